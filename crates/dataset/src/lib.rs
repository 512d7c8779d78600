//! Meteraug dataset module
//!
//! Reads beat-annotated datasets from disk and writes their meter
//! augmentations next to them.
//!
//! # Features
//!
//! - Track registry over `audio/` and `annotations/` trees, mergeable across datasets
//! - Beat and meter annotation files
//! - Audio decoding and resampling (symphonia, rubato) and WAV output (hound)
//! - Batch augmentation with per-batch completion markers
//! - Split files for augmented tracks
//! - JSON settings file

pub mod augment;
pub mod config;
pub mod error;
pub mod library;

// Re-export main types
pub use augment::{
    augment_dataset, make_splits, run, AugmentationLayout, BatchReport, RunReport,
};
pub use config::{AugmentSettings, SettingsError, SettingsManager};
pub use error::DatasetError;
pub use library::{load_datasets, Track, TrackRegistry};
