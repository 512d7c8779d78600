//! Dataset augmentation: batch driver, output layout, and split files.

pub mod batch;
pub mod layout;
pub mod splits;

pub use batch::{
    annotate_meters, augment_dataset, load_meters, meter_histogram, run, BatchReport,
    MeterHistogram, RunReport,
};
pub use layout::{AugmentationLayout, CompletionMarker, MARKER_FILE};
pub use splits::{augment_split, make_splits, SPLIT_FILES};
