//! Meter transformation engine.
//!
//! Turns beat-annotated 4/4 recordings into synthetic recordings in 2/4, 3/4,
//! 5/4, 6/4 or 7/4 by dropping or repeating inter-beat segments, and rebuilds
//! beat times and bar positions that match the spliced audio.
//!
//! # Pipeline
//!
//! - [`extract_intervals`]: beats to inter-beat intervals
//! - [`TargetMeter::select`]: keep, drop or repeat intervals by bar position
//! - [`correct_annotations`] / [`correct_positions`]: new timeline and labels
//! - [`splice`]: concatenate the kept audio
//!
//! [`transform`] runs the annotation side of the pipeline for one track.

pub use beats::{extract_intervals, BeatTrack, Interval};
pub use correct::{correct_annotations, correct_positions};
pub use error::{BeatError, TransformError};
pub use meter::{infer_meter, Meter, TargetMeter};
pub use select::{Selection, ToggleState, ToggleStep};
pub use splice::{splice, splice_ranges, time_to_sample, zero_crossings, SpliceOptions};
pub use transform::{transform, Augmentation, TransformOptions};

mod beats;
mod correct;
mod error;
mod meter;
pub mod select;
mod splice;
mod transform;
