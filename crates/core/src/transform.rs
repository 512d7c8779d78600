//! The per-track meter transformation pipeline.

use crate::beats::{extract_intervals, BeatTrack, Interval};
use crate::correct::{correct_annotations, correct_positions};
use crate::error::TransformError;
use crate::meter::TargetMeter;
use crate::select::Selection;
use crate::splice::{splice, SpliceOptions};

/// Knobs for [`transform`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransformOptions {
    /// Bar position dropped by the 3/4 selector.
    pub three_four_drop_position: u32,
    /// Snap splice boundaries to zero crossings.
    pub align_zeros: bool,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            three_four_drop_position: 4,
            align_zeros: true,
        }
    }
}

impl TransformOptions {
    pub fn validate(&self) -> Result<(), TransformError> {
        if !(1..=4).contains(&self.three_four_drop_position) {
            return Err(TransformError::InvalidDropPosition(
                self.three_four_drop_position,
            ));
        }
        Ok(())
    }

    pub fn splice_options(&self) -> SpliceOptions {
        SpliceOptions {
            align_zeros: self.align_zeros,
        }
    }
}

/// Annotations of a track transformed to a new meter.
#[derive(Debug, Clone, PartialEq)]
pub struct Augmentation {
    pub target: TargetMeter,
    /// Intervals kept from the source track, with their original labels.
    pub selection: Selection,
    /// Contiguous intervals of the spliced audio, labelled in the target meter.
    pub intervals: Vec<Interval>,
}

impl Augmentation {
    /// Beat times of the spliced audio (one per kept interval).
    pub fn beat_times(&self) -> Vec<f64> {
        self.intervals.iter().map(|i| i.start).collect()
    }

    /// Bar positions in the target meter, parallel to [`Self::beat_times`].
    pub fn positions(&self) -> Vec<u32> {
        self.intervals.iter().map(|i| i.position).collect()
    }

    /// Splice the source audio so it matches these annotations.
    pub fn render(&self, samples: &[f32], sample_rate: u32, options: &SpliceOptions) -> Vec<f32> {
        splice(samples, sample_rate, self.selection.intervals(), options)
    }
}

/// Transform a 4/4 beat track into `target`.
///
/// Extracts the inter-beat intervals, runs the target's selector, then lays
/// the kept intervals end to end from the first beat and relabels them as a
/// regular cycle of the target meter.
pub fn transform(
    track: &BeatTrack,
    target: TargetMeter,
    options: &TransformOptions,
) -> Result<Augmentation, TransformError> {
    options.validate()?;

    let first_beat = match track.first_time() {
        Some(t) if track.len() >= 2 => t,
        _ => return Err(TransformError::TooFewBeats(track.len())),
    };

    let intervals = extract_intervals(track);
    let selection = target.select(&intervals, options);
    if selection.is_empty() {
        return Err(TransformError::EmptySelection(target.to_string()));
    }

    let positions = correct_positions(&selection.positions(), target.beats_per_bar());
    let intervals: Vec<Interval> = correct_annotations(first_beat, selection.intervals())
        .into_iter()
        .zip(positions)
        .map(|(interval, position)| interval.relabel(position))
        .collect();

    log::debug!(
        "{}: kept {} of {} intervals",
        target,
        selection.len(),
        track.len() - 1
    );

    Ok(Augmentation {
        target,
        selection,
        intervals,
    })
}
