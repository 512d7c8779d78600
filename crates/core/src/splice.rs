//! Audio splicing: build a new signal from the kept beat intervals.

use std::ops::Range;

use crate::beats::Interval;

/// Samples at or below this magnitude count as zero when locating crossings.
const ZERO_THRESHOLD: f32 = 1e-10;

/// Splicing options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpliceOptions {
    /// Snap every segment boundary to the nearest zero crossing to avoid clicks.
    pub align_zeros: bool,
}

impl Default for SpliceOptions {
    fn default() -> Self {
        Self { align_zeros: true }
    }
}

/// Convert a time in seconds to a sample index (truncating).
pub fn time_to_sample(time: f64, sample_rate: u32) -> usize {
    (time * sample_rate as f64) as usize
}

/// Sample ranges of `samples` to concatenate for the given kept intervals.
///
/// The first range always covers the audio before the first kept beat, so the
/// lead-in of the track is not lost. With [`SpliceOptions::align_zeros`] every
/// boundary is moved to the nearest zero crossing (the end of the signal always
/// counts as one). Ranges are clamped to the signal; a range whose end falls
/// before its start is empty.
pub fn splice_ranges(
    samples: &[f32],
    sample_rate: u32,
    kept: &[Interval],
    options: &SpliceOptions,
) -> Vec<Range<usize>> {
    let Some(first) = kept.first() else {
        return Vec::new();
    };

    let len = samples.len();
    let crossings = options.align_zeros.then(|| zero_crossings(samples));
    let snap = |index: usize| {
        crossings
            .as_deref()
            .map_or(index, |c| nearest(c, index))
            .min(len)
    };

    std::iter::once((0.0, first.start))
        .chain(kept.iter().map(|i| (i.start, i.end)))
        .map(|(start, end)| {
            let start = snap(time_to_sample(start, sample_rate));
            let end = snap(time_to_sample(end, sample_rate));
            start..end.max(start)
        })
        .collect()
}

/// Concatenate the audio covered by the kept intervals, preceded by the audio
/// before the first kept beat. See [`splice_ranges`].
pub fn splice(
    samples: &[f32],
    sample_rate: u32,
    kept: &[Interval],
    options: &SpliceOptions,
) -> Vec<f32> {
    let ranges = splice_ranges(samples, sample_rate, kept, options);

    log::debug!(
        "Splicing {} segments from {} samples at {} Hz",
        ranges.len(),
        samples.len(),
        sample_rate
    );

    let total: usize = ranges.iter().map(|r| r.len()).sum();
    let mut output = Vec::with_capacity(total);
    for range in ranges {
        output.extend_from_slice(&samples[range]);
    }
    output
}

/// Indices where the signal changes sign, plus index 0 and `samples.len()`.
///
/// Near-silent samples (|x| <= 1e-10) count as positive.
pub fn zero_crossings(samples: &[f32]) -> Vec<usize> {
    let negative = |s: f32| s < -ZERO_THRESHOLD;

    let mut crossings = Vec::new();
    if !samples.is_empty() {
        crossings.push(0);
    }
    crossings.extend(
        samples
            .windows(2)
            .enumerate()
            .filter(|(_, pair)| negative(pair[0]) != negative(pair[1]))
            .map(|(i, _)| i + 1),
    );
    crossings.push(samples.len());
    crossings
}

/// Closest entry of the sorted `candidates` to `index`; ties go to the earlier one.
fn nearest(candidates: &[usize], index: usize) -> usize {
    match candidates.binary_search(&index) {
        Ok(_) => index,
        Err(0) => candidates[0],
        Err(i) if i == candidates.len() => candidates[i - 1],
        Err(i) => {
            let (before, after) = (candidates[i - 1], candidates[i]);
            if index - before <= after - index {
                before
            } else {
                after
            }
        }
    }
}
