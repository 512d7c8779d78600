//! Annotation correction for spliced audio.
//!
//! Splicing removes (or repeats) audio, so the original beat times no longer
//! describe the new signal. These functions rebuild a gap-free timeline from
//! the kept durations and a regular position cycle for the target meter.

use crate::beats::Interval;

/// Lay the kept intervals end to end, starting at `first_beat`.
///
/// Each output interval keeps the duration (and label) of its source, and
/// starts exactly where the previous one ended.
pub fn correct_annotations(first_beat: f64, kept: &[Interval]) -> Vec<Interval> {
    let mut start = first_beat;
    kept.iter()
        .map(|interval| {
            let duration = interval.duration();
            let corrected = Interval::new(start, start + duration, interval.position);
            start += duration;
            corrected
        })
        .collect()
}

/// Relabel `positions` as a regular `1..=beats_per_bar` cycle.
///
/// Only the first label is used, to set the phase: output `i` is
/// `((p0 - 1 + i) mod beats_per_bar) + 1`.
///
/// # Panics
///
/// Panics if `beats_per_bar` is zero.
pub fn correct_positions(positions: &[u32], beats_per_bar: u32) -> Vec<u32> {
    assert!(beats_per_bar > 0, "beats_per_bar must be non-zero");

    let Some(&first) = positions.first() else {
        return Vec::new();
    };

    let phase = first.saturating_sub(1) as u64;
    let bar = beats_per_bar as u64;
    (0..positions.len() as u64)
        .map(|i| ((phase + i) % bar + 1) as u32)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correct_annotations_contiguous() {
        // Kept intervals taken from disjoint parts of the original timeline
        let kept = vec![
            Interval::new(0.5, 1.0, 1),
            Interval::new(1.0, 1.6, 2),
            Interval::new(2.5, 3.1, 1),
            Interval::new(2.5, 3.1, 5),
            Interval::new(7.0, 7.45, 2),
        ];

        let corrected = correct_annotations(0.5, &kept);

        assert_eq!(corrected.len(), kept.len());
        assert_eq!(corrected[0].start, 0.5);
        for pair in corrected.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
        for (c, k) in corrected.iter().zip(&kept) {
            assert!((c.duration() - k.duration()).abs() < 1e-12);
            assert_eq!(c.position, k.position);
        }
    }

    #[test]
    fn test_correct_annotations_empty() {
        assert!(correct_annotations(3.0, &[]).is_empty());
    }

    #[test]
    fn test_correct_positions_keeps_phase() {
        assert_eq!(
            correct_positions(&[3, 4, 5, 1, 2, 3, 4, 5], 5),
            vec![3, 4, 5, 1, 2, 3, 4, 5]
        );
        assert_eq!(correct_positions(&[1, 2, 3, 5, 4], 5), vec![1, 2, 3, 4, 5]);
        assert_eq!(correct_positions(&[2, 1, 2, 1], 2), vec![2, 1, 2, 1]);
    }

    #[test]
    fn test_correct_positions_ignores_irregular_labels() {
        assert_eq!(
            correct_positions(&[1, 2, 3, 4, 3, 4, 1], 6),
            vec![1, 2, 3, 4, 5, 6, 1]
        );
    }

    #[test]
    fn test_correct_positions_first_label_beyond_meter() {
        // A leading 4 in a 3/4 output wraps to 1
        assert_eq!(correct_positions(&[4, 1, 2, 3], 3), vec![1, 2, 3, 1]);
    }

    #[test]
    fn test_correct_positions_period() {
        for meter in 2..=7u32 {
            for first in 1..=4u32 {
                for len in [1usize, 2, 7, 29] {
                    let input = vec![first; len];
                    let output = correct_positions(&input, meter);

                    assert_eq!(output.len(), len);
                    assert_eq!(output[0], (first - 1) % meter + 1);
                    assert!(output.iter().all(|&p| (1..=meter).contains(&p)));
                    for i in meter as usize..len {
                        assert_eq!(output[i], output[i - meter as usize]);
                    }
                    for pair in output.windows(2) {
                        assert_eq!(pair[1], pair[0] % meter + 1);
                    }
                }
            }
        }
    }

    #[test]
    fn test_correct_positions_empty() {
        assert!(correct_positions(&[], 4).is_empty());
    }
}
