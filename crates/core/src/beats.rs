//! Beat annotations and the inter-beat intervals derived from them.

use crate::error::BeatError;

/// Ground-truth beats of a single track.
///
/// Times are in seconds and strictly increasing; positions are the 1-based
/// index of each beat inside its bar.
#[derive(Debug, Clone, PartialEq)]
pub struct BeatTrack {
    times: Vec<f64>,
    positions: Vec<u32>,
}

impl BeatTrack {
    /// Build a beat track, validating lengths, ordering and labels.
    pub fn new(times: Vec<f64>, positions: Vec<u32>) -> Result<Self, BeatError> {
        if times.len() != positions.len() {
            return Err(BeatError::LengthMismatch {
                times: times.len(),
                positions: positions.len(),
            });
        }

        if let Some((index, &time)) = times
            .iter()
            .enumerate()
            .find(|(_, t)| !t.is_finite() || **t < 0.0)
        {
            return Err(BeatError::InvalidTime { index, time });
        }

        if let Some(index) = times.windows(2).position(|pair| pair[1] <= pair[0]) {
            return Err(BeatError::NotIncreasing {
                index: index + 1,
                previous: times[index],
                time: times[index + 1],
            });
        }

        if let Some(index) = positions.iter().position(|&p| p == 0) {
            return Err(BeatError::InvalidPosition { index, position: 0 });
        }

        Ok(Self { times, positions })
    }

    /// Beat times in seconds.
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// Beat positions within the bar.
    pub fn positions(&self) -> &[u32] {
        &self.positions
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Time of the first beat, if any.
    pub fn first_time(&self) -> Option<f64> {
        self.times.first().copied()
    }
}

/// Half-open span `[start, end)` between two consecutive beats, labelled with
/// the bar position of the beat it starts on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub start: f64,
    pub end: f64,
    pub position: u32,
}

impl Interval {
    pub fn new(start: f64, end: f64, position: u32) -> Self {
        Self {
            start,
            end,
            position,
        }
    }

    /// Length of the interval in seconds.
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// The same span carrying a different position label.
    pub fn relabel(self, position: u32) -> Self {
        Self { position, ..self }
    }
}

/// Turn `n` beats into the `n - 1` intervals between them.
///
/// Nothing follows the final beat, so it never starts an interval. Tracks with
/// fewer than two beats produce no intervals.
pub fn extract_intervals(track: &BeatTrack) -> Vec<Interval> {
    track
        .times
        .windows(2)
        .zip(&track.positions)
        .map(|(pair, &position)| Interval::new(pair[0], pair[1], position))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(times: &[f64], positions: &[u32]) -> BeatTrack {
        BeatTrack::new(times.to_vec(), positions.to_vec()).unwrap()
    }

    #[test]
    fn test_extract_intervals_count_and_starts() {
        let beats = track(&[0.5, 1.0, 1.5, 2.0, 2.5], &[1, 2, 3, 4, 1]);
        let intervals = extract_intervals(&beats);

        assert_eq!(intervals.len(), beats.len() - 1);
        for (i, interval) in intervals.iter().enumerate() {
            assert_eq!(interval.start, beats.times()[i]);
            assert_eq!(interval.end, beats.times()[i + 1]);
            assert_eq!(interval.position, beats.positions()[i]);
        }
    }

    #[test]
    fn test_extract_intervals_too_few_beats() {
        assert!(extract_intervals(&track(&[], &[])).is_empty());
        assert!(extract_intervals(&track(&[1.0], &[1])).is_empty());
    }

    #[test]
    fn test_interval_duration_and_relabel() {
        let interval = Interval::new(1.25, 2.0, 3);
        assert_eq!(interval.duration(), 0.75);

        let relabelled = interval.relabel(5);
        assert_eq!(relabelled.position, 5);
        assert_eq!(relabelled.start, 1.25);
        assert_eq!(relabelled.end, 2.0);
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let err = BeatTrack::new(vec![0.0, 1.0], vec![1]).unwrap_err();
        assert_eq!(
            err,
            BeatError::LengthMismatch {
                times: 2,
                positions: 1
            }
        );
    }

    #[test]
    fn test_non_increasing_times_rejected() {
        let err = BeatTrack::new(vec![0.0, 1.0, 1.0], vec![1, 2, 3]).unwrap_err();
        assert!(matches!(err, BeatError::NotIncreasing { index: 2, .. }));
    }

    #[test]
    fn test_negative_time_rejected() {
        let err = BeatTrack::new(vec![-0.1, 1.0], vec![1, 2]).unwrap_err();
        assert!(matches!(err, BeatError::InvalidTime { index: 0, .. }));
    }

    #[test]
    fn test_zero_position_rejected() {
        let err = BeatTrack::new(vec![0.0, 1.0], vec![1, 0]).unwrap_err();
        assert_eq!(
            err,
            BeatError::InvalidPosition {
                index: 1,
                position: 0
            }
        );
    }
}
