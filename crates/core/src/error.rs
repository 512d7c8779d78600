//! Error types for the meter transformation engine.

use thiserror::Error;

/// Reasons a beat annotation cannot be turned into a [`BeatTrack`](crate::BeatTrack).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BeatError {
    #[error("beat times and positions differ in length ({times} times, {positions} positions)")]
    LengthMismatch { times: usize, positions: usize },

    #[error("beat {index} has invalid time {time}")]
    InvalidTime { index: usize, time: f64 },

    #[error("beat times are not strictly increasing at index {index} ({previous} -> {time})")]
    NotIncreasing {
        index: usize,
        previous: f64,
        time: f64,
    },

    #[error("beat {index} has invalid position {position}")]
    InvalidPosition { index: usize, position: u32 },
}

/// Errors raised while transforming a track to a new meter.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransformError {
    #[error("track has {0} beats, at least 2 are needed to form an interval")]
    TooFewBeats(usize),

    #[error("no intervals survived the {0} selection")]
    EmptySelection(String),

    #[error("unsupported target meter code: {0}")]
    UnsupportedTarget(String),

    #[error("invalid meter label: {0:?}")]
    InvalidMeter(String),

    #[error("3/4 transform cannot drop position {0}, expected 1-4")]
    InvalidDropPosition(u32),
}
