//! Errors raised while reading datasets and their annotations.

use std::path::PathBuf;

use meteraug_core::{BeatError, TransformError};
use thiserror::Error;

/// Errors for a single track or annotation file.
///
/// Everything here is recoverable at track granularity: the batch driver logs
/// it and moves on to the next track.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("track {0} is not in the registry")]
    UnknownTrack(String),

    #[error("no beat annotation at {0}")]
    MissingAnnotation(PathBuf),

    #[error("{path}: line {line}: {reason}")]
    MalformedAnnotation {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("{path}: no usable beat positions ({reason})")]
    MissingPositionData { path: PathBuf, reason: String },

    #[error("no meter label at {0}")]
    MissingMeter(PathBuf),

    #[error("{path}: malformed split entry on line {line}")]
    MalformedSplit { path: PathBuf, line: usize },

    #[error("invalid beats: {0}")]
    Beats(#[from] BeatError),

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
