//! Library module for datasets: track lookup, annotation files, and audio I/O.

pub mod annotations;
pub mod audio;
pub mod registry;

pub use annotations::{parse_beats, read_beats, read_meter, write_beats, write_meter};
pub use audio::{
    is_supported_audio_file, load_audio, supported_extensions, write_wav, INGEST_SAMPLE_RATE,
};
pub use registry::{augmented_root, load_datasets, Track, TrackRegistry};
