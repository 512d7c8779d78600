//! Where augmented tracks are written, and the marker recording a finished batch.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use meteraug_core::TargetMeter;
use serde::{Deserialize, Serialize};

use crate::library::augmented_root;

/// File name of the completion marker inside a target directory.
pub const MARKER_FILE: &str = ".complete.json";

/// Output directories of one (dataset, target) batch:
/// `<data_home>/<dataset>_augmented/<code>/{audio,annotations/beats,annotations/meter}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AugmentationLayout {
    root: PathBuf,
    target: TargetMeter,
}

impl AugmentationLayout {
    pub fn new<P: AsRef<Path>>(data_home: P, dataset: &str, target: TargetMeter) -> Self {
        Self {
            root: augmented_root(data_home, dataset).join(target.code()),
            target,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn target(&self) -> TargetMeter {
        self.target
    }

    pub fn audio_dir(&self) -> PathBuf {
        self.root.join("audio")
    }

    pub fn beats_dir(&self) -> PathBuf {
        self.root.join("annotations").join("beats")
    }

    pub fn meter_dir(&self) -> PathBuf {
        self.root.join("annotations").join("meter")
    }

    /// Id of the augmented copy of `track_id`, e.g. `song_34`.
    pub fn output_id(&self, track_id: &str) -> String {
        format!("{}_{}", track_id, self.target.code())
    }

    pub fn audio_path(&self, track_id: &str) -> PathBuf {
        self.audio_dir().join(format!("{}.wav", self.output_id(track_id)))
    }

    pub fn beats_path(&self, track_id: &str) -> PathBuf {
        self.beats_dir().join(format!("{}.beats", self.output_id(track_id)))
    }

    pub fn meter_path(&self, track_id: &str) -> PathBuf {
        self.meter_dir().join(format!("{}.meter", self.output_id(track_id)))
    }

    /// Create the output directories. Safe to call on an existing layout.
    pub fn create(&self) -> io::Result<()> {
        fs::create_dir_all(self.audio_dir())?;
        fs::create_dir_all(self.beats_dir())?;
        fs::create_dir_all(self.meter_dir())
    }

    pub fn marker_path(&self) -> PathBuf {
        self.root.join(MARKER_FILE)
    }

    /// The completion marker, if present and readable.
    ///
    /// A marker that fails to parse is ignored with a warning so the batch runs
    /// again.
    pub fn read_marker(&self) -> Option<CompletionMarker> {
        let path = self.marker_path();
        let content = fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&content) {
            Ok(marker) => Some(marker),
            Err(e) => {
                log::warn!("Ignoring unreadable marker {:?}: {}", path, e);
                None
            }
        }
    }

    pub fn write_marker(&self, marker: &CompletionMarker) -> Result<(), anyhow::Error> {
        let content = serde_json::to_string_pretty(marker)?;
        fs::write(self.marker_path(), content)?;
        Ok(())
    }
}

/// Summary written once every track of a batch has been processed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionMarker {
    pub dataset: String,
    pub target: TargetMeter,
    pub tracks_written: usize,
    pub tracks_skipped: usize,
    pub completed_at: DateTime<Utc>,
}
