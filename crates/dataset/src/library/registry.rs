//! Track registry: owns the tracks of one or more datasets and resolves their files.
//!
//! A dataset on disk looks like
//!
//! ```text
//! <root>/audio/**/<id>.wav
//! <root>/annotations/beats/<id>.beats
//! <root>/annotations/meter/<id>.meter
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use meteraug_core::{BeatTrack, Meter, TargetMeter};

use super::annotations::{read_beats, read_meter};
use super::audio::{is_supported_audio_file, load_audio};
use crate::error::DatasetError;

/// One track of a dataset and the paths of its files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    /// Audio file name without extension.
    pub id: String,
    pub audio_path: PathBuf,
    pub beats_path: PathBuf,
    pub meter_path: PathBuf,
}

impl Track {
    /// Build a track whose annotations live under `annotations_dir`.
    pub fn new(id: String, audio_path: PathBuf, annotations_dir: &Path) -> Self {
        let beats_path = annotations_dir.join("beats").join(format!("{}.beats", id));
        let meter_path = annotations_dir.join("meter").join(format!("{}.meter", id));
        Self {
            id,
            audio_path,
            beats_path,
            meter_path,
        }
    }

    /// Decoded mono audio at `sample_rate`.
    pub fn audio(&self, sample_rate: u32) -> Result<(Vec<f32>, u32), anyhow::Error> {
        load_audio(&self.audio_path, sample_rate)
    }

    pub fn beats(&self) -> Result<BeatTrack, DatasetError> {
        read_beats(&self.beats_path)
    }

    /// Meter label, or `None` when the track has no meter file.
    pub fn meter(&self) -> Result<Option<Meter>, DatasetError> {
        match read_meter(&self.meter_path) {
            Ok(meter) => Ok(Some(meter)),
            Err(DatasetError::MissingMeter(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Tracks of one or more datasets, keyed (and iterated) by track id.
#[derive(Debug, Clone, Default)]
pub struct TrackRegistry {
    name: String,
    tracks: BTreeMap<String, Track>,
}

impl TrackRegistry {
    /// An empty registry.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tracks: BTreeMap::new(),
        }
    }

    /// Index the dataset rooted at `root` (`audio/` and `annotations/` inside).
    pub fn open<P: AsRef<Path>>(name: impl Into<String>, root: P) -> Result<Self, anyhow::Error> {
        let root = root.as_ref();
        Self::index(name, root.join("audio"), root.join("annotations"))
    }

    /// Index every supported audio file below `audio_dir`, recursively.
    pub fn index<P: AsRef<Path>, Q: AsRef<Path>>(
        name: impl Into<String>,
        audio_dir: P,
        annotations_dir: Q,
    ) -> Result<Self, anyhow::Error> {
        let audio_dir = audio_dir.as_ref();
        let annotations_dir = annotations_dir.as_ref();
        let mut registry = Self::new(name);

        if !audio_dir.is_dir() {
            return Err(anyhow::anyhow!(
                "Audio directory {:?} does not exist",
                audio_dir
            ));
        }

        registry.index_directory(audio_dir, annotations_dir)?;
        log::info!(
            "Indexed {} tracks for {} from {:?}",
            registry.len(),
            registry.name,
            audio_dir
        );
        Ok(registry)
    }

    fn index_directory(&mut self, dir: &Path, annotations_dir: &Path) -> Result<(), anyhow::Error> {
        let mut entries: Vec<PathBuf> = fs::read_dir(dir)?
            .flatten()
            .map(|entry| entry.path())
            .collect();
        entries.sort();

        for entry_path in entries {
            if entry_path.is_dir() {
                self.index_directory(&entry_path, annotations_dir)?;
            } else if is_supported_audio_file(&entry_path) {
                let Some(id) = entry_path.file_stem().and_then(|s| s.to_str()) else {
                    log::warn!("Skipping file with non UTF-8 name: {:?}", entry_path);
                    continue;
                };
                let track = Track::new(id.to_string(), entry_path.clone(), annotations_dir);
                if let Some(previous) = self.insert(track) {
                    log::warn!(
                        "Duplicate track id {}: {:?} replaced by {:?}",
                        previous.id,
                        previous.audio_path,
                        entry_path
                    );
                }
            }
        }
        Ok(())
    }

    /// Add a track, returning the one it replaced.
    pub fn insert(&mut self, track: Track) -> Option<Track> {
        self.tracks.insert(track.id.clone(), track)
    }

    /// Merge `other` into this registry. Tracks from `other` win on id clashes.
    pub fn union(mut self, other: TrackRegistry) -> Self {
        if self.name.is_empty() {
            self.name = other.name;
        } else if !other.name.is_empty() {
            self.name = format!("{}+{}", self.name, other.name);
        }
        self.tracks.extend(other.tracks);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn track_ids(&self) -> impl Iterator<Item = &str> {
        self.tracks.keys().map(String::as_str)
    }

    pub fn tracks(&self) -> impl Iterator<Item = &Track> {
        self.tracks.values()
    }

    pub fn get(&self, track_id: &str) -> Option<&Track> {
        self.tracks.get(track_id)
    }

    fn track(&self, track_id: &str) -> Result<&Track, DatasetError> {
        self.get(track_id)
            .ok_or_else(|| DatasetError::UnknownTrack(track_id.to_string()))
    }

    /// Mono audio of a track at `sample_rate`.
    pub fn get_audio(
        &self,
        track_id: &str,
        sample_rate: u32,
    ) -> Result<(Vec<f32>, u32), anyhow::Error> {
        self.track(track_id)?.audio(sample_rate)
    }

    pub fn get_beats(&self, track_id: &str) -> Result<BeatTrack, DatasetError> {
        self.track(track_id)?.beats()
    }

    pub fn get_meter(&self, track_id: &str) -> Result<Option<Meter>, DatasetError> {
        self.track(track_id)?.meter()
    }
}

/// Root directory of the augmented copies of `dataset`.
pub fn augmented_root<P: AsRef<Path>>(data_home: P, dataset: &str) -> PathBuf {
    data_home.as_ref().join(format!("{}_augmented", dataset))
}

/// Load and merge several datasets from `data_home`.
///
/// A plain name refers to `<data_home>/<name>`. A name ending in a target code,
/// such as `gtzan_64`, refers to the 6/4 augmentation of `gtzan` at
/// `<data_home>/gtzan_augmented/64`.
pub fn load_datasets<P: AsRef<Path>>(
    data_home: P,
    names: &[String],
) -> Result<TrackRegistry, anyhow::Error> {
    let data_home = data_home.as_ref();
    let mut merged = TrackRegistry::default();

    for name in names {
        let root = match split_augmented_name(name) {
            Some((base, target)) => augmented_root(data_home, base).join(target.code()),
            None => data_home.join(name),
        };
        log::info!("Loading {} from {:?}", name, root);
        merged = merged.union(TrackRegistry::open(name.clone(), root)?);
    }

    Ok(merged)
}

/// Split `gtzan_64` into (`gtzan`, 6/4). Plain names return `None`.
fn split_augmented_name(name: &str) -> Option<(&str, TargetMeter)> {
    let (base, code) = name.rsplit_once('_')?;
    if base.is_empty() {
        return None;
    }
    TargetMeter::from_code(code).ok().map(|target| (base, target))
}
