//! Batch augmentation of whole datasets.
//!
//! Per-track problems (missing or malformed beats, undecodable audio, nothing
//! left after selection) are logged and the track is skipped. Failures while
//! writing outputs abort the batch.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use meteraug_core::{infer_meter, transform, Augmentation, Meter, TargetMeter};

use super::layout::{AugmentationLayout, CompletionMarker};
use crate::config::AugmentSettings;
use crate::library::{load_datasets, write_beats, write_meter, write_wav, Track, TrackRegistry};

/// Outcome of one (dataset, target) batch.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchReport {
    pub dataset: String,
    pub target: TargetMeter,
    /// Ids of the written tracks (augmented ids, e.g. `song_34`).
    pub written: Vec<String>,
    /// Source track id and the reason it was skipped.
    pub skipped: Vec<(String, String)>,
    /// The batch had already been completed and was not run again.
    pub already_complete: bool,
}

/// Outcome of [`run`] over every configured dataset and target.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunReport {
    pub batches: Vec<BatchReport>,
    /// Dataset name and the reason it could not be loaded.
    pub skipped_datasets: Vec<(String, String)>,
}

/// Meter label counts over a registry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MeterHistogram {
    pub counts: BTreeMap<Meter, usize>,
    /// Tracks with no readable meter label.
    pub unlabelled: usize,
}

/// Tracks whose meter label is one of `include`, in id order.
///
/// Tracks without a readable label are skipped with a warning.
pub fn load_meters(registry: &TrackRegistry, include: &[Meter]) -> Vec<(String, Meter)> {
    registry
        .tracks()
        .filter_map(|track| match track.meter() {
            Ok(Some(meter)) => Some((track.id.clone(), meter)),
            Ok(None) => {
                log::warn!("Track {} has no meter label, skipping", track.id);
                None
            }
            Err(e) => {
                log::warn!("Track {}: {}, skipping", track.id, e);
                None
            }
        })
        .filter(|(_, meter)| include.contains(meter))
        .collect()
}

/// Count the meter labels of every track in `registry`.
pub fn meter_histogram(registry: &TrackRegistry) -> MeterHistogram {
    let mut histogram = MeterHistogram::default();
    for track in registry.tracks() {
        match track.meter() {
            Ok(Some(meter)) => *histogram.counts.entry(meter).or_insert(0) += 1,
            Ok(None) => histogram.unlabelled += 1,
            Err(e) => {
                log::warn!("Track {}: {}, counting as unlabelled", track.id, e);
                histogram.unlabelled += 1;
            }
        }
    }
    histogram
}

/// A transformed track ready to be written.
struct PreparedTrack {
    augmentation: Augmentation,
    audio: Vec<f32>,
    sample_rate: u32,
}

/// Load, transform, and splice one track. Any error here skips the track.
fn prepare_track(
    track: &Track,
    target: TargetMeter,
    settings: &AugmentSettings,
) -> Result<PreparedTrack, anyhow::Error> {
    let beats = track.beats()?;
    let options = settings.transform_options();
    let augmentation = transform(&beats, target, &options)?;

    let (samples, sample_rate) = track.audio(settings.sample_rate)?;
    let audio = augmentation.render(&samples, sample_rate, &options.splice_options());

    Ok(PreparedTrack {
        augmentation,
        audio,
        sample_rate,
    })
}

fn write_outputs(
    layout: &AugmentationLayout,
    track_id: &str,
    prepared: &PreparedTrack,
) -> Result<(), anyhow::Error> {
    let augmentation = &prepared.augmentation;
    write_wav(
        layout.audio_path(track_id),
        &prepared.audio,
        prepared.sample_rate,
    )?;
    write_beats(
        layout.beats_path(track_id),
        &augmentation.beat_times(),
        &augmentation.positions(),
    )?;
    write_meter(layout.meter_path(track_id), augmentation.target.meter())?;
    Ok(())
}

/// Augment every eligible track of `registry` into `target`.
///
/// Outputs go under `<data_home>/<registry name>_augmented/<code>`. A batch
/// whose completion marker is present is skipped.
pub fn augment_dataset<P: AsRef<Path>>(
    registry: &TrackRegistry,
    data_home: P,
    target: TargetMeter,
    settings: &AugmentSettings,
) -> Result<BatchReport, anyhow::Error> {
    let dataset = registry.name().to_string();
    let layout = AugmentationLayout::new(data_home, &dataset, target);
    let mut report = BatchReport {
        dataset: dataset.clone(),
        target,
        written: Vec::new(),
        skipped: Vec::new(),
        already_complete: false,
    };

    if let Some(marker) = layout.read_marker() {
        log::info!(
            "{} {} already augmented at {} ({} tracks), skipping",
            dataset,
            target,
            marker.completed_at.to_rfc3339(),
            marker.tracks_written
        );
        report.already_complete = true;
        return Ok(report);
    }

    let eligible = load_meters(registry, &settings.include_meters);
    log::info!(
        "Augmenting {} of {} tracks of {} to {}",
        eligible.len(),
        registry.len(),
        dataset,
        target
    );
    layout.create()?;

    let total = eligible.len();
    for (index, (track_id, _)) in eligible.iter().enumerate() {
        let Some(track) = registry.get(track_id) else {
            continue;
        };
        log::info!("[{}/{}] {}", index + 1, total, track_id);

        match prepare_track(track, target, settings) {
            Ok(prepared) => {
                write_outputs(&layout, track_id, &prepared)?;
                report.written.push(layout.output_id(track_id));
            }
            Err(e) => {
                log::warn!("Skipping {}: {}", track_id, e);
                report.skipped.push((track_id.clone(), e.to_string()));
            }
        }
    }

    layout.write_marker(&CompletionMarker {
        dataset: dataset.clone(),
        target,
        tracks_written: report.written.len(),
        tracks_skipped: report.skipped.len(),
        completed_at: chrono::Utc::now(),
    })?;

    log::info!(
        "{} {}: wrote {} tracks, skipped {}",
        dataset,
        target,
        report.written.len(),
        report.skipped.len()
    );
    Ok(report)
}

/// Augment every configured dataset into every configured target.
///
/// A dataset that cannot be loaded is logged and skipped; the remaining
/// datasets are still processed.
pub fn run<P: AsRef<Path>>(
    settings: &AugmentSettings,
    data_home: P,
) -> Result<RunReport, anyhow::Error> {
    let data_home = data_home.as_ref();
    let mut report = RunReport::default();

    for dataset in &settings.datasets {
        let registry = match load_datasets(data_home, std::slice::from_ref(dataset)) {
            Ok(registry) => registry,
            Err(e) => {
                log::warn!("Skipping dataset {}: {}", dataset, e);
                report.skipped_datasets.push((dataset.clone(), e.to_string()));
                continue;
            }
        };
        for &target in &settings.targets {
            report
                .batches
                .push(augment_dataset(&registry, data_home, target, settings)?);
        }
    }

    Ok(report)
}

/// Write a `.meter` file inferred from the beat positions of every track in
/// the dataset at `dataset_dir` that has no label yet.
///
/// Returns the number of labels written.
pub fn annotate_meters<P: AsRef<Path>>(dataset_dir: P) -> Result<usize, anyhow::Error> {
    let dataset_dir = dataset_dir.as_ref();
    let name = dataset_dir
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("dataset")
        .to_string();
    let registry = TrackRegistry::open(name, dataset_dir)?;

    let mut written = 0;
    for track in registry.tracks() {
        if track.meter_path.exists() {
            log::debug!("{} already has a meter label", track.id);
            continue;
        }

        let beats = match track.beats() {
            Ok(beats) => beats,
            Err(e) => {
                log::warn!("Skipping {}: {}", track.id, e);
                continue;
            }
        };

        let Some(meter) = infer_meter(beats.positions()) else {
            log::warn!("Skipping {}: beat positions never wrap to a new bar", track.id);
            continue;
        };

        if let Some(parent) = track.meter_path.parent() {
            fs::create_dir_all(parent)?;
        }
        write_meter(&track.meter_path, meter)?;
        log::info!("{}: {}", track.id, meter);
        written += 1;
    }

    Ok(written)
}
