use std::path::PathBuf;

use clap::{Parser, Subcommand};
use meteraug_core::TargetMeter;
use meteraug_dataset::augment::{annotate_meters, meter_histogram};
use meteraug_dataset::{load_datasets, make_splits, run, SettingsManager};

/// Augment 4/4 beat-annotated music datasets into other meters.
#[derive(Parser, Debug)]
#[command(name = "meteraug")]
#[command(about = "Meter augmentation for beat-annotated datasets")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write augmented copies of every 4/4 track of the given datasets
    Augment {
        /// Directory holding one sub-directory per dataset
        #[arg(long)]
        data_home: PathBuf,

        /// Datasets to augment (default: beatles gtzan rwcc rwcj)
        #[arg(long, num_args = 1..)]
        datasets: Vec<String>,

        /// Target meters, as codes (24) or labels (2/4) (default: 24 34)
        #[arg(long, num_args = 1..)]
        target_aug: Vec<TargetMeter>,

        /// Settings file (JSON); flags given here override its values
        #[arg(long)]
        config: Option<PathBuf>,

        /// Beat position the 3/4 transform drops (1-4)
        #[arg(long)]
        drop_position: Option<u32>,

        /// Sample rate audio is resampled to before splicing
        #[arg(long)]
        sample_rate: Option<u32>,

        /// Cut at the exact beat sample instead of the nearest zero crossing
        #[arg(long)]
        no_align: bool,

        /// Write the resulting settings back to the settings file
        #[arg(long)]
        save_config: bool,
    },

    /// Write split files for augmented tracks from the original splits
    Splits {
        /// Directory with 8-folds.split and single.split
        #[arg(long)]
        original: PathBuf,

        /// Directory the augmented split files are written to
        #[arg(long)]
        output: PathBuf,

        /// Target meters the tracks were augmented to (default: 24 34)
        #[arg(long, num_args = 1.., default_values = ["24", "34"])]
        target_aug: Vec<TargetMeter>,
    },

    /// Infer and write missing .meter labels from beat positions
    AnnotateMeter {
        /// Dataset directory (with audio/ and annotations/)
        #[arg(long)]
        dataset_dir: PathBuf,
    },

    /// Print meter label counts for datasets
    Meters {
        #[arg(long)]
        data_home: PathBuf,

        /// Datasets to inspect; `<name>_<code>` selects an augmented set
        #[arg(long, num_args = 1.., required = true)]
        datasets: Vec<String>,
    },
}

fn main() -> Result<(), anyhow::Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match Args::parse().command {
        Command::Augment {
            data_home,
            datasets,
            target_aug,
            config,
            drop_position,
            sample_rate,
            no_align,
            save_config,
        } => {
            let mut manager = SettingsManager::new(config);
            let mut settings = manager.load()?;

            if !datasets.is_empty() {
                settings.datasets = datasets;
            }
            if !target_aug.is_empty() {
                settings.targets = target_aug;
            }
            if let Some(position) = drop_position {
                settings.three_four_drop_position = position;
            }
            if let Some(rate) = sample_rate {
                settings.sample_rate = rate;
            }
            if no_align {
                settings.align_zeros = false;
            }

            SettingsManager::validate_settings(&settings)
                .map_err(|errors| anyhow::anyhow!("Invalid settings: {}", errors.join(", ")))?;
            log::debug!("Using settings {:?}", settings);

            if save_config {
                manager.update_settings(settings.clone())?;
                log::info!("Saved settings to {:?}", manager.config_path());
            }

            let report = run(&settings, &data_home)?;
            for (dataset, reason) in &report.skipped_datasets {
                println!("{}: skipped ({})", dataset, reason);
            }
            for report in &report.batches {
                if report.already_complete {
                    println!("{} {}: already complete", report.dataset, report.target);
                } else {
                    println!(
                        "{} {}: {} written, {} skipped",
                        report.dataset,
                        report.target,
                        report.written.len(),
                        report.skipped.len()
                    );
                }
            }
        }

        Command::Splits {
            original,
            output,
            target_aug,
        } => {
            let written = make_splits(&original, &output, &target_aug)?;
            println!("Wrote {} split files to {}", written, output.display());
        }

        Command::AnnotateMeter { dataset_dir } => {
            let written = annotate_meters(&dataset_dir)?;
            println!("Wrote {} meter labels", written);
        }

        Command::Meters {
            data_home,
            datasets,
        } => {
            let registry = load_datasets(&data_home, &datasets)?;
            let histogram = meter_histogram(&registry);

            println!("{} tracks in {}", registry.len(), registry.name());
            for (meter, count) in &histogram.counts {
                println!("  {:>5}  {}", meter.to_string(), count);
            }
            if histogram.unlabelled > 0 {
                println!("  {:>5}  {}", "none", histogram.unlabelled);
            }
        }
    }

    Ok(())
}
