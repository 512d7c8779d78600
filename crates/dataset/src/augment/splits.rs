//! Train/validation split files for augmented tracks.
//!
//! Augmented tracks inherit the fold (or train/validation value) of the track
//! they were made from.

use std::fs;
use std::io;
use std::path::Path;

use meteraug_core::TargetMeter;

use crate::error::DatasetError;

/// Split files carried over from the original dataset.
pub const SPLIT_FILES: [&str; 2] = ["8-folds.split", "single.split"];

/// Rewrite a split file for the augmented tracks.
///
/// Each `id<TAB>value` line becomes one `id_<code><TAB>value` line per target.
pub fn augment_split(
    text: &str,
    targets: &[TargetMeter],
    path: &Path,
) -> Result<String, DatasetError> {
    let mut output = String::new();

    for (index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let mut fields = line.split_whitespace();
        let (Some(id), Some(value), None) = (fields.next(), fields.next(), fields.next()) else {
            return Err(DatasetError::MalformedSplit {
                path: path.to_path_buf(),
                line: index + 1,
            });
        };

        for target in targets {
            output.push_str(&format!("{}_{}\t{}\n", id, target.code(), value));
        }
    }

    Ok(output)
}

/// Write augmented versions of every split file found in `original_dir`.
///
/// Missing split files are skipped with a warning. Returns the number of files
/// written.
pub fn make_splits<P: AsRef<Path>, Q: AsRef<Path>>(
    original_dir: P,
    output_dir: Q,
    targets: &[TargetMeter],
) -> Result<usize, anyhow::Error> {
    let original_dir = original_dir.as_ref();
    let output_dir = output_dir.as_ref();
    fs::create_dir_all(output_dir)?;

    let mut written = 0;
    for name in SPLIT_FILES {
        let source = original_dir.join(name);
        let text = match fs::read_to_string(&source) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::warn!("No split file at {:?}, skipping", source);
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        let output = augment_split(&text, targets, &source)?;
        let destination = output_dir.join(name);
        fs::write(&destination, output)?;
        log::info!("Wrote {:?}", destination);
        written += 1;
    }

    Ok(written)
}
