//! Beat (`.beats`) and meter (`.meter`) annotation files.
//!
//! A beat file holds one beat per line: the time in seconds and the position
//! in the bar, separated by whitespace (a tab when we write it). A meter file
//! holds a single `N/D` label.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use meteraug_core::{BeatTrack, Meter};

use crate::error::DatasetError;

/// Read a beat file from disk.
pub fn read_beats<P: AsRef<Path>>(path: P) -> Result<BeatTrack, DatasetError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => DatasetError::MissingAnnotation(path.to_path_buf()),
        _ => DatasetError::Io(e),
    })?;
    parse_beats(&text, path)
}

/// Parse the contents of a beat file. `path` is only used in error messages.
///
/// Blank lines and `#` comments are ignored. Positions may be written as
/// floats (`1.0`); they are truncated to integers.
pub fn parse_beats(text: &str, path: &Path) -> Result<BeatTrack, DatasetError> {
    let malformed = |line: usize, reason: String| DatasetError::MalformedAnnotation {
        path: path.to_path_buf(),
        line,
        reason,
    };
    let no_positions = |reason: String| DatasetError::MissingPositionData {
        path: path.to_path_buf(),
        reason,
    };

    let mut times = Vec::new();
    let mut positions = Vec::new();
    let mut columns = None;

    for (index, raw) in text.lines().enumerate() {
        let line_no = index + 1;
        let line = raw.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        match columns {
            None => columns = Some(fields.len()),
            Some(n) if n != fields.len() => {
                return Err(malformed(
                    line_no,
                    format!("expected {} columns, found {}", n, fields.len()),
                ));
            }
            Some(_) => {}
        }

        let time: f64 = fields[0]
            .parse()
            .map_err(|_| malformed(line_no, format!("invalid beat time {:?}", fields[0])))?;
        times.push(time);

        let Some(raw_position) = fields.get(1) else {
            continue;
        };
        let position: f64 = raw_position.parse().map_err(|_| {
            no_positions(format!("line {}: invalid position {:?}", line_no, raw_position))
        })?;
        if !position.is_finite() || position < 1.0 {
            return Err(no_positions(format!(
                "line {}: position {} is not a positive beat number",
                line_no, raw_position
            )));
        }
        positions.push(position.trunc() as u32);
    }

    match columns {
        None => Err(malformed(0, "file contains no beats".to_string())),
        Some(1) => Err(no_positions("file has a single column".to_string())),
        Some(_) => Ok(BeatTrack::new(times, positions)?),
    }
}

/// Write beats as `time<TAB>position` lines.
///
/// Times use the shortest representation that reads back to the same `f64`.
pub fn write_beats<P: AsRef<Path>>(path: P, times: &[f64], positions: &[u32]) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    for (time, position) in times.iter().zip(positions) {
        writeln!(writer, "{}\t{}", time, position)?;
    }
    writer.flush()
}

/// Read a meter label file.
pub fn read_meter<P: AsRef<Path>>(path: P) -> Result<Meter, DatasetError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => DatasetError::MissingMeter(path.to_path_buf()),
        _ => DatasetError::Io(e),
    })?;
    Ok(Meter::parse(&text)?)
}

/// Write a meter label file (`N/D`, no trailing newline).
pub fn write_meter<P: AsRef<Path>>(path: P, meter: Meter) -> io::Result<()> {
    fs::write(path, meter.to_string())
}
