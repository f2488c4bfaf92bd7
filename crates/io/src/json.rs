// Travel log input and record output

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};
use worksync_recon::model::{DayRecord, TravelEntry};

use crate::error::IoError;

/// Read a travel log: a JSON array of objects with `date` and
/// `travelCountry`. Unknown fields are ignored. Elements that are not
/// objects read as empty entries, which never match a date.
pub fn read_travel_log(path: &Path) -> Result<Vec<TravelEntry>, IoError> {
    let file = File::open(path).map_err(|e| IoError::file(path, e))?;
    let values: Vec<Value> =
        serde_json::from_reader(BufReader::new(file)).map_err(|source| IoError::TravelLog {
            path: path.to_path_buf(),
            source,
        })?;

    let mut ignored = 0;
    let entries: Vec<TravelEntry> = values
        .into_iter()
        .map(|value| {
            serde_json::from_value(value).unwrap_or_else(|_| {
                ignored += 1;
                TravelEntry::default()
            })
        })
        .collect();
    if ignored > 0 {
        warn!(path = %path.display(), ignored, "travel log entries that are not objects ignored");
    }
    debug!(path = %path.display(), entries = entries.len(), "travel log read");
    Ok(entries)
}

/// Pretty JSON with two-space indentation. Non-ASCII text is written as-is.
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<String, IoError> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Write the record array as UTF-8 pretty JSON, replacing any existing file.
pub fn write_records(path: &Path, records: &[DayRecord]) -> Result<(), IoError> {
    write_json(path, records)
}

/// Write any serializable value as UTF-8 pretty JSON.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), IoError> {
    let json = to_pretty_json(value)?;
    let file = File::create(path).map_err(|e| IoError::file(path, e))?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(json.as_bytes())
        .and_then(|_| writer.flush())
        .map_err(|e| IoError::file(path, e))?;
    Ok(())
}
