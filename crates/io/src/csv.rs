// CSV export of reconciled records

use std::path::Path;

use worksync_recon::model::DayRecord;

use crate::error::IoError;

/// Write records as CSV with a header row using the JSON field names. A
/// missing remark is an empty field.
pub fn write_records_csv(path: &Path, records: &[DayRecord]) -> Result<(), IoError> {
    let file = std::fs::File::create(path).map_err(|e| IoError::file(path, e))?;
    write_records_to(file, records)
}

pub fn write_records_to<W: std::io::Write>(writer: W, records: &[DayRecord]) -> Result<(), IoError> {
    let mut writer = csv::WriterBuilder::new().has_headers(true).from_writer(writer);
    if records.is_empty() {
        writer.write_record(HEADERS)?;
    }
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

const HEADERS: [&str; 8] = [
    "date",
    "otHours",
    "leaveAmount",
    "travelCountry",
    "remark",
    "otType",
    "isLeave",
    "recordType",
];
