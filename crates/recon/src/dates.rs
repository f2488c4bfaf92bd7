//! Lenient calendar-date parsing for travel log entries and sheet headers.
//!
//! Every parser returns `Option`: an unparseable value is skipped by the
//! caller, never reported as an error.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::model::CellValue;

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d", "%m/%d/%Y"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

/// Parse free text as a calendar date.
pub fn parse_date_text(text: &str) -> Option<NaiveDate> {
    let s = text.trim();
    if s.is_empty() {
        return None;
    }

    if let Some(date) = parse_compact(s) {
        return Some(date);
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Some(date);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    // Timestamps with an offset keep the date of their own offset.
    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive())
}

/// `YYYYMMDD`
fn parse_compact(s: &str) -> Option<NaiveDate> {
    if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year = s[0..4].parse().ok()?;
    let month = s[4..6].parse().ok()?;
    let day = s[6..8].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Interpret a sheet cell as a date. Plain numbers are day counts or
/// quantities in these sheets, not dates.
pub fn cell_date(value: &CellValue) -> Option<NaiveDate> {
    match value {
        CellValue::DateTime(dt) => Some(dt.date()),
        CellValue::Text(s) => parse_date_text(s),
        CellValue::Empty | CellValue::Number(_) | CellValue::Bool(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn plain_dates() {
        assert_eq!(parse_date_text("2025-03-01"), Some(d(2025, 3, 1)));
        assert_eq!(parse_date_text(" 2025/3/1 "), Some(d(2025, 3, 1)));
        assert_eq!(parse_date_text("2025.12.31"), Some(d(2025, 12, 31)));
        assert_eq!(parse_date_text("20250301"), Some(d(2025, 3, 1)));
        assert_eq!(parse_date_text("03/01/2025"), Some(d(2025, 3, 1)));
    }

    #[test]
    fn timestamps() {
        assert_eq!(parse_date_text("2025-03-01T09:30:00"), Some(d(2025, 3, 1)));
        assert_eq!(parse_date_text("2025-03-01 18:00:00.250"), Some(d(2025, 3, 1)));
        assert_eq!(parse_date_text("2025-03-01T23:30:00Z"), Some(d(2025, 3, 1)));
        // Date is taken in the timestamp's own offset, not converted to UTC
        assert_eq!(parse_date_text("2025-03-02T01:00:00+08:00"), Some(d(2025, 3, 2)));
    }

    #[test]
    fn garbage_is_none() {
        assert_eq!(parse_date_text(""), None);
        assert_eq!(parse_date_text("   "), None);
        assert_eq!(parse_date_text("星期六"), None);
        assert_eq!(parse_date_text("2025-02-30"), None);
        assert_eq!(parse_date_text("20251301"), None);
        assert_eq!(parse_date_text("1"), None);
    }

    #[test]
    fn cell_dates() {
        let dt = d(2025, 3, 1).and_hms_opt(0, 0, 0).unwrap();
        assert_eq!(cell_date(&CellValue::DateTime(dt)), Some(d(2025, 3, 1)));
        assert_eq!(cell_date(&CellValue::Text("2025-03-02".into())), Some(d(2025, 3, 2)));
        assert_eq!(cell_date(&CellValue::Number(45717.0)), None);
        assert_eq!(cell_date(&CellValue::Bool(true)), None);
        assert_eq!(cell_date(&CellValue::Empty), None);
    }
}
