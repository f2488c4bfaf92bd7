use chrono::NaiveDate;

use crate::config::LayoutConfig;
use crate::dates::cell_date;
use crate::model::Sheet;

/// Date carried by `column`'s header rows, tried in order. `None` marks the
/// column as invalid: it produces no record.
pub fn resolve_column(attendance: &Sheet, column: u32, header_rows: &[u32]) -> Option<NaiveDate> {
    header_rows
        .iter()
        .find_map(|&row| cell_date(attendance.value(row, column)))
}

/// (column, date) pairs left to right, from the first date column through
/// the last populated column, skipping invalid columns.
pub fn date_columns(attendance: &Sheet, layout: &LayoutConfig) -> Vec<(u32, NaiveDate)> {
    (layout.first_date_column..=attendance.max_column())
        .filter_map(|column| {
            resolve_column(attendance, column, &layout.header_rows).map(|date| (column, date))
        })
        .collect()
}
