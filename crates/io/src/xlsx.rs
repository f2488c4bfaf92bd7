//! Workbook import: cell values through calamine, fill colours through
//! [`crate::xlsx_styles`].

use calamine::{open_workbook_auto, Data, Reader, Sheets};
use chrono::{NaiveDate, NaiveDateTime};
use std::path::Path;
use tracing::{debug, info, warn};
use worksync_recon::model::{CellValue, Sheet};
use worksync_recon::Workbook;

use crate::error::IoError;
use crate::xlsx_styles::{read_sheet_fills, SheetFills};

/// Load every sheet of a workbook (xlsx, xlsm, xls, xlsb, ods).
///
/// Fill colours are only available for OOXML workbooks; other formats load
/// with every cell unfilled.
pub fn load_workbook(path: &Path) -> Result<Workbook, IoError> {
    if !path.exists() {
        return Err(IoError::file(
            path,
            std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        ));
    }

    let mut source: Sheets<_> = open_workbook_auto(path).map_err(|e| IoError::Workbook {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let sheet_names: Vec<String> = source.sheet_names().to_vec();

    let fills = if has_ooxml_styles(path) {
        read_sheet_fills(path, &sheet_names)?
    } else {
        warn!(path = %path.display(), "fill colours unavailable for this format");
        sheet_names.iter().map(|_| SheetFills::new()).collect()
    };

    let mut workbook = Workbook::new();
    for (name, sheet_fills) in sheet_names.iter().zip(fills) {
        let range = source.worksheet_range(name).map_err(|e| IoError::Sheet {
            sheet: name.clone(),
            message: e.to_string(),
        })?;

        let mut sheet = Sheet::new(name.as_str());
        // Range start offset (data may not begin at A1)
        let (start_row, start_col) = range.start().unwrap_or((0, 0));
        for (row_idx, row) in range.rows().enumerate() {
            for (col_idx, cell) in row.iter().enumerate() {
                let value = convert_cell(cell);
                if !value.is_empty() {
                    sheet.set_value(
                        start_row + row_idx as u32 + 1,
                        start_col + col_idx as u32 + 1,
                        value,
                    );
                }
            }
        }
        let filled = sheet_fills.len();
        for ((row, col), fill) in sheet_fills {
            sheet.set_fill(row, col, fill);
        }

        debug!(
            sheet = %name,
            rows = sheet.max_row(),
            columns = sheet.max_column(),
            filled,
            "sheet loaded"
        );
        workbook.add_sheet(sheet);
    }

    info!(path = %path.display(), sheets = workbook.len(), "workbook loaded");
    Ok(workbook)
}

fn has_ooxml_styles(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| matches!(ext.to_ascii_lowercase().as_str(), "xlsx" | "xlsm"))
        .unwrap_or(false)
}

/// Map a calamine cell onto the engine's cell model.
fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) if s.is_empty() => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(n) => CellValue::Number(*n),
        Data::Int(n) => CellValue::Number(*n as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::Error(e) => CellValue::Text(e.to_string()),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(value) => CellValue::DateTime(value),
            None => CellValue::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) => parse_iso_datetime(s)
            .map(CellValue::DateTime)
            .unwrap_or_else(|| CellValue::Text(s.clone())),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}

fn parse_iso_datetime(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}
