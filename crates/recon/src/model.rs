use std::collections::{BTreeMap, HashMap};

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

// ---------------------------------------------------------------------------
// Workbook
// ---------------------------------------------------------------------------

/// A raw cell value as loaded from the workbook.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
}

static EMPTY_CELL: CellValue = CellValue::Empty;

impl CellValue {
    /// Numeric payload. Text, booleans and dates are never numeric.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) if n.is_finite() => Some(*n),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Render the value as display text (empty cells render as "").
    pub fn to_text(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Text(s) => s.clone(),
            Self::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{}", n)
                }
            }
            Self::Bool(b) => (if *b { "TRUE" } else { "FALSE" }).to_string(),
            Self::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

/// Background fill identifier of a cell.
///
/// `Rgb` holds an upper-case AARRGGBB hex string. Indexed and theme colours
/// are kept unresolved. In TOML a string is an RGB value, an integer is an
/// indexed colour and `{ theme = N }` is a theme colour.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FillColor {
    Rgb(String),
    Indexed(u32),
    Theme { theme: u32 },
}

/// ARGB value reported for cells without any fill.
pub const NO_FILL_RGB: &str = "00000000";

impl FillColor {
    pub fn no_fill() -> Self {
        Self::Rgb(NO_FILL_RGB.to_string())
    }

    /// Build an RGB identifier, normalizing case and a missing alpha byte.
    pub fn rgb(hex: &str) -> Self {
        Self::Rgb(normalize_argb(hex))
    }

    /// Same colour with RGB hex normalized.
    pub fn normalized(&self) -> Self {
        match self {
            Self::Rgb(hex) => Self::rgb(hex),
            other => other.clone(),
        }
    }
}

/// `ffffff` -> `00FFFFFF`, `#ffFFffFF` -> `FFFFFFFF`.
pub fn normalize_argb(hex: &str) -> String {
    let s = hex.trim().trim_start_matches('#').to_ascii_uppercase();
    if s.len() == 6 {
        format!("00{s}")
    } else {
        s
    }
}

/// One worksheet: a sparse grid addressed by 1-based (row, column).
#[derive(Debug, Clone, Default)]
pub struct Sheet {
    pub name: String,
    values: HashMap<(u32, u32), CellValue>,
    fills: HashMap<(u32, u32), FillColor>,
    max_row: u32,
    max_column: u32,
}

impl Sheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set a cell value. Non-empty values extend the populated extent.
    pub fn set_value(&mut self, row: u32, column: u32, value: CellValue) {
        if row == 0 || column == 0 {
            return;
        }
        if value.is_empty() {
            self.values.remove(&(row, column));
            return;
        }
        self.max_row = self.max_row.max(row);
        self.max_column = self.max_column.max(column);
        self.values.insert((row, column), value);
    }

    pub fn set_fill(&mut self, row: u32, column: u32, fill: FillColor) {
        if row == 0 || column == 0 {
            return;
        }
        self.fills.insert((row, column), fill);
    }

    pub fn value(&self, row: u32, column: u32) -> &CellValue {
        self.values.get(&(row, column)).unwrap_or(&EMPTY_CELL)
    }

    pub fn fill(&self, row: u32, column: u32) -> FillColor {
        self.fills
            .get(&(row, column))
            .cloned()
            .unwrap_or_else(FillColor::no_fill)
    }

    /// Last populated row (1-based), 0 for an empty sheet.
    pub fn max_row(&self) -> u32 {
        self.max_row
    }

    /// Last populated column (1-based), 0 for an empty sheet.
    pub fn max_column(&self) -> u32 {
        self.max_column
    }
}

/// Named collection of sheets, in workbook order.
#[derive(Debug, Clone, Default)]
pub struct Workbook {
    sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sheet, replacing any existing sheet with the same name.
    pub fn add_sheet(&mut self, sheet: Sheet) {
        if let Some(existing) = self.sheets.iter_mut().find(|s| s.name == sheet.name) {
            *existing = sheet;
        } else {
            self.sheets.push(sheet);
        }
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Travel log
// ---------------------------------------------------------------------------

/// One entry of the app travel log. Unknown fields are ignored and
/// non-string values read as absent.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TravelEntry {
    #[serde(default, deserialize_with = "string_or_none")]
    pub date: Option<String>,
    #[serde(default, rename = "travelCountry", deserialize_with = "string_or_none")]
    pub travel_country: Option<String>,
}

impl TravelEntry {
    pub fn new(date: &str, travel_country: &str) -> Self {
        Self {
            date: Some(date.to_string()),
            travel_country: Some(travel_country.to_string()),
        }
    }
}

fn string_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        _ => None,
    })
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OtType {
    Pay,
    Internal,
}

impl std::fmt::Display for OtType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pay => write!(f, "pay"),
            Self::Internal => write!(f, "internal"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordType {
    Attendance,
}

impl std::fmt::Display for RecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Attendance => write!(f, "attendance"),
        }
    }
}

/// One reconciled day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayRecord {
    pub date: NaiveDate,
    pub ot_hours: f64,
    pub leave_amount: f64,
    pub travel_country: String,
    pub remark: Option<String>,
    pub ot_type: OtType,
    pub is_leave: bool,
    pub record_type: RecordType,
}

impl DayRecord {
    /// Record with every rule still at its default.
    pub fn blank(date: NaiveDate, travel_country: impl Into<String>) -> Self {
        Self {
            date,
            ot_hours: 0.0,
            leave_amount: 0.0,
            travel_country: travel_country.into(),
            remark: None,
            ot_type: OtType::Pay,
            is_leave: false,
            record_type: RecordType::Attendance,
        }
    }
}

// ---------------------------------------------------------------------------
// Engine input / result
// ---------------------------------------------------------------------------

/// Pre-loaded inputs for one run.
pub struct SyncInput {
    pub workbook: Workbook,
    pub travel: Vec<TravelEntry>,
    /// Whether overtime fill colour decides pay vs internal. Derived by the
    /// caller (e.g. from the workbook file name), never by the engine.
    pub color_sensitive_year: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    MissingAttendanceSheet,
    PersonNotFound,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingAttendanceSheet => write!(f, "missing attendance sheet"),
            Self::PersonNotFound => write!(f, "person not found"),
        }
    }
}

/// A month that contributed no records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthSkip {
    pub month: u32,
    pub reason: SkipReason,
}

/// Per-month locator diagnostics (no records built).
#[derive(Debug, Clone, Serialize)]
pub struct MonthReport {
    pub month: u32,
    pub attendance_sheet: String,
    pub has_attendance: bool,
    pub has_leave: bool,
    pub has_overtime: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_row: Option<u32>,
    pub date_columns: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MonthSummary {
    pub days: usize,
    pub pay_ot_hours: f64,
    pub internal_ot_hours: f64,
    pub leave_hours: f64,
    pub travel_days: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncSummary {
    pub records: usize,
    pub ot_days: usize,
    pub pay_ot_hours: f64,
    pub internal_ot_hours: f64,
    pub leave_days: usize,
    pub leave_hours: f64,
    pub travel_days: usize,
    pub department_leave_days: usize,
    pub months_skipped: usize,
    /// Keyed by `YYYY-MM` of the record date.
    pub by_month: BTreeMap<String, MonthSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SyncMeta {
    pub person: String,
    pub color_sensitive_year: bool,
    pub engine_version: String,
    pub run_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SyncResult {
    pub meta: SyncMeta,
    pub summary: SyncSummary,
    pub skipped: Vec<MonthSkip>,
    pub records: Vec<DayRecord>,
}
