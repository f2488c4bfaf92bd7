use serde::Deserialize;

use crate::error::ReconError;
use crate::model::FillColor;

/// Placeholder replaced by the month number in sheet name templates.
pub const MONTH_PLACEHOLDER: &str = "{M}";

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SyncConfig {
    /// Exact name in the attendance sheet's name column.
    #[serde(default)]
    pub person: String,
    #[serde(default)]
    pub sheets: SheetNaming,
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub colors: ColorConfig,
    #[serde(default)]
    pub remarks: RemarkConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

// ---------------------------------------------------------------------------
// Sheet naming
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetKind {
    Attendance,
    Leave,
    Overtime,
}

impl std::fmt::Display for SheetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Attendance => write!(f, "attendance"),
            Self::Leave => write!(f, "leave"),
            Self::Overtime => write!(f, "overtime"),
        }
    }
}

/// Maps (sheet kind, month) to the sheet name a workbook uses.
pub trait SheetNamer {
    fn sheet_name(&self, kind: SheetKind, month: u32) -> String;
}

impl<F> SheetNamer for F
where
    F: Fn(SheetKind, u32) -> String,
{
    fn sheet_name(&self, kind: SheetKind, month: u32) -> String {
        self(kind, month)
    }
}

/// Template table; `{M}` is replaced by the month number without padding.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SheetNaming {
    #[serde(default = "default_attendance_template")]
    pub attendance: String,
    #[serde(default = "default_leave_template")]
    pub leave: String,
    #[serde(default = "default_overtime_template")]
    pub overtime: String,
}

fn default_attendance_template() -> String {
    "TP出勤{M}月份".into()
}

fn default_leave_template() -> String {
    "TP{M}月份請假".into()
}

fn default_overtime_template() -> String {
    "TP{M}月份加班".into()
}

impl Default for SheetNaming {
    fn default() -> Self {
        Self {
            attendance: default_attendance_template(),
            leave: default_leave_template(),
            overtime: default_overtime_template(),
        }
    }
}

impl SheetNaming {
    pub fn template(&self, kind: SheetKind) -> &str {
        match kind {
            SheetKind::Attendance => &self.attendance,
            SheetKind::Leave => &self.leave,
            SheetKind::Overtime => &self.overtime,
        }
    }
}

impl SheetNamer for SheetNaming {
    fn sheet_name(&self, kind: SheetKind, month: u32) -> String {
        self.template(kind)
            .replace(MONTH_PLACEHOLDER, &month.to_string())
    }
}

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayoutConfig {
    /// 1-based column holding the row owner's name.
    #[serde(default = "default_name_column")]
    pub name_column: u32,
    /// 1-based column of the first day; earlier columns are row labels.
    #[serde(default = "default_first_date_column")]
    pub first_date_column: u32,
    /// Header rows tried in order when resolving a column's date.
    #[serde(default = "default_header_rows")]
    pub header_rows: Vec<u32>,
}

fn default_name_column() -> u32 {
    2
}

fn default_first_date_column() -> u32 {
    3
}

fn default_header_rows() -> Vec<u32> {
    vec![1, 2]
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            name_column: default_name_column(),
            first_date_column: default_first_date_column(),
            header_rows: default_header_rows(),
        }
    }
}

// ---------------------------------------------------------------------------
// Colours
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColorConfig {
    /// Fill identifiers meaning "no blue highlight". Exact match only.
    #[serde(default = "default_no_fill")]
    pub no_fill: Vec<FillColor>,
    /// Workbook file names containing this marker enable colour rules.
    #[serde(default = "default_year_marker")]
    pub year_marker: String,
}

fn default_no_fill() -> Vec<FillColor> {
    vec![
        FillColor::rgb("00000000"),
        FillColor::rgb("FFFFFFFF"),
        FillColor::rgb("00FFFFFF"),
        FillColor::Indexed(64),
    ]
}

fn default_year_marker() -> String {
    "2025".into()
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            no_fill: default_no_fill(),
            year_marker: default_year_marker(),
        }
    }
}

impl ColorConfig {
    pub fn is_no_fill(&self, fill: &FillColor) -> bool {
        let fill = fill.normalized();
        self.no_fill.iter().any(|c| c.normalized() == fill)
    }

    /// Whether a workbook file name selects the colour-sensitive policy.
    pub fn is_color_sensitive_name(&self, file_name: &str) -> bool {
        !self.year_marker.is_empty() && file_name.contains(&self.year_marker)
    }
}

// ---------------------------------------------------------------------------
// Remarks + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RemarkConfig {
    /// Glyph in an attendance cell marking department compensatory leave.
    #[serde(default = "default_marker")]
    pub marker: String,
    #[serde(default = "default_department_leave")]
    pub department_leave: String,
    #[serde(default = "default_internal_overtime")]
    pub internal_overtime: String,
    #[serde(default = "default_separator")]
    pub separator: String,
}

fn default_marker() -> String {
    "◎".into()
}

fn default_department_leave() -> String {
    "internal department compensatory leave".into()
}

fn default_internal_overtime() -> String {
    "internal compensatory leave (no blue fill)".into()
}

fn default_separator() -> String {
    "; ".into()
}

impl Default for RemarkConfig {
    fn default() -> Self {
        Self {
            marker: default_marker(),
            department_leave: default_department_leave(),
            internal_overtime: default_internal_overtime(),
            separator: default_separator(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// Stable-sort records by date instead of trusting column order.
    #[serde(default)]
    pub sort_by_date: bool,
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl SyncConfig {
    /// Default config for one person.
    pub fn for_person(person: impl Into<String>) -> Self {
        Self {
            person: person.into(),
            ..Default::default()
        }
    }

    /// Parse and validate.
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config = Self::parse(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse without validating, for callers that apply overrides first.
    pub fn parse(input: &str) -> Result<Self, ReconError> {
        toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if self.person.trim().is_empty() {
            return Err(ReconError::ConfigValidation(
                "person must be a non-empty name".into(),
            ));
        }

        for kind in [SheetKind::Attendance, SheetKind::Leave, SheetKind::Overtime] {
            let template = self.sheets.template(kind);
            if !template.contains(MONTH_PLACEHOLDER) {
                return Err(ReconError::ConfigValidation(format!(
                    "sheets.{kind} template '{template}' must contain {MONTH_PLACEHOLDER}"
                )));
            }
        }

        let layout = &self.layout;
        if layout.name_column == 0 || layout.first_date_column == 0 {
            return Err(ReconError::ConfigValidation(
                "layout columns are 1-based and must be at least 1".into(),
            ));
        }
        if layout.header_rows.is_empty() {
            return Err(ReconError::ConfigValidation(
                "layout.header_rows must list at least one row".into(),
            ));
        }
        if layout.header_rows.contains(&0) {
            return Err(ReconError::ConfigValidation(
                "layout.header_rows are 1-based and must be at least 1".into(),
            ));
        }

        if self.remarks.marker.is_empty() {
            return Err(ReconError::ConfigValidation(
                "remarks.marker must not be empty".into(),
            ));
        }
        if self.remarks.department_leave.is_empty() || self.remarks.internal_overtime.is_empty() {
            return Err(ReconError::ConfigValidation(
                "remarks.department_leave and remarks.internal_overtime must not be empty".into(),
            ));
        }
        if self.remarks.department_leave == self.remarks.internal_overtime {
            return Err(ReconError::ConfigValidation(
                "remarks.department_leave and remarks.internal_overtime must differ".into(),
            ));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
