use crate::config::{SheetKind, SheetNamer};
use crate::model::{Sheet, Workbook};

/// The sheets of one month and the target person's row in them.
#[derive(Debug, Clone, Copy)]
pub struct MonthContext<'a> {
    pub month: u32,
    pub attendance: &'a Sheet,
    pub leave: Option<&'a Sheet>,
    pub overtime: Option<&'a Sheet>,
    pub target_row: Option<u32>,
}

impl<'a> MonthContext<'a> {
    pub fn with_target_row(self, row: Option<u32>) -> Self {
        Self {
            target_row: row,
            ..self
        }
    }
}

/// Find a month's sheets. `None` when the attendance sheet is absent; a
/// missing leave or overtime sheet only disables that category.
pub fn locate_month_sheets<'a>(
    workbook: &'a Workbook,
    month: u32,
    naming: &impl SheetNamer,
) -> Option<MonthContext<'a>> {
    let attendance = workbook.sheet(&naming.sheet_name(SheetKind::Attendance, month))?;
    let leave = workbook.sheet(&naming.sheet_name(SheetKind::Leave, month));
    let overtime = workbook.sheet(&naming.sheet_name(SheetKind::Overtime, month));

    Some(MonthContext {
        month,
        attendance,
        leave,
        overtime,
        target_row: None,
    })
}

/// First row (top to bottom) whose trimmed name cell equals `person`.
pub fn locate_target_row(attendance: &Sheet, person: &str, name_column: u32) -> Option<u32> {
    (1..=attendance.max_row())
        .find(|&row| attendance.value(row, name_column).to_text().trim() == person)
}
