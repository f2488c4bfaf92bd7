//! Per-day record construction.
//!
//! Rules run in a fixed order; a later rule may extend the remark set by an
//! earlier one. Wrong-typed or non-positive cells leave the defaults alone.

use chrono::NaiveDate;

use crate::config::{ColorConfig, RemarkConfig};
use crate::locate::MonthContext;
use crate::model::{DayRecord, OtType, Sheet};
use crate::travel::TravelIndex;

/// Sheet cells count in half-hour units.
const UNITS_PER_HOUR: f64 = 2.0;

pub struct DayRecordBuilder<'a> {
    pub travel: &'a TravelIndex,
    pub remarks: &'a RemarkConfig,
    pub colors: &'a ColorConfig,
    pub color_sensitive_year: bool,
}

impl<'a> DayRecordBuilder<'a> {
    /// Build the record for one resolved date column of `month`.
    ///
    /// A context without a target row yields a blank record; the engine
    /// never calls it that way.
    pub fn build(&self, month: &MonthContext<'_>, date: NaiveDate, column: u32) -> DayRecord {
        let mut record = DayRecord::blank(date, self.travel.lookup(date));
        let Some(row) = month.target_row else {
            return record;
        };

        // Attendance mark
        let mark = month.attendance.value(row, column).to_text();
        if mark.contains(self.remarks.marker.as_str()) {
            record.remark = Some(self.remarks.department_leave.clone());
        }

        // Leave
        if let Some(units) = month.leave.and_then(|sheet| positive_units(sheet, row, column)) {
            record.leave_amount = units / UNITS_PER_HOUR;
            record.is_leave = true;
        }

        // Overtime + fill colour
        if let Some(sheet) = month.overtime {
            if let Some(units) = positive_units(sheet, row, column) {
                record.ot_hours = units / UNITS_PER_HOUR;
                if self.color_sensitive_year {
                    self.classify_overtime(&mut record, sheet, row, column);
                }
            }
        }

        record
    }

    /// Uncoloured overtime is converted to internal compensatory time;
    /// any highlight keeps it paid.
    fn classify_overtime(&self, record: &mut DayRecord, sheet: &Sheet, row: u32, column: u32) {
        if self.colors.is_no_fill(&sheet.fill(row, column)) {
            record.ot_type = OtType::Internal;
            record.remark = Some(match record.remark.take() {
                Some(existing) => format!(
                    "{existing}{}{}",
                    self.remarks.separator, self.remarks.internal_overtime
                ),
                None => self.remarks.internal_overtime.clone(),
            });
        } else {
            record.ot_type = OtType::Pay;
        }
    }
}

fn positive_units(sheet: &Sheet, row: u32, column: u32) -> Option<f64> {
    sheet.value(row, column).as_number().filter(|v| *v > 0.0)
}
