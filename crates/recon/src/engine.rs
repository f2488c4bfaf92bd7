use tracing::{debug, info};

use crate::columns::{date_columns, resolve_column};
use crate::config::{SheetKind, SheetNamer, SyncConfig};
use crate::day::DayRecordBuilder;
use crate::locate::{locate_month_sheets, locate_target_row};
use crate::model::{
    DayRecord, MonthReport, MonthSkip, SkipReason, SyncInput, SyncMeta, SyncResult, Workbook,
};
use crate::summary::compute_summary;
use crate::travel::TravelIndex;

pub const MONTHS: std::ops::RangeInclusive<u32> = 1..=12;

/// Reconcile the whole year. Returns records in month then column order
/// (or date order with `output.sort_by_date`), plus skipped months.
pub fn run(config: &SyncConfig, input: &SyncInput) -> SyncResult {
    let travel = TravelIndex::build(&input.travel);
    info!(
        person = %config.person,
        travel_days = travel.len(),
        sheets = input.workbook.len(),
        color_sensitive_year = input.color_sensitive_year,
        "starting reconciliation"
    );

    let builder = DayRecordBuilder {
        travel: &travel,
        remarks: &config.remarks,
        colors: &config.colors,
        color_sensitive_year: input.color_sensitive_year,
    };

    let mut records = Vec::new();
    let mut skipped = Vec::new();
    for month in MONTHS {
        match reconcile_month(config, &input.workbook, month, &builder) {
            Ok(month_records) => {
                debug!(month, records = month_records.len(), "month reconciled");
                records.extend(month_records);
            }
            Err(reason) => {
                debug!(month, %reason, "month skipped");
                skipped.push(MonthSkip { month, reason });
            }
        }
    }

    if config.output.sort_by_date {
        records.sort_by_key(|r| r.date);
    }

    let mut summary = compute_summary(&records, &config.remarks);
    summary.months_skipped = skipped.len();
    info!(records = records.len(), skipped = skipped.len(), "reconciliation finished");

    SyncResult {
        meta: SyncMeta {
            person: config.person.clone(),
            color_sensitive_year: input.color_sensitive_year,
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
        },
        summary,
        skipped,
        records,
    }
}

/// Records for one month, or the reason the month contributes none.
pub fn reconcile_month(
    config: &SyncConfig,
    workbook: &Workbook,
    month: u32,
    builder: &DayRecordBuilder<'_>,
) -> Result<Vec<DayRecord>, SkipReason> {
    let ctx = locate_month_sheets(workbook, month, &config.sheets)
        .ok_or(SkipReason::MissingAttendanceSheet)?;
    let row = locate_target_row(ctx.attendance, &config.person, config.layout.name_column)
        .ok_or(SkipReason::PersonNotFound)?;
    let ctx = ctx.with_target_row(Some(row));

    let layout = &config.layout;
    let mut records = Vec::new();
    for column in layout.first_date_column..=ctx.attendance.max_column() {
        let Some(date) = resolve_column(ctx.attendance, column, &layout.header_rows) else {
            debug!(month, column, "column has no date");
            continue;
        };
        records.push(builder.build(&ctx, date, column));
    }
    Ok(records)
}

/// Locator diagnostics for every month, without building records.
pub fn inspect(config: &SyncConfig, workbook: &Workbook) -> Vec<MonthReport> {
    MONTHS
        .map(|month| {
            let attendance_sheet = config.sheets.sheet_name(SheetKind::Attendance, month);
            match locate_month_sheets(workbook, month, &config.sheets) {
                Some(ctx) => {
                    let target_row = locate_target_row(
                        ctx.attendance,
                        &config.person,
                        config.layout.name_column,
                    );
                    MonthReport {
                        month,
                        attendance_sheet,
                        has_attendance: true,
                        has_leave: ctx.leave.is_some(),
                        has_overtime: ctx.overtime.is_some(),
                        target_row,
                        date_columns: date_columns(ctx.attendance, &config.layout).len(),
                    }
                }
                None => MonthReport {
                    month,
                    attendance_sheet,
                    has_attendance: false,
                    has_leave: false,
                    has_overtime: false,
                    target_row: None,
                    date_columns: 0,
                },
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CellValue, FillColor, OtType, Sheet, TravelEntry};
    use chrono::NaiveDate;

    const PERSON: &str = "李小明";

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn attendance(month: u32, row: u32, dates: &[&str]) -> Sheet {
        let mut sheet = Sheet::new(format!("TP出勤{month}月份"));
        sheet.set_value(1, 2, CellValue::Text("姓名".into()));
        sheet.set_value(row, 2, CellValue::Text(PERSON.into()));
        for (i, date) in dates.iter().enumerate() {
            sheet.set_value(1, 3 + i as u32, CellValue::Text((*date).into()));
        }
        sheet
    }

    fn input(workbook: Workbook, color_sensitive_year: bool) -> SyncInput {
        SyncInput {
            workbook,
            travel: Vec::new(),
            color_sensitive_year,
        }
    }

    #[test]
    fn months_in_order_with_skips() {
        let mut wb = Workbook::new();
        // Added out of order: output still follows month order
        wb.add_sheet(attendance(2, 4, &["2025-02-01", "2025-02-02"]));
        wb.add_sheet(attendance(1, 6, &["2025-01-31"]));
        let mut other = Sheet::new("TP出勤3月份");
        other.set_value(4, 2, CellValue::Text("someone else".into()));
        other.set_value(1, 3, CellValue::Text("2025-03-01".into()));
        wb.add_sheet(other);

        let config = SyncConfig::for_person(PERSON);
        let result = run(&config, &input(wb, false));

        let dates: Vec<_> = result.records.iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![d("2025-01-31"), d("2025-02-01"), d("2025-02-02")]);

        assert_eq!(result.skipped.len(), 10);
        assert_eq!(
            result.skipped[0],
            MonthSkip { month: 3, reason: SkipReason::PersonNotFound }
        );
        assert_eq!(
            result.skipped[1],
            MonthSkip { month: 4, reason: SkipReason::MissingAttendanceSheet }
        );
        assert_eq!(result.summary.records, 3);
        assert_eq!(result.summary.months_skipped, 10);
        assert_eq!(result.meta.person, PERSON);
    }

    #[test]
    fn column_order_is_kept_unless_sorting() {
        let mut wb = Workbook::new();
        wb.add_sheet(attendance(5, 3, &["2025-05-02", "2025-05-01"]));

        let mut config = SyncConfig::for_person(PERSON);
        let result = run(&config, &input(wb.clone(), false));
        let dates: Vec<_> = result.records.iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![d("2025-05-02"), d("2025-05-01")]);

        config.output.sort_by_date = true;
        let result = run(&config, &input(wb, false));
        let dates: Vec<_> = result.records.iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![d("2025-05-01"), d("2025-05-02")]);
    }

    #[test]
    fn end_to_end_white_fill_overtime() {
        let mut att = Sheet::new("TP出勤3月份");
        att.set_value(5, 2, CellValue::Text(PERSON.into()));
        att.set_value(1, 3, CellValue::Text("2025-03-01".into()));
        let mut ot = Sheet::new("TP3月份加班");
        ot.set_value(5, 3, CellValue::Number(2.0));
        ot.set_fill(5, 3, FillColor::rgb("FFFFFFFF"));

        let mut wb = Workbook::new();
        wb.add_sheet(att);
        wb.add_sheet(ot);

        let input = SyncInput {
            workbook: wb,
            travel: vec![TravelEntry::new("2025-03-01", "JP")],
            color_sensitive_year: true,
        };
        let result = run(&SyncConfig::for_person(PERSON), &input);

        assert_eq!(result.records.len(), 1);
        let r = &result.records[0];
        assert_eq!(r.date, d("2025-03-01"));
        assert_eq!(r.ot_hours, 1.0);
        assert_eq!(r.ot_type, OtType::Internal);
        assert_eq!(r.travel_country, "JP");
        assert!(r
            .remark
            .as_deref()
            .unwrap()
            .contains("internal compensatory leave (no blue fill)"));
    }

    #[test]
    fn target_row_found_per_month() {
        // Each month locates its own row for the person
        let mut wb = Workbook::new();
        let mut jan = attendance(1, 4, &["2025-01-02"]);
        jan.set_value(4, 3, CellValue::Text("◎".into()));
        wb.add_sheet(jan);
        let mut feb = attendance(2, 9, &["2025-02-03"]);
        feb.set_value(4, 3, CellValue::Text("◎".into()));
        wb.add_sheet(feb);

        let result = run(&SyncConfig::for_person(PERSON), &input(wb, false));
        assert_eq!(result.records.len(), 2);
        assert!(result.records[0].remark.is_some());
        assert!(result.records[1].remark.is_none());
    }

    #[test]
    fn inspect_reports_every_month() {
        let mut wb = Workbook::new();
        wb.add_sheet(attendance(3, 7, &["2025-03-01", "x", "2025-03-03"]));
        wb.add_sheet(Sheet::new("TP3月份加班"));

        let reports = inspect(&SyncConfig::for_person(PERSON), &wb);
        assert_eq!(reports.len(), 12);
        let march = &reports[2];
        assert_eq!(march.attendance_sheet, "TP出勤3月份");
        assert!(march.has_attendance);
        assert!(!march.has_leave);
        assert!(march.has_overtime);
        assert_eq!(march.target_row, Some(7));
        assert_eq!(march.date_columns, 2);
        assert!(!reports[0].has_attendance);
    }
}
