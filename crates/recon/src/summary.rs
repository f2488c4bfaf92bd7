use crate::config::RemarkConfig;
use crate::model::{DayRecord, OtType, SyncSummary};

/// Compute totals from reconciled records. `months_skipped` is left for the
/// caller, which knows about skipped months.
pub fn compute_summary(records: &[DayRecord], remarks: &RemarkConfig) -> SyncSummary {
    let mut summary = SyncSummary {
        records: records.len(),
        ..Default::default()
    };

    for r in records {
        let month = summary
            .by_month
            .entry(r.date.format("%Y-%m").to_string())
            .or_default();
        month.days += 1;

        if r.ot_hours > 0.0 {
            summary.ot_days += 1;
            match r.ot_type {
                OtType::Pay => {
                    summary.pay_ot_hours += r.ot_hours;
                    month.pay_ot_hours += r.ot_hours;
                }
                OtType::Internal => {
                    summary.internal_ot_hours += r.ot_hours;
                    month.internal_ot_hours += r.ot_hours;
                }
            }
        }

        if r.is_leave {
            summary.leave_days += 1;
            summary.leave_hours += r.leave_amount;
            month.leave_hours += r.leave_amount;
        }

        if !r.travel_country.is_empty() {
            summary.travel_days += 1;
            month.travel_days += 1;
        }

        if r.remark.as_deref().is_some_and(|remark| is_department_leave(remark, remarks)) {
            summary.department_leave_days += 1;
        }
    }

    summary
}

/// The marker remark is either the whole remark or followed by the
/// internal-overtime label.
fn is_department_leave(remark: &str, remarks: &RemarkConfig) -> bool {
    match remark.strip_prefix(remarks.department_leave.as_str()) {
        Some("") => true,
        Some(rest) => rest
            .strip_prefix(remarks.separator.as_str())
            .is_some_and(|tail| tail == remarks.internal_overtime),
        None => false,
    }
}
