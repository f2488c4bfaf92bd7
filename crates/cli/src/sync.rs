//! `worksync sync`, `worksync inspect` and `worksync validate`.

use std::path::{Path, PathBuf};

use clap::Args;
use tracing::{info, warn};
use worksync_io::csv::write_records_csv;
use worksync_io::json::to_pretty_json;
use worksync_io::{load_workbook, read_travel_log, write_records};
use worksync_recon::config::SheetKind;
use worksync_recon::model::{SkipReason, SyncResult};
use worksync_recon::{inspect, run, SyncConfig, SyncInput};

use crate::exit_codes::{EXIT_SYNC_INVALID_CONFIG, EXIT_SYNC_PERSON_NOT_FOUND};
use crate::CliError;

const OUTPUT_PREFIX: &str = "app_synced_";

#[derive(Args)]
pub struct SyncArgs {
    /// App travel log (JSON array of {date, travelCountry})
    pub travel: PathBuf,

    /// Attendance workbook (.xlsx)
    pub workbook: PathBuf,

    /// TOML config file (sheet names, layout, colours, remark labels)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Person to sync; overrides `person` from --config
    #[arg(long, env = "WORKSYNC_PERSON")]
    pub person: Option<String>,

    /// Output JSON path [default: app_synced_<workbook stem>.json next to the workbook]
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Also write the records as CSV
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Force fill-colour classification on or off instead of deriving it
    /// from the workbook file name
    #[arg(long, value_name = "BOOL")]
    pub color_sensitive: Option<bool>,

    /// Print the full result (meta, summary, skipped months, records) to stdout
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct InspectArgs {
    /// Attendance workbook (.xlsx)
    pub workbook: PathBuf,

    /// TOML config file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Person to locate; overrides `person` from --config
    #[arg(long, env = "WORKSYNC_PERSON")]
    pub person: Option<String>,

    /// Output JSON to stdout instead of a table
    #[arg(long)]
    pub json: bool,
}

fn sync_err(code: u8, msg: impl Into<String>) -> CliError {
    CliError { code, message: msg.into(), hint: None }
}

// ============================================================================
// Config resolution
// ============================================================================

/// Config from `--config` (if any) with `--person` applied, validated.
pub fn resolve_config(config: Option<&Path>, person: Option<String>) -> Result<SyncConfig, CliError> {
    let mut resolved = match config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .map_err(|e| CliError::io(format!("cannot read config {}: {e}", path.display())))?;
            SyncConfig::parse(&text).map_err(|e| sync_err(EXIT_SYNC_INVALID_CONFIG, e.to_string()))?
        }
        None => SyncConfig::default(),
    };

    if let Some(person) = person {
        resolved.person = person;
    }

    if resolved.person.trim().is_empty() {
        let hint = "pass --person NAME, set WORKSYNC_PERSON, or set `person` in a --config file";
        return Err(CliError::args("no person to sync").with_hint(hint));
    }

    resolved
        .validate()
        .map_err(|e| sync_err(EXIT_SYNC_INVALID_CONFIG, e.to_string()))?;
    Ok(resolved)
}

/// `app_synced_<stem>.json` in the workbook's directory.
pub fn default_output_path(workbook: &Path) -> PathBuf {
    let stem = workbook
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "workbook".to_string());
    workbook.with_file_name(format!("{OUTPUT_PREFIX}{stem}.json"))
}

fn color_sensitive_year(config: &SyncConfig, workbook: &Path, flag: Option<bool>) -> bool {
    flag.unwrap_or_else(|| {
        let name = workbook
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        config.colors.is_color_sensitive_name(&name)
    })
}

// ============================================================================
// sync
// ============================================================================

pub fn cmd_sync(args: SyncArgs) -> Result<(), CliError> {
    let config = resolve_config(args.config.as_deref(), args.person)?;

    // Both inputs are read before the engine runs
    let travel = read_travel_log(&args.travel)?;
    let workbook = load_workbook(&args.workbook)?;
    let color_sensitive = color_sensitive_year(&config, &args.workbook, args.color_sensitive);
    info!(color_sensitive, "colour classification decided");

    let input = SyncInput { workbook, travel, color_sensitive_year: color_sensitive };
    let result = run(&config, &input);

    let output = args.output.unwrap_or_else(|| default_output_path(&args.workbook));
    write_records(&output, &result.records)?;
    eprintln!("wrote {}", output.display());

    if let Some(ref csv_path) = args.csv {
        write_records_csv(csv_path, &result.records)?;
        eprintln!("wrote {}", csv_path.display());
    }

    if args.json {
        println!("{}", to_pretty_json(&result)?);
    }

    print_summary(&result);

    if person_missing_everywhere(&result) {
        return Err(sync_err(
            EXIT_SYNC_PERSON_NOT_FOUND,
            format!("'{}' not found in any attendance sheet", config.person),
        )
        .with_hint(format!(
            "names are matched exactly after trimming, in column {}",
            config.layout.name_column
        )));
    }

    Ok(())
}

/// No records, and at least one attendance sheet existed without the person.
fn person_missing_everywhere(result: &SyncResult) -> bool {
    result.records.is_empty()
        && result
            .skipped
            .iter()
            .any(|skip| skip.reason == SkipReason::PersonNotFound)
}

fn print_summary(result: &SyncResult) {
    let s = &result.summary;
    eprintln!(
        "synced {} day(s) for {}: {} h pay overtime, {} h internal overtime, {} h leave over {} day(s), {} travel day(s)",
        s.records,
        result.meta.person,
        s.pay_ot_hours,
        s.internal_ot_hours,
        s.leave_hours,
        s.leave_days,
        s.travel_days,
    );
    if s.department_leave_days > 0 {
        eprintln!("department compensatory leave: {} day(s)", s.department_leave_days);
    }
    if !result.meta.color_sensitive_year {
        eprintln!("fill colours ignored (not a colour-sensitive year)");
    }

    let person_missing: Vec<String> = result
        .skipped
        .iter()
        .filter(|skip| skip.reason == SkipReason::PersonNotFound)
        .map(|skip| skip.month.to_string())
        .collect();
    if !person_missing.is_empty() {
        warn!(months = %person_missing.join(","), "person missing from attendance sheets");
        eprintln!("person not listed in month(s): {}", person_missing.join(", "));
    }
    let sheet_missing = result.skipped.len() - person_missing.len();
    if sheet_missing > 0 {
        eprintln!("{sheet_missing} month(s) without an attendance sheet");
    }
}

// ============================================================================
// inspect
// ============================================================================

pub fn cmd_inspect(args: InspectArgs) -> Result<(), CliError> {
    let config = resolve_config(args.config.as_deref(), args.person)?;
    let workbook = load_workbook(&args.workbook)?;
    let reports = inspect(&config, &workbook);

    if args.json {
        println!("{}", to_pretty_json(&reports)?);
        return Ok(());
    }

    println!(
        "{:>5}  {:<20}  {:<10}  {:<5}  {:<8}  {:>4}  {:>5}",
        "month", "attendance sheet", "attendance", "leave", "overtime", "row", "dates"
    );
    for r in &reports {
        println!(
            "{:>5}  {:<20}  {:<10}  {:<5}  {:<8}  {:>4}  {:>5}",
            r.month,
            r.attendance_sheet,
            yes_no(r.has_attendance),
            yes_no(r.has_leave),
            yes_no(r.has_overtime),
            r.target_row.map(|row| row.to_string()).unwrap_or_else(|| "-".into()),
            r.date_columns,
        );
    }

    let found = reports.iter().filter(|r| r.target_row.is_some()).count();
    eprintln!("'{}' found in {found} of {} month(s)", config.person, reports.len());
    Ok(())
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

// ============================================================================
// validate
// ============================================================================

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let text = std::fs::read_to_string(&config_path)
        .map_err(|e| CliError::io(format!("cannot read config: {e}")))?;

    let config = SyncConfig::from_toml(&text)
        .map_err(|e| sync_err(EXIT_SYNC_INVALID_CONFIG, e.to_string()))?;

    eprintln!(
        "valid: '{}', sheets '{}' / '{}' / '{}', header rows {:?}, colour year marker '{}'",
        config.person,
        config.sheets.template(SheetKind::Attendance),
        config.sheets.template(SheetKind::Leave),
        config.sheets.template(SheetKind::Overtime),
        config.layout.header_rows,
        config.colors.year_marker,
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exit_codes::EXIT_USAGE;
    use tempfile::tempdir;

    #[test]
    fn output_next_to_workbook() {
        assert_eq!(
            default_output_path(Path::new("/data/attendance_2025.xlsx")),
            PathBuf::from("/data/app_synced_attendance_2025.json")
        );
        assert_eq!(
            default_output_path(Path::new("book.xlsx")),
            PathBuf::from("app_synced_book.json")
        );
    }

    #[test]
    fn colour_year_from_name_unless_forced() {
        let config = SyncConfig::for_person("x");
        assert!(color_sensitive_year(&config, Path::new("/2024/att_2025.xlsx"), None));
        assert!(!color_sensitive_year(&config, Path::new("/2025/att_2024.xlsx"), None));
        assert!(!color_sensitive_year(&config, Path::new("att_2025.xlsx"), Some(false)));
        assert!(color_sensitive_year(&config, Path::new("att.xlsx"), Some(true)));
    }

    #[test]
    fn person_flag_overrides_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sync.toml");
        std::fs::write(&path, "person = \"王大同\"\n[output]\nsort_by_date = true\n").unwrap();

        let config = resolve_config(Some(&path), Some("李小明".into())).unwrap();
        assert_eq!(config.person, "李小明");
        assert!(config.output.sort_by_date);

        let config = resolve_config(Some(&path), None).unwrap();
        assert_eq!(config.person, "王大同");
    }

    #[test]
    fn missing_person_is_usage_error() {
        let err = resolve_config(None, None).unwrap_err();
        assert_eq!(err.code, EXIT_USAGE);
        assert!(err.hint.is_some());

        let err = resolve_config(None, Some("  ".into())).unwrap_err();
        assert_eq!(err.code, EXIT_USAGE);
    }

    #[test]
    fn bad_config_codes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "person = \"x\"\n[sheets]\nattendance = \"TP出勤\"\n").unwrap();
        let err = resolve_config(Some(&path), None).unwrap_err();
        assert_eq!(err.code, EXIT_SYNC_INVALID_CONFIG);

        std::fs::write(&path, "persn = \"x\"\n").unwrap();
        let err = resolve_config(Some(&path), None).unwrap_err();
        assert_eq!(err.code, EXIT_SYNC_INVALID_CONFIG);

        let err = resolve_config(Some(&dir.path().join("none.toml")), None).unwrap_err();
        assert_eq!(err.code, crate::exit_codes::EXIT_IO);
    }
}
