// End-to-end tests for the `worksync` binary.
// Run with: cargo test -p worksync-cli --test cli_tests

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use rust_xlsxwriter::{Color, ExcelDateTime, Format, Workbook};
use tempfile::{tempdir, TempDir};

const PERSON: &str = "李小明";

fn worksync() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_worksync"));
    cmd.env_remove("WORKSYNC_PERSON").env_remove("RUST_LOG");
    cmd
}

fn code(output: &Output) -> i32 {
    output.status.code().unwrap_or(-1)
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// March sheet set: C1 = 2025-03-01, D1 = 2025-03-02. Overtime C5 blue, D5 unfilled.
fn write_workbook(path: &Path, person: &str) {
    let mut workbook = Workbook::new();
    let date_format = Format::new().set_num_format("yyyy-mm-dd");
    let blue = Format::new().set_background_color(Color::RGB(0x00B0F0));

    let att = workbook.add_worksheet().set_name("TP出勤3月份").unwrap();
    att.write_string(0, 1, "姓名").unwrap();
    let first = ExcelDateTime::from_ymd(2025, 3, 1).unwrap();
    let second = ExcelDateTime::from_ymd(2025, 3, 2).unwrap();
    att.write_datetime_with_format(0, 2, &first, &date_format).unwrap();
    att.write_datetime_with_format(0, 3, &second, &date_format).unwrap();
    att.write_string(4, 1, person).unwrap();

    let ot = workbook.add_worksheet().set_name("TP3月份加班").unwrap();
    ot.write_number_with_format(4, 2, 4, &blue).unwrap();
    ot.write_number(4, 3, 2).unwrap();

    workbook.save(path).unwrap();
}

struct Fixture {
    dir: TempDir,
    travel: PathBuf,
    workbook: PathBuf,
}

fn fixture(workbook_name: &str) -> Fixture {
    let dir = tempdir().unwrap();
    let travel = dir.path().join("app.json");
    std::fs::write(&travel, r#"[{"date": "2025-03-01", "travelCountry": "JP"}]"#).unwrap();
    let workbook = dir.path().join(workbook_name);
    write_workbook(&workbook, PERSON);
    Fixture { dir, travel, workbook }
}

fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn sync_writes_default_output() {
    let fx = fixture("attendance_2025.xlsx");
    let output = worksync()
        .args(["sync"])
        .arg(&fx.travel)
        .arg(&fx.workbook)
        .args(["--person", PERSON])
        .output()
        .unwrap();
    assert_eq!(code(&output), 0, "stderr: {}", stderr(&output));
    assert!(stderr(&output).contains("synced 2 day(s)"));

    let records = read_json(&fx.dir.path().join("app_synced_attendance_2025.json"));
    let records = records.as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["date"], "2025-03-01");
    assert_eq!(records[0]["travelCountry"], "JP");
    assert_eq!(records[0]["otHours"], 2.0);
    assert_eq!(records[0]["otType"], "pay");
    assert_eq!(records[1]["otType"], "internal");
    assert_eq!(records[1]["remark"], "internal compensatory leave (no blue fill)");
}

#[test]
fn sync_color_flag_and_csv() {
    let fx = fixture("attendance_2025.xlsx");
    let out = fx.dir.path().join("out.json");
    let csv = fx.dir.path().join("out.csv");
    let output = worksync()
        .args(["sync"])
        .arg(&fx.travel)
        .arg(&fx.workbook)
        .args(["--person", PERSON, "--color-sensitive", "false", "--output"])
        .arg(&out)
        .arg("--csv")
        .arg(&csv)
        .output()
        .unwrap();
    assert_eq!(code(&output), 0, "stderr: {}", stderr(&output));

    let records = read_json(&out);
    assert_eq!(records[1]["otType"], "pay");
    assert!(records[1]["remark"].is_null());

    let csv_text = std::fs::read_to_string(&csv).unwrap();
    let mut lines = csv_text.lines();
    assert_eq!(
        lines.next(),
        Some("date,otHours,leaveAmount,travelCountry,remark,otType,isLeave,recordType")
    );
    assert_eq!(lines.next(), Some("2025-03-01,2.0,0.0,JP,,pay,false,attendance"));
}

#[test]
fn sync_json_to_stdout() {
    let fx = fixture("attendance_2025.xlsx");
    let output = worksync()
        .args(["sync"])
        .arg(&fx.travel)
        .arg(&fx.workbook)
        .args(["--person", PERSON, "--json"])
        .output()
        .unwrap();
    assert_eq!(code(&output), 0, "stderr: {}", stderr(&output));

    let result: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(result["meta"]["person"], PERSON);
    assert_eq!(result["meta"]["color_sensitive_year"], true);
    assert_eq!(result["summary"]["records"], 2);
    assert_eq!(result["summary"]["internal_ot_hours"], 1.0);
    assert_eq!(result["skipped"].as_array().unwrap().len(), 11);
    assert_eq!(result["records"].as_array().unwrap().len(), 2);
}

#[test]
fn person_from_env_and_config() {
    let fx = fixture("attendance_2025.xlsx");
    let out = fx.dir.path().join("env.json");
    let output = worksync()
        .env("WORKSYNC_PERSON", PERSON)
        .args(["sync"])
        .arg(&fx.travel)
        .arg(&fx.workbook)
        .arg("--output")
        .arg(&out)
        .output()
        .unwrap();
    assert_eq!(code(&output), 0, "stderr: {}", stderr(&output));
    assert_eq!(read_json(&out).as_array().unwrap().len(), 2);

    let config = fx.dir.path().join("worksync.toml");
    std::fs::write(&config, format!("person = \"{PERSON}\"\n[remarks]\ninternal_overtime = \"內部補休(無藍底)\"\n")).unwrap();
    let output = worksync()
        .args(["sync"])
        .arg(&fx.travel)
        .arg(&fx.workbook)
        .arg("--config")
        .arg(&config)
        .arg("--output")
        .arg(&out)
        .output()
        .unwrap();
    assert_eq!(code(&output), 0, "stderr: {}", stderr(&output));
    // Written literally, not as \u escapes
    assert!(std::fs::read_to_string(&out).unwrap().contains("內部補休(無藍底)"));
}

#[test]
fn no_person_is_usage_error() {
    let fx = fixture("attendance_2025.xlsx");
    let output = worksync()
        .args(["sync"])
        .arg(&fx.travel)
        .arg(&fx.workbook)
        .output()
        .unwrap();
    assert_eq!(code(&output), 2);
    assert!(stderr(&output).contains("hint:"));
}

#[test]
fn person_not_found_exit_code() {
    let fx = fixture("attendance_2025.xlsx");
    let output = worksync()
        .args(["sync"])
        .arg(&fx.travel)
        .arg(&fx.workbook)
        .args(["--person", "nobody"])
        .output()
        .unwrap();
    assert_eq!(code(&output), 11);
    // Output is still written
    let records = read_json(&fx.dir.path().join("app_synced_attendance_2025.json"));
    assert_eq!(records, serde_json::json!([]));
}

#[test]
fn missing_and_malformed_inputs() {
    let fx = fixture("attendance_2025.xlsx");

    let output = worksync()
        .args(["sync", "missing.json"])
        .arg(&fx.workbook)
        .args(["--person", PERSON])
        .output()
        .unwrap();
    assert_eq!(code(&output), 3);

    let bad_travel = fx.dir.path().join("bad.json");
    std::fs::write(&bad_travel, "{not json").unwrap();
    let output = worksync()
        .args(["sync"])
        .arg(&bad_travel)
        .arg(&fx.workbook)
        .args(["--person", PERSON])
        .output()
        .unwrap();
    assert_eq!(code(&output), 4);

    let bad_book = fx.dir.path().join("bad_2025.xlsx");
    std::fs::write(&bad_book, "not a workbook").unwrap();
    let output = worksync()
        .args(["sync"])
        .arg(&fx.travel)
        .arg(&bad_book)
        .args(["--person", PERSON])
        .output()
        .unwrap();
    assert_eq!(code(&output), 4);
    // The engine never ran, so nothing was written
    assert!(!fx.dir.path().join("app_synced_bad_2025.json").exists());
}

#[test]
fn inspect_reports_months() {
    let fx = fixture("attendance_2025.xlsx");
    let output = worksync()
        .args(["inspect"])
        .arg(&fx.workbook)
        .args(["--person", PERSON, "--json"])
        .output()
        .unwrap();
    assert_eq!(code(&output), 0, "stderr: {}", stderr(&output));

    let reports: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let reports = reports.as_array().unwrap();
    assert_eq!(reports.len(), 12);
    assert_eq!(reports[2]["attendance_sheet"], "TP出勤3月份");
    assert_eq!(reports[2]["has_overtime"], true);
    assert_eq!(reports[2]["has_leave"], false);
    assert_eq!(reports[2]["target_row"], 5);
    assert_eq!(reports[2]["date_columns"], 2);
    assert_eq!(reports[0]["has_attendance"], false);
}

#[test]
fn validate_config() {
    let dir = tempdir().unwrap();
    let good = dir.path().join("good.toml");
    std::fs::write(
        &good,
        "person = \"李小明\"\n[sheets]\nattendance = \"出勤{M}月\"\nleave = \"請假{M}月\"\novertime = \"加班{M}月\"\n",
    )
    .unwrap();
    let output = worksync().arg("validate").arg(&good).output().unwrap();
    assert_eq!(code(&output), 0, "stderr: {}", stderr(&output));
    assert!(stderr(&output).contains("valid:"));

    let bad = dir.path().join("bad.toml");
    std::fs::write(&bad, "person = \"\"\n").unwrap();
    let output = worksync().arg("validate").arg(&bad).output().unwrap();
    assert_eq!(code(&output), 10);

    let output = worksync().arg("validate").arg(dir.path().join("none.toml")).output().unwrap();
    assert_eq!(code(&output), 3);
}
