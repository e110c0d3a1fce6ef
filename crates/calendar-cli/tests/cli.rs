use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::NamedTempFile;

fn calendar() -> Command {
    Command::cargo_bin("calendar").unwrap()
}

fn events_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"[
  {{
    "id": "1",
    "title": "기존 회의",
    "date": "2024-10-15",
    "startTime": "09:00",
    "endTime": "10:00",
    "description": "기존 팀 미팅",
    "location": "회의실 B",
    "category": "업무",
    "repeat": {{ "type": "none", "interval": "same_date" }},
    "notificationTime": 10
  }},
  {{
    "id": "2",
    "title": "주간 점검",
    "date": "2024-10-01",
    "startTime": "14:00",
    "endTime": "15:00",
    "description": "",
    "location": "회의실 A",
    "category": "업무",
    "repeat": {{ "type": "weekly", "interval": "same_date", "endDate": "2024-10-31" }},
    "notificationTime": 60
  }}
]"#
    )
    .unwrap();
    file
}

fn stdout_json(cmd: &mut Command) -> Value {
    let output = cmd.output().unwrap();
    assert!(output.status.success(), "command failed: {:?}", output);
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn test_expand_monthly_same_date_skips_february() {
    let value = stdout_json(calendar().args([
        "expand",
        "--date",
        "2024-01-31",
        "--type",
        "monthly",
        "--interval",
        "same_date",
        "--to",
        "2024-04-30",
    ]));
    assert_eq!(value, serde_json::json!(["2024-01-31", "2024-03-31"]));
}

#[test]
fn test_expand_rejects_unknown_type() {
    calendar()
        .args(["expand", "--date", "2024-01-31", "--type", "hourly", "--to", "2024-02-01"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown repeat type"));
}

fn expand_args() -> [&'static str; 7] {
    ["expand", "--date", "2024-01-31", "--type", "monthly", "--to", "2024-04-30"]
}

#[test]
fn test_global_rust_log_enables_debug_output() {
    calendar()
        .env("RUST_LOG", "debug")
        .args(expand_args())
        .assert()
        .success()
        .stderr(predicate::str::contains("expanding recurrence"));
}

#[test]
fn test_debug_output_is_off_by_default() {
    calendar()
        .env_remove("RUST_LOG")
        .args(expand_args())
        .assert()
        .success()
        .stderr(predicate::str::contains("expanding recurrence").not());
}

#[test]
fn test_options_for_month_end() {
    let value = stdout_json(calendar().args(["options", "--date", "2024-01-31", "--type", "monthly"]));
    let labels: Vec<&str> = value
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["label"].as_str().unwrap())
        .collect();
    assert_eq!(labels, ["1월의 마지막 날", "1월 31일", "1월 5번째 수요일"]);
}

#[test]
fn test_validate_reports_both_fields() {
    calendar()
        .args(["validate", "--start", "10:00", "--end", "09:00"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("시작 시간은 종료 시간보다 빨라야 합니다."))
        .stdout(predicate::str::contains("종료 시간은 시작 시간보다 늦어야 합니다."));
}

#[test]
fn test_validate_accepts_ordered_times() {
    calendar()
        .args(["validate", "--start", "09:00", "--end", "10:00"])
        .assert()
        .success();
}

#[test]
fn test_overlaps_crossing_and_touching() {
    let file = events_file();
    let path = file.path().to_str().unwrap();

    let value = stdout_json(calendar().args([
        "overlaps", "--events", path, "--date", "2024-10-15", "--start", "09:30", "--end", "10:30",
    ]));
    assert_eq!(value.as_array().unwrap().len(), 1);
    assert_eq!(value[0]["id"], "1");

    let value = stdout_json(calendar().args([
        "overlaps", "--events", path, "--date", "2024-10-15", "--start", "10:00", "--end", "11:00",
    ]));
    assert!(value.as_array().unwrap().is_empty());
}

#[test]
fn test_overlaps_excludes_edited_event() {
    let file = events_file();
    let value = stdout_json(calendar().args([
        "overlaps",
        "--events",
        file.path().to_str().unwrap(),
        "--date",
        "2024-10-15",
        "--start",
        "09:30",
        "--end",
        "10:30",
        "--editing-id",
        "1",
    ]));
    assert!(value.as_array().unwrap().is_empty());
}

#[test]
fn test_occurrences_materialise_weekly_event() {
    let file = events_file();
    let value = stdout_json(calendar().args([
        "occurrences",
        "--events",
        file.path().to_str().unwrap(),
        "--from",
        "2024-10-01",
        "--to",
        "2024-12-31",
    ]));
    let dates: Vec<&str> = value
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["date"].as_str().unwrap())
        .collect();
    assert_eq!(
        dates,
        ["2024-10-01", "2024-10-08", "2024-10-15", "2024-10-15", "2024-10-22", "2024-10-29"]
    );
}

#[test]
fn test_notify_fires_inside_lead_window() {
    let file = events_file();
    // 08:55 KST on 2024-10-15.
    let value = stdout_json(calendar().args([
        "notify",
        "--events",
        file.path().to_str().unwrap(),
        "--now",
        "2024-10-14T23:55:00Z",
    ]));
    assert_eq!(
        value,
        serde_json::json!([{
            "id": "1@2024-10-15",
            "message": "10분 후 기존 회의 일정이 시작됩니다."
        }])
    );
}

#[test]
fn test_notify_respects_configured_timezone() {
    let file = events_file();
    let mut config = NamedTempFile::new().unwrap();
    writeln!(config, r#"timezone = "UTC""#).unwrap();
    let value = stdout_json(calendar().args([
        "--config",
        config.path().to_str().unwrap(),
        "notify",
        "--events",
        file.path().to_str().unwrap(),
        "--now",
        "2024-10-15T08:55:00Z",
    ]));
    assert_eq!(value.as_array().unwrap().len(), 1);
}

#[test]
fn test_search_week_view() {
    let file = events_file();
    let value = stdout_json(calendar().args([
        "search",
        "--events",
        file.path().to_str().unwrap(),
        "--term",
        "회의실",
        "--view",
        "week",
        "--date",
        "2024-10-16",
    ]));
    assert_eq!(value["window"]["start"], "2024-10-13");
    assert_eq!(value["window"]["end"], "2024-10-19");
    assert_eq!(value["events"].as_array().unwrap().len(), 2);
}

#[test]
fn test_rrule_export() {
    calendar()
        .args([
            "rrule",
            "--date",
            "2024-03-29",
            "--type",
            "monthly",
            "--interval",
            "same_month_nth_weekday",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("RRULE:FREQ=MONTHLY;BYDAY=5FR"));
}

#[test]
fn test_missing_events_file_is_reported() {
    calendar()
        .args(["notify", "--events", "/nonexistent/events.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read"));
}

#[test]
fn test_lead_times() {
    let value = stdout_json(&mut calendar().arg("lead-times"));
    assert_eq!(value.as_array().unwrap().len(), 5);
    assert_eq!(value[4]["label"], "1일 전");
}
