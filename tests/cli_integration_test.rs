//! End-to-end tests for the `siteprogress` binary.

mod common;

use assert_cmd::Command;
use common::{fixture_data_dir, SITE};
use serde_json::Value;
use std::fs;
use tempfile::TempDir;

fn siteprogress() -> Command {
    let mut cmd = Command::cargo_bin("siteprogress").unwrap();
    cmd.env_remove("RUST_LOG").env_remove("SITEPROGRESS_SITE");
    cmd
}

#[test]
fn test_report_json_to_file() {
    let data = fixture_data_dir();
    let out_dir = TempDir::new().unwrap();
    let output_path = out_dir.path().join("reports/north-field.json");

    siteprogress()
        .current_dir(out_dir.path())
        .args(["report", "--site", SITE, "--format", "json", "--output"])
        .arg(&output_path)
        .arg(data.path())
        .assert()
        .success();

    let json: Value = serde_json::from_str(&fs::read_to_string(&output_path).unwrap()).unwrap();
    assert_eq!(json["status"], "ready");
    assert_eq!(json["site"], SITE);
    assert!(json["generatedAt"].is_string());
    assert_eq!(json["report"]["siteWide"]["totals"]["scope"], 300.0);
    assert_eq!(json["report"]["boqOnly"]["activitiesWithBOQ"], 2);
    assert_eq!(json["report"]["byAssignee"][0]["userId"], "U2");
    assert_eq!(json["report"]["diagnostics"]["excluded"]["handoff"], 1);
    assert_eq!(json["stats"]["skippedRecords"], 1);
}

#[test]
fn test_report_terminal_plain() {
    let data = fixture_data_dir();

    let output = siteprogress()
        .args(["report", "--site", SITE, "--plain", "--top", "1"])
        .arg(data.path())
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Site north-field"));
    assert!(stdout.contains("Civil Works"));
    assert!(stdout.contains("Ben"));
    assert!(!stdout.contains("Ana"));
    assert!(stdout.contains("1 activities lack contractual scope"));
}

#[test]
fn test_report_unknown_site_exits_with_status_2() {
    let data = fixture_data_dir();

    let output = siteprogress()
        .args(["report", "--site", "missing", "--format", "json"])
        .arg(data.path())
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(2));
    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["status"], "unavailable");
    assert!(json.get("report").is_none());
}

#[test]
fn test_report_uses_explicit_config() {
    let data = fixture_data_dir();
    let config_dir = TempDir::new().unwrap();
    let config_path = config_dir.path().join("custom.toml");
    fs::write(&config_path, "[fetch]\nbatch_size = 1\nparallel = false\n").unwrap();

    let output = siteprogress()
        .args(["report", "--site", SITE, "--format", "json", "--config"])
        .arg(&config_path)
        .arg(data.path())
        .output()
        .unwrap();

    assert!(output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["stats"]["activityBatches"], 2);
}

#[test]
fn test_init_creates_config_once() {
    let dir = TempDir::new().unwrap();

    siteprogress()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success();
    let contents = fs::read_to_string(dir.path().join(".siteprogress.toml")).unwrap();
    assert!(contents.contains("[fetch]"));
    assert!(contents.contains("batch_size = 10"));

    siteprogress()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .failure();

    siteprogress()
        .current_dir(dir.path())
        .args(["init", "--force"])
        .assert()
        .success();
}
