//! Shared fixtures for integration tests.

#![allow(dead_code)]

use indoc::indoc;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

pub const SITE: &str = "north-field";

pub const TAXONOMY: &str = indoc! {r#"
    [
      { "id": "M1", "level": "main", "name": "Civil Works" },
      { "id": "M2", "level": "main", "name": "Electrical" },
      { "id": "S1", "level": "sub", "name": "Trenching", "parentMainId": "M1" },
      { "id": "S2", "level": "sub", "name": "MV Cable", "key": "mv-cable", "parentMainId": "M2" }
    ]
"#};

pub const TASKS: &str = indoc! {r#"
    [
      { "id": "T1", "pvArea": "PV-1", "blockArea": "B1", "subCategoryKey": "trenching" },
      { "id": "T2", "subCategoryKey": "mv-cable" }
    ]
"#};

/// Activity fixture:
///
/// - `Dig trench`: flat scope 200, QC 50, BOQ 250, assigned to U1
/// - `Pull cable`: grid scope 5 cells x 20 = 100, QC 100, assigned via external id
/// - `Hand over`: handoff, excluded
/// - `Backfill`: no local scope, BOQ 40 with QC 10
/// - `Broken`: undecodable, skipped by the loader
/// - `Elsewhere`: task outside the site's task set, never fetched
pub const ACTIVITIES: &str = indoc! {r#"
    [
      { "name": "Dig trench", "taskId": "T1", "scopeValue": 200, "qcValue": 50,
        "cumulativeCompleted": 80, "assigneeId": "U1", "boqQuantity": 250, "boqUnit": "m" },
      { "name": "Pull cable", "taskId": "T2", "qcValue": 100, "assigneeId": "EXT-2",
        "gridConfig": { "flexibleColumns": [ { "column": "A", "rows": 3 }, { "column": "B", "rows": 2 } ],
                        "perCellValue": 20 } },
      { "name": "Hand over", "taskId": "T2", "scopeValue": 50, "qcValue": 50, "isHandoff": true },
      { "name": "Backfill", "taskId": "T1", "scopeValue": 0, "qcValue": 10, "boqQuantity": 40 },
      { "name": "Broken", "taskId": "T1", "qcValue": "lots" },
      { "name": "Elsewhere", "taskId": "T9", "scopeValue": 10, "qcValue": 10 }
    ]
"#};

pub const USERS: &str = indoc! {r#"
    [
      { "id": "U1", "name": "Ana", "role": "supervisor" },
      { "id": "U2", "externalId": "EXT-2", "name": "Ben", "role": "foreman" }
    ]
"#};

pub fn write_site(root: &Path, site: &str) {
    let dir = root.join(site);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("taxonomy.json"), TAXONOMY).unwrap();
    fs::write(dir.join("tasks.json"), TASKS).unwrap();
    fs::write(dir.join("activities.json"), ACTIVITIES).unwrap();
    fs::write(dir.join("users.json"), USERS).unwrap();
}

/// Temp data directory holding the fixture site.
pub fn fixture_data_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    write_site(dir.path(), SITE);
    dir
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}
