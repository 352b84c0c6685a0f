//! Directory Source Integration Tests
//!
//! Writes a small project export to a temp directory and reads it back
//! through the `PlanningSource` trait.

use chrono::NaiveDate;
use rust_decimal_macros::dec;
use siteplan_core::{PlanningSource, ScheduleQuery, SourceError};
use siteplan_parser::DirectorySource;
use std::fs;
use std::path::Path;

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

const GANTT: &str = r#"[
  {"id": 1, "description": "Foundations", "wbs_code": "1", "level": 0, "sort_order": 1,
   "planned_start_date": "2024-01-10", "planned_end_date": "2024-02-10",
   "actual_start_date": "2024-01-12T00:00:00.000Z", "actual_end_date": null,
   "percent_complete": "55.00", "planned_duration_days": 31,
   "planned_cost": "12000.00", "actual_cost": "5000.00", "is_milestone": false,
   "dependencies": []},
  {"id": 2, "description": "Structure done", "wbs_code": "2", "level": 0, "sort_order": 2,
   "planned_start_date": "2024-03-05", "planned_end_date": "2024-03-05",
   "actual_start_date": null, "actual_end_date": null,
   "percent_complete": null, "planned_duration_days": 0,
   "planned_cost": null, "actual_cost": null, "is_milestone": true,
   "dependencies": [{"id": 8, "predecessor_backlog_id": 1, "dependency_type": "FS", "lag_days": 3}]}
]"#;

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn export() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "7/gantt.json", GANTT);
    write(
        dir.path(),
        "7/critical_path.json",
        r#"{"critical_tasks": [1, 2], "total_duration": 55}"#,
    );
    write(
        dir.path(),
        "7/baselines/3.json",
        r#"{"id": 3, "baseline_number": 1, "description": null,
            "created_at": "2024-01-05T09:00:00.000Z",
            "snapshot_data": [
              {"id": 1, "planned_start_date": "2024-01-10", "planned_end_date": "2024-02-10",
               "planned_cost": 12000, "quantity": null}
            ]}"#,
    );
    dir
}

#[test]
fn reads_gantt_items_in_order() {
    let dir = export();
    let source = DirectorySource::new(dir.path());

    let tasks = source.gantt_data(&ScheduleQuery::project(7)).unwrap();

    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].description.as_deref(), Some("Foundations"));
    assert_eq!(tasks[0].actual_start, Some(date(2024, 1, 12)));
    assert_eq!(tasks[0].percent_complete, 55);
    assert_eq!(tasks[0].planned_cost, Some(dec!(12000.00)));
    assert!(tasks[1].is_milestone);
    assert_eq!(tasks[1].dependencies[0].lag_days, 3);
}

#[test]
fn reads_critical_path_and_baseline() {
    let dir = export();
    let source = DirectorySource::new(dir.path());
    let query = ScheduleQuery::project(7);

    let cp = source.critical_path(&query).unwrap();
    assert!(cp.contains(1));
    assert!(cp.contains(2));
    assert_eq!(cp.total_duration, 55);

    let baseline = source.baseline(&query, 3).unwrap();
    assert_eq!(baseline.items.len(), 1);
    assert_eq!(baseline.snapshot_date, date(2024, 1, 5));
}

#[test]
fn missing_health_is_not_found() {
    let dir = export();
    let source = DirectorySource::new(dir.path());

    let err = source.schedule_health(&ScheduleQuery::project(7)).unwrap_err();

    assert!(matches!(err, SourceError::NotFound(_)));
}

#[test]
fn progress_falls_back_to_gantt() {
    let dir = export();
    let source = DirectorySource::new(dir.path());

    let progress = source.actual_progress(&ScheduleQuery::project(7)).unwrap();

    assert_eq!(progress.len(), 2);
    assert_eq!(progress[0].percent_complete, 55);
    assert_eq!(progress[0].actual_cost, dec!(5000.00));
}

#[test]
fn malformed_payload_names_the_file() {
    let dir = export();
    write(dir.path(), "7/health.json", r#"{"total_tasks": "many"}"#);
    let source = DirectorySource::new(dir.path());

    let err = source.schedule_health(&ScheduleQuery::project(7)).unwrap_err();

    match err {
        SourceError::InvalidPayload(message) => assert!(message.contains("health.json")),
        other => panic!("unexpected error: {other}"),
    }
}
