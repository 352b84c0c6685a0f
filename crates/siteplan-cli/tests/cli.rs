//! CLI integration tests
//!
//! Run the `siteplan` binary against a project export written to a temp
//! directory. Each run gets its own working directory so a stray
//! `siteplan.toml` never leaks in.

use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};

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

const BASELINE: &str = r#"{"id": 3, "baseline_number": 1, "description": null,
  "created_at": "2024-01-05T09:00:00.000Z",
  "snapshot_data": [
    {"id": 1, "planned_start_date": "2024-01-10", "planned_end_date": "2024-02-10",
     "planned_cost": 12000, "quantity": null}
  ]}"#;

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
    write(dir.path(), "7/baselines/3.json", BASELINE);
    dir
}

fn siteplan(cwd: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_siteplan"))
        .current_dir(cwd)
        .env_remove("SITEPLAN_CONFIG")
        .env_remove("SITEPLAN_LOCALE")
        .env_remove("SITEPLAN_GRANULARITY")
        .env_remove("SITEPLAN_SESSION")
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("failed to execute siteplan")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

// =============================================================================
// Timeline
// =============================================================================

#[test]
fn timeline_text_by_month() {
    let dir = export();
    let file = dir.path().join("7/gantt.json");

    let out = siteplan(
        dir.path(),
        &["timeline", file.to_str().unwrap(), "--granularity", "month", "--today", "2024-02-01"],
    );

    assert!(out.status.success(), "{}", stderr(&out));
    let text = stdout(&out);
    assert!(text.starts_with("Timeline: month x3"), "{text}");
    assert!(text.contains("Foundations"));
    assert!(text.contains("(critical path unavailable)"));
}

#[test]
fn timeline_json_marks_critical_rows() {
    let dir = export();
    let file = dir.path().join("7/gantt.json");
    let critical = dir.path().join("7/critical_path.json");

    let out = siteplan(
        dir.path(),
        &[
            "timeline",
            file.to_str().unwrap(),
            "--critical",
            critical.to_str().unwrap(),
            "--today",
            "2024-02-01",
            "--format",
            "json",
        ],
    );

    assert!(out.status.success(), "{}", stderr(&out));
    let json: serde_json::Value = serde_json::from_str(&stdout(&out)).unwrap();
    let rows = json["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["is_critical"], serde_json::Value::Bool(true));
    assert!(rows[1]["milestone"].is_number());
    assert_eq!(json["timeline"]["granularity"], "week");
}

#[test]
fn timeline_rejects_bad_granularity() {
    let dir = export();
    let file = dir.path().join("7/gantt.json");
    let out = siteplan(dir.path(), &["timeline", file.to_str().unwrap(), "-g", "hour"]);
    assert!(!out.status.success());
}

// =============================================================================
// Charts
// =============================================================================

#[test]
fn gantt_writes_svg() {
    let dir = export();
    let svg = dir.path().join("chart.svg");

    let out = siteplan(
        dir.path(),
        &[
            "gantt",
            dir.path().to_str().unwrap(),
            "--project",
            "7",
            "--output",
            svg.to_str().unwrap(),
            "--today",
            "2024-02-01",
        ],
    );

    assert!(out.status.success(), "{}", stderr(&out));
    assert!(stdout(&out).contains("(2 tasks)"));
    // no health.json in the export
    assert!(stderr(&out).contains("warning:"));
    let content = fs::read_to_string(&svg).unwrap();
    assert!(content.contains("<svg"));
    assert!(content.contains("Foundations"));
}

#[test]
fn gantt_writes_workbook() {
    let dir = export();
    let xlsx = dir.path().join("schedule.xlsx");

    let out = siteplan(
        dir.path(),
        &["gantt", dir.path().to_str().unwrap(), "-p", "7", "-o", xlsx.to_str().unwrap()],
    );

    assert!(out.status.success(), "{}", stderr(&out));
    let bytes = fs::read(&xlsx).unwrap();
    assert_eq!(&bytes[..2], b"PK");
}

#[test]
fn gantt_fails_without_gantt_data() {
    let dir = export();
    let out = siteplan(
        dir.path(),
        &["gantt", dir.path().to_str().unwrap(), "-p", "99", "-o", "x.svg"],
    );
    assert!(!out.status.success());
}

#[test]
fn data_dir_from_config() {
    let dir = export();
    let config = dir.path().join("siteplan.toml");
    fs::write(
        &config,
        format!("[data]\ndir = {:?}\n", dir.path().to_str().unwrap()),
    )
    .unwrap();

    // picked up from the working directory
    let out = siteplan(dir.path(), &["wbs", "-p", "7", "--format", "json"]);

    assert!(out.status.success(), "{}", stderr(&out));
    let json: serde_json::Value = serde_json::from_str(&stdout(&out)).unwrap();
    assert_eq!(json.as_array().unwrap().len(), 2);
    assert_eq!(json[0]["code"], "1");
}

#[test]
fn missing_data_dir_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let out = siteplan(dir.path(), &["wbs", "-p", "7"]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("No data directory"));
}

// =============================================================================
// Analytics
// =============================================================================

#[test]
fn health_needs_snapshot_or_compute() {
    let dir = export();
    let root = dir.path().to_str().unwrap();

    let out = siteplan(dir.path(), &["health", root, "-p", "7"]);
    assert!(!out.status.success());

    let out = siteplan(
        dir.path(),
        &["health", root, "-p", "7", "--compute", "--today", "2024-02-01", "--locale", "en-US"],
    );
    assert!(out.status.success(), "{}", stderr(&out));
    assert!(stdout(&out).contains("SPI:"));
}

#[test]
fn health_json_carries_spi_band() {
    let dir = export();
    let out = siteplan(
        dir.path(),
        &[
            "health",
            dir.path().to_str().unwrap(),
            "-p",
            "7",
            "--compute",
            "--today",
            "2024-02-01",
            "-f",
            "json",
        ],
    );
    assert!(out.status.success(), "{}", stderr(&out));
    let json: serde_json::Value = serde_json::from_str(&stdout(&out)).unwrap();
    assert_eq!(json["total_tasks"], 2);
    assert!(json["spi_band"].is_string());
}

#[test]
fn curve_s_table() {
    let dir = export();
    let out = siteplan(
        dir.path(),
        &["curve-s", dir.path().to_str().unwrap(), "-p", "7", "-b", "3"],
    );
    assert!(out.status.success(), "{}", stderr(&out));
    let text = stdout(&out);
    assert!(text.contains("2024-01"));
    assert!(text.contains("2024-02"));
}

#[test]
fn variance_badge() {
    let dir = tempfile::tempdir().unwrap();
    let out = siteplan(
        dir.path(),
        &["variance", "--actual", "52.3", "--planned", "50", "--locale", "en-US"],
    );
    assert!(out.status.success(), "{}", stderr(&out));
    assert_eq!(stdout(&out), "+2.3% ahead #22c55e\n");
}

#[test]
fn spi_badge() {
    let dir = tempfile::tempdir().unwrap();
    let out = siteplan(dir.path(), &["spi", "0.85"]);
    assert_eq!(stdout(&out), "0.85 Atrasado #ef4444\n");
}

// =============================================================================
// Status Machines
// =============================================================================

#[test]
fn document_submit() {
    let dir = tempfile::tempdir().unwrap();
    let out = siteplan(
        dir.path(),
        &["transition", "document", "--from", "rascunho", "--event", "submit"],
    );
    assert!(out.status.success(), "{}", stderr(&out));
    assert!(stdout(&out).starts_with("rascunho -> em_revisao\n"));
}

#[test]
fn closed_incident_rejects_events() {
    let dir = tempfile::tempdir().unwrap();
    let out = siteplan(
        dir.path(),
        &["transition", "incident", "--from", "encerrado", "--event", "amend"],
    );
    assert!(!out.status.success());
    assert!(stderr(&out).contains("not allowed"));
}

// =============================================================================
// Session
// =============================================================================

#[test]
fn session_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("session.json");
    let file = file.to_str().unwrap();

    let out = siteplan(
        dir.path(),
        &[
            "session",
            "--session-file",
            file,
            "login",
            "--token",
            "abc",
            "--email",
            "eng@obra.com",
            "--name",
            "Eng",
        ],
    );
    assert!(out.status.success(), "{}", stderr(&out));

    let out = siteplan(dir.path(), &["session", "--session-file", file, "show"]);
    assert!(stdout(&out).contains("Eng <eng@obra.com>"));

    let out = siteplan(dir.path(), &["session", "--session-file", file, "logout"]);
    assert_eq!(stdout(&out), "Logged out\n");

    let out = siteplan(dir.path(), &["session", "--session-file", file, "show"]);
    assert_eq!(stdout(&out), "Not logged in\n");
}
