//! # siteplan-parser
//!
//! Typed ingestion of the planning backend's JSON payloads.
//!
//! Payloads are parsed and validated once, here; everything downstream works
//! on `siteplan_core` types. This crate provides:
//! - Gantt, critical path, schedule health, baseline and progress parsers
//! - `DirectorySource`, a `PlanningSource` over exported JSON files
//! - `JsonFileSessionStore`, a `SessionStore` backed by one JSON file
//!
//! ## Example
//!
//! ```rust
//! use siteplan_parser::parse_gantt;
//!
//! let json = r#"[
//!     {"id": 1, "description": "Excavation", "wbs_code": "1.1",
//!      "planned_start_date": "2025-03-01", "planned_end_date": "2025-04-15",
//!      "percent_complete": "40.00"}
//! ]"#;
//!
//! let tasks = parse_gantt(json).unwrap();
//! assert_eq!(tasks[0].percent_complete, 40);
//! ```

pub mod directory;
pub mod payload;
pub mod session_file;

pub use directory::DirectorySource;
pub use session_file::JsonFileSessionStore;

use siteplan_core::baseline::{ActualProgress, BaselineSnapshot};
use siteplan_core::{CriticalPath, ScheduleHealthSnapshot, ScheduleTask, SourceError, TaskId};
use thiserror::Error;

/// Payload parsing error
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Malformed payload at line {line}, column {column}: {message}")]
    Json {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("Item {item}: invalid {field}: {message}")]
    InvalidField {
        item: TaskId,
        field: &'static str,
        message: String,
    },

    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

impl From<serde_json::Error> for ParseError {
    fn from(err: serde_json::Error) -> Self {
        ParseError::Json {
            line: err.line(),
            column: err.column(),
            message: err.to_string(),
        }
    }
}

impl From<ParseError> for SourceError {
    fn from(err: ParseError) -> Self {
        SourceError::InvalidPayload(err.to_string())
    }
}

/// Parse a Gantt payload (array of items, in display order)
pub fn parse_gantt(input: &str) -> Result<Vec<ScheduleTask>, ParseError> {
    let items: Vec<payload::GanttItem> = serde_json::from_str(input)?;
    let tasks = items
        .into_iter()
        .map(payload::GanttItem::into_task)
        .collect::<Result<Vec<_>, _>>()?;
    tracing::debug!(count = tasks.len(), "parsed gantt payload");
    Ok(tasks)
}

/// Parse a critical path payload
pub fn parse_critical_path(input: &str) -> Result<CriticalPath, ParseError> {
    let wire: payload::CriticalPathPayload = serde_json::from_str(input)?;
    wire.into_critical_path()
}

/// Parse a schedule health payload
pub fn parse_schedule_health(input: &str) -> Result<ScheduleHealthSnapshot, ParseError> {
    let wire: payload::HealthPayload = serde_json::from_str(input)?;
    wire.into_snapshot()
}

/// Parse a baseline record with its snapshot data
pub fn parse_baseline(input: &str) -> Result<BaselineSnapshot, ParseError> {
    let wire: payload::BaselineRecord = serde_json::from_str(input)?;
    wire.into_snapshot()
}

/// Parse current progress rows
pub fn parse_actual_progress(input: &str) -> Result<Vec<ActualProgress>, ParseError> {
    let rows: Vec<payload::ProgressRow> = serde_json::from_str(input)?;
    rows.into_iter()
        .map(payload::ProgressRow::into_progress)
        .collect()
}
