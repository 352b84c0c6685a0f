//! Wire shapes of the backend planning payloads.
//!
//! The backend serializes numeric columns inconsistently: counts as numbers,
//! money and percentages as numbers or decimal strings, and any of them as
//! `null`. These structs accept that variety and convert into the core
//! types in one place, rejecting what cannot be repaired.
//!
//! Dates that are present but unreadable degrade to "unknown" with a
//! warning; a missing date is a normal state of planning data.

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::warn;

use siteplan_core::baseline::{ActualProgress, BaselineItem, BaselineSnapshot};
use siteplan_core::dates::parse_date;
use siteplan_core::{
    CriticalPath, DependencyRef, DependencyType, ScheduleHealthSnapshot, ScheduleTask, TaskId,
    UpcomingMilestone,
};

use crate::ParseError;

// ============================================================================
// Field Conversion
// ============================================================================

fn optional_date(item: TaskId, field: &'static str, raw: Option<&str>) -> Option<NaiveDate> {
    let date = parse_date(raw);
    if date.is_none() {
        if let Some(raw) = raw.filter(|r| !r.trim().is_empty()) {
            warn!(item, field, value = raw, "unreadable date treated as unknown");
        }
    }
    date
}

/// Percent complete rounded and clamped into 0-100; `null` is 0
fn percent(value: Option<Decimal>) -> u8 {
    value
        .map(|v| v.round().clamp(Decimal::ZERO, Decimal::ONE_HUNDRED))
        .and_then(|v| v.to_u8())
        .unwrap_or(0)
}

fn non_negative(
    item: TaskId,
    field: &'static str,
    value: Option<Decimal>,
) -> Result<Option<Decimal>, ParseError> {
    match value {
        Some(v) if v.is_sign_negative() && !v.is_zero() => Err(ParseError::InvalidField {
            item,
            field,
            message: format!("must not be negative, got {v}"),
        }),
        other => Ok(other),
    }
}

fn whole_days(value: Option<Decimal>) -> Option<i64> {
    value.and_then(|v| v.round().to_i64())
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

// ============================================================================
// Gantt
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct GanttDependency {
    pub id: i64,
    pub predecessor_backlog_id: TaskId,
    pub dependency_type: Option<String>,
    pub lag_days: Option<i64>,
}

/// One item of `GET /planning/gantt`
#[derive(Debug, Deserialize)]
pub struct GanttItem {
    pub id: TaskId,
    pub description: Option<String>,
    pub wbs_code: Option<String>,
    pub level: Option<i64>,
    pub sort_order: Option<i64>,
    pub planned_start_date: Option<String>,
    pub planned_end_date: Option<String>,
    pub actual_start_date: Option<String>,
    pub actual_end_date: Option<String>,
    pub percent_complete: Option<Decimal>,
    pub planned_duration_days: Option<Decimal>,
    pub planned_cost: Option<Decimal>,
    pub actual_cost: Option<Decimal>,
    pub weight: Option<Decimal>,
    pub quantity: Option<Decimal>,
    pub is_milestone: Option<bool>,
    pub dependencies: Option<Vec<GanttDependency>>,
}

fn dependency_type(item: TaskId, code: Option<&str>) -> Result<DependencyType, ParseError> {
    match code.map(|c| c.trim().to_ascii_uppercase()).as_deref() {
        None | Some("") | Some("FS") => Ok(DependencyType::FinishToStart),
        Some("SS") => Ok(DependencyType::StartToStart),
        Some("FF") => Ok(DependencyType::FinishToFinish),
        Some("SF") => Ok(DependencyType::StartToFinish),
        Some(other) => Err(ParseError::InvalidField {
            item,
            field: "dependency_type",
            message: format!("unknown dependency type '{other}'"),
        }),
    }
}

impl GanttItem {
    pub fn into_task(self) -> Result<ScheduleTask, ParseError> {
        let id = self.id;
        let planned_start = optional_date(id, "planned_start_date", self.planned_start_date.as_deref());
        let planned_end = optional_date(id, "planned_end_date", self.planned_end_date.as_deref());
        if let (Some(start), Some(end)) = (planned_start, planned_end) {
            if end < start {
                warn!(item = id, %start, %end, "planned end precedes planned start");
            }
        }

        let dependencies = self
            .dependencies
            .unwrap_or_default()
            .into_iter()
            .map(|dep| -> Result<DependencyRef, ParseError> {
                Ok(DependencyRef {
                    id: dep.id,
                    predecessor: dep.predecessor_backlog_id,
                    kind: dependency_type(id, dep.dependency_type.as_deref())?,
                    lag_days: dep.lag_days.unwrap_or(0),
                })
            })
            .collect::<Result<Vec<_>, ParseError>>()?;

        Ok(ScheduleTask {
            id,
            wbs_code: blank_to_none(self.wbs_code),
            description: self.description,
            level: self.level.unwrap_or(0).max(0) as u32,
            sort_order: self.sort_order,
            planned_start,
            planned_end,
            actual_start: optional_date(id, "actual_start_date", self.actual_start_date.as_deref()),
            actual_end: optional_date(id, "actual_end_date", self.actual_end_date.as_deref()),
            percent_complete: percent(self.percent_complete),
            planned_duration_days: whole_days(self.planned_duration_days),
            planned_cost: non_negative(id, "planned_cost", self.planned_cost)?,
            actual_cost: non_negative(id, "actual_cost", self.actual_cost)?,
            weight: non_negative(id, "weight", self.weight)?,
            quantity: non_negative(id, "quantity", self.quantity)?,
            is_milestone: self.is_milestone.unwrap_or(false),
            dependencies,
        })
    }
}

// ============================================================================
// Critical Path
// ============================================================================

/// `GET /planning/critical-path`
#[derive(Debug, Deserialize)]
pub struct CriticalPathPayload {
    #[serde(default)]
    pub critical_tasks: Vec<TaskId>,
    pub total_duration: Option<Decimal>,
}

impl CriticalPathPayload {
    pub fn into_critical_path(self) -> Result<CriticalPath, ParseError> {
        let total = whole_days(self.total_duration).unwrap_or(0);
        if total < 0 {
            return Err(ParseError::InvalidValue(format!(
                "critical path duration must not be negative, got {total}"
            )));
        }
        Ok(CriticalPath::new(self.critical_tasks, total))
    }
}

// ============================================================================
// Schedule Health
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct MilestonePayload {
    pub id: TaskId,
    pub description: Option<String>,
    pub planned_date: String,
    pub wbs_code: Option<String>,
    #[serde(default)]
    pub is_overdue: bool,
}

/// `GET /planning/schedule-health`
#[derive(Debug, Deserialize)]
pub struct HealthPayload {
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub in_progress_tasks: usize,
    pub not_started_tasks: usize,
    pub on_time: usize,
    pub delayed: usize,
    pub ahead: usize,
    pub overall_planned_percent: f64,
    pub overall_actual_percent: f64,
    pub spi: Option<f64>,
    #[serde(default)]
    pub upcoming_milestones: Vec<MilestonePayload>,
}

impl HealthPayload {
    pub fn into_snapshot(self) -> Result<ScheduleHealthSnapshot, ParseError> {
        let counted = self.completed_tasks + self.in_progress_tasks + self.not_started_tasks;
        if counted != self.total_tasks {
            warn!(
                total = self.total_tasks,
                counted, "schedule health counts do not add up"
            );
        }

        let upcoming_milestones = self
            .upcoming_milestones
            .into_iter()
            .map(|m| -> Result<UpcomingMilestone, ParseError> {
                let planned_date =
                    parse_date(Some(&m.planned_date)).ok_or_else(|| ParseError::InvalidField {
                        item: m.id,
                        field: "planned_date",
                        message: format!("'{}' is not a date", m.planned_date),
                    })?;
                Ok(UpcomingMilestone {
                    id: m.id,
                    description: m.description,
                    planned_date,
                    wbs_code: m.wbs_code,
                    is_overdue: m.is_overdue,
                })
            })
            .collect::<Result<Vec<_>, ParseError>>()?;

        Ok(ScheduleHealthSnapshot {
            total_tasks: self.total_tasks,
            completed_tasks: self.completed_tasks,
            in_progress_tasks: self.in_progress_tasks,
            not_started_tasks: self.not_started_tasks,
            on_time: self.on_time,
            delayed: self.delayed,
            ahead: self.ahead,
            overall_planned_percent: self.overall_planned_percent,
            overall_actual_percent: self.overall_actual_percent,
            spi: self.spi.filter(|s| s.is_finite()),
            upcoming_milestones,
        })
    }
}

// ============================================================================
// Baselines
// ============================================================================

/// One frozen backlog inside `snapshot_data`
#[derive(Debug, Deserialize)]
pub struct SnapshotItem {
    pub id: TaskId,
    pub description: Option<String>,
    pub wbs_code: Option<String>,
    pub planned_start_date: Option<String>,
    pub planned_end_date: Option<String>,
    pub planned_cost: Option<Decimal>,
    pub quantity: Option<Decimal>,
}

/// A row of `GET /planning/baselines/:id`
#[derive(Debug, Deserialize)]
pub struct BaselineRecord {
    pub id: i64,
    pub baseline_number: Option<i64>,
    pub description: Option<String>,
    pub created_at: Option<String>,
    pub snapshot_data: Option<Vec<SnapshotItem>>,
}

impl BaselineRecord {
    pub fn into_snapshot(self) -> Result<BaselineSnapshot, ParseError> {
        let snapshot_date = parse_date(self.created_at.as_deref()).ok_or_else(|| {
            ParseError::InvalidValue(format!("baseline {} has no readable created_at", self.id))
        })?;

        let items = self
            .snapshot_data
            .unwrap_or_default()
            .into_iter()
            .map(|item| -> Result<BaselineItem, ParseError> {
                Ok(BaselineItem {
                    id: item.id,
                    planned_start: optional_date(
                        item.id,
                        "planned_start_date",
                        item.planned_start_date.as_deref(),
                    ),
                    planned_end: optional_date(
                        item.id,
                        "planned_end_date",
                        item.planned_end_date.as_deref(),
                    ),
                    planned_cost: non_negative(item.id, "planned_cost", item.planned_cost)?,
                    quantity: non_negative(item.id, "quantity", item.quantity)?,
                    description: item.description,
                    wbs_code: blank_to_none(item.wbs_code),
                })
            })
            .collect::<Result<Vec<_>, ParseError>>()?;

        let number = self.baseline_number.unwrap_or(self.id);
        Ok(BaselineSnapshot {
            id: self.id,
            name: format!("Baseline #{number}"),
            description: self.description,
            snapshot_date,
            items,
        })
    }
}

// ============================================================================
// Actual Progress
// ============================================================================

/// Current progress columns of a backlog
#[derive(Debug, Deserialize)]
pub struct ProgressRow {
    pub id: TaskId,
    pub actual_end_date: Option<String>,
    pub percent_complete: Option<Decimal>,
    pub quantity_done: Option<Decimal>,
    pub quantity: Option<Decimal>,
    pub actual_cost: Option<Decimal>,
}

impl ProgressRow {
    pub fn into_progress(self) -> Result<ActualProgress, ParseError> {
        let id = self.id;
        Ok(ActualProgress {
            id,
            actual_end: optional_date(id, "actual_end_date", self.actual_end_date.as_deref()),
            percent_complete: percent(self.percent_complete),
            quantity_done: non_negative(id, "quantity_done", self.quantity_done)?
                .unwrap_or(Decimal::ZERO),
            // zero quantity counts as one unit
            quantity: non_negative(id, "quantity", self.quantity)?
                .filter(|q| !q.is_zero())
                .unwrap_or(Decimal::ONE),
            actual_cost: non_negative(id, "actual_cost", self.actual_cost)?
                .unwrap_or(Decimal::ZERO),
        })
    }
}
