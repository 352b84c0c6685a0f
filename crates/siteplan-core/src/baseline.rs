//! Baseline snapshots for Curve-S comparison.
//!
//! A baseline freezes the planned values of every task in a project at a
//! point in time. The Curve-S compares the planned distribution recorded in
//! a baseline against the project's current progress.
//!
//! # Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use siteplan_core::baseline::BaselineSnapshot;
//! use siteplan_core::ScheduleTask;
//!
//! let tasks = vec![ScheduleTask::new(1).planned(
//!     NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
//!     NaiveDate::from_ymd_opt(2025, 4, 15).unwrap(),
//! )];
//!
//! let baseline = BaselineSnapshot::capture(
//!     1,
//!     "Original",
//!     NaiveDate::from_ymd_opt(2025, 2, 20).unwrap(),
//!     &tasks,
//! );
//! assert_eq!(baseline.planned_items().count(), 1);
//! ```

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{BaselineId, ScheduleTask, TaskId};

/// Frozen planned values of one task
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BaselineItem {
    pub id: TaskId,
    pub description: Option<String>,
    pub wbs_code: Option<String>,
    pub planned_start: Option<NaiveDate>,
    pub planned_end: Option<NaiveDate>,
    pub planned_cost: Option<Decimal>,
    /// Planned quantity; the Curve-S falls back to it when no cost is planned
    pub quantity: Option<Decimal>,
}

impl BaselineItem {
    /// Planned window, when both ends are known
    pub fn window(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((self.planned_start?, self.planned_end?))
    }
}

/// A saved schedule baseline
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BaselineSnapshot {
    pub id: BaselineId,
    pub name: String,
    pub description: Option<String>,
    pub snapshot_date: NaiveDate,
    pub items: Vec<BaselineItem>,
}

impl BaselineSnapshot {
    /// Freeze the planned values of `tasks`
    pub fn capture(
        id: BaselineId,
        name: impl Into<String>,
        snapshot_date: NaiveDate,
        tasks: &[ScheduleTask],
    ) -> Self {
        let items = tasks
            .iter()
            .map(|t| BaselineItem {
                id: t.id,
                description: t.description.clone(),
                wbs_code: t.wbs_code.clone(),
                planned_start: t.planned_start,
                planned_end: t.planned_end,
                planned_cost: t.planned_cost,
                quantity: t.quantity,
            })
            .collect();

        Self {
            id,
            name: name.into(),
            description: None,
            snapshot_date,
            items,
        }
    }

    /// Items with both planned dates, the only ones that shape the curve
    pub fn planned_items(&self) -> impl Iterator<Item = &BaselineItem> + '_ {
        self.items.iter().filter(|i| i.window().is_some())
    }
}

/// Current progress of a task, as reported by the backend
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ActualProgress {
    pub id: TaskId,
    pub actual_end: Option<NaiveDate>,
    /// 0-100
    pub percent_complete: u8,
    pub quantity_done: Decimal,
    pub quantity: Decimal,
    pub actual_cost: Decimal,
}

impl ActualProgress {
    pub fn from_task(task: &ScheduleTask) -> Self {
        Self {
            id: task.id,
            actual_end: task.actual_end,
            percent_complete: task.percent_complete,
            quantity_done: Decimal::ZERO,
            quantity: task.quantity.unwrap_or(Decimal::ONE),
            actual_cost: task.actual_cost.unwrap_or(Decimal::ZERO),
        }
    }
}
