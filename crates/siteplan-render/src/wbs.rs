//! WBS table rows.

use serde::Serialize;

use siteplan_core::dates::format_optional;
use siteplan_core::{Locale, ProgressStatus, ScheduleTask, TaskId};

/// One display row of the work breakdown table
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WbsRow {
    pub id: TaskId,
    /// WBS code, `-` when absent
    pub code: String,
    pub description: String,
    pub level: u32,
    pub planned_start: String,
    pub planned_end: String,
    pub actual_start: String,
    pub actual_end: String,
    pub percent_complete: u8,
    pub status: ProgressStatus,
    pub status_label: String,
    pub status_color: String,
}

impl WbsRow {
    pub fn from_task(task: &ScheduleTask, locale: Locale) -> Self {
        let status = task.progress_status();
        Self {
            id: task.id,
            code: task
                .wbs_code
                .as_deref()
                .filter(|c| !c.trim().is_empty())
                .unwrap_or("-")
                .to_string(),
            description: task.description.clone().unwrap_or_default(),
            level: task.level,
            planned_start: format_optional(task.planned_start, locale),
            planned_end: format_optional(task.planned_end, locale),
            actual_start: format_optional(task.actual_start, locale),
            actual_end: format_optional(task.actual_end, locale),
            percent_complete: task.percent_complete,
            status,
            status_label: status.label(locale).to_string(),
            status_color: status.color().to_string(),
        }
    }
}

/// Table rows for `tasks`, in order
pub fn wbs_rows(tasks: &[ScheduleTask], locale: Locale) -> Vec<WbsRow> {
    tasks.iter().map(|t| WbsRow::from_task(t, locale)).collect()
}
