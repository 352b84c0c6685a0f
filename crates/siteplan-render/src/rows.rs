//! Gantt row layout.
//!
//! One row per task, in the order the backend delivered them. Milestones
//! get a marker at their planned position instead of bars.

use serde::Serialize;

use siteplan_core::{BarExtent, ProgressStatus, ScheduleView, TaskId, TimelineSpan};

use crate::bars::bar_extent;

/// Positioned content of one Gantt row
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GanttRow {
    pub id: TaskId,
    pub label: String,
    pub wbs_code: Option<String>,
    pub level: u32,
    pub planned: Option<BarExtent>,
    pub actual: Option<BarExtent>,
    /// Left offset of the milestone marker, in percent; needs both
    /// planned dates
    pub milestone: Option<f64>,
    pub is_critical: bool,
    pub percent_complete: u8,
    pub status: ProgressStatus,
}

impl GanttRow {
    /// Width of the progress fill inside the planned bar, in percent of the
    /// timeline
    pub fn progress_width(&self) -> Option<f64> {
        self.planned
            .map(|bar| bar.width * f64::from(self.percent_complete) / 100.0)
    }

    pub fn has_bars(&self) -> bool {
        self.planned.is_some() || self.actual.is_some() || self.milestone.is_some()
    }
}

/// Lay out every task of `view` on `span`
pub fn layout_rows(view: &ScheduleView, span: TimelineSpan) -> Vec<GanttRow> {
    view.tasks
        .iter()
        .map(|task| {
            let (planned, actual, milestone) = if task.is_milestone {
                let marker =
                    bar_extent(task.planned_start, task.planned_end, span).map(|bar| bar.left);
                (None, None, marker)
            } else {
                (
                    bar_extent(task.planned_start, task.planned_end, span),
                    bar_extent(task.actual_start, task.actual_end, span),
                    None,
                )
            };

            GanttRow {
                id: task.id,
                label: task.display_name(),
                wbs_code: task.wbs_code.clone(),
                level: task.level,
                planned,
                actual,
                milestone,
                is_critical: view.is_critical(task.id),
                percent_complete: task.percent_complete,
                status: task.progress_status(),
            }
        })
        .collect()
}
