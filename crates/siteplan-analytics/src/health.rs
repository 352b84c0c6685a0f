//! Schedule health aggregation.
//!
//! Rolls a project's tasks up into counts by execution state, counts by
//! timing (on time, ahead, delayed), weighted planned/actual percent and the
//! Schedule Performance Index.
//!
//! Planned progress for a task is interpolated linearly between its planned
//! start and end. Planned value is the task's planned cost, or its weight
//! when no cost is planned; earned value scales the same amount by percent
//! complete.

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use siteplan_core::{ProgressStatus, ScheduleHealthSnapshot, ScheduleTask, UpcomingMilestone};

use crate::round2;

/// Number of milestones listed on the dashboard
pub const UPCOMING_MILESTONES: usize = 5;

/// Percentage points above plan before a task counts as ahead
pub const AHEAD_MARGIN: f64 = 5.0;

/// Timing of one task against its plan
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskTiming {
    OnTime,
    Ahead,
    Delayed,
}

fn positive_or_one(value: Option<Decimal>) -> f64 {
    value
        .filter(|v| !v.is_zero())
        .and_then(|v| v.to_f64())
        .unwrap_or(1.0)
}

/// Planned percent complete for `today`, 0-100
pub fn planned_percent_at(task: &ScheduleTask, today: NaiveDate) -> f64 {
    let (Some(start), Some(end)) = (task.planned_start, task.planned_end) else {
        return 0.0;
    };
    if today >= end {
        100.0
    } else if today > start {
        let elapsed = (today - start).num_days() as f64;
        let total = (end - start).num_days() as f64;
        elapsed / total * 100.0
    } else {
        0.0
    }
}

/// Classify a task as on time, ahead or delayed
pub fn classify(task: &ScheduleTask, today: NaiveDate) -> TaskTiming {
    let actual = f64::from(task.percent_complete);
    if task.percent_complete >= 100 {
        return match (task.actual_end, task.planned_end) {
            (Some(actual_end), Some(planned_end)) if actual_end > planned_end => TaskTiming::Delayed,
            _ => TaskTiming::OnTime,
        };
    }
    if task.planned_end.is_some_and(|end| today > end) {
        return TaskTiming::Delayed;
    }
    let planned = planned_percent_at(task, today);
    if planned > 0.0 && actual > planned + AHEAD_MARGIN {
        TaskTiming::Ahead
    } else {
        TaskTiming::OnTime
    }
}

/// Schedule health calculator
pub struct ScheduleHealth;

impl ScheduleHealth {
    /// Aggregate `tasks` as of `today`
    pub fn compute(tasks: &[ScheduleTask], today: NaiveDate) -> ScheduleHealthSnapshot {
        if tasks.is_empty() {
            return ScheduleHealthSnapshot::default();
        }

        let mut snapshot = ScheduleHealthSnapshot {
            total_tasks: tasks.len(),
            ..Default::default()
        };

        let mut total_weight = 0.0;
        let mut weighted_planned = 0.0;
        let mut weighted_actual = 0.0;
        let mut planned_value = 0.0;
        let mut earned_value = 0.0;

        for task in tasks {
            let actual = f64::from(task.percent_complete);
            let weight = positive_or_one(task.weight);
            let planned = planned_percent_at(task, today);

            match task.progress_status() {
                ProgressStatus::Completed => snapshot.completed_tasks += 1,
                ProgressStatus::InProgress => snapshot.in_progress_tasks += 1,
                ProgressStatus::NotStarted => snapshot.not_started_tasks += 1,
            }

            total_weight += weight;
            weighted_planned += planned * weight;
            weighted_actual += actual * weight;

            let value = task
                .planned_cost
                .filter(|c| !c.is_zero())
                .and_then(|c| c.to_f64())
                .unwrap_or(weight);
            planned_value += value * planned / 100.0;
            earned_value += value * actual / 100.0;

            match classify(task, today) {
                TaskTiming::OnTime => snapshot.on_time += 1,
                TaskTiming::Ahead => snapshot.ahead += 1,
                TaskTiming::Delayed => snapshot.delayed += 1,
            }
        }

        if total_weight > 0.0 {
            snapshot.overall_planned_percent = round2(weighted_planned / total_weight);
            snapshot.overall_actual_percent = round2(weighted_actual / total_weight);
        }
        snapshot.spi = (planned_value > 0.0).then(|| round2(earned_value / planned_value));
        snapshot.upcoming_milestones = upcoming_milestones(tasks, today);

        debug!(
            tasks = snapshot.total_tasks,
            delayed = snapshot.delayed,
            spi = ?snapshot.spi,
            "computed schedule health"
        );
        snapshot
    }
}

/// Unfinished milestones with a planned date, soonest first
pub fn upcoming_milestones(tasks: &[ScheduleTask], today: NaiveDate) -> Vec<UpcomingMilestone> {
    let mut milestones: Vec<UpcomingMilestone> = tasks
        .iter()
        .filter(|t| t.is_milestone && t.percent_complete < 100)
        .filter_map(|t| {
            let planned_date = t.planned_end?;
            Some(UpcomingMilestone {
                id: t.id,
                description: t.description.clone(),
                planned_date,
                wbs_code: t.wbs_code.clone(),
                is_overdue: planned_date < today,
            })
        })
        .collect();
    milestones.sort_by_key(|m| m.planned_date);
    milestones.truncate(UPCOMING_MILESTONES);
    milestones
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn planned_percent_interpolates() {
        let task = ScheduleTask::new(1).planned(date(2024, 1, 1), date(2024, 1, 11));
        assert_eq!(planned_percent_at(&task, date(2023, 12, 31)), 0.0);
        assert_eq!(planned_percent_at(&task, date(2024, 1, 1)), 0.0);
        assert_eq!(planned_percent_at(&task, date(2024, 1, 6)), 50.0);
        assert_eq!(planned_percent_at(&task, date(2024, 1, 11)), 100.0);
        assert_eq!(planned_percent_at(&ScheduleTask::new(2), date(2024, 1, 6)), 0.0);
    }

    #[test]
    fn classification_rules() {
        let today = date(2024, 1, 6);
        let plan = ScheduleTask::new(1).planned(date(2024, 1, 1), date(2024, 1, 11));

        assert_eq!(classify(&plan.clone().complete(50), today), TaskTiming::OnTime);
        assert_eq!(classify(&plan.clone().complete(56), today), TaskTiming::Ahead);
        assert_eq!(classify(&plan.clone().complete(55), today), TaskTiming::OnTime);

        let late = plan.clone().complete(90);
        assert_eq!(classify(&late, date(2024, 1, 12)), TaskTiming::Delayed);

        let finished_late = plan
            .clone()
            .actual(date(2024, 1, 1), Some(date(2024, 1, 15)))
            .complete(100);
        assert_eq!(classify(&finished_late, today), TaskTiming::Delayed);

        let finished_on_time = plan.actual(date(2024, 1, 1), Some(date(2024, 1, 10))).complete(100);
        assert_eq!(classify(&finished_on_time, date(2024, 2, 1)), TaskTiming::OnTime);
    }

    #[test]
    fn empty_project() {
        let snapshot = ScheduleHealth::compute(&[], date(2024, 1, 1));
        assert_eq!(snapshot, ScheduleHealthSnapshot::default());
        assert_eq!(snapshot.spi, None);
    }

    #[test]
    fn weighted_rollup_and_spi() {
        let today = date(2024, 1, 6);
        let tasks = vec![
            // planned 50%, actual 40%, cost 1000
            ScheduleTask::new(1)
                .planned(date(2024, 1, 1), date(2024, 1, 11))
                .planned_cost(dec!(1000))
                .complete(40),
            // planned 100%, actual 100%, cost 1000
            ScheduleTask::new(2)
                .planned(date(2023, 12, 1), date(2023, 12, 20))
                .planned_cost(dec!(1000))
                .complete(100),
            // not yet started per plan
            ScheduleTask::new(3)
                .planned(date(2024, 2, 1), date(2024, 3, 1))
                .planned_cost(dec!(1000)),
        ];

        let snapshot = ScheduleHealth::compute(&tasks, today);

        assert_eq!(snapshot.total_tasks, 3);
        assert_eq!(snapshot.completed_tasks, 1);
        assert_eq!(snapshot.in_progress_tasks, 1);
        assert_eq!(snapshot.not_started_tasks, 1);
        assert_eq!(snapshot.on_time, 3);
        assert_eq!(snapshot.overall_planned_percent, 50.0);
        assert_eq!(snapshot.overall_actual_percent, 46.67);
        // EV = 400 + 1000, PV = 500 + 1000
        assert_eq!(snapshot.spi, Some(0.93));
    }

    #[test]
    fn spi_absent_without_planned_value() {
        let tasks = vec![ScheduleTask::new(1)
            .planned(date(2024, 5, 1), date(2024, 6, 1))
            .complete(10)];
        let snapshot = ScheduleHealth::compute(&tasks, date(2024, 1, 1));
        assert_eq!(snapshot.spi, None);
        assert_eq!(snapshot.ahead, 0);
    }

    #[test]
    fn milestones_sorted_and_capped() {
        let today = date(2024, 3, 1);
        let mut tasks: Vec<ScheduleTask> = (1..=7)
            .map(|i| {
                let d = date(2024, 2, 20 + i as u32);
                ScheduleTask::new(i).planned(d, d).milestone()
            })
            .collect();
        tasks.reverse();
        tasks.push(ScheduleTask::new(99).planned(today, today).milestone().complete(100));

        let milestones = upcoming_milestones(&tasks, today);

        assert_eq!(milestones.len(), 5);
        assert_eq!(
            milestones.iter().map(|m| m.id).collect::<Vec<_>>(),
            vec![1, 2, 3, 4, 5]
        );
        assert!(milestones.iter().all(|m| m.is_overdue));
    }
}
