//! Concurrent loading of schedule views.
//!
//! A schedule page needs Gantt items, the critical path and the health
//! snapshot. The three requests are independent and run concurrently; only
//! the Gantt items are required. A failed optional part leaves a gap in the
//! returned `Fetched` instead of silently turning into "nothing".

use tracing::{info, warn};

use siteplan_core::{
    BaselineId, CurveSPoint, FetchGap, Fetched, PlanningSource, ScheduleQuery, ScheduleView,
    ViewPart,
};

use crate::curve_s::curve_s;

/// Fetch everything a schedule page shows.
///
/// No retries and no timeouts: a source that blocks blocks the caller.
pub fn load_schedule_view<S: PlanningSource + ?Sized>(
    source: &S,
    query: &ScheduleQuery,
) -> Fetched<ScheduleView> {
    let (tasks, (critical_path, health)) = rayon::join(
        || source.gantt_data(query),
        || {
            rayon::join(
                || source.critical_path(query),
                || source.schedule_health(query),
            )
        },
    );

    let tasks = match tasks {
        Ok(tasks) => tasks,
        Err(error) => {
            warn!(project = query.project, error = %error, "gantt data unavailable");
            return Fetched::failed(ViewPart::GanttData, error);
        }
    };

    let mut gaps = Vec::new();
    let view = ScheduleView {
        tasks,
        critical_path: FetchGap::absorb(ViewPart::CriticalPath, critical_path, &mut gaps),
        health: FetchGap::absorb(ViewPart::ScheduleHealth, health, &mut gaps),
    };

    info!(
        project = query.project,
        tasks = view.tasks.len(),
        gaps = gaps.len(),
        "loaded schedule view"
    );
    Fetched::from_parts(view, gaps)
}

/// Fetch a baseline and the current progress, then build the Curve-S.
///
/// Without current progress the series still carries the planned curve.
pub fn load_curve_s<S: PlanningSource + ?Sized>(
    source: &S,
    query: &ScheduleQuery,
    baseline: BaselineId,
) -> Fetched<Vec<CurveSPoint>> {
    let (snapshot, progress) = rayon::join(
        || source.baseline(query, baseline),
        || source.actual_progress(query),
    );

    let snapshot = match snapshot {
        Ok(snapshot) => snapshot,
        Err(error) => return Fetched::failed(ViewPart::Baseline, error),
    };

    let mut gaps = Vec::new();
    let actuals = FetchGap::absorb(ViewPart::ActualProgress, progress, &mut gaps).unwrap_or_default();
    Fetched::from_parts(curve_s(&snapshot, &actuals), gaps)
}
