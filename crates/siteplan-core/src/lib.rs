//! # siteplan-core
//!
//! Core domain model and traits for siteplan schedule views.
//!
//! This crate provides:
//! - Domain types: `ScheduleTask`, `CriticalPath`, `ScheduleHealthSnapshot`, `Timeline`
//! - Date utilities shared by every layer (`dates`)
//! - Explicit lifecycles for incidents, documents, non-conformances and PPE deliveries
//! - Session state with an injected persistence store
//! - The `Fetched` outcome type and the `PlanningSource` / `Renderer` traits
//! - Error types and result aliases
//!
//! ## Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use siteplan_core::{CriticalPath, ScheduleTask};
//!
//! let task = ScheduleTask::new(42)
//!     .description("Excavation")
//!     .wbs("1.1")
//!     .planned(
//!         NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
//!         NaiveDate::from_ymd_opt(2025, 4, 15).unwrap(),
//!     )
//!     .complete(40);
//!
//! let critical = CriticalPath::new([42, 43], 120);
//! assert!(critical.contains(task.id));
//! ```

pub mod baseline;
pub mod dates;
pub mod fetch;
pub mod lifecycle;
pub mod session;

pub use dates::{parse_date, Locale};
pub use fetch::{FetchGap, Fetched, ViewPart};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;
use thiserror::Error;

// ============================================================================
// Type Aliases
// ============================================================================

/// Backend identifier of a schedule task (a project backlog item)
pub type TaskId = i64;

/// Backend identifier of a project
pub type ProjectId = i64;

/// Backend identifier of a sprint
pub type SprintId = i64;

/// Backend identifier of a schedule baseline
pub type BaselineId = i64;

// ============================================================================
// Granularity
// ============================================================================

/// Width of one timeline column
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Day,
    #[default]
    Week,
    Month,
}

impl Granularity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Day => "day",
            Granularity::Week => "week",
            Granularity::Month => "month",
        }
    }
}

impl std::fmt::Display for Granularity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown granularity name
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown granularity '{0}' (expected day, week or month)")]
pub struct ParseGranularityError(pub String);

impl FromStr for Granularity {
    type Err = ParseGranularityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" | "dia" => Ok(Granularity::Day),
            "week" | "semana" => Ok(Granularity::Week),
            "month" | "mes" | "mês" => Ok(Granularity::Month),
            other => Err(ParseGranularityError(other.to_string())),
        }
    }
}

// ============================================================================
// Schedule Task
// ============================================================================

/// Dependency type between two tasks
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DependencyType {
    /// Finish-to-Start: successor starts after predecessor finishes
    #[default]
    #[serde(rename = "FS")]
    FinishToStart,
    /// Start-to-Start: successor starts when predecessor starts
    #[serde(rename = "SS")]
    StartToStart,
    /// Finish-to-Finish: successor finishes when predecessor finishes
    #[serde(rename = "FF")]
    FinishToFinish,
    /// Start-to-Finish: successor finishes when predecessor starts
    #[serde(rename = "SF")]
    StartToFinish,
}

impl DependencyType {
    pub fn code(&self) -> &'static str {
        match self {
            DependencyType::FinishToStart => "FS",
            DependencyType::StartToStart => "SS",
            DependencyType::FinishToFinish => "FF",
            DependencyType::StartToFinish => "SF",
        }
    }
}

/// Predecessor reference carried on a Gantt item
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyRef {
    pub id: i64,
    pub predecessor: TaskId,
    pub kind: DependencyType,
    pub lag_days: i64,
}

/// Execution state derived from percent complete
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    NotStarted,
    InProgress,
    Completed,
}

impl ProgressStatus {
    /// Classify a percent complete value (>= 100 completed, > 0 in progress)
    pub fn from_percent(percent: u8) -> Self {
        match percent {
            p if p >= 100 => ProgressStatus::Completed,
            0 => ProgressStatus::NotStarted,
            _ => ProgressStatus::InProgress,
        }
    }

    /// Display color used by progress bars and badges
    pub fn color(&self) -> &'static str {
        match self {
            ProgressStatus::Completed => "#22c55e",
            ProgressStatus::InProgress => "#3b82f6",
            ProgressStatus::NotStarted => "#94a3b8",
        }
    }

    pub fn label(&self, locale: Locale) -> &'static str {
        match (self, locale) {
            (ProgressStatus::Completed, Locale::PtBr) => "Concluído",
            (ProgressStatus::InProgress, Locale::PtBr) => "Em andamento",
            (ProgressStatus::NotStarted, Locale::PtBr) => "Não iniciado",
            (ProgressStatus::Completed, Locale::EnUs) => "Completed",
            (ProgressStatus::InProgress, Locale::EnUs) => "In progress",
            (ProgressStatus::NotStarted, Locale::EnUs) => "Not started",
            (ProgressStatus::Completed, Locale::Es) => "Completado",
            (ProgressStatus::InProgress, Locale::Es) => "En curso",
            (ProgressStatus::NotStarted, Locale::Es) => "No iniciado",
        }
    }
}

/// A unit of work as delivered by the backend Gantt endpoint.
///
/// Read-only from the layout module's perspective: the backend import or a
/// manual edit creates and updates it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScheduleTask {
    pub id: TaskId,
    pub wbs_code: Option<String>,
    pub description: Option<String>,
    /// Hierarchy depth (0 = top level)
    pub level: u32,
    pub sort_order: Option<i64>,
    pub planned_start: Option<NaiveDate>,
    pub planned_end: Option<NaiveDate>,
    pub actual_start: Option<NaiveDate>,
    pub actual_end: Option<NaiveDate>,
    /// 0-100
    pub percent_complete: u8,
    pub planned_duration_days: Option<i64>,
    pub planned_cost: Option<Decimal>,
    pub actual_cost: Option<Decimal>,
    /// Relative weight used by progress rollups (defaults to 1)
    pub weight: Option<Decimal>,
    pub quantity: Option<Decimal>,
    pub is_milestone: bool,
    pub dependencies: Vec<DependencyRef>,
}

impl ScheduleTask {
    pub fn new(id: TaskId) -> Self {
        Self {
            id,
            wbs_code: None,
            description: None,
            level: 0,
            sort_order: None,
            planned_start: None,
            planned_end: None,
            actual_start: None,
            actual_end: None,
            percent_complete: 0,
            planned_duration_days: None,
            planned_cost: None,
            actual_cost: None,
            weight: None,
            quantity: None,
            is_milestone: false,
            dependencies: Vec::new(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn wbs(mut self, code: impl Into<String>) -> Self {
        self.wbs_code = Some(code.into());
        self
    }

    pub fn level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }

    pub fn planned(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.planned_start = Some(start);
        self.planned_end = Some(end);
        self
    }

    pub fn actual(mut self, start: NaiveDate, end: Option<NaiveDate>) -> Self {
        self.actual_start = Some(start);
        self.actual_end = end;
        self
    }

    /// Set percent complete, capped at 100
    pub fn complete(mut self, percent: u8) -> Self {
        self.percent_complete = percent.min(100);
        self
    }

    pub fn planned_cost(mut self, cost: Decimal) -> Self {
        self.planned_cost = Some(cost);
        self
    }

    pub fn weight(mut self, weight: Decimal) -> Self {
        self.weight = Some(weight);
        self
    }

    pub fn milestone(mut self) -> Self {
        self.is_milestone = true;
        self
    }

    pub fn depends_on(mut self, predecessor: TaskId, kind: DependencyType, lag_days: i64) -> Self {
        let id = self.dependencies.len() as i64 + 1;
        self.dependencies.push(DependencyRef {
            id,
            predecessor,
            kind,
            lag_days,
        });
        self
    }

    /// Every non-null planned/actual date, in start/end order
    pub fn known_dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        [
            self.planned_start,
            self.planned_end,
            self.actual_start,
            self.actual_end,
        ]
        .into_iter()
        .flatten()
    }

    pub fn progress_status(&self) -> ProgressStatus {
        ProgressStatus::from_percent(self.percent_complete)
    }

    /// Display name: description, falling back to the WBS code, then the id
    pub fn display_name(&self) -> String {
        match (&self.description, &self.wbs_code) {
            (Some(d), _) if !d.trim().is_empty() => d.clone(),
            (_, Some(w)) if !w.trim().is_empty() => w.clone(),
            _ => format!("#{}", self.id),
        }
    }
}

// ============================================================================
// Backend Aggregates
// ============================================================================

/// Critical task identifiers computed by the backend.
///
/// No graph computation happens client side: membership is a set lookup.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriticalPath {
    pub critical_tasks: BTreeSet<TaskId>,
    /// Total duration of the critical chain in days
    pub total_duration: i64,
}

impl CriticalPath {
    pub fn new(ids: impl IntoIterator<Item = TaskId>, total_duration: i64) -> Self {
        Self {
            critical_tasks: ids.into_iter().collect(),
            total_duration,
        }
    }

    pub fn contains(&self, id: TaskId) -> bool {
        self.critical_tasks.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.critical_tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.critical_tasks.is_empty()
    }
}

/// Milestone listed on the schedule health dashboard
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpcomingMilestone {
    pub id: TaskId,
    pub description: Option<String>,
    pub planned_date: NaiveDate,
    pub wbs_code: Option<String>,
    pub is_overdue: bool,
}

/// Aggregate schedule health for a project
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleHealthSnapshot {
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub in_progress_tasks: usize,
    pub not_started_tasks: usize,
    pub on_time: usize,
    pub delayed: usize,
    pub ahead: usize,
    pub overall_planned_percent: f64,
    pub overall_actual_percent: f64,
    /// Schedule Performance Index (earned / planned); `None` without planned value
    pub spi: Option<f64>,
    pub upcoming_milestones: Vec<UpcomingMilestone>,
}

/// One monthly point of a Curve-S series
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CurveSPoint {
    /// Period label, `YYYY-MM`
    pub period: String,
    pub planned_cumulative: f64,
    pub actual_cumulative: f64,
    pub planned_percent: f64,
    pub actual_percent: f64,
}

// ============================================================================
// Timeline Geometry
// ============================================================================

/// A single column of the rendered timeline
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeBucket {
    pub label: String,
    /// Inclusive
    pub start: NaiveDate,
    /// Exclusive
    pub end: NaiveDate,
}

impl TimeBucket {
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date < self.end
    }
}

/// Overall extent of a timeline, both days inclusive
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineSpan {
    pub first_day: NaiveDate,
    pub last_day: NaiveDate,
}

impl TimelineSpan {
    pub fn new(first_day: NaiveDate, last_day: NaiveDate) -> Self {
        Self { first_day, last_day }
    }

    /// Number of days covered, counting the last day in full
    pub fn total_days(&self) -> i64 {
        (self.last_day - self.first_day).num_days() + 1
    }

    /// True when the span covers no day at all
    pub fn is_degenerate(&self) -> bool {
        self.total_days() <= 0
    }
}

/// Ordered, contiguous, non-empty sequence of buckets
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Timeline {
    granularity: Granularity,
    buckets: Vec<TimeBucket>,
}

impl Timeline {
    /// Build a timeline from ready-made buckets.
    ///
    /// `None` unless the list is non-empty, every bucket ends after it
    /// starts and each bucket starts where the previous one ends.
    pub fn from_buckets(granularity: Granularity, buckets: Vec<TimeBucket>) -> Option<Self> {
        let mut buckets = buckets.into_iter();
        let first = buckets.next().filter(|b| b.end > b.start)?;
        let mut timeline = Self::single(granularity, first);
        for bucket in buckets {
            if bucket.start != timeline.end() || !timeline.push_next(bucket.label, bucket.end) {
                return None;
            }
        }
        Some(timeline)
    }

    /// Timeline holding a single bucket
    pub fn single(granularity: Granularity, bucket: TimeBucket) -> Self {
        Self {
            granularity,
            buckets: vec![bucket],
        }
    }

    /// Append a bucket starting where the timeline currently ends.
    ///
    /// Returns `false`, leaving the timeline untouched, when `end` does not
    /// lie after the current end.
    pub fn push_next(&mut self, label: impl Into<String>, end: NaiveDate) -> bool {
        let start = self.end();
        if end <= start {
            return false;
        }
        self.buckets.push(TimeBucket {
            label: label.into(),
            start,
            end,
        });
        true
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn buckets(&self) -> &[TimeBucket] {
        &self.buckets
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn start(&self) -> NaiveDate {
        self.buckets[0].start
    }

    /// Exclusive end of the last bucket
    pub fn end(&self) -> NaiveDate {
        self.buckets[self.buckets.len() - 1].end
    }

    pub fn span(&self) -> TimelineSpan {
        TimelineSpan::new(self.start(), self.end().pred_opt().unwrap_or(self.start()))
    }
}

/// Horizontal extent of a bar, in percent of the timeline width
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BarExtent {
    pub left: f64,
    pub width: f64,
}

impl BarExtent {
    /// Minimum visible width in percent
    pub const MIN_WIDTH: f64 = 0.5;

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    /// CSS-style strings, e.g. `("48.39%", "0.50%")`
    pub fn css(&self) -> (String, String) {
        (format!("{:.2}%", self.left), format!("{:.2}%", self.width))
    }
}

// ============================================================================
// Views and Sources
// ============================================================================

/// Parameters identifying which schedule data to fetch
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleQuery {
    pub project: ProjectId,
    pub sprint: Option<SprintId>,
}

impl ScheduleQuery {
    pub fn project(project: ProjectId) -> Self {
        Self {
            project,
            sprint: None,
        }
    }

    pub fn sprint(mut self, sprint: SprintId) -> Self {
        self.sprint = Some(sprint);
        self
    }
}

/// Everything a schedule page renders from one data refresh
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleView {
    pub tasks: Vec<ScheduleTask>,
    pub critical_path: Option<CriticalPath>,
    pub health: Option<ScheduleHealthSnapshot>,
}

impl ScheduleView {
    pub fn new(tasks: Vec<ScheduleTask>) -> Self {
        Self {
            tasks,
            critical_path: None,
            health: None,
        }
    }

    pub fn with_critical_path(mut self, critical_path: CriticalPath) -> Self {
        self.critical_path = Some(critical_path);
        self
    }

    pub fn is_critical(&self, id: TaskId) -> bool {
        self.critical_path
            .as_ref()
            .map(|cp| cp.contains(id))
            .unwrap_or(false)
    }
}

/// Provider of backend schedule data
pub trait PlanningSource: Send + Sync {
    /// Gantt items for a project (optionally one sprint), in display order
    fn gantt_data(&self, query: &ScheduleQuery) -> Result<Vec<ScheduleTask>, SourceError>;

    /// Backend-computed critical path
    fn critical_path(&self, query: &ScheduleQuery) -> Result<CriticalPath, SourceError>;

    /// Backend-computed schedule health
    fn schedule_health(&self, query: &ScheduleQuery) -> Result<ScheduleHealthSnapshot, SourceError>;

    /// Saved baseline snapshot
    fn baseline(
        &self,
        query: &ScheduleQuery,
        baseline: BaselineId,
    ) -> Result<baseline::BaselineSnapshot, SourceError>;

    /// Current progress of every task in the project
    fn actual_progress(
        &self,
        query: &ScheduleQuery,
    ) -> Result<Vec<baseline::ActualProgress>, SourceError>;
}

/// Output renderer
pub trait Renderer {
    type Output;

    fn render(&self, view: &ScheduleView) -> Result<Self::Output, RenderError>;
}

// ============================================================================
// Errors
// ============================================================================

/// Failure fetching data from a `PlanningSource`
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Source unavailable: {0}")]
    Unavailable(String),
}

/// Rendering error
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Format error: {0}")]
    Format(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn granularity_parses_english_and_portuguese() {
        assert_eq!("day".parse::<Granularity>().unwrap(), Granularity::Day);
        assert_eq!(" Week ".parse::<Granularity>().unwrap(), Granularity::Week);
        assert_eq!("mes".parse::<Granularity>().unwrap(), Granularity::Month);
        assert!("fortnight".parse::<Granularity>().is_err());
    }

    #[test]
    fn granularity_default_is_week() {
        assert_eq!(Granularity::default(), Granularity::Week);
        assert_eq!(Granularity::Month.to_string(), "month");
    }

    #[test]
    fn task_builder() {
        let task = ScheduleTask::new(7)
            .description("Concrete pour")
            .wbs("1.2")
            .level(1)
            .planned(date(2025, 4, 16), date(2025, 6, 30))
            .planned_cost(dec!(70000))
            .complete(150)
            .depends_on(6, DependencyType::FinishToStart, 0);

        assert_eq!(task.percent_complete, 100);
        assert_eq!(task.level, 1);
        assert_eq!(task.dependencies.len(), 1);
        assert_eq!(task.dependencies[0].predecessor, 6);
        assert_eq!(task.progress_status(), ProgressStatus::Completed);
    }

    #[test]
    fn known_dates_skips_missing() {
        let task = ScheduleTask::new(1)
            .planned(date(2024, 1, 10), date(2024, 1, 20))
            .actual(date(2024, 1, 12), None);
        let dates: Vec<_> = task.known_dates().collect();
        assert_eq!(dates, vec![date(2024, 1, 10), date(2024, 1, 20), date(2024, 1, 12)]);
    }

    #[test]
    fn display_name_fallbacks() {
        assert_eq!(ScheduleTask::new(3).description("Walls").display_name(), "Walls");
        assert_eq!(ScheduleTask::new(3).wbs("2.1").display_name(), "2.1");
        assert_eq!(ScheduleTask::new(3).description("  ").display_name(), "#3");
    }

    #[test]
    fn progress_status_bands() {
        assert_eq!(ProgressStatus::from_percent(0), ProgressStatus::NotStarted);
        assert_eq!(ProgressStatus::from_percent(1), ProgressStatus::InProgress);
        assert_eq!(ProgressStatus::from_percent(99), ProgressStatus::InProgress);
        assert_eq!(ProgressStatus::from_percent(100), ProgressStatus::Completed);
        assert_eq!(ProgressStatus::InProgress.label(Locale::EnUs), "In progress");
    }

    #[test]
    fn critical_path_membership() {
        let cp = CriticalPath::new([42, 7], 30);
        assert!(cp.contains(42));
        assert!(!cp.contains(41));
        assert_eq!(cp.len(), 2);

        let empty = CriticalPath::default();
        assert!(empty.is_empty());
        assert!(!empty.contains(42));
    }

    #[test]
    fn timeline_requires_buckets() {
        assert!(Timeline::from_buckets(Granularity::Day, Vec::new()).is_none());

        let timeline = Timeline::from_buckets(
            Granularity::Week,
            vec![
                TimeBucket {
                    label: "a".into(),
                    start: date(2024, 1, 1),
                    end: date(2024, 1, 8),
                },
                TimeBucket {
                    label: "b".into(),
                    start: date(2024, 1, 8),
                    end: date(2024, 1, 15),
                },
            ],
        )
        .unwrap();

        assert_eq!(timeline.start(), date(2024, 1, 1));
        assert_eq!(timeline.end(), date(2024, 1, 15));
        assert_eq!(timeline.span(), TimelineSpan::new(date(2024, 1, 1), date(2024, 1, 14)));
        assert_eq!(timeline.span().total_days(), 14);
        assert_eq!(timeline.buckets()[0].days(), 7);
    }

    #[test]
    fn timeline_rejects_broken_buckets() {
        let bucket = |start: NaiveDate, end: NaiveDate| TimeBucket {
            label: start.to_string(),
            start,
            end,
        };

        // gap between buckets
        let gap = vec![
            bucket(date(2024, 1, 1), date(2024, 1, 8)),
            bucket(date(2024, 1, 9), date(2024, 1, 16)),
        ];
        assert!(Timeline::from_buckets(Granularity::Week, gap).is_none());

        // overlapping buckets
        let overlap = vec![
            bucket(date(2024, 1, 1), date(2024, 1, 8)),
            bucket(date(2024, 1, 5), date(2024, 1, 12)),
        ];
        assert!(Timeline::from_buckets(Granularity::Week, overlap).is_none());

        // out of order
        let reversed = vec![
            bucket(date(2024, 1, 8), date(2024, 1, 15)),
            bucket(date(2024, 1, 1), date(2024, 1, 8)),
        ];
        assert!(Timeline::from_buckets(Granularity::Week, reversed).is_none());

        // empty first bucket
        let empty = vec![bucket(date(2024, 1, 1), date(2024, 1, 1))];
        assert!(Timeline::from_buckets(Granularity::Day, empty).is_none());

        // empty later bucket
        let trailing = vec![
            bucket(date(2024, 1, 1), date(2024, 1, 2)),
            bucket(date(2024, 1, 2), date(2024, 1, 2)),
        ];
        assert!(Timeline::from_buckets(Granularity::Day, trailing).is_none());
    }

    #[test]
    fn push_next_keeps_buckets_contiguous() {
        let mut timeline = Timeline::single(
            Granularity::Day,
            TimeBucket {
                label: "01/01".into(),
                start: date(2024, 1, 1),
                end: date(2024, 1, 2),
            },
        );

        assert!(timeline.push_next("02/01", date(2024, 1, 3)));
        assert!(!timeline.push_next("bad", date(2024, 1, 3)));

        assert_eq!(timeline.len(), 2);
        assert_eq!(timeline.buckets()[1].start, date(2024, 1, 2));
        assert_eq!(timeline.end(), date(2024, 1, 3));
    }

    #[test]
    fn span_degenerate() {
        assert!(TimelineSpan::new(date(2024, 1, 5), date(2024, 1, 4)).is_degenerate());
        assert!(TimelineSpan::new(date(2024, 1, 5), date(2023, 12, 1)).is_degenerate());

        let one_day = TimelineSpan::new(date(2024, 1, 5), date(2024, 1, 5));
        assert!(!one_day.is_degenerate());
        assert_eq!(one_day.total_days(), 1);
        assert!(!TimelineSpan::new(date(2024, 1, 5), date(2024, 1, 6)).is_degenerate());
    }

    #[test]
    fn bar_extent_css() {
        let bar = BarExtent {
            left: 48.39,
            width: 0.5,
        };
        assert_eq!(bar.css(), ("48.39%".to_string(), "0.50%".to_string()));
        assert!((bar.right() - 48.89).abs() < 1e-9);
    }

    #[test]
    fn view_critical_lookup() {
        let view = ScheduleView::new(vec![ScheduleTask::new(1)]);
        assert!(!view.is_critical(1));
        let view = view.with_critical_path(CriticalPath::new([1], 5));
        assert!(view.is_critical(1));
    }
}
