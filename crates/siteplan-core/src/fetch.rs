//! Outcome of loading data from a `PlanningSource`.
//!
//! A schedule page joins several independent fetches. Only some of them are
//! required; when an optional one fails the page still renders, but the
//! caller must be able to tell "the backend has no critical path" apart from
//! "the critical path request failed". `Fetched` keeps that distinction.

use serde::Serialize;
use tracing::warn;

use crate::SourceError;

/// Piece of a schedule view that is fetched separately
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewPart {
    GanttData,
    CriticalPath,
    ScheduleHealth,
    Baseline,
    ActualProgress,
}

impl ViewPart {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewPart::GanttData => "gantt data",
            ViewPart::CriticalPath => "critical path",
            ViewPart::ScheduleHealth => "schedule health",
            ViewPart::Baseline => "baseline",
            ViewPart::ActualProgress => "actual progress",
        }
    }
}

impl std::fmt::Display for ViewPart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An optional part that could not be fetched
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FetchGap {
    pub part: ViewPart,
    pub reason: String,
}

impl FetchGap {
    pub fn new(part: ViewPart, reason: impl Into<String>) -> Self {
        Self {
            part,
            reason: reason.into(),
        }
    }

    /// Keep the value of an optional fetch, or record why it is missing
    pub fn absorb<T>(
        part: ViewPart,
        result: Result<T, SourceError>,
        gaps: &mut Vec<FetchGap>,
    ) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(part = %part, error = %err, "optional fetch failed; continuing without it");
                gaps.push(FetchGap::new(part, err.to_string()));
                None
            }
        }
    }
}

impl std::fmt::Display for FetchGap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} unavailable: {}", self.part, self.reason)
    }
}

/// Success, partial success, or failure of a composite fetch
#[derive(Debug)]
pub enum Fetched<T> {
    /// Every part arrived
    Ready(T),
    /// Required parts arrived; the listed optional parts did not
    Partial { value: T, gaps: Vec<FetchGap> },
    /// A required part failed; nothing can be rendered
    Failed { part: ViewPart, error: SourceError },
}

impl<T> Fetched<T> {
    /// `Ready` when `gaps` is empty, `Partial` otherwise
    pub fn from_parts(value: T, gaps: Vec<FetchGap>) -> Self {
        if gaps.is_empty() {
            Fetched::Ready(value)
        } else {
            Fetched::Partial { value, gaps }
        }
    }

    pub fn failed(part: ViewPart, error: SourceError) -> Self {
        Fetched::Failed { part, error }
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Fetched::Ready(value) | Fetched::Partial { value, .. } => Some(value),
            Fetched::Failed { .. } => None,
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            Fetched::Ready(value) | Fetched::Partial { value, .. } => Some(value),
            Fetched::Failed { .. } => None,
        }
    }

    pub fn gaps(&self) -> &[FetchGap] {
        match self {
            Fetched::Partial { gaps, .. } => gaps,
            _ => &[],
        }
    }

    /// True when `part` was requested but did not arrive
    pub fn is_missing(&self, part: ViewPart) -> bool {
        match self {
            Fetched::Ready(_) => false,
            Fetched::Partial { gaps, .. } => gaps.iter().any(|g| g.part == part),
            Fetched::Failed { .. } => true,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, Fetched::Ready(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Fetched::Failed { .. })
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Fetched<U> {
        match self {
            Fetched::Ready(value) => Fetched::Ready(f(value)),
            Fetched::Partial { value, gaps } => Fetched::Partial {
                value: f(value),
                gaps,
            },
            Fetched::Failed { part, error } => Fetched::Failed { part, error },
        }
    }

    /// Value plus gaps, or the error of the failed required part
    pub fn into_result(self) -> Result<(T, Vec<FetchGap>), SourceError> {
        match self {
            Fetched::Ready(value) => Ok((value, Vec::new())),
            Fetched::Partial { value, gaps } => Ok((value, gaps)),
            Fetched::Failed { error, .. } => Err(error),
        }
    }
}
