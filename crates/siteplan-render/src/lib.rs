//! # siteplan-render
//!
//! Timeline layout and rendering backends for siteplan schedule views.
//!
//! This crate provides:
//! - The timeline bucketer (`timeline`) and bar position mapper (`bars`)
//! - Gantt row layout with planned/actual bars and milestone markers
//! - WBS table rows
//! - SVG Gantt chart rendering
//! - Text output: timeline table, WBS table, health summary, Curve-S table
//! - Excel export in the schedule import template layout
//!
//! ## Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use siteplan_core::{Granularity, ScheduleTask, TimelineSpan};
//! use siteplan_render::{bar_extent, build_timeline};
//!
//! let d = |m, day| NaiveDate::from_ymd_opt(2024, m, day).unwrap();
//! let tasks = vec![ScheduleTask::new(1).planned(d(1, 10), d(3, 5))];
//!
//! let timeline = build_timeline(&tasks, Granularity::Day, d(1, 1));
//! assert_eq!(timeline.start(), d(1, 7));
//!
//! let span = TimelineSpan::new(d(1, 1), d(1, 31));
//! let bar = bar_extent(Some(d(1, 16)), Some(d(1, 16)), span).unwrap();
//! assert_eq!((bar.left, bar.width), (48.39, 0.5));
//! ```

pub mod bars;
pub mod excel;
pub mod gantt;
pub mod rows;
pub mod text;
pub mod timeline;
pub mod wbs;

pub use bars::{bar_extent, bar_extent_str, marker_offset};
pub use excel::ExcelRenderer;
pub use gantt::SvgRenderer;
pub use rows::{layout_rows, GanttRow};
pub use text::{curve_s_table, HealthTextRenderer, TimelineTextRenderer, WbsTextRenderer};
pub use timeline::{build_timeline, Bucketer};
pub use wbs::{wbs_rows, WbsRow};

/// Truncate a string to at most `max` characters with ellipsis
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}
