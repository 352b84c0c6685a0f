//! Plain text renderers for console output.

use chrono::NaiveDate;
use std::fmt::Write;

use siteplan_analytics::indicators::{format_spi, SpiBand, Variance};
use siteplan_core::dates::format_long;
use siteplan_core::{
    BarExtent, CurveSPoint, Granularity, Locale, RenderError, Renderer, ScheduleView,
};

use crate::rows::layout_rows;
use crate::timeline::Bucketer;
use crate::truncate;
use crate::wbs::wbs_rows;

fn bar_cell(bar: Option<BarExtent>) -> String {
    match bar {
        Some(bar) => format!("{:>6.2}% +{:>6.2}%", bar.left, bar.width),
        None => "-".to_string(),
    }
}

/// Timeline buckets followed by the bar position of every task
#[derive(Clone, Debug)]
pub struct TimelineTextRenderer {
    pub granularity: Granularity,
    pub locale: Locale,
    pub today: NaiveDate,
}

impl TimelineTextRenderer {
    pub fn new(granularity: Granularity, today: NaiveDate) -> Self {
        Self {
            granularity,
            locale: Locale::default(),
            today,
        }
    }

    pub fn locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }
}

impl Renderer for TimelineTextRenderer {
    type Output = String;

    fn render(&self, view: &ScheduleView) -> Result<String, RenderError> {
        let timeline = Bucketer::new(self.granularity)
            .locale(self.locale)
            .build(&view.tasks, self.today);
        let span = timeline.span();
        let mut out = String::new();

        writeln!(
            out,
            "Timeline: {} x{} ({} .. {})",
            timeline.granularity(),
            timeline.len(),
            format_long(span.first_day, self.locale),
            format_long(span.last_day, self.locale)
        )
        .map_err(|e| RenderError::Format(e.to_string()))?;

        let labels: Vec<&str> = timeline.buckets().iter().map(|b| b.label.as_str()).collect();
        writeln!(out, "{}", labels.join(" | ")).map_err(|e| RenderError::Format(e.to_string()))?;
        writeln!(out).map_err(|e| RenderError::Format(e.to_string()))?;

        writeln!(
            out,
            "{:<8} {:<10} {:<30} {:<18} {:<18} {:>4}  {}",
            "ID", "WBS", "Task", "Planned", "Actual", "%", "Critical"
        )
        .map_err(|e| RenderError::Format(e.to_string()))?;

        for row in layout_rows(view, span) {
            let planned = match row.milestone {
                Some(offset) => format!("<> {offset:>6.2}%"),
                None => bar_cell(row.planned),
            };
            writeln!(
                out,
                "{:<8} {:<10} {:<30} {:<18} {:<18} {:>4}  {}",
                row.id,
                row.wbs_code.as_deref().unwrap_or("-"),
                truncate(&row.label, 30),
                planned,
                bar_cell(row.actual),
                row.percent_complete,
                if row.is_critical { "*" } else { "" }
            )
            .map_err(|e| RenderError::Format(e.to_string()))?;
        }

        if view.critical_path.is_none() {
            writeln!(out, "\n(critical path unavailable)")
                .map_err(|e| RenderError::Format(e.to_string()))?;
        }

        Ok(out)
    }
}

/// Work breakdown table
#[derive(Clone, Debug, Default)]
pub struct WbsTextRenderer {
    pub locale: Locale,
}

impl WbsTextRenderer {
    pub fn new(locale: Locale) -> Self {
        Self { locale }
    }
}

impl Renderer for WbsTextRenderer {
    type Output = String;

    fn render(&self, view: &ScheduleView) -> Result<String, RenderError> {
        let mut out = String::new();
        writeln!(
            out,
            "{:<10} {:<40} {:<10} {:<10} {:<10} {:<10} {:>4}  {}",
            "WBS", "Description", "Start", "End", "Act.start", "Act.end", "%", "Status"
        )
        .map_err(|e| RenderError::Format(e.to_string()))?;

        for row in wbs_rows(&view.tasks, self.locale) {
            let indent = "  ".repeat(row.level as usize);
            writeln!(
                out,
                "{:<10} {:<40} {:<10} {:<10} {:<10} {:<10} {:>4}  {}",
                row.code,
                truncate(&format!("{indent}{}", row.description), 40),
                row.planned_start,
                row.planned_end,
                row.actual_start,
                row.actual_end,
                row.percent_complete,
                row.status_label
            )
            .map_err(|e| RenderError::Format(e.to_string()))?;
        }
        Ok(out)
    }
}

/// Schedule health summary
#[derive(Clone, Debug, Default)]
pub struct HealthTextRenderer {
    pub locale: Locale,
}

impl HealthTextRenderer {
    pub fn new(locale: Locale) -> Self {
        Self { locale }
    }
}

impl Renderer for HealthTextRenderer {
    type Output = String;

    fn render(&self, view: &ScheduleView) -> Result<String, RenderError> {
        let health = view
            .health
            .as_ref()
            .ok_or_else(|| RenderError::InvalidData("Schedule health unavailable".into()))?;

        let variance = Variance::between(health.overall_actual_percent, health.overall_planned_percent);
        let band = SpiBand::from_ratio(health.spi);

        let mut out = String::new();
        let mut line = |text: String| {
            out.push_str(&text);
            out.push('\n');
        };

        line(format!(
            "Tasks:     {} (completed {}, in progress {}, not started {})",
            health.total_tasks,
            health.completed_tasks,
            health.in_progress_tasks,
            health.not_started_tasks
        ));
        line(format!(
            "Timing:    on time {}, ahead {}, delayed {}",
            health.on_time, health.ahead, health.delayed
        ));
        line(format!(
            "Progress:  planned {:.2}%, actual {:.2}% ({})",
            health.overall_planned_percent,
            health.overall_actual_percent,
            variance.label(self.locale)
        ));
        line(format!(
            "SPI:       {} ({})",
            format_spi(health.spi),
            band.label(self.locale)
        ));

        if !health.upcoming_milestones.is_empty() {
            line("Milestones:".to_string());
            for m in &health.upcoming_milestones {
                line(format!(
                    "  {}  {:<8} {}{}",
                    format_long(m.planned_date, self.locale),
                    m.wbs_code.as_deref().unwrap_or("-"),
                    m.description.as_deref().unwrap_or(""),
                    if m.is_overdue { "  [overdue]" } else { "" }
                ));
            }
        }

        Ok(out)
    }
}

/// Curve-S series as a table, closing with the latest variance
pub fn curve_s_table(points: &[CurveSPoint], locale: Locale) -> String {
    let mut out = format!(
        "{:<8} {:>14} {:>14} {:>9} {:>9}\n",
        "Period", "Planned", "Actual", "Plan %", "Act %"
    );
    for p in points {
        out.push_str(&format!(
            "{:<8} {:>14.2} {:>14.2} {:>8.2}% {:>8.2}%\n",
            p.period, p.planned_cumulative, p.actual_cumulative, p.planned_percent, p.actual_percent
        ));
    }
    if let Some((point, variance)) = siteplan_analytics::latest_variance(points) {
        out.push_str(&format!("\n{}: {}\n", point.period, variance.label(locale)));
    }
    out
}
