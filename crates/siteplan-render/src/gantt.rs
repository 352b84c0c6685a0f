//! SVG Gantt chart renderer.
//!
//! Draws the timeline header, one row per task with its planned bar,
//! progress fill, actual bar or milestone diamond, a today line and a
//! legend. Horizontal positions come from the bar position mapper, so the
//! chart agrees with every other consumer of the layout.

use chrono::NaiveDate;
use svg::node::element::{Group, Line, Polygon, Rectangle, Text};
use svg::Document;
use tracing::debug;

use siteplan_core::{Granularity, Locale, RenderError, Renderer, ScheduleView, Timeline, TimelineSpan};

use crate::bars::marker_offset;
use crate::rows::{layout_rows, GanttRow};
use crate::timeline::Bucketer;
use crate::truncate;

/// SVG Gantt chart renderer configuration
#[derive(Clone, Debug)]
pub struct SvgRenderer {
    /// Chart title
    pub title: Option<String>,
    /// Width of the chart area (excluding labels) in pixels
    pub chart_width: u32,
    /// Height per task row in pixels
    pub row_height: u32,
    /// Width of the label column in pixels
    pub label_width: u32,
    /// Header height in pixels
    pub header_height: u32,
    /// Padding around the chart
    pub padding: u32,
    pub granularity: Granularity,
    pub locale: Locale,
    /// Reference date for the today line and the empty-schedule window
    pub today: Option<NaiveDate>,
    /// Draw critical tasks in the critical color (default: true)
    pub highlight_critical: bool,
    pub critical_color: String,
    pub planned_color: String,
    pub actual_color: String,
    pub milestone_color: String,
    pub today_color: String,
    pub background_color: String,
    pub grid_color: String,
    pub text_color: String,
    pub font_family: String,
    pub font_size: u32,
}

impl Default for SvgRenderer {
    fn default() -> Self {
        Self {
            title: None,
            chart_width: 800,
            row_height: 36,
            label_width: 220,
            header_height: 50,
            padding: 20,
            granularity: Granularity::Week,
            locale: Locale::default(),
            today: None,
            highlight_critical: true,
            critical_color: "#ef4444".into(),
            planned_color: "#3b82f6".into(),
            actual_color: "#22c55e".into(),
            milestone_color: "#eab308".into(),
            today_color: "#f97316".into(),
            background_color: "#ffffff".into(),
            grid_color: "#e2e8f0".into(),
            text_color: "#1e293b".into(),
            font_family: "system-ui, -apple-system, sans-serif".into(),
            font_size: 12,
        }
    }
}

impl SvgRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Configure chart width
    pub fn chart_width(mut self, width: u32) -> Self {
        self.chart_width = width.max(100);
        self
    }

    /// Configure row height
    pub fn row_height(mut self, height: u32) -> Self {
        self.row_height = height.max(16);
        self
    }

    /// Configure label column width
    pub fn label_width(mut self, width: u32) -> Self {
        self.label_width = width;
        self
    }

    pub fn granularity(mut self, granularity: Granularity) -> Self {
        self.granularity = granularity;
        self
    }

    pub fn locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    pub fn today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    /// Draw every task in the planned color
    pub fn no_critical_highlight(mut self) -> Self {
        self.highlight_critical = false;
        self
    }

    fn total_width(&self) -> u32 {
        self.padding * 2 + self.label_width + self.chart_width
    }

    fn total_height(&self, row_count: usize) -> u32 {
        self.padding * 2 + self.header_height + (row_count as u32 * self.row_height)
    }

    fn chart_left(&self) -> f64 {
        f64::from(self.padding + self.label_width)
    }

    /// Horizontal pixel position of a percent offset
    fn percent_to_x(&self, percent: f64) -> f64 {
        self.chart_left() + percent * f64::from(self.chart_width) / 100.0
    }

    fn row_top(&self, row: usize) -> u32 {
        self.padding + self.header_height + (row as u32 * self.row_height)
    }

    fn bar_color(&self, row: &GanttRow) -> &str {
        if self.highlight_critical && row.is_critical {
            self.critical_color.as_str()
        } else {
            self.planned_color.as_str()
        }
    }

    fn text(&self, content: impl Into<String>, x: f64, y: f64, size: u32) -> Text {
        Text::new(content.into())
            .set("x", x)
            .set("y", y)
            .set("font-family", self.font_family.as_str())
            .set("font-size", size)
            .set("fill", self.text_color.as_str())
    }

    /// Bucket labels above the chart
    fn render_header(&self, timeline: &Timeline, span: TimelineSpan) -> Group {
        let mut group = Group::new().set("class", "header");

        let header_bg = Rectangle::new()
            .set("x", self.padding)
            .set("y", self.padding)
            .set("width", self.label_width + self.chart_width)
            .set("height", self.header_height)
            .set("fill", "#f8fafc");
        group = group.add(header_bg);

        let label_y = f64::from(self.padding + self.header_height) - 12.0;
        for bucket in timeline.buckets() {
            let Some(left) = marker_offset(Some(bucket.start), span) else {
                continue;
            };
            let right = marker_offset(Some(bucket.end), span).unwrap_or(left);
            let x = self.percent_to_x((left + right) / 2.0);
            let text = self
                .text(bucket.label.as_str(), x, label_y, self.font_size.saturating_sub(2))
                .set("text-anchor", "middle");
            group = group.add(text);
        }

        group
    }

    /// Row separators and bucket boundaries
    fn render_grid(&self, timeline: &Timeline, span: TimelineSpan, row_count: usize) -> Group {
        let mut group = Group::new().set("class", "grid");

        let chart_top = self.padding + self.header_height;
        let chart_bottom = self.row_top(row_count);

        for i in 0..=row_count {
            let y = self.row_top(i);
            let line = Line::new()
                .set("x1", self.padding)
                .set("y1", y)
                .set("x2", self.padding + self.label_width + self.chart_width)
                .set("y2", y)
                .set("stroke", self.grid_color.as_str())
                .set("stroke-width", 1);
            group = group.add(line);
        }

        for bucket in timeline.buckets() {
            let Some(left) = marker_offset(Some(bucket.start), span) else {
                continue;
            };
            let x = self.percent_to_x(left);
            let line = Line::new()
                .set("x1", x)
                .set("y1", chart_top)
                .set("x2", x)
                .set("y2", chart_bottom)
                .set("stroke", self.grid_color.as_str())
                .set("stroke-width", 1);
            group = group.add(line);
        }

        group
    }

    /// Label, bars and milestone marker of one row
    fn render_row(&self, row: &GanttRow, index: usize) -> Group {
        let mut group = Group::new()
            .set("class", if row.is_critical { "task critical" } else { "task" })
            .set("data-task-id", row.id.to_string());

        let y = f64::from(self.row_top(index));
        let row_height = f64::from(self.row_height);

        if self.highlight_critical && row.is_critical {
            let tint = Rectangle::new()
                .set("x", self.padding)
                .set("y", y)
                .set("width", self.label_width + self.chart_width)
                .set("height", row_height)
                .set("fill", self.critical_color.as_str())
                .set("fill-opacity", 0.04);
            group = group.add(tint);
        }

        let indent = f64::from(self.padding) + 8.0 + f64::from(row.level) * 12.0;
        let label = match &row.wbs_code {
            Some(code) => format!("{code} {}", row.label),
            None => row.label.clone(),
        };
        group = group.add(self.text(
            truncate(&label, 30),
            indent,
            y + row_height / 2.0 + 4.0,
            self.font_size,
        ));

        let color = self.bar_color(row);

        if let Some(planned) = row.planned {
            let bar_y = y + row_height * 0.28;
            let bar_height = row_height * 0.24;
            let x = self.percent_to_x(planned.left);
            let width = planned.width * f64::from(self.chart_width) / 100.0;

            let bar = Rectangle::new()
                .set("x", x)
                .set("y", bar_y)
                .set("width", width)
                .set("height", bar_height)
                .set("rx", 3)
                .set("ry", 3)
                .set("fill", color)
                .set("fill-opacity", 0.25)
                .set("stroke", color)
                .set("stroke-width", 1);
            group = group.add(bar);

            if let Some(fill) = row.progress_width().filter(|w| *w > 0.0) {
                let progress = Rectangle::new()
                    .set("class", "progress")
                    .set("x", x)
                    .set("y", bar_y)
                    .set("width", fill * f64::from(self.chart_width) / 100.0)
                    .set("height", bar_height)
                    .set("rx", 3)
                    .set("ry", 3)
                    .set("fill", color);
                group = group.add(progress);
            }
        }

        if let Some(actual) = row.actual {
            let bar = Rectangle::new()
                .set("class", "actual")
                .set("x", self.percent_to_x(actual.left))
                .set("y", y + row_height * 0.58)
                .set("width", actual.width * f64::from(self.chart_width) / 100.0)
                .set("height", row_height * 0.16)
                .set("rx", 2)
                .set("ry", 2)
                .set("fill", self.actual_color.as_str())
                .set("fill-opacity", 0.85);
            group = group.add(bar);
        }

        if let Some(offset) = row.milestone {
            let cx = self.percent_to_x(offset);
            let cy = y + row_height / 2.0;
            let size = row_height * 0.25;
            group = group.add(diamond(cx, cy, size, &self.milestone_color));
        }

        group
    }

    fn render_today(&self, span: TimelineSpan, row_count: usize) -> Option<Line> {
        let today = self.today?;
        if today < span.first_day || today > span.last_day {
            return None;
        }
        let x = self.percent_to_x(marker_offset(Some(today), span)?);
        Some(
            Line::new()
                .set("class", "today")
                .set("x1", x)
                .set("y1", self.padding + self.header_height)
                .set("x2", x)
                .set("y2", self.row_top(row_count))
                .set("stroke", self.today_color.as_str())
                .set("stroke-width", 2)
                .set("stroke-dasharray", "4,3"),
        )
    }

    /// Legend plus the critical path summary line
    fn render_legend(&self, view: &ScheduleView, y_offset: u32) -> Group {
        let mut group = Group::new().set("class", "legend");
        let x_start = f64::from(self.padding);
        let y = f64::from(y_offset) + 15.0;
        let box_size = 12.0;
        let spacing = 120.0;

        let (planned, actual, critical, milestone) = match self.locale {
            Locale::PtBr => ("Planejado", "Realizado", "Caminho crítico", "Marco"),
            Locale::EnUs => ("Planned", "Actual", "Critical path", "Milestone"),
            Locale::Es => ("Planificado", "Realizado", "Ruta crítica", "Hito"),
        };

        let entries = [
            (planned, self.planned_color.as_str()),
            (actual, self.actual_color.as_str()),
            (critical, self.critical_color.as_str()),
        ];
        for (i, (label, color)) in entries.iter().enumerate() {
            let x = x_start + spacing * i as f64;
            let swatch = Rectangle::new()
                .set("x", x)
                .set("y", y - box_size + 2.0)
                .set("width", box_size)
                .set("height", box_size)
                .set("rx", 2)
                .set("fill", *color);
            group = group.add(swatch);
            group = group.add(self.text(*label, x + box_size + 5.0, y, self.font_size - 1));
        }

        let mx = x_start + spacing * 3.0 + box_size / 2.0;
        group = group.add(diamond(mx, y - box_size / 2.0 + 2.0, box_size / 2.0, &self.milestone_color));
        group = group.add(self.text(milestone, mx + box_size, y, self.font_size - 1));

        if let Some(cp) = &view.critical_path {
            let summary = match self.locale {
                Locale::PtBr => format!(
                    "Caminho crítico: {} tarefas | Duração total: {} dias",
                    cp.len(),
                    cp.total_duration
                ),
                Locale::EnUs => format!(
                    "Critical path: {} tasks | Total duration: {} days",
                    cp.len(),
                    cp.total_duration
                ),
                Locale::Es => format!(
                    "Ruta crítica: {} tareas | Duración total: {} días",
                    cp.len(),
                    cp.total_duration
                ),
            };
            group = group.add(self.text(summary, x_start, y + 20.0, self.font_size - 1));
        }

        group
    }
}

fn diamond(cx: f64, cy: f64, size: f64, color: &str) -> Polygon {
    Polygon::new()
        .set(
            "points",
            format!(
                "{},{} {},{} {},{} {},{}",
                cx,
                cy - size,
                cx + size,
                cy,
                cx,
                cy + size,
                cx - size,
                cy
            ),
        )
        .set("fill", color)
}

impl Renderer for SvgRenderer {
    type Output = String;

    fn render(&self, view: &ScheduleView) -> Result<String, RenderError> {
        if view.tasks.is_empty() {
            return Err(RenderError::InvalidData("No tasks to render".into()));
        }

        let today = self
            .today
            .unwrap_or_else(|| chrono::Local::now().date_naive());
        let timeline = Bucketer::new(self.granularity)
            .locale(self.locale)
            .build(&view.tasks, today);
        let span = timeline.span();
        let rows = layout_rows(view, span);

        let width = self.total_width();
        let height = self.total_height(rows.len()) + 50; // legend

        let mut document = Document::new()
            .set("width", width)
            .set("height", height)
            .set("viewBox", (0, 0, width, height))
            .set("xmlns", "http://www.w3.org/2000/svg");

        let background = Rectangle::new()
            .set("width", "100%")
            .set("height", "100%")
            .set("fill", self.background_color.as_str());
        document = document.add(background);

        document = document.add(self.render_header(&timeline, span));

        if let Some(title) = &self.title {
            let title = self
                .text(title.as_str(), f64::from(self.padding) + 8.0, f64::from(self.padding) + 20.0, self.font_size + 4)
                .set("font-weight", "bold");
            document = document.add(title);
        }

        document = document.add(self.render_grid(&timeline, span, rows.len()));

        for (index, row) in rows.iter().enumerate() {
            document = document.add(self.render_row(row, index));
        }

        if let Some(line) = self.render_today(span, rows.len()) {
            document = document.add(line);
        }

        document = document.add(self.render_legend(view, self.row_top(rows.len()) + 10));

        debug!(rows = rows.len(), buckets = timeline.len(), "rendered svg gantt");

        let mut output = Vec::new();
        svg::write(&mut output, &document)
            .map_err(|e| RenderError::Format(format!("Failed to write SVG: {}", e)))?;

        String::from_utf8(output).map_err(|e| RenderError::Format(format!("Invalid UTF-8: {}", e)))
    }
}
