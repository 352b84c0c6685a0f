//! Excel schedule export.
//!
//! Writes a single `Cronograma` sheet whose first ten columns match the
//! schedule import template, so an exported workbook can be edited and
//! imported again:
//!
//! ```text
//! | WBS | Descricao | Nivel | Data Inicio | Data Fim | Duracao (dias) | Predecessores | Custo Planejado | Peso | Marco | % Concluido | Critico |
//! |-----|-----------|-------|-------------|----------|----------------|---------------|-----------------|------|-------|-------------|---------|
//! | 1.1 | Escavacao | 1     | 2025-03-01  | 2025-04-15 | 45           |               | 30000           | 10   | Nao   | 100         | Nao     |
//! | 1.2 | Concretagem | 1   | 2025-04-16  | 2025-06-30 | 75           | 1FS           | 70000           | 20   | Nao   | 40          | Sim     |
//! ```
//!
//! Predecessors are written as `<row><type>[+/-lag]`, separated by `;`,
//! where `<row>` is the 1-based data row of the predecessor in the same
//! sheet. The importer resolves references by row, not by backend id.

use rust_decimal::prelude::ToPrimitive;
use std::collections::HashMap;
use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook, Worksheet};
use tracing::debug;

use siteplan_core::dates::to_api_date;
use siteplan_core::{RenderError, Renderer, ScheduleTask, ScheduleView, TaskId};

/// Sheet name expected by the importer
pub const SHEET_NAME: &str = "Cronograma";

/// Import template columns, in order
pub const TEMPLATE_HEADERS: [&str; 10] = [
    "WBS",
    "Descricao",
    "Nivel",
    "Data Inicio",
    "Data Fim",
    "Duracao (dias)",
    "Predecessores",
    "Custo Planejado",
    "Peso",
    "Marco",
];

/// Columns appended after the template
pub const PROGRESS_HEADERS: [&str; 2] = ["% Concluido", "Critico"];

/// Excel schedule renderer
#[derive(Clone, Debug)]
pub struct ExcelRenderer {
    /// Currency symbol for the planned cost column
    pub currency: String,
    /// Append percent complete and critical flag columns
    pub include_progress: bool,
}

impl Default for ExcelRenderer {
    fn default() -> Self {
        Self {
            currency: "R$".into(),
            include_progress: true,
        }
    }
}

struct ExcelFormats {
    header: Format,
    text: Format,
    integer: Format,
    currency: Format,
    number: Format,
    critical_text: Format,
}

fn xlsx_err(e: rust_xlsxwriter::XlsxError) -> RenderError {
    RenderError::Format(e.to_string())
}

/// 1-based data row of each task, in export order
pub fn export_rows(tasks: &[ScheduleTask]) -> HashMap<TaskId, usize> {
    tasks
        .iter()
        .enumerate()
        .map(|(i, task)| (task.id, i + 1))
        .collect()
}

/// `3FS`, `5SS+2`, `7FF-1`, joined with `;`.
///
/// Numbers are rows from `rows`; a predecessor missing from the export is
/// left out.
pub fn format_predecessors(task: &ScheduleTask, rows: &HashMap<TaskId, usize>) -> String {
    task.dependencies
        .iter()
        .filter_map(|d| {
            let Some(row) = rows.get(&d.predecessor) else {
                debug!(task = task.id, predecessor = d.predecessor, "predecessor not exported");
                return None;
            };
            let lag = match d.lag_days {
                0 => String::new(),
                l if l > 0 => format!("+{l}"),
                l => l.to_string(),
            };
            Some(format!("{}{}{}", row, d.kind.code(), lag))
        })
        .collect::<Vec<_>>()
        .join(";")
}

/// Planned duration in days: the backend value, else the planned window
fn duration_days(task: &ScheduleTask) -> Option<i64> {
    task.planned_duration_days.or_else(|| {
        let (start, end) = (task.planned_start?, task.planned_end?);
        Some((end - start).num_days().max(0))
    })
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Sim"
    } else {
        "Nao"
    }
}

impl ExcelRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set currency symbol
    pub fn currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    /// Write only the import template columns
    pub fn template_only(mut self) -> Self {
        self.include_progress = false;
        self
    }

    fn create_formats(&self) -> ExcelFormats {
        let header = Format::new()
            .set_bold()
            .set_align(FormatAlign::Center)
            .set_background_color(0x1E293B)
            .set_font_color(0xFFFFFF)
            .set_border(FormatBorder::Thin);

        let text = Format::new().set_border(FormatBorder::Thin);

        let integer = Format::new()
            .set_num_format("0")
            .set_border(FormatBorder::Thin);

        let currency = Format::new()
            .set_num_format(&format!("\"{}\" #,##0.00", self.currency))
            .set_border(FormatBorder::Thin);

        let number = Format::new()
            .set_num_format("#,##0.##")
            .set_border(FormatBorder::Thin);

        let critical_text = Format::new()
            .set_bold()
            .set_font_color(0xEF4444)
            .set_border(FormatBorder::Thin);

        ExcelFormats {
            header,
            text,
            integer,
            currency,
            number,
            critical_text,
        }
    }

    /// Generate Excel workbook bytes
    pub fn render_to_bytes(&self, view: &ScheduleView) -> Result<Vec<u8>, RenderError> {
        let mut workbook = Workbook::new();
        let formats = self.create_formats();

        let sheet = workbook.add_worksheet();
        sheet.set_name(SHEET_NAME).map_err(xlsx_err)?;
        self.write_headers(sheet, &formats)?;

        let rows = export_rows(&view.tasks);
        for (i, task) in view.tasks.iter().enumerate() {
            let predecessors = format_predecessors(task, &rows);
            self.write_task(
                sheet,
                i as u32 + 1,
                task,
                &predecessors,
                view.is_critical(task.id),
                &formats,
            )?;
        }

        let widths = [10, 40, 8, 12, 12, 14, 16, 16, 8, 8, 12, 10];
        for (col, width) in widths.iter().enumerate().take(self.column_count()) {
            sheet.set_column_width(col as u16, *width).ok();
        }
        sheet.set_freeze_panes(1, 2).ok();

        debug!(rows = view.tasks.len(), "rendered schedule workbook");

        workbook
            .save_to_buffer()
            .map_err(|e| RenderError::Format(format!("Failed to create Excel: {e}")))
    }

    fn column_count(&self) -> usize {
        if self.include_progress {
            TEMPLATE_HEADERS.len() + PROGRESS_HEADERS.len()
        } else {
            TEMPLATE_HEADERS.len()
        }
    }

    fn write_headers(&self, sheet: &mut Worksheet, formats: &ExcelFormats) -> Result<(), RenderError> {
        let headers = TEMPLATE_HEADERS
            .iter()
            .chain(PROGRESS_HEADERS.iter())
            .take(self.column_count());
        for (col, header) in headers.enumerate() {
            sheet
                .write_with_format(0, col as u16, *header, &formats.header)
                .map_err(xlsx_err)?;
        }
        Ok(())
    }

    fn write_task(
        &self,
        sheet: &mut Worksheet,
        row: u32,
        task: &ScheduleTask,
        predecessors: &str,
        is_critical: bool,
        formats: &ExcelFormats,
    ) -> Result<(), RenderError> {
        let text = |value: Option<String>| value.unwrap_or_default();

        sheet
            .write_with_format(row, 0, text(task.wbs_code.clone()), &formats.text)
            .map_err(xlsx_err)?;
        sheet
            .write_with_format(row, 1, text(task.description.clone()), &formats.text)
            .map_err(xlsx_err)?;
        sheet
            .write_with_format(row, 2, task.level, &formats.integer)
            .map_err(xlsx_err)?;
        sheet
            .write_with_format(row, 3, text(task.planned_start.map(to_api_date)), &formats.text)
            .map_err(xlsx_err)?;
        sheet
            .write_with_format(row, 4, text(task.planned_end.map(to_api_date)), &formats.text)
            .map_err(xlsx_err)?;

        match duration_days(task) {
            Some(days) => sheet
                .write_with_format(row, 5, days as f64, &formats.integer)
                .map_err(xlsx_err)?,
            None => sheet.write_blank(row, 5, &formats.integer).map_err(xlsx_err)?,
        };

        sheet
            .write_with_format(row, 6, predecessors, &formats.text)
            .map_err(xlsx_err)?;

        let cost = task.planned_cost.and_then(|c| c.to_f64()).unwrap_or(0.0);
        sheet
            .write_with_format(row, 7, cost, &formats.currency)
            .map_err(xlsx_err)?;

        match task.weight.and_then(|w| w.to_f64()) {
            Some(weight) => sheet
                .write_with_format(row, 8, weight, &formats.number)
                .map_err(xlsx_err)?,
            None => sheet.write_blank(row, 8, &formats.number).map_err(xlsx_err)?,
        };

        sheet
            .write_with_format(row, 9, yes_no(task.is_milestone), &formats.text)
            .map_err(xlsx_err)?;

        if self.include_progress {
            sheet
                .write_with_format(row, 10, task.percent_complete, &formats.integer)
                .map_err(xlsx_err)?;
            let critical_format = if is_critical {
                &formats.critical_text
            } else {
                &formats.text
            };
            sheet
                .write_with_format(row, 11, yes_no(is_critical), critical_format)
                .map_err(xlsx_err)?;
        }

        Ok(())
    }
}

impl Renderer for ExcelRenderer {
    type Output = Vec<u8>;

    fn render(&self, view: &ScheduleView) -> Result<Vec<u8>, RenderError> {
        if view.tasks.is_empty() {
            return Err(RenderError::InvalidData("No tasks to render".into()));
        }
        self.render_to_bytes(view)
    }
}
