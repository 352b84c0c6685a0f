//! Command implementations.
//!
//! Each command returns the text to print on stdout. Missing optional data
//! is reported on stderr; a missing Gantt payload is an error.

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt::{Display, Write as _};
use std::path::Path;
use tracing::info;

use siteplan_analytics::indicators::format_spi;
use siteplan_analytics::{load_curve_s, load_schedule_view, ScheduleHealth, SpiBand, Variance};
use siteplan_core::lifecycle::{
    DocumentAction, DocumentStatus, IncidentAction, IncidentClosure, IncidentEvent,
    IncidentStatus, Lifecycle, NonConformanceAction, NonConformanceStatus, PpeAction, PpeStatus,
};
use siteplan_core::session::{SessionState, UserProfile};
use siteplan_core::{
    BaselineId, FetchGap, Fetched, PlanningSource, Renderer, ScheduleQuery, ScheduleView,
};
use siteplan_parser::{parse_critical_path, parse_gantt, DirectorySource, JsonFileSessionStore};
use siteplan_render::{
    curve_s_table, layout_rows, wbs_rows, Bucketer, ExcelRenderer, HealthTextRenderer,
    TimelineTextRenderer, WbsTextRenderer,
};

use crate::config::Config;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Status machines exposed on the command line
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum Machine {
    Incident,
    Document,
    NonConformance,
    Ppe,
}

/// Fields an incident needs before it can be closed
#[derive(Clone, Debug, Default)]
pub struct ClosureFields {
    pub root_cause: Option<String>,
    pub corrective_actions: Option<String>,
    pub preventive_actions: Option<String>,
}

fn report_gaps(gaps: &[FetchGap]) {
    for gap in gaps {
        eprintln!("warning: {} unavailable: {}", gap.part, gap.reason);
    }
}

fn settle<T>(fetched: Fetched<T>) -> Result<T> {
    let (value, gaps) = fetched.into_result()?;
    report_gaps(&gaps);
    Ok(value)
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    let mut out = serde_json::to_string_pretty(value)?;
    out.push('\n');
    Ok(out)
}

fn read_tasks(file: &Path) -> Result<ScheduleView> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let tasks = parse_gantt(&content).with_context(|| format!("Invalid Gantt data in {}", file.display()))?;
    Ok(ScheduleView::new(tasks))
}

// ============================================================================
// Schedule
// ============================================================================

#[derive(Serialize)]
struct TimelineLayout<'a> {
    timeline: &'a siteplan_core::Timeline,
    rows: Vec<siteplan_render::GanttRow>,
}

/// Bucket and lay out the tasks of one exported Gantt file
pub fn timeline(
    config: &Config,
    file: &Path,
    critical: Option<&Path>,
    today: NaiveDate,
    format: OutputFormat,
) -> Result<String> {
    let mut view = read_tasks(file)?;
    if let Some(path) = critical {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        view.critical_path = Some(
            parse_critical_path(&content)
                .with_context(|| format!("Invalid critical path in {}", path.display()))?,
        );
    }

    match format {
        OutputFormat::Text => Ok(TimelineTextRenderer::new(config.display.granularity, today)
            .locale(config.display.locale)
            .render(&view)?),
        OutputFormat::Json => {
            let timeline = Bucketer::new(config.display.granularity)
                .locale(config.display.locale)
                .build(&view.tasks, today);
            let rows = layout_rows(&view, timeline.span());
            to_json(&TimelineLayout {
                timeline: &timeline,
                rows,
            })
        }
    }
}

/// Render a project's Gantt chart to SVG, or to an Excel workbook for `.xlsx`
pub fn gantt(
    config: &Config,
    dir: &Path,
    query: &ScheduleQuery,
    output: &Path,
    title: Option<String>,
    today: Option<NaiveDate>,
) -> Result<String> {
    let source = DirectorySource::new(dir);
    let view = settle(load_schedule_view(&source, query))?;

    let is_excel = output
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("xlsx"));

    if is_excel {
        let bytes = ExcelRenderer::new().render(&view)?;
        std::fs::write(output, bytes)
            .with_context(|| format!("Failed to write {}", output.display()))?;
    } else {
        let mut renderer = config.svg_renderer();
        if let Some(title) = title {
            renderer = renderer.title(title);
        }
        if let Some(today) = today {
            renderer = renderer.today(today);
        }
        let svg = renderer.render(&view)?;
        std::fs::write(output, svg)
            .with_context(|| format!("Failed to write {}", output.display()))?;
    }

    info!(output = %output.display(), tasks = view.tasks.len(), "chart written");
    Ok(format!(
        "Wrote {} ({} tasks)\n",
        output.display(),
        view.tasks.len()
    ))
}

/// Work breakdown listing of a project
pub fn wbs(config: &Config, dir: &Path, query: &ScheduleQuery, format: OutputFormat) -> Result<String> {
    let tasks = DirectorySource::new(dir).gantt_data(query)?;
    match format {
        OutputFormat::Text => Ok(WbsTextRenderer::new(config.display.locale).render(&ScheduleView::new(tasks))?),
        OutputFormat::Json => to_json(&wbs_rows(&tasks, config.display.locale)),
    }
}

#[derive(Serialize)]
struct HealthReport<'a> {
    #[serde(flatten)]
    health: &'a siteplan_core::ScheduleHealthSnapshot,
    spi_band: SpiBand,
}

/// Schedule health: the exported snapshot, or computed from the tasks
pub fn health(
    config: &Config,
    dir: &Path,
    query: &ScheduleQuery,
    compute: Option<NaiveDate>,
    format: OutputFormat,
) -> Result<String> {
    let source = DirectorySource::new(dir);
    let view = match compute {
        Some(today) => {
            let tasks = source.gantt_data(query)?;
            let health = ScheduleHealth::compute(&tasks, today);
            ScheduleView {
                tasks,
                critical_path: None,
                health: Some(health),
            }
        }
        None => settle(load_schedule_view(&source, query))?,
    };

    match format {
        OutputFormat::Text => Ok(HealthTextRenderer::new(config.display.locale).render(&view)?),
        OutputFormat::Json => {
            let Some(health) = view.health.as_ref() else {
                bail!("Schedule health unavailable for project {}", query.project);
            };
            to_json(&HealthReport {
                health,
                spi_band: SpiBand::from_ratio(health.spi),
            })
        }
    }
}

/// Monthly Curve-S of a baseline against current progress
pub fn curve_s(
    config: &Config,
    dir: &Path,
    query: &ScheduleQuery,
    baseline: BaselineId,
    format: OutputFormat,
) -> Result<String> {
    let source = DirectorySource::new(dir);
    let points = settle(load_curve_s(&source, query, baseline))?;
    match format {
        OutputFormat::Text => Ok(curve_s_table(&points, config.display.locale)),
        OutputFormat::Json => to_json(&points),
    }
}

// ============================================================================
// Indicators
// ============================================================================

pub fn variance(config: &Config, actual: f64, planned: f64) -> String {
    let variance = Variance::between(actual, planned);
    format!(
        "{} {}\n",
        variance.label(config.display.locale),
        variance.class.color()
    )
}

pub fn spi(config: &Config, value: Option<f64>) -> String {
    let band = SpiBand::from_ratio(value);
    format!(
        "{} {} {}\n",
        format_spi(value),
        band.label(config.display.locale),
        band.color()
    )
}

// ============================================================================
// Status Machines
// ============================================================================

fn step<L: Lifecycle + Display>(from: L, event: &L::Event) -> Result<String> {
    let to = from.transition(event)?;
    let mut out = format!("{from} -> {to}\n");
    let next: Vec<&str> = to.available_events().into_iter().map(L::action_name).collect();
    if next.is_empty() {
        out.push_str("terminal\n");
    } else {
        let _ = writeln!(out, "next: {}", next.join(", "));
    }
    Ok(out)
}

/// Apply `event` to a record in state `from`
pub fn transition(machine: Machine, from: &str, event: &str, closure: ClosureFields) -> Result<String> {
    match machine {
        Machine::Incident => {
            let from: IncidentStatus = from.parse()?;
            let event = match IncidentAction::parse(event)? {
                IncidentAction::StartInvestigation => IncidentEvent::StartInvestigation,
                IncidentAction::ConcludeInvestigation => IncidentEvent::ConcludeInvestigation,
                IncidentAction::Amend => IncidentEvent::Amend,
                IncidentAction::Close => IncidentEvent::Close(IncidentClosure {
                    root_cause: closure.root_cause.unwrap_or_default(),
                    corrective_actions: closure.corrective_actions.unwrap_or_default(),
                    preventive_actions: closure.preventive_actions,
                }),
            };
            step(from, &event)
        }
        Machine::Document => step(from.parse::<DocumentStatus>()?, &DocumentAction::parse(event)?),
        Machine::NonConformance => step(
            from.parse::<NonConformanceStatus>()?,
            &NonConformanceAction::parse(event)?,
        ),
        Machine::Ppe => step(from.parse::<PpeStatus>()?, &PpeAction::parse(event)?),
    }
}

// ============================================================================
// Session
// ============================================================================

fn open_session(path: &Path) -> Result<SessionState<JsonFileSessionStore>> {
    SessionState::init(JsonFileSessionStore::new(path))
        .with_context(|| format!("Failed to open session {}", path.display()))
}

pub fn session_login(path: &Path, token: &str, user: UserProfile) -> Result<String> {
    let mut session = open_session(path)?;
    let email = user.email.clone();
    session.login(token, user)?;
    Ok(format!("Logged in as {email}\n"))
}

pub fn session_show(path: &Path) -> Result<String> {
    let session = open_session(path)?;
    let Some(user) = session.user().filter(|_| session.is_logged_in()) else {
        return Ok("Not logged in\n".to_string());
    };
    let mut out = String::new();
    let _ = writeln!(out, "User:          {} <{}>", user.name, user.email);
    let _ = writeln!(out, "Company:       {}", user.company_id);
    let _ = writeln!(out, "Active sprint: {}", user.active_sprint_id);
    Ok(out)
}

pub fn session_logout(path: &Path) -> Result<String> {
    let mut session = open_session(path)?;
    if !session.is_logged_in() {
        return Ok("Not logged in\n".to_string());
    }
    session.logout()?;
    Ok("Logged out\n".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use siteplan_core::Locale;

    #[test]
    fn variance_badge() {
        let config = Config::default();
        assert_eq!(variance(&config, 52.3, 50.0), "+2.3% adiantado #22c55e\n");
        assert_eq!(variance(&config, 49.8, 50.0), "No prazo #94a3b8\n");
    }

    #[test]
    fn spi_badge() {
        let config = Config::default().with_overrides(Some(Locale::EnUs), None);
        assert_eq!(spi(&config, Some(0.93)), "0.93 Attention #eab308\n");
        assert_eq!(spi(&config, None), "N/A N/A #94a3b8\n");
    }

    #[test]
    fn incident_close_requires_root_cause() {
        let err = transition(Machine::Incident, "investigado", "close", ClosureFields::default());
        assert!(err.is_err());

        let out = transition(
            Machine::Incident,
            "investigado",
            "close",
            ClosureFields {
                root_cause: Some("Loose guard rail".into()),
                corrective_actions: Some("Rail replaced".into()),
                preventive_actions: None,
            },
        )
        .unwrap();
        assert_eq!(out, "investigado -> encerrado\nterminal\n");
    }

    #[test]
    fn unknown_state_is_rejected() {
        assert!(transition(Machine::Document, "archived", "approve", ClosureFields::default()).is_err());
    }

    #[test]
    fn session_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        assert_eq!(session_show(&path).unwrap(), "Not logged in\n");

        let user = UserProfile {
            id: 7,
            name: "Ana".into(),
            email: "ana@obra.com".into(),
            company_id: 3,
            active_sprint_id: 12,
            ..Default::default()
        };
        assert_eq!(session_login(&path, "tok", user).unwrap(), "Logged in as ana@obra.com\n");
        assert!(session_show(&path).unwrap().contains("Ana <ana@obra.com>"));
        assert_eq!(session_logout(&path).unwrap(), "Logged out\n");
        assert_eq!(session_show(&path).unwrap(), "Not logged in\n");
        assert!(!path.exists());
    }
}
