//! siteplan CLI - construction schedule layout and analytics
//!
//! Reads exported planning payloads and renders timelines, Gantt charts,
//! WBS listings, schedule health and Curve-S tables.

mod commands;
mod config;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use siteplan_core::session::UserProfile;
use siteplan_core::{BaselineId, Granularity, Locale, ProjectId, ScheduleQuery, SprintId};

use commands::{ClosureFields, Machine, OutputFormat};
use config::Config;

#[derive(Parser)]
#[command(name = "siteplan")]
#[command(author, version, about = "Construction schedule layout and analytics", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file (defaults to ./siteplan.toml)
    #[arg(long, env = "SITEPLAN_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Display locale (pt-BR, en-US, es)
    #[arg(long, env = "SITEPLAN_LOCALE", global = true)]
    locale: Option<Locale>,

    /// Timeline granularity (day, week, month)
    #[arg(short, long, env = "SITEPLAN_GRANULARITY", global = true)]
    granularity: Option<Granularity>,

    #[command(subcommand)]
    command: Commands,
}

/// Which project (and sprint) to read
#[derive(Args)]
struct ProjectArgs {
    /// Export directory (defaults to [data] dir in the config)
    #[arg(value_name = "DIR")]
    dir: Option<PathBuf>,

    /// Project id
    #[arg(short, long)]
    project: ProjectId,

    /// Restrict to one sprint
    #[arg(short, long)]
    sprint: Option<SprintId>,
}

impl ProjectArgs {
    fn query(&self) -> ScheduleQuery {
        let query = ScheduleQuery::project(self.project);
        match self.sprint {
            Some(sprint) => query.sprint(sprint),
            None => query,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Bucket and lay out the tasks of a Gantt export
    Timeline {
        /// Gantt JSON file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Critical path JSON file
        #[arg(long)]
        critical: Option<PathBuf>,

        /// Reference date (defaults to today)
        #[arg(long)]
        today: Option<NaiveDate>,

        #[arg(short, long, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// Render a Gantt chart (.svg) or schedule workbook (.xlsx)
    Gantt {
        #[command(flatten)]
        project: ProjectArgs,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Chart title
        #[arg(long)]
        title: Option<String>,

        /// Date of the today line (defaults to today)
        #[arg(long)]
        today: Option<NaiveDate>,
    },

    /// List the work breakdown structure
    Wbs {
        #[command(flatten)]
        project: ProjectArgs,

        #[arg(short, long, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// Show schedule health
    Health {
        #[command(flatten)]
        project: ProjectArgs,

        /// Compute from the tasks instead of reading health.json
        #[arg(long)]
        compute: bool,

        /// Reference date for --compute (defaults to today)
        #[arg(long)]
        today: Option<NaiveDate>,

        #[arg(short, long, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// Planned vs. actual Curve-S against a baseline
    CurveS {
        #[command(flatten)]
        project: ProjectArgs,

        /// Baseline id
        #[arg(short, long)]
        baseline: BaselineId,

        #[arg(short, long, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// Classify an actual-vs-planned percent difference
    Variance {
        #[arg(long, allow_negative_numbers = true)]
        actual: f64,

        #[arg(long, allow_negative_numbers = true)]
        planned: f64,
    },

    /// Classify a Schedule Performance Index
    Spi {
        /// SPI value; omit when no value is planned yet
        value: Option<f64>,
    },

    /// Apply an event to a record's status
    Transition {
        #[arg(value_enum)]
        machine: Machine,

        /// Current status, as stored
        #[arg(long)]
        from: String,

        /// Event name
        #[arg(long)]
        event: String,

        /// Root cause (closing an incident)
        #[arg(long)]
        root_cause: Option<String>,

        /// Corrective actions (closing an incident)
        #[arg(long)]
        corrective: Option<String>,

        /// Preventive actions (closing an incident)
        #[arg(long)]
        preventive: Option<String>,
    },

    /// Manage the stored login session
    Session {
        /// Session file
        #[arg(long, env = "SITEPLAN_SESSION", default_value = "siteplan-session.json")]
        session_file: PathBuf,

        #[command(subcommand)]
        action: SessionAction,
    },
}

#[derive(Subcommand)]
enum SessionAction {
    /// Store a token and user profile
    Login {
        #[arg(long)]
        token: String,

        #[arg(long)]
        email: String,

        #[arg(long, default_value = "")]
        name: String,

        #[arg(long, default_value_t = 0)]
        user_id: i64,

        #[arg(long, default_value_t = 0)]
        company: i64,

        #[arg(long, default_value_t = 0)]
        sprint: i64,
    },
    /// Show the logged-in user
    Show,
    /// Clear the session
    Logout,
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn today_or_now(today: Option<NaiveDate>) -> NaiveDate {
    today.unwrap_or_else(|| chrono::Local::now().date_naive())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::load(cli.config.as_deref())?.with_overrides(cli.locale, cli.granularity);
    let output = run(&config, cli.command)?;
    print!("{output}");
    Ok(())
}

fn data_dir(config: &Config, project: &ProjectArgs) -> Result<PathBuf> {
    config.data_dir(project.dir.clone())
}

fn run(config: &Config, command: Commands) -> Result<String> {
    match command {
        Commands::Timeline {
            file,
            critical,
            today,
            format,
        } => commands::timeline(config, &file, critical.as_deref(), today_or_now(today), format),
        Commands::Gantt {
            project,
            output,
            title,
            today,
        } => commands::gantt(
            config,
            &data_dir(config, &project)?,
            &project.query(),
            &output,
            title,
            today,
        ),
        Commands::Wbs { project, format } => {
            commands::wbs(config, &data_dir(config, &project)?, &project.query(), format)
        }
        Commands::Health {
            project,
            compute,
            today,
            format,
        } => commands::health(
            config,
            &data_dir(config, &project)?,
            &project.query(),
            compute.then(|| today_or_now(today)),
            format,
        ),
        Commands::CurveS {
            project,
            baseline,
            format,
        } => commands::curve_s(
            config,
            &data_dir(config, &project)?,
            &project.query(),
            baseline,
            format,
        ),
        Commands::Variance { actual, planned } => Ok(commands::variance(config, actual, planned)),
        Commands::Spi { value } => Ok(commands::spi(config, value)),
        Commands::Transition {
            machine,
            from,
            event,
            root_cause,
            corrective,
            preventive,
        } => commands::transition(
            machine,
            &from,
            &event,
            ClosureFields {
                root_cause,
                corrective_actions: corrective,
                preventive_actions: preventive,
            },
        ),
        Commands::Session {
            session_file,
            action,
        } => session(&session_file, action),
    }
}

fn session(path: &Path, action: SessionAction) -> Result<String> {
    match action {
        SessionAction::Login {
            token,
            email,
            name,
            user_id,
            company,
            sprint,
        } => commands::session_login(
            path,
            &token,
            UserProfile {
                id: user_id,
                name,
                email,
                company_id: company,
                active_sprint_id: sprint,
                ..Default::default()
            },
        ),
        SessionAction::Show => commands::session_show(path),
        SessionAction::Logout => commands::session_logout(path),
    }
}
