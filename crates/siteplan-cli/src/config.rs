//! `siteplan.toml` configuration.
//!
//! ```toml
//! [display]
//! locale = "pt-BR"
//! granularity = "week"
//!
//! [gantt]
//! chart_width = 800
//! row_height = 36
//! label_width = 220
//! highlight_critical = true
//!
//! [data]
//! dir = "exports"
//! ```
//!
//! Every key is optional. Command-line flags and `SITEPLAN_*` environment
//! variables take precedence over the file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use siteplan_core::{Granularity, Locale};
use siteplan_render::SvgRenderer;

/// File looked up in the working directory when `--config` is not given
pub const CONFIG_FILE: &str = "siteplan.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub display: DisplayConfig,
    pub gantt: GanttConfig,
    pub data: DataConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub locale: Locale,
    pub granularity: Granularity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GanttConfig {
    pub chart_width: u32,
    pub row_height: u32,
    pub label_width: u32,
    pub highlight_critical: bool,
}

impl Default for GanttConfig {
    fn default() -> Self {
        Self {
            chart_width: 800,
            row_height: 36,
            label_width: 220,
            highlight_critical: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Root of the exported project directories
    pub dir: Option<PathBuf>,
}

impl Config {
    /// Load `explicit`, else `./siteplan.toml` when present, else defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let local = Path::new(CONFIG_FILE);
                if local.exists() {
                    Self::from_file(local)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Invalid config {}", path.display()))
    }

    /// Apply command-line overrides
    pub fn with_overrides(mut self, locale: Option<Locale>, granularity: Option<Granularity>) -> Self {
        if let Some(locale) = locale {
            self.display.locale = locale;
        }
        if let Some(granularity) = granularity {
            self.display.granularity = granularity;
        }
        self
    }

    /// Data directory: the explicit argument, else `[data] dir`
    pub fn data_dir(&self, explicit: Option<PathBuf>) -> Result<PathBuf> {
        explicit
            .or_else(|| self.data.dir.clone())
            .context("No data directory: pass DIR or set [data] dir in siteplan.toml")
    }

    pub fn svg_renderer(&self) -> SvgRenderer {
        let renderer = SvgRenderer::new()
            .chart_width(self.gantt.chart_width)
            .row_height(self.gantt.row_height)
            .label_width(self.gantt.label_width)
            .granularity(self.display.granularity)
            .locale(self.display.locale);
        if self.gantt.highlight_critical {
            renderer
        } else {
            renderer.no_critical_highlight()
        }
    }
}
