//! Settings for the terminal client.
//!
//! Layered lowest to highest: built-in defaults, `settings.json` in the
//! platform data directory, `COASTER_*` environment variables, command-line flags.

use crate::cli::Cli;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use coaster_core::{DaySchedule, GeneratorConfig, DEFAULT_ROLLOVER_HOUR};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const SETTINGS_FILE: &str = "settings.json";

/// Color theme selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeName {
    #[default]
    Dark,
    Light,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub catalog_path: Option<PathBuf>,
    pub rollover_hour: u32,
    pub launch_date: NaiveDate,
    pub generator: GeneratorConfig,
    pub theme: ThemeName,
}

impl Default for Settings {
    fn default() -> Self {
        let schedule = DaySchedule::default();
        Self {
            data_dir: default_data_dir(),
            catalog_path: None,
            rollover_hour: DEFAULT_ROLLOVER_HOUR,
            launch_date: schedule.launch_date,
            generator: GeneratorConfig::default(),
            theme: ThemeName::default(),
        }
    }
}

/// `<data_local_dir>/coaster-connections`, or the working directory when the
/// platform has no data directory
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("coaster-connections")
}

impl Settings {
    /// Resolve settings from every layer.
    pub fn load(cli: &Cli) -> Result<Self> {
        let mut settings = Self::from_file(&default_data_dir().join(SETTINGS_FILE))?;
        settings.apply_env(|key| std::env::var(key).ok())?;
        settings.apply_cli(cli);
        Ok(settings)
    }

    /// Read a settings file; a missing file yields the defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings: {}", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse settings: {}", path.display()))
    }

    /// Apply `COASTER_*` overrides read through `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(dir) = lookup("COASTER_DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(path) = lookup("COASTER_CATALOG") {
            self.catalog_path = Some(PathBuf::from(path));
        }
        if let Some(hour) = lookup("COASTER_ROLLOVER_HOUR") {
            self.rollover_hour = hour
                .trim()
                .parse()
                .with_context(|| format!("COASTER_ROLLOVER_HOUR is not an hour: {hour}"))?;
        }
        if let Some(date) = lookup("COASTER_LAUNCH_DATE") {
            self.launch_date = date
                .trim()
                .parse()
                .with_context(|| format!("COASTER_LAUNCH_DATE is not a date: {date}"))?;
        }
        if let Some(theme) = lookup("COASTER_THEME") {
            self.theme = match theme.trim().to_ascii_lowercase().as_str() {
                "light" => ThemeName::Light,
                _ => ThemeName::Dark,
            };
        }
        Ok(())
    }

    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(dir) = &cli.data_dir {
            self.data_dir = dir.clone();
        }
        if let Some(path) = &cli.catalog {
            self.catalog_path = Some(path.clone());
        }
        if let Some(hour) = cli.rollover_hour {
            self.rollover_hour = hour;
        }
    }

    pub fn schedule(&self) -> DaySchedule {
        DaySchedule::new(self.rollover_hour, self.launch_date)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }
}
