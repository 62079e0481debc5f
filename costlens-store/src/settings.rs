//! User preferences.
//!
//! Settings live in `settings.json` under the config directory. Every field
//! has a default, so a partial or missing file is fine; command line flags
//! override whatever is loaded.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use costlens_core::{CostMetric, Granularity};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::persistence::{default_data_dir, default_settings_path, load_json, save_json};

// ============================================================================
// Settings Types
// ============================================================================

/// User preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory holding exported cost tables. `None` uses the platform
    /// data directory.
    pub data_dir: Option<PathBuf>,

    /// Cost Explorer metric the tables were exported with.
    pub cost_metric: CostMetric,

    /// Granularity of exported tables.
    pub granularity: Granularity,

    /// Summary rows below this amount are hidden.
    pub report_threshold: Decimal,

    /// Default number of rows per period in reports.
    pub top_n: usize,

    /// Log level when neither `--verbose` nor `--quiet` is given.
    pub log_level: LogLevel,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: None,
            cost_metric: CostMetric::default(),
            granularity: Granularity::default(),
            report_threshold: Decimal::new(1, 3),
            top_n: 10,
            log_level: LogLevel::default(),
        }
    }
}

impl Settings {
    /// Returns the configured data directory or the platform default.
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(default_data_dir)
    }
}

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    /// Error level logging.
    Error,
    /// Warning level logging.
    #[default]
    Warn,
    /// Info level logging.
    Info,
    /// Debug level logging.
    Debug,
    /// Trace level logging.
    Trace,
}

impl LogLevel {
    /// Returns the `tracing` directive spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            other => Err(format!("Unknown log level: {other}")),
        }
    }
}

// ============================================================================
// Settings Store
// ============================================================================

/// Settings bound to the file they were loaded from.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    settings: Arc<RwLock<Settings>>,
    path: PathBuf,
    load_error: Option<String>,
}

impl SettingsStore {
    /// Creates a store holding defaults.
    pub fn new(path: PathBuf) -> Self {
        Self {
            settings: Arc::new(RwLock::new(Settings::default())),
            path,
            load_error: None,
        }
    }

    /// Loads settings from the default path.
    ///
    /// # Errors
    ///
    /// See [`SettingsStore::load`].
    pub async fn load_default() -> Result<Self, StoreError> {
        Self::load(default_settings_path()).await
    }

    /// Loads settings from a path.
    ///
    /// A missing file yields defaults; so does an unreadable one, whose
    /// error is kept in [`SettingsStore::load_error`].
    ///
    /// # Errors
    ///
    /// Returns an error only if checking for the file fails.
    pub async fn load(path: PathBuf) -> Result<Self, StoreError> {
        let mut load_error = None;
        let settings = if tokio::fs::try_exists(&path).await? {
            info!(path = %path.display(), "Loading settings");
            load_json(&path).await.unwrap_or_else(|e| {
                warn!(error = %e, "Failed to load settings, using defaults");
                load_error = Some(e.to_string());
                Settings::default()
            })
        } else {
            debug!(path = %path.display(), "Settings file not found, using defaults");
            Settings::default()
        };

        Ok(Self {
            settings: Arc::new(RwLock::new(settings)),
            path,
            load_error,
        })
    }

    /// Returns why the settings file was ignored, if it was.
    ///
    /// Callers that set up logging after loading use this to report it.
    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    /// Returns the settings file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Gets a copy of the current settings.
    pub async fn get(&self) -> Settings {
        self.settings.read().await.clone()
    }

    /// Updates settings in memory.
    pub async fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut Settings),
    {
        let mut settings = self.settings.write().await;
        f(&mut settings);
    }

    /// Saves settings to disk.
    ///
    /// # Errors
    ///
    /// Returns error if settings cannot be written to disk.
    pub async fn save(&self) -> Result<(), StoreError> {
        let settings = self.settings.read().await;
        save_json(&self.path, &*settings).await?;
        info!(path = %self.path.display(), "Settings saved");
        Ok(())
    }
}
