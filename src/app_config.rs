use anyhow::{anyhow, Context, Result};
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::sync::{SyncOptions, DEFAULT_CHECKPOINT_INTERVAL};
use crate::versions::{VersionScheme, DEFAULT_DEVELOPMENT_PREFIX};

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct Config {
    /// Storage settings
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Import settings
    #[serde(default)]
    pub import: ImportConfig,

    /// Version matching settings
    #[serde(default)]
    pub versions: VersionsConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Storage settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct DatabaseConfig {
    /// SQLite file; the per-user data directory when absent
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Import settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ImportConfig {
    /// Items committed per transaction
    #[serde(default = "default_checkpoint_interval")]
    pub checkpoint_interval: usize,

    /// Notify reviewers when an import leaves rows to review
    #[serde(default = "default_true")]
    pub notify_reviewers: bool,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            checkpoint_interval: default_checkpoint_interval(),
            notify_reviewers: default_true(),
        }
    }
}

/// Version matching settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct VersionsConfig {
    /// Marker of versions tracking an unreleased branch
    #[serde(default = "default_development_prefix")]
    pub development_prefix: String,
}

impl Default for VersionsConfig {
    fn default() -> Self {
        Self {
            development_prefix: default_development_prefix(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(self) -> LevelFilter {
        match self {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

fn default_checkpoint_interval() -> usize {
    DEFAULT_CHECKPOINT_INTERVAL
}

fn default_true() -> bool {
    true
}

fn default_development_prefix() -> String {
    DEFAULT_DEVELOPMENT_PREFIX.to_string()
}

impl Config {
    /// Load a configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;

        let reader = BufReader::new(file);
        let config: Config = serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Write the configuration as pretty-printed JSON
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let config_json =
            serde_json::to_string_pretty(self).context("Failed to serialize config to JSON")?;

        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write config to file: {}", path.display()))?;
        Ok(())
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.import.checkpoint_interval == 0 {
            return Err(anyhow!("import.checkpoint_interval must be at least 1"));
        }

        if self.versions.development_prefix.trim().is_empty() {
            return Err(anyhow!("versions.development_prefix must not be empty"));
        }

        Ok(())
    }

    /// Synchronizer options derived from the import settings
    pub fn sync_options(&self) -> SyncOptions {
        SyncOptions {
            checkpoint_interval: self.import.checkpoint_interval,
            notify_reviewers: self.import.notify_reviewers,
        }
    }

    pub fn version_scheme(&self) -> VersionScheme {
        VersionScheme::new(self.versions.development_prefix.clone())
    }
}
