//! Configuration for the bodega daemon.
//!
//! Loaded from a TOML file (`bodega.toml` by convention) with every field
//! optional; CLI flags override individual values after loading. A missing
//! config file is not an error - the defaults run a local daemon on port
//! 8000 with a `bodega.db` database next to the process.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub reaper: ReaperConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// HTTP listener settings.
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Backing store settings.
#[derive(Debug, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
    /// Run against a non-persistent in-memory database.
    #[serde(default)]
    pub in_memory: bool,
}

/// Background sweep settings.
#[derive(Debug, Deserialize)]
pub struct ReaperConfig {
    #[serde(default = "default_reap_interval_secs")]
    pub interval_secs: u64,
}

/// Prometheus exporter settings. Disabled unless `enabled = true`.
#[derive(Debug, Deserialize)]
pub struct MetricsConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_metrics_port")]
    pub port: u16,
}

fn default_bind() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_db_path() -> PathBuf {
    PathBuf::from("bodega.db")
}

fn default_reap_interval_secs() -> u64 {
    3600
}

fn default_metrics_port() -> u16 {
    9464
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            in_memory: false,
        }
    }
}

impl Default for ReaperConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_reap_interval_secs(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            port: default_metrics_port(),
        }
    }
}

impl Config {
    /// Load configuration from the specified path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or contains invalid TOML.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Invalid TOML in {}", path.display()))
    }

    /// Load from an explicit path, or fall back to defaults when none is
    /// given.
    ///
    /// # Errors
    ///
    /// Returns an error only when an explicitly named file is unreadable or
    /// invalid.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => Ok(Self::default()),
        }
    }
}
