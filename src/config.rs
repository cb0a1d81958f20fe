//! Configuration loader plus strongly typed settings structures.
//!
//! Deserializes the TOML config we ship as an embedded default, resolves the
//! per-user data directory (overridable via `DUPLEX_DIR`), and writes the
//! default file out on first run so users have something to edit.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

// Embedded at compile time; parsed when no user config exists.
const DEFAULT_CONFIG: &str = include_str!("../defaults/config.toml");

/// Top-level configuration object.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Input/interface settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Enable SGR mouse reporting at session start.
    #[serde(default = "default_mouse_enabled")]
    pub mouse_enabled: bool,

    /// Size of the raw stdin read buffer in bytes.
    #[serde(default = "default_read_buffer_size")]
    pub read_buffer_size: usize,
}

/// Log file settings. TUI apps can't log to stdout, so logs go to a file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log file name, created inside the data directory.
    #[serde(default = "default_log_file")]
    pub file: String,

    /// Default tracing filter when RUST_LOG is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_mouse_enabled() -> bool {
    true
}

fn default_read_buffer_size() -> usize {
    1024
}

fn default_log_file() -> String {
    "duplex.log".to_string()
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            mouse_enabled: default_mouse_enabled(),
            read_buffer_size: default_read_buffer_size(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: default_log_file(),
            filter: default_log_filter(),
        }
    }
}

impl Config {
    /// Resolve the data directory: `DUPLEX_DIR` env override, else
    /// `~/.duplex`.
    pub fn base_dir() -> Result<PathBuf> {
        if let Ok(dir) = std::env::var("DUPLEX_DIR") {
            return Ok(PathBuf::from(dir));
        }
        let home = dirs::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".duplex"))
    }

    /// Load configuration from the data directory, seeding the default
    /// config file on first run.
    pub fn load() -> Result<Self> {
        let base = Self::base_dir()?;
        let path = base.join("config.toml");

        if !path.exists() {
            fs::create_dir_all(&base)
                .with_context(|| format!("Failed to create data directory {:?}", base))?;
            fs::write(&path, DEFAULT_CONFIG)
                .with_context(|| format!("Failed to write default config to {:?}", path))?;
            tracing::info!(path = ?path, "wrote default configuration");
        }

        Self::load_from_path(&path)
    }

    /// Load configuration from an explicit file path.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        toml::from_str(&text).with_context(|| format!("Failed to parse config file {:?}", path))
    }

    /// Absolute path of the log file inside the data directory.
    pub fn log_path(&self) -> Result<PathBuf> {
        Ok(Self::base_dir()?.join(&self.logging.file))
    }
}
