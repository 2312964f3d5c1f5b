//! Configuration management for the snapshot tool.
//!
//! Loads configuration from a TOML file; every key has a default.

use crate::setup::claude_dir;
use crate::utils::{Result, SnapshotError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub snapshot: SnapshotConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotConfig {
    /// Live configuration directory (default: `$HOME/.claude`)
    #[serde(default)]
    pub config_dir: Option<PathBuf>,

    /// Snapshots kept by `cleanup` when no count is given
    #[serde(default = "default_keep_count")]
    pub keep_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default values
fn default_keep_count() -> usize {
    5
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            config_dir: None,
            keep_count: default_keep_count(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// The live directory to snapshot: an explicit override, then the
    /// configured directory, then `$HOME/.claude`.
    pub fn resolve_config_dir(&self, override_dir: Option<&Path>) -> Result<PathBuf> {
        override_dir
            .map(Path::to_path_buf)
            .or_else(|| self.snapshot.config_dir.clone())
            .or_else(claude_dir)
            .ok_or_else(|| SnapshotError::Config("cannot determine home directory".to_string()))
    }
}
