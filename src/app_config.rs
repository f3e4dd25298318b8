use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::PathBuf;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// chess.com account whose games are exported
    pub username: String,

    /// Archive source config
    #[serde(default)]
    pub archive: ArchiveConfig,

    /// Export config
    #[serde(default)]
    pub export: ExportConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Archive source configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ArchiveConfig {
    /// Base URL of the public API
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum number of concurrent archive downloads
    #[serde(default = "default_concurrent_downloads")]
    pub concurrent_downloads: usize,

    /// Directory where monthly downloads are staged; a temporary
    /// directory is used when unset
    #[serde(default)]
    pub download_dir: Option<PathBuf>,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
            concurrent_downloads: default_concurrent_downloads(),
            download_dir: None,
        }
    }
}

/// Export configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ExportConfig {
    /// Output path template; `{username}` is substituted
    #[serde(default = "default_output_template")]
    pub output_template: String,

    /// Whether the per-side move columns are written
    #[serde(default = "default_true")]
    pub include_moves: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_template: default_output_template(),
            include_moves: true,
        }
    }
}

impl ExportConfig {
    // @returns: Output path with the username substituted
    pub fn output_path(&self, username: &str) -> PathBuf {
        PathBuf::from(self.output_template.replace("{username}", username))
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn default_endpoint() -> String {
    "https://api.chess.com/pub".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_concurrent_downloads() -> usize {
    4
}

fn default_output_template() -> String {
    "data/{username}_games.csv".to_string()
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.username.trim().is_empty() {
            return Err(anyhow!("A chess.com username is required"));
        }

        if self.archive.endpoint.trim().is_empty() {
            return Err(anyhow!("Archive endpoint must not be empty"));
        }
        if !self.archive.endpoint.starts_with("http://")
            && !self.archive.endpoint.starts_with("https://")
        {
            return Err(anyhow!(
                "Archive endpoint must be an http(s) URL: {}",
                self.archive.endpoint
            ));
        }

        if self.archive.timeout_secs == 0 {
            return Err(anyhow!("Archive timeout must be at least one second"));
        }
        if self.archive.concurrent_downloads == 0 {
            return Err(anyhow!("Concurrent downloads must be at least 1"));
        }

        if self.export.output_template.trim().is_empty() {
            return Err(anyhow!("Export output template must not be empty"));
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            username: String::new(),
            archive: ArchiveConfig::default(),
            export: ExportConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
