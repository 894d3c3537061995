//! # Configuration
//!
//! Settings are read once at start-up and never change afterwards.
//! Precedence: command line > environment > `config.yaml` > built-in default.
//! Command line and environment are both handled by clap (see `cli.rs`).

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::level_filters::LevelFilter;

pub const DEFAULT_BINARY: &str = "./MigratorXpress";
pub const DEFAULT_LOG_DIR: &str = "./logs";
pub const DEFAULT_LOG_LEVEL: &str = "info";

fn default_timeout() -> u64 {
    3600
}
fn default_handle_ttl() -> u64 {
    3600
}

/// Parses a log level, accepting the Python-style names `WARNING` and
/// `CRITICAL` alongside the `tracing` ones, in any case.
pub fn parse_log_level(raw: &str) -> Result<LevelFilter> {
    let name = raw.trim().to_ascii_lowercase();
    let name = match name.as_str() {
        "warning" => "warn",
        "critical" | "fatal" => "error",
        other => other,
    };
    name.parse::<LevelFilter>()
        .with_context(|| format!("Invalid log level '{raw}' (expected error, warn, info, debug or trace)"))
}

/// Resolved, immutable server configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub binary_path: PathBuf,
    pub timeout: Duration,
    pub log_dir: PathBuf,
    /// A `tracing` level name, lowercase.
    pub log_level: String,
    pub handle_ttl: Duration,
}

/// Layout of the optional `config.yaml`.
#[derive(Debug, Default, Deserialize, Clone, PartialEq)]
pub struct FileConfig {
    #[serde(default)]
    pub binary_path: Option<PathBuf>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
    #[serde(default)]
    pub log_level: Option<String>,
    #[serde(default)]
    pub handle_ttl_secs: Option<u64>,
}

/// Values supplied on the command line or through the environment.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub binary_path: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
    pub log_dir: Option<PathBuf>,
    pub log_level: Option<String>,
    pub handle_ttl_secs: Option<u64>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// `<config_dir>/migratorxpress-mcp/config.yaml`, if such a file exists.
    pub fn default_path() -> Option<PathBuf> {
        let path = dirs::config_dir()?.join("migratorxpress-mcp").join("config.yaml");
        path.is_file().then_some(path)
    }
}

impl AppConfig {
    pub fn resolve(overrides: Overrides, file: FileConfig) -> Result<Self> {
        let log_level = overrides
            .log_level
            .or(file.log_level)
            .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());
        let log_level = parse_log_level(&log_level)?.to_string().to_lowercase();

        Ok(Self {
            binary_path: overrides
                .binary_path
                .or(file.binary_path)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_BINARY)),
            timeout: Duration::from_secs(
                overrides
                    .timeout_secs
                    .or(file.timeout_secs)
                    .unwrap_or_else(default_timeout),
            ),
            log_dir: overrides
                .log_dir
                .or(file.log_dir)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_DIR)),
            log_level,
            handle_ttl: Duration::from_secs(
                overrides
                    .handle_ttl_secs
                    .or(file.handle_ttl_secs)
                    .unwrap_or_else(default_handle_ttl),
            ),
        })
    }

    /// `EnvFilter` directives used when `RUST_LOG` is unset.
    pub fn filter_directives(&self) -> String {
        format!("{},rmcp=warn", self.log_level)
    }
}
