//! Command-line arguments. Every option can also come from the environment.

use clap::Parser;
use std::path::PathBuf;

use crate::domain::config::Overrides;

#[derive(Debug, Parser)]
#[command(name = "migratorxpress-mcp", version, about = "MCP server for MigratorXpress database migrations")]
pub struct Cli {
    /// Path to the MigratorXpress binary
    #[arg(long = "binary", env = "MIGRATORXPRESS_PATH")]
    pub binary: Option<PathBuf>,

    /// Execution timeout in seconds
    #[arg(long, env = "MIGRATORXPRESS_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Directory for execution logs and the server log
    #[arg(long = "log-dir", env = "MIGRATORXPRESS_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long = "log-level", env = "LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Seconds a previewed command stays executable
    #[arg(long = "handle-ttl", env = "MIGRATORXPRESS_HANDLE_TTL")]
    pub handle_ttl: Option<u64>,

    /// YAML config file
    #[arg(long, env = "MIGRATORXPRESS_CONFIG")]
    pub config: Option<PathBuf>,
}

impl Cli {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            binary_path: self.binary.clone(),
            timeout_secs: self.timeout,
            log_dir: self.log_dir.clone(),
            log_level: self.log_level.clone(),
            handle_ttl_secs: self.handle_ttl,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_map_to_overrides() {
        let cli = Cli::try_parse_from([
            "migratorxpress-mcp",
            "--binary",
            "/opt/MigratorXpress",
            "--timeout",
            "120",
            "--handle-ttl",
            "30",
        ])
        .unwrap();
        let overrides = cli.overrides();
        assert_eq!(overrides.binary_path, Some(PathBuf::from("/opt/MigratorXpress")));
        assert_eq!(overrides.timeout_secs, Some(120));
        assert_eq!(overrides.handle_ttl_secs, Some(30));
    }

    #[test]
    fn test_rejects_non_numeric_timeout() {
        assert!(Cli::try_parse_from(["migratorxpress-mcp", "--timeout", "soon"]).is_err());
    }
}
