//! # Command Runner
//!
//! Executes a [`BuiltCommand`] under the configured deadline, persists a
//! redacted log and returns a terminal [`ExecutionResult`].

use chrono::Local;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::domain::error::{MigrateError, MigrateResult};
use crate::domain::types::{BuiltCommand, ExecutionResult, ExecutionStatus};
use crate::infrastructure::execution_log::{LogRecord, write_log};
use crate::infrastructure::process::run_captured;

/// Anchors a relative program path such as `./MigratorXpress` to the server's
/// working directory, since the child runs in the log directory. Bare names
/// are left for `PATH` lookup.
fn resolve_program(program: &Path) -> PathBuf {
    if program.is_relative()
        && program.components().count() > 1
        && let Ok(absolute) = std::path::absolute(program)
    {
        return absolute;
    }
    program.to_path_buf()
}

#[derive(Debug, Clone)]
pub struct CommandRunner {
    timeout: Duration,
    log_dir: PathBuf,
}

impl CommandRunner {
    pub fn new(timeout: Duration, log_dir: PathBuf) -> Self {
        Self { timeout, log_dir }
    }

    /// Consumes `command`. Fails only when the process could not be started;
    /// timeouts and non-zero exits come back as an [`ExecutionResult`].
    pub async fn execute(&self, command: BuiltCommand) -> MigrateResult<ExecutionResult> {
        let started = Local::now();
        tracing::info!("Executing MigratorXpress command: {}", command.display_line());

        // The log directory doubles as the working directory.
        let cwd = match tokio::fs::create_dir_all(&self.log_dir).await {
            Ok(()) => Some(self.log_dir.as_path()),
            Err(e) => {
                tracing::warn!(
                    "Cannot create log directory {}: {}. Running in the current directory.",
                    self.log_dir.display(),
                    e
                );
                None
            }
        };

        let program = resolve_program(command.program());
        let captured = run_captured(&program, command.args(), cwd, self.timeout)
            .await
            .map_err(|source| MigrateError::LaunchFailed {
                program: command.program().display().to_string(),
                source,
            })?;

        let status = if captured.timed_out {
            ExecutionStatus::TimedOut
        } else if captured.exit_code == Some(0) {
            ExecutionStatus::Completed
        } else {
            ExecutionStatus::Failed
        };

        match status {
            ExecutionStatus::TimedOut => tracing::error!(
                "MigratorXpress execution timed out after {}s",
                self.timeout.as_secs()
            ),
            _ => tracing::info!(
                "MigratorXpress finished in {:.2}s with status {} (code {:?})",
                captured.elapsed.as_secs_f64(),
                status.as_str(),
                captured.exit_code
            ),
        }

        let stdout = command.redact(&captured.stdout);
        let stderr = command.redact(&captured.stderr);

        let record = LogRecord {
            started,
            command: &command,
            status,
            exit_code: captured.exit_code,
            elapsed: captured.elapsed,
            stdout: &stdout,
            stderr: &stderr,
        };
        let log_path = match write_log(&self.log_dir, &record).await {
            Ok(path) => {
                tracing::info!("Execution log saved to: {}", path.display());
                Some(path)
            }
            Err(e) => {
                tracing::warn!("Failed to save execution log: {}", e);
                None
            }
        };

        Ok(ExecutionResult {
            status,
            exit_code: captured.exit_code,
            stdout,
            stderr,
            elapsed: captured.elapsed,
            log_path,
            command: command.display_line(),
        })
    }
}
