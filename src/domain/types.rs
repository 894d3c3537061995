//! # Domain Types
//!
//! The command produced by the builder and the outcome produced by the runner.

use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::domain::capabilities::Task;
use crate::domain::error::MigrateError;
use crate::domain::flags::{REDACTED, is_sensitive_flag};

/// A fully assembled MigratorXpress invocation.
///
/// `args` keeps every real value for execution; anything human-visible goes
/// through [`BuiltCommand::display`] or [`BuiltCommand::redact`].
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltCommand {
    program: PathBuf,
    args: Vec<String>,
    secrets: Vec<String>,
    tasks: Vec<Task>,
    display: String,
}

impl BuiltCommand {
    pub fn new(program: PathBuf, args: Vec<String>, tasks: Vec<Task>) -> Self {
        let mut secrets = Vec::new();
        let mut masked = args.clone();
        for i in 0..args.len().saturating_sub(1) {
            if is_sensitive_flag(&args[i]) {
                if !args[i + 1].is_empty() {
                    secrets.push(args[i + 1].clone());
                }
                masked[i + 1] = REDACTED.to_string();
            }
        }
        let display = format_display(&program.to_string_lossy(), &masked);
        Self {
            program,
            args,
            secrets,
            tasks,
            display,
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Unmasked arguments. Only the runner should pass these anywhere.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Multi-line masked rendering, suitable for showing to a person.
    pub fn display(&self) -> &str {
        &self.display
    }

    /// Masked command on a single line, for logs.
    pub fn display_line(&self) -> String {
        self.display.replace(" \\\n  ", " ")
    }

    /// Replaces every secret value occurring in `text` with the redaction marker.
    pub fn redact(&self, text: &str) -> String {
        let mut out = text.to_string();
        for secret in &self.secrets {
            out = out.replace(secret.as_str(), REDACTED);
        }
        out
    }
}

/// Groups `flag value` pairs on one line each, quoting values that contain spaces.
fn format_display(program: &str, args: &[String]) -> String {
    let quote = |v: &str| {
        if v.contains(' ') {
            format!("\"{v}\"")
        } else {
            v.to_string()
        }
    };

    let mut parts = vec![quote(program)];
    let mut i = 0;
    while i < args.len() {
        let token = &args[i];
        if token.starts_with('-') {
            let mut line = token.clone();
            let mut j = i + 1;
            while j < args.len() && !args[j].starts_with('-') {
                line.push(' ');
                line.push_str(&quote(&args[j]));
                j += 1;
            }
            parts.push(line);
            i = j;
        } else {
            parts.push(quote(token));
            i += 1;
        }
    }
    parts.join(" \\\n  ")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExecutionStatus {
    Completed,
    Failed,
    TimedOut,
}

impl ExecutionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "Completed",
            Self::Failed => "Failed",
            Self::TimedOut => "TimedOut",
        }
    }
}

/// Terminal outcome of one execution. Output is already redacted.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionResult {
    pub status: ExecutionStatus,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub elapsed: Duration,
    pub log_path: Option<PathBuf>,
    pub command: String,
}

impl ExecutionResult {
    pub fn is_success(&self) -> bool {
        self.status == ExecutionStatus::Completed
    }

    /// The error this outcome represents, if it was not a success.
    pub fn failure(&self, timeout: Duration) -> Option<MigrateError> {
        match self.status {
            ExecutionStatus::Completed => None,
            ExecutionStatus::TimedOut => Some(MigrateError::Timeout(timeout)),
            ExecutionStatus::Failed => Some(MigrateError::ExecutionFailure(self.exit_code.unwrap_or(-1))),
        }
    }
}
