//! # Execution Logs
//!
//! One file per execution under the log directory. Everything written here
//! has already been passed through [`BuiltCommand::redact`].

use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;

use crate::domain::capabilities::Task;
use crate::domain::types::{BuiltCommand, ExecutionStatus};

const RULE: &str = "================================================================================";

/// `migratorxpress_<timestamp>_<tasks>.log`, `default` when no task was given.
pub fn log_file_name(started: DateTime<Local>, command: &BuiltCommand) -> String {
    let tasks = if command.tasks().is_empty() {
        "default".to_string()
    } else if command.tasks().len() == Task::CANONICAL.len() {
        "all".to_string()
    } else {
        command
            .tasks()
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join("-")
    };
    format!(
        "migratorxpress_{}_{}.log",
        started.format("%Y%m%d_%H%M%S_%3f"),
        tasks
    )
}

pub struct LogRecord<'a> {
    pub started: DateTime<Local>,
    pub command: &'a BuiltCommand,
    pub status: ExecutionStatus,
    pub exit_code: Option<i32>,
    pub elapsed: Duration,
    pub stdout: &'a str,
    pub stderr: &'a str,
}

fn render(record: &LogRecord<'_>) -> String {
    let exit_code = record
        .exit_code
        .map_or_else(|| "none".to_string(), |c| c.to_string());
    format!(
        "MigratorXpress Execution Log\n{RULE}\n\n\
         Timestamp: {}\n\
         Duration: {:.2} seconds\n\
         Status: {}\n\
         Return Code: {}\n\n\
         Command:\n{}\n\n\
         {RULE}\nSTDOUT:\n{}\n\n\
         {RULE}\nSTDERR:\n{}\n",
        record.started.to_rfc3339(),
        record.elapsed.as_secs_f64(),
        record.status.as_str(),
        exit_code,
        record.command.display_line(),
        record.stdout,
        record.stderr,
    )
}

const MAX_NAME_ATTEMPTS: usize = 100;

/// `name` with `_<n>` inserted before the extension.
fn numbered_name(name: &str, n: usize) -> String {
    match name.strip_suffix(".log") {
        Some(stem) => format!("{stem}_{n}.log"),
        None => format!("{name}_{n}"),
    }
}

/// Writes the log and returns its path. An existing file is never
/// overwritten; a clashing name gets a numeric suffix.
pub async fn write_log(log_dir: &Path, record: &LogRecord<'_>) -> std::io::Result<PathBuf> {
    tokio::fs::create_dir_all(log_dir).await?;
    let name = log_file_name(record.started, record.command);

    for attempt in 0..MAX_NAME_ATTEMPTS {
        let path = if attempt == 0 {
            log_dir.join(&name)
        } else {
            log_dir.join(numbered_name(&name, attempt))
        };
        let mut file = match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e),
        };
        file.write_all(render(record).as_bytes()).await?;
        file.flush().await?;
        return Ok(path);
    }

    Err(std::io::Error::new(
        std::io::ErrorKind::AlreadyExists,
        format!("no free log file name for {name}"),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn command(tasks: Vec<Task>) -> BuiltCommand {
        BuiltCommand::new(
            PathBuf::from("MigratorXpress"),
            vec!["--license".into(), "TOPSECRET".into()],
            tasks,
        )
    }

    #[test]
    fn test_file_name_is_deterministic() {
        let started = Local.with_ymd_and_hms(2026, 3, 1, 14, 5, 9).unwrap();
        assert_eq!(
            log_file_name(started, &command(vec![Task::Translate, Task::Create])),
            "migratorxpress_20260301_140509_000_translate-create.log"
        );
        assert_eq!(
            log_file_name(started, &command(vec![])),
            "migratorxpress_20260301_140509_000_default.log"
        );
        assert_eq!(
            log_file_name(started, &command(Task::CANONICAL.to_vec())),
            "migratorxpress_20260301_140509_000_all.log"
        );
    }

    #[tokio::test]
    async fn test_log_never_contains_license() {
        let dir = tempfile::tempdir().unwrap();
        let cmd = command(vec![Task::Diff]);
        let path = write_log(
            &dir.path().join("nested"),
            &LogRecord {
                started: Local::now(),
                command: &cmd,
                status: ExecutionStatus::Completed,
                exit_code: Some(0),
                elapsed: Duration::from_millis(1500),
                stdout: "ok",
                stderr: "",
            },
        )
        .await
        .unwrap();
        let content = std::fs::read_to_string(path).unwrap();
        assert!(!content.contains("TOPSECRET"));
        assert!(content.contains("--license ******"));
        assert!(content.contains("Duration: 1.50 seconds"));
        assert!(content.contains("Return Code: 0"));
    }

    #[tokio::test]
    async fn test_same_millisecond_runs_keep_both_logs() {
        let dir = tempfile::tempdir().unwrap();
        let cmd = command(vec![Task::Transfer]);
        let started = Local::now();
        let record = |stdout: &'static str| LogRecord {
            started,
            command: &cmd,
            status: ExecutionStatus::Completed,
            exit_code: Some(0),
            elapsed: Duration::from_millis(10),
            stdout,
            stderr: "",
        };

        let first = write_log(dir.path(), &record("first run")).await.unwrap();
        let second = write_log(dir.path(), &record("second run")).await.unwrap();
        assert_ne!(first, second);
        assert!(second.to_string_lossy().ends_with("_transfer_1.log"));
        assert!(std::fs::read_to_string(first).unwrap().contains("first run"));
        assert!(std::fs::read_to_string(second).unwrap().contains("second run"));
    }
}
