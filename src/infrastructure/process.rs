//! # Subprocess Capture
//!
//! Spawns a program, waits for it under a wall-clock deadline and captures
//! both output streams. On timeout the child is killed and whatever it had
//! written so far is kept.

use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::task::JoinHandle;

/// How long to wait for the output pipes to close after the child exits.
const DRAIN_GRACE: Duration = Duration::from_secs(2);

#[derive(Debug, Clone)]
pub struct Captured {
    /// `None` when the child timed out or was terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub timed_out: bool,
    pub elapsed: Duration,
}

async fn read_all<R: AsyncRead + Unpin>(mut reader: R) -> Vec<u8> {
    let mut buf = Vec::new();
    if let Err(e) = reader.read_to_end(&mut buf).await {
        tracing::debug!("Output stream closed with error: {}", e);
    }
    buf
}

async fn collect(handle: Option<JoinHandle<Vec<u8>>>) -> String {
    let Some(handle) = handle else {
        return String::new();
    };
    match tokio::time::timeout(DRAIN_GRACE, handle).await {
        Ok(Ok(bytes)) => String::from_utf8_lossy(&bytes).into_owned(),
        Ok(Err(e)) => {
            tracing::warn!("Output reader task failed: {}", e);
            String::new()
        }
        Err(_) => {
            tracing::warn!("Output stream still open {}s after exit, dropping it", DRAIN_GRACE.as_secs());
            String::new()
        }
    }
}

/// Runs `program` with `args`. Only a spawn failure is an error; a timeout or
/// non-zero exit is reported through [`Captured`].
pub async fn run_captured(
    program: &Path,
    args: &[String],
    cwd: Option<&Path>,
    timeout: Duration,
) -> std::io::Result<Captured> {
    let start = Instant::now();

    let mut cmd = tokio::process::Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }

    let mut child = cmd.spawn()?;
    let stdout = child.stdout.take().map(|s| tokio::spawn(read_all(s)));
    let stderr = child.stderr.take().map(|s| tokio::spawn(read_all(s)));

    let (exit_code, timed_out) = match tokio::time::timeout(timeout, child.wait()).await {
        Ok(status) => (status?.code(), false),
        Err(_) => {
            if let Err(e) = child.kill().await {
                tracing::warn!("Failed to kill timed out process: {}", e);
            }
            (None, true)
        }
    };

    Ok(Captured {
        exit_code,
        stdout: collect(stdout).await,
        stderr: collect(stderr).await,
        timed_out,
        elapsed: start.elapsed(),
    })
}
