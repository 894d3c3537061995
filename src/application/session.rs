//! # Migration Session
//!
//! The two-call protocol: `preview` builds a command and parks it under a
//! handle, `execute` runs that exact command, but only with an explicit
//! confirmation. A handle moves Built -> Executing -> finished and is never
//! reusable.

use std::sync::Arc;

use crate::application::builder::CommandBuilder;
use crate::application::handles::{DEFAULT_CAPACITY, HandleStore};
use crate::application::version::VersionDetector;
use crate::domain::config::AppConfig;
use crate::domain::error::{MigrateError, MigrateResult};
use crate::domain::request::{MigrationParams, MigrationRequest};
use crate::domain::types::ExecutionResult;
use crate::infrastructure::runner::CommandRunner;

#[derive(Debug, Clone)]
pub struct Preview {
    pub handle: String,
    /// Masked, multi-line command text.
    pub display: String,
    pub request: MigrationRequest,
    pub warnings: Vec<String>,
}

pub struct MigrationSession {
    config: Arc<AppConfig>,
    builder: CommandBuilder,
    detector: VersionDetector,
    handles: HandleStore,
    runner: CommandRunner,
}

impl MigrationSession {
    pub fn new(config: Arc<AppConfig>) -> Self {
        let detector = VersionDetector::new(config.binary_path.clone());
        Self::with_detector(config, detector)
    }

    pub fn with_detector(config: Arc<AppConfig>, detector: VersionDetector) -> Self {
        Self {
            builder: CommandBuilder::new(config.binary_path.clone()),
            handles: HandleStore::new(config.handle_ttl, DEFAULT_CAPACITY),
            runner: CommandRunner::new(config.timeout, config.log_dir.clone()),
            detector,
            config,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn builder(&self) -> &CommandBuilder {
        &self.builder
    }

    pub fn detector(&self) -> &VersionDetector {
        &self.detector
    }

    /// Validates `params` and builds the command. Never runs anything, the
    /// version check included.
    pub async fn preview(&self, params: MigrationParams) -> MigrateResult<Preview> {
        let request = params.validate()?;
        let warnings = self.detector.compatibility_warnings(&request);
        let command = self.builder.build(&request);
        let display = command.display().to_string();
        let handle = self.handles.insert(command).await;

        tracing::info!(
            "Built command {} ({} pending)",
            handle,
            self.handles.len().await
        );

        Ok(Preview {
            handle,
            display,
            request,
            warnings,
        })
    }

    /// Runs the command parked under `handle`.
    ///
    /// The confirmation check comes first, so a refused call leaves the
    /// handle untouched.
    pub async fn execute(&self, handle: &str, confirmation: bool) -> MigrateResult<ExecutionResult> {
        if !confirmation {
            tracing::warn!("Execution of {} refused: confirmation not given", handle);
            return Err(MigrateError::ConfirmationRequired);
        }

        let command = self
            .handles
            .take(handle)
            .await
            .ok_or_else(|| MigrateError::UnknownHandle(handle.to_string()))?;

        tracing::info!("Executing command {}", handle);
        self.runner.execute(command).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::flags::REDACTED;
    use crate::domain::request::minimal_params;
    use crate::domain::types::ExecutionStatus;
    use crate::domain::version::Version;
    use std::path::{Path, PathBuf};
    use std::time::Duration;

    fn config(binary: &str, log_dir: PathBuf, timeout: Duration) -> Arc<AppConfig> {
        Arc::new(AppConfig {
            binary_path: PathBuf::from(binary),
            timeout,
            log_dir,
            log_level: "info".into(),
            handle_ttl: Duration::from_secs(60),
        })
    }

    /// Writes an executable shell script standing in for MigratorXpress.
    #[cfg(unix)]
    fn fake_binary(dir: &Path, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join("MigratorXpress");
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn session(binary: &str, log_dir: PathBuf, timeout: Duration) -> MigrationSession {
        let config = config(binary, log_dir, timeout);
        let detector = VersionDetector::preset(binary, Some(Version::new(0, 6, 24)));
        MigrationSession::with_detector(config, detector)
    }

    #[tokio::test]
    async fn test_preview_masks_and_registers() {
        let dir = tempfile::tempdir().unwrap();
        let session = session("MigratorXpress", dir.path().to_path_buf(), Duration::from_secs(5));
        let mut params = minimal_params();
        params.license = Some("MY-LICENSE".into());
        let preview = session.preview(params).await.unwrap();
        assert!(!preview.display.contains("MY-LICENSE"));
        assert!(preview.display.contains(REDACTED));
        assert!(preview.warnings.is_empty());
        assert!(!preview.handle.is_empty());
        // Nothing ran: no log was written.
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_confirmation_is_required() {
        let dir = tempfile::tempdir().unwrap();
        let session = session("MigratorXpress", dir.path().to_path_buf(), Duration::from_secs(5));
        let preview = session.preview(minimal_params()).await.unwrap();

        assert!(matches!(
            session.execute(&preview.handle, false).await,
            Err(MigrateError::ConfirmationRequired)
        ));
        assert!(matches!(
            session.execute("bogus", false).await,
            Err(MigrateError::ConfirmationRequired)
        ));
        // Refusal did not consume the handle.
        assert_eq!(session.handles.len().await, 1);
    }

    #[tokio::test]
    async fn test_unknown_handle() {
        let dir = tempfile::tempdir().unwrap();
        let session = session("MigratorXpress", dir.path().to_path_buf(), Duration::from_secs(5));
        assert!(matches!(
            session.execute("not-a-handle", true).await,
            Err(MigrateError::UnknownHandle(_))
        ));
    }

    #[tokio::test]
    async fn test_validation_errors_surface() {
        let dir = tempfile::tempdir().unwrap();
        let session = session("MigratorXpress", dir.path().to_path_buf(), Duration::from_secs(5));
        let mut params = minimal_params();
        params.auth_file = None;
        assert!(matches!(
            session.preview(params).await,
            Err(MigrateError::MissingParameter("auth_file"))
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_handle_runs_once() {
        let dir = tempfile::tempdir().unwrap();
        // `true` ignores its arguments and exits 0.
        let session = session("true", dir.path().join("logs"), Duration::from_secs(5));
        let preview = session.preview(minimal_params()).await.unwrap();

        let result = session.execute(&preview.handle, true).await.unwrap();
        assert_eq!(result.status, ExecutionStatus::Completed);
        assert!(result.log_path.unwrap().starts_with(dir.path().join("logs")));

        assert!(matches!(
            session.execute(&preview.handle, true).await,
            Err(MigrateError::UnknownHandle(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_binary_never_runs() {
        let dir = tempfile::tempdir().unwrap();
        let session = session(
            "/nonexistent/MigratorXpress",
            dir.path().to_path_buf(),
            Duration::from_secs(5),
        );
        let preview = session.preview(minimal_params()).await.unwrap();
        assert!(matches!(
            session.execute(&preview.handle, true).await,
            Err(MigrateError::LaunchFailed { .. })
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_preview_does_not_run_the_binary() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("ran");
        let binary = fake_binary(dir.path(), &format!("touch '{}'", marker.display()));
        let session = MigrationSession::new(config(
            binary.to_str().unwrap(),
            dir.path().join("logs"),
            Duration::from_secs(5),
        ));

        let preview = session.preview(minimal_params()).await.unwrap();
        assert!(!marker.exists());
        assert!(preview.warnings.iter().any(|w| w.contains("could not be detected")));
        assert!(!session.detector().report().detected);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_relative_auth_file_resolves_from_server_directory() {
        let dir = tempfile::tempdir().unwrap();
        // Relative to this process's working directory, not to the log directory.
        let auth = tempfile::Builder::new()
            .suffix(".json")
            .tempfile_in(".")
            .unwrap();
        std::fs::write(auth.path(), "{}").unwrap();
        let relative = auth.path().file_name().unwrap().to_string_lossy().into_owned();

        // $1 is --auth_file, $2 its value.
        let binary = fake_binary(
            dir.path(),
            r#"[ -f "$2" ] || { echo "auth $2 missing in $(pwd)" >&2; exit 7; }"#,
        );
        let session = session(
            binary.to_str().unwrap(),
            dir.path().join("logs"),
            Duration::from_secs(5),
        );
        let mut params = minimal_params();
        params.auth_file = Some(relative);

        let preview = session.preview(params).await.unwrap();
        let result = session.execute(&preview.handle, true).await.unwrap();
        assert_eq!(result.status, ExecutionStatus::Completed, "stderr: {}", result.stderr);
    }
}
