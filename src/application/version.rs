//! # Version Detection
//!
//! Asks the binary for its version once per process and maps the answer onto
//! the version registry. Failure to detect is not an error; the latest known
//! capabilities are assumed and callers get a warning instead.

use regex::Regex;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::LazyLock;
use std::time::Duration;
use tokio::sync::OnceCell;

use crate::domain::request::MigrationRequest;
use crate::domain::version::{
    VALIDATED_MIN, VALIDATED_UPPER, Version, VersionCapabilities, is_validated, known_versions,
    resolve_capabilities,
};
use crate::infrastructure::process::run_captured;

const DETECT_TIMEOUT: Duration = Duration::from_secs(10);

static BANNER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)migratorxpress\s+(\d+\.\d+\.\d+)").expect("static regex")
});

/// Finds `MigratorXpress X.Y.Z` in the combined `--version` output.
pub fn parse_version_output(output: &str) -> Option<Version> {
    let caps = BANNER_RE.captures(output)?;
    Version::parse(&caps[1])
}

#[derive(Debug, Clone, Serialize)]
pub struct VersionReport {
    pub version: Option<Version>,
    pub detected: bool,
    pub binary_path: PathBuf,
    pub validated_range: String,
    pub known_versions: Vec<Version>,
    pub warning: Option<String>,
    pub capabilities: &'static VersionCapabilities,
}

pub struct VersionDetector {
    binary_path: PathBuf,
    detected: OnceCell<Option<Version>>,
}

impl VersionDetector {
    pub fn new(binary_path: impl Into<PathBuf>) -> Self {
        Self {
            binary_path: binary_path.into(),
            detected: OnceCell::new(),
        }
    }

    /// A detector whose detection outcome is already known.
    pub fn preset(binary_path: impl Into<PathBuf>, version: Option<Version>) -> Self {
        Self {
            binary_path: binary_path.into(),
            detected: OnceCell::new_with(Some(version)),
        }
    }

    async fn run_version(&self) -> Option<Version> {
        let args = ["--version".to_string(), "--no_banner".to_string()];
        match run_captured(&self.binary_path, &args, None, DETECT_TIMEOUT).await {
            Ok(out) if out.timed_out => {
                tracing::warn!("Version detection timed out");
                None
            }
            Ok(out) => {
                let combined = format!("{}{}", out.stdout, out.stderr);
                let version = parse_version_output(&combined);
                match version {
                    Some(v) => tracing::info!("Detected MigratorXpress version: {}", v),
                    None => tracing::warn!(
                        "Could not parse version from output: {:?}",
                        combined.trim()
                    ),
                }
                version
            }
            Err(e) => {
                tracing::warn!(
                    "Version detection failed for {}: {}",
                    self.binary_path.display(),
                    e
                );
                None
            }
        }
    }

    /// Detected version, probing the binary on first use only.
    /// Called once at start-up; tool calls read [`VersionDetector::cached`].
    pub async fn detect(&self) -> Option<Version> {
        *self.detected.get_or_init(|| self.run_version()).await
    }

    /// The detection outcome if it has run, never spawning anything.
    pub fn cached(&self) -> Option<Version> {
        self.detected.get().copied().flatten()
    }

    pub fn report(&self) -> VersionReport {
        let version = self.cached();
        VersionReport {
            version,
            detected: version.is_some(),
            binary_path: self.binary_path.clone(),
            validated_range: format!(">= {VALIDATED_MIN}, < {VALIDATED_UPPER}"),
            known_versions: known_versions().collect(),
            warning: range_warning(version),
            capabilities: resolve_capabilities(version),
        }
    }

    pub fn compatibility_warnings(&self, request: &MigrationRequest) -> Vec<String> {
        let version = self.cached();
        let mut warnings: Vec<String> = range_warning(version).into_iter().collect();
        warnings.extend(request_warnings(request, resolve_capabilities(version)));
        warnings
    }
}

fn range_warning(version: Option<Version>) -> Option<String> {
    match version {
        None => Some(format!(
            "MigratorXpress version could not be detected; flags were validated against {VALIDATED_MIN} up to {VALIDATED_UPPER} (exclusive)"
        )),
        Some(v) if !is_validated(v) => Some(format!(
            "MigratorXpress {v} is outside the validated range {VALIDATED_MIN} up to {VALIDATED_UPPER} (exclusive); flags may have changed"
        )),
        Some(_) => None,
    }
}

/// Options in `request` that the resolved capabilities do not cover.
pub fn request_warnings(request: &MigrationRequest, caps: &VersionCapabilities) -> Vec<String> {
    let mut warnings = Vec::new();

    if let Some(kind) = request.source_db_type
        && !caps.source_databases.contains(&kind)
    {
        warnings.push(format!("Source database '{kind}' is not supported by this version"));
    }
    if let Some(kind) = request.target_db_type
        && !caps.target_databases.contains(&kind)
    {
        warnings.push(format!("Target database '{kind}' is not supported by this version"));
    }
    for task in &request.tasks {
        if !caps.tasks.contains(task) {
            warnings.push(format!("Task '{task}' is not supported by this version"));
        }
    }
    if let Some(mode) = request.fk_mode
        && !caps.fk_modes.contains(&mode)
    {
        warnings.push(format!("FK mode '{mode}' is not supported by this version"));
    }
    if let Some(mode) = request.load_mode
        && !caps.load_modes.contains(&mode)
    {
        warnings.push(format!("Load mode '{mode}' is not supported by this version"));
    }
    if let Some(mode) = request.migration_db_mode
        && !caps.migration_db_modes.contains(&mode)
    {
        warnings.push(format!("Migration DB mode '{mode}' is not supported by this version"));
    }

    let uses_fasttransfer = request.fasttransfer_dir_path.is_some()
        || request.fasttransfer_p.is_some()
        || request.ft_large_table_th.is_some()
        || request.quiet_ft;
    if uses_fasttransfer && !caps.supports_fasttransfer {
        warnings.push("FastTransfer options are not supported by this version".to_string());
    }
    if (request.license.is_some() || request.license_file.is_some()) && !caps.supports_license {
        warnings.push("License options are not supported by this version".to_string());
    }
    if request.no_banner && !caps.supports_no_banner {
        warnings.push("--no_banner is not supported by this version".to_string());
    }

    warnings
}
