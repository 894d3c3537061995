//! # Version Registry
//!
//! Known MigratorXpress releases and the capabilities each one supports.
//! The flag mapping in [`crate::domain::flags`] was validated against the
//! range [`VALIDATED_MIN`, `VALIDATED_UPPER`).

use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;

use crate::domain::capabilities::{
    FkMode, LoadMode, MigrationDatabase, MigrationDbMode, SourceDatabase, Task, TargetDatabase,
};

static VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\.(\d+)\.(\d+)").expect("static regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl Version {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Extracts the first `X.Y.Z` triple, e.g. from `"migratorxpress 0.6.24"`.
    pub fn parse(text: &str) -> Option<Self> {
        let caps = VERSION_RE.captures(text.trim())?;
        Some(Self {
            major: caps[1].parse().ok()?,
            minor: caps[2].parse().ok()?,
            patch: caps[3].parse().ok()?,
        })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl Serialize for Version {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

pub const VALIDATED_MIN: Version = Version::new(0, 6, 24);
pub const VALIDATED_UPPER: Version = Version::new(0, 7, 0);

pub fn is_validated(version: Version) -> bool {
    version >= VALIDATED_MIN && version < VALIDATED_UPPER
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionCapabilities {
    pub source_databases: Vec<SourceDatabase>,
    pub target_databases: Vec<TargetDatabase>,
    pub migration_db_types: Vec<MigrationDatabase>,
    pub tasks: Vec<Task>,
    pub fk_modes: Vec<FkMode>,
    pub migration_db_modes: Vec<MigrationDbMode>,
    pub load_modes: Vec<LoadMode>,
    pub supports_no_banner: bool,
    pub supports_version_flag: bool,
    pub supports_fasttransfer: bool,
    pub supports_license: bool,
}

/// Registry entries sorted by version, oldest first.
static REGISTRY: LazyLock<Vec<(Version, VersionCapabilities)>> = LazyLock::new(|| {
    vec![(
        Version::new(0, 6, 24),
        VersionCapabilities {
            source_databases: SourceDatabase::ALL.to_vec(),
            target_databases: TargetDatabase::ALL.to_vec(),
            migration_db_types: MigrationDatabase::ALL.to_vec(),
            tasks: Task::ALL.to_vec(),
            fk_modes: FkMode::ALL.to_vec(),
            migration_db_modes: MigrationDbMode::ALL.to_vec(),
            load_modes: LoadMode::ALL.to_vec(),
            supports_no_banner: true,
            supports_version_flag: true,
            supports_fasttransfer: true,
            supports_license: true,
        },
    )]
});

pub fn known_versions() -> impl Iterator<Item = Version> {
    REGISTRY.iter().map(|(version, _)| *version)
}

/// Capabilities for `detected`: the newest entry not newer than it, falling back
/// to the latest known entry when detection failed or the version predates them all.
pub fn resolve_capabilities(detected: Option<Version>) -> &'static VersionCapabilities {
    let latest = &REGISTRY[REGISTRY.len() - 1].1;
    let Some(detected) = detected else {
        return latest;
    };
    REGISTRY
        .iter()
        .rev()
        .find(|(version, _)| *version <= detected)
        .map(|(_, caps)| caps)
        .unwrap_or(latest)
}
