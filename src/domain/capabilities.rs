//! # Capability Registry
//!
//! Static lookup tables for everything MigratorXpress understands:
//! database kinds, migration tasks and the various mode switches.
//! Pure data, no behaviour beyond lookups.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Declares a registry enum with its wire value and a human description.
macro_rules! registry_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $value:literal, $desc:literal;)+ }) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
        )]
        pub enum $name {
            $(
                #[serde(rename = $value)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $value),+
                }
            }

            pub fn description(self) -> &'static str {
                match self {
                    $($name::$variant => $desc),+
                }
            }

            /// Case-insensitive lookup of a wire value.
            pub fn parse(value: &str) -> Option<Self> {
                let value = value.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|kind| kind.as_str().eq_ignore_ascii_case(value))
            }

            pub fn supported_list() -> String {
                Self::ALL
                    .iter()
                    .map(|kind| kind.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

registry_enum! {
    /// Databases MigratorXpress can read from.
    SourceDatabase {
        Oracle => "oracle", "Oracle";
        Postgresql => "postgresql", "PostgreSQL";
        Sqlserver => "sqlserver", "SQL Server";
        Netezza => "netezza", "Netezza";
    }
}

registry_enum! {
    /// Databases MigratorXpress can write to.
    TargetDatabase {
        Postgresql => "postgresql", "PostgreSQL";
        Sqlserver => "sqlserver", "SQL Server";
    }
}

registry_enum! {
    /// Databases that can host the migration tracking tables.
    MigrationDatabase {
        Sqlserver => "sqlserver", "SQL Server";
    }
}

registry_enum! {
    Task {
        Translate => "translate", "Translate source schema to target schema DDL";
        Create => "create", "Create target tables from translated DDL";
        Transfer => "transfer", "Transfer data from source to target";
        Diff => "diff", "Compare source and target row counts";
        CopyPk => "copy_pk", "Copy primary key constraints to target";
        CopyAk => "copy_ak", "Copy alternate key (unique) constraints to target";
        CopyFk => "copy_fk", "Copy foreign key constraints to target";
        All => "all", "Run all tasks in sequence (translate, create, transfer, diff, copy_pk, copy_ak, copy_fk)";
    }
}

impl Task {
    /// The full migration in execution order. `all` stands for exactly this.
    pub const CANONICAL: [Task; 7] = [
        Task::Translate,
        Task::Create,
        Task::Transfer,
        Task::Diff,
        Task::CopyPk,
        Task::CopyAk,
        Task::CopyFk,
    ];

    pub fn is_constraint_copy(self) -> bool {
        matches!(self, Task::CopyPk | Task::CopyAk | Task::CopyFk)
    }
}

registry_enum! {
    MigrationDbMode {
        Preserve => "preserve", "Keep existing migration database data";
        Truncate => "truncate", "Clear migration database before run";
        Drop => "drop", "Drop and recreate migration database";
    }
}

registry_enum! {
    LoadMode {
        Truncate => "truncate", "Truncate target tables before loading";
        Append => "append", "Append data to existing target tables";
    }
}

registry_enum! {
    FkMode {
        Trusted => "trusted", "Create foreign keys as trusted constraints";
        Untrusted => "untrusted", "Create foreign keys as untrusted constraints";
        Disabled => "disabled", "Create foreign keys in disabled state";
    }
}

registry_enum! {
    /// Verbosity passed through to the binary's own `--log_level`.
    LogLevel {
        Debug => "DEBUG", "Debug output";
        Info => "INFO", "Informational output";
        Warning => "WARNING", "Warnings only";
        Error => "ERROR", "Errors only";
        Critical => "CRITICAL", "Critical errors only";
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapabilityEntry {
    pub name: &'static str,
    pub description: &'static str,
}

/// Everything the registry knows, grouped by category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    pub source_databases: Vec<CapabilityEntry>,
    pub target_databases: Vec<CapabilityEntry>,
    pub migration_databases: Vec<CapabilityEntry>,
    pub tasks: Vec<CapabilityEntry>,
    pub migration_db_modes: Vec<CapabilityEntry>,
    pub load_modes: Vec<CapabilityEntry>,
    pub fk_modes: Vec<CapabilityEntry>,
}

macro_rules! entries {
    ($kind:ty) => {
        <$kind>::ALL
            .iter()
            .map(|k| CapabilityEntry {
                name: k.as_str(),
                description: k.description(),
            })
            .collect()
    };
}

pub fn list_capabilities() -> Capabilities {
    Capabilities {
        source_databases: entries!(SourceDatabase),
        target_databases: entries!(TargetDatabase),
        migration_databases: entries!(MigrationDatabase),
        tasks: entries!(Task),
        migration_db_modes: entries!(MigrationDbMode),
        load_modes: entries!(LoadMode),
        fk_modes: entries!(FkMode),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_capabilities_is_pure() {
        assert_eq!(list_capabilities(), list_capabilities());
    }

    #[test]
    fn test_registry_contents() {
        let caps = list_capabilities();
        let names = |entries: &[CapabilityEntry]| {
            entries.iter().map(|e| e.name).collect::<Vec<_>>()
        };
        assert_eq!(
            names(&caps.source_databases),
            vec!["oracle", "postgresql", "sqlserver", "netezza"]
        );
        assert_eq!(names(&caps.target_databases), vec!["postgresql", "sqlserver"]);
        assert_eq!(names(&caps.migration_databases), vec!["sqlserver"]);
        assert_eq!(caps.tasks.len(), 8);
        assert_eq!(names(&caps.fk_modes), vec!["trusted", "untrusted", "disabled"]);
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(SourceDatabase::parse("Oracle"), Some(SourceDatabase::Oracle));
        assert_eq!(TargetDatabase::parse(" SQLSERVER "), Some(TargetDatabase::Sqlserver));
        assert_eq!(TargetDatabase::parse("oracle"), None);
        assert_eq!(Task::parse("copy_fk"), Some(Task::CopyFk));
        assert_eq!(LogLevel::parse("warning"), Some(LogLevel::Warning));
    }

    #[test]
    fn test_canonical_order_excludes_all() {
        assert!(!Task::CANONICAL.contains(&Task::All));
        assert_eq!(Task::CANONICAL.iter().filter(|t| t.is_constraint_copy()).count(), 3);
    }

    #[test]
    fn test_serde_uses_wire_values() {
        let json = serde_json::to_string(&Task::CopyPk).unwrap();
        assert_eq!(json, "\"copy_pk\"");
        let mode: FkMode = serde_json::from_str("\"untrusted\"").unwrap();
        assert_eq!(mode, FkMode::Untrusted);
    }
}
