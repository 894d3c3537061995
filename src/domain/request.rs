//! # Migration Requests
//!
//! [`MigrationParams`] is the loosely typed shape a client sends.
//! [`MigrationParams::validate`] checks it against the capability registry and
//! produces an immutable, fully typed [`MigrationRequest`].

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domain::capabilities::{
    FkMode, LoadMode, LogLevel, MigrationDbMode, SourceDatabase, Task, TargetDatabase,
};
use crate::domain::error::{MigrateError, MigrateResult};

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct MigrationParams {
    /// Path to authentication/credentials JSON file
    pub auth_file: Option<String>,
    /// Source database type (oracle, postgresql, sqlserver, netezza)
    pub source_db_type: Option<String>,
    /// Source database credential ID in the auth file
    pub source_db_auth_id: Option<String>,
    /// Source database name
    pub source_db_name: Option<String>,
    /// Source schema name
    pub source_schema_name: Option<String>,
    /// Target database type (postgresql, sqlserver)
    pub target_db_type: Option<String>,
    /// Target database credential ID in the auth file
    pub target_db_auth_id: Option<String>,
    /// Target database name
    pub target_db_name: Option<String>,
    /// Target schema name
    pub target_schema_name: Option<String>,
    /// Migration (tracking) database credential ID in the auth file
    pub migration_db_auth_id: Option<String>,
    /// Tasks to run: translate, create, transfer, diff, copy_pk, copy_ak, copy_fk, or 'all' alone
    pub task_list: Option<Vec<String>>,
    /// Resume a previous run by RUN_ID
    pub resume: Option<String>,
    /// Path to the FastTransfer binary directory
    pub fasttransfer_dir_path: Option<String>,
    /// FastTransfer parallel degree
    pub fasttransfer_p: Option<u32>,
    /// FastTransfer large table threshold
    pub ft_large_table_th: Option<u64>,
    /// Number of concurrent jobs
    pub n_jobs: Option<u32>,
    /// Clustered columnstore index threshold
    pub cci_threshold: Option<u64>,
    /// Additional clustered index threshold
    pub aci_threshold: Option<u64>,
    /// Migration database mode: preserve, truncate, drop
    pub migration_db_mode: Option<String>,
    /// Compute number of rows ('true' or 'false')
    pub compute_nbrows: Option<String>,
    /// Drop target tables if they exist ('true' or 'false')
    pub drop_tables_if_exists: Option<String>,
    /// Data load mode: truncate, append
    pub load_mode: Option<String>,
    /// Table include pattern
    pub include_tables: Option<String>,
    /// Table exclude pattern
    pub exclude_tables: Option<String>,
    /// Minimum row count for table inclusion
    pub min_rows: Option<u64>,
    /// Maximum row count for table inclusion
    pub max_rows: Option<u64>,
    /// Oracle: force integer IDs for columns with these prefixes
    pub forced_int_id_prefixes: Option<Vec<String>>,
    /// Oracle: force integer IDs for columns with these suffixes
    pub forced_int_id_suffixes: Option<Vec<String>>,
    /// Profiling sample percentage
    pub profiling_sample_pc: Option<f64>,
    /// Profiling query parameter
    pub p_query: Option<f64>,
    /// Minimum sample percentage for profiling
    pub min_sample_pc_profile: Option<f64>,
    /// Force operation (existing data may be overwritten)
    #[serde(default)]
    pub force: bool,
    /// Use basic diff mode
    #[serde(default)]
    pub basic_diff: bool,
    /// Disable XID tracking
    #[serde(default)]
    pub without_xid: bool,
    /// Foreign key constraint mode: trusted, untrusted, disabled
    pub fk_mode: Option<String>,
    /// MigratorXpress log level: DEBUG, INFO, WARNING, ERROR, CRITICAL
    pub log_level: Option<String>,
    /// Directory for MigratorXpress's own log files
    pub log_dir: Option<String>,
    /// Suppress the startup banner
    #[serde(default)]
    pub no_banner: bool,
    /// Disable progress bar display
    #[serde(default)]
    pub no_progress: bool,
    /// Suppress FastTransfer output
    #[serde(default)]
    pub quiet_ft: bool,
    /// License key (sensitive, masked in every display)
    pub license: Option<String>,
    /// Path to license file
    pub license_file: Option<String>,
}

/// A validated migration request. Only constructible through [`MigrationParams::validate`].
#[derive(Debug, Clone, PartialEq)]
pub struct MigrationRequest {
    pub auth_file: String,
    pub source_db_type: Option<SourceDatabase>,
    pub source_db_auth_id: String,
    pub source_db_name: String,
    pub source_schema_name: Option<String>,
    pub target_db_type: Option<TargetDatabase>,
    pub target_db_auth_id: String,
    pub target_db_name: String,
    pub target_schema_name: Option<String>,
    pub migration_db_auth_id: String,
    pub tasks: Vec<Task>,
    pub resume: Option<String>,
    pub fasttransfer_dir_path: Option<String>,
    pub fasttransfer_p: Option<u32>,
    pub ft_large_table_th: Option<u64>,
    pub n_jobs: Option<u32>,
    pub cci_threshold: Option<u64>,
    pub aci_threshold: Option<u64>,
    pub migration_db_mode: Option<MigrationDbMode>,
    pub compute_nbrows: Option<bool>,
    pub drop_tables_if_exists: Option<bool>,
    pub load_mode: Option<LoadMode>,
    pub include_tables: Option<String>,
    pub exclude_tables: Option<String>,
    pub min_rows: Option<u64>,
    pub max_rows: Option<u64>,
    pub forced_int_id_prefixes: Vec<String>,
    pub forced_int_id_suffixes: Vec<String>,
    pub profiling_sample_pc: Option<f64>,
    pub p_query: Option<f64>,
    pub min_sample_pc_profile: Option<f64>,
    pub force: bool,
    pub basic_diff: bool,
    pub without_xid: bool,
    pub fk_mode: Option<FkMode>,
    pub log_level: Option<LogLevel>,
    pub log_dir: Option<String>,
    pub no_banner: bool,
    pub no_progress: bool,
    pub quiet_ft: bool,
    pub license: Option<String>,
    pub license_file: Option<String>,
}

impl MigrationRequest {
    /// True when `tasks` is exactly the `all` shorthand.
    pub fn runs_all(&self) -> bool {
        self.tasks == [Task::All]
    }

    /// Tasks in the order the binary will perform them, with `all` expanded.
    pub fn effective_tasks(&self) -> Vec<Task> {
        if self.runs_all() {
            Task::CANONICAL.to_vec()
        } else {
            self.tasks.clone()
        }
    }
}

fn required(value: Option<String>, field: &'static str) -> MigrateResult<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(MigrateError::MissingParameter(field)),
    }
}

/// Blank strings are treated as absent.
fn optional(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn mode<T>(
    value: Option<String>,
    field: &'static str,
    parse: fn(&str) -> Option<T>,
    supported: fn() -> String,
) -> MigrateResult<Option<T>> {
    match optional(value) {
        None => Ok(None),
        Some(raw) => parse(&raw).map(Some).ok_or_else(|| MigrateError::InvalidParameter {
            field,
            reason: format!("'{raw}' is not one of: {}", supported()),
        }),
    }
}

fn string_bool(value: Option<String>, field: &'static str) -> MigrateResult<Option<bool>> {
    match value.as_deref() {
        None => Ok(None),
        Some("true") => Ok(Some(true)),
        Some("false") => Ok(Some(false)),
        Some(other) => Err(MigrateError::InvalidParameter {
            field,
            reason: format!("must be 'true' or 'false', got '{other}'"),
        }),
    }
}

fn tasks(value: Option<Vec<String>>) -> MigrateResult<Vec<Task>> {
    let mut parsed = Vec::new();
    for raw in value.unwrap_or_default() {
        let task = Task::parse(&raw).ok_or_else(|| MigrateError::InvalidParameter {
            field: "task_list",
            reason: format!("invalid task '{raw}', valid tasks: {}", Task::supported_list()),
        })?;
        if !parsed.contains(&task) {
            parsed.push(task);
        }
    }
    if parsed.contains(&Task::All) && parsed.len() > 1 {
        return Err(MigrateError::InvalidParameter {
            field: "task_list",
            reason: "task 'all' cannot be combined with other tasks".to_string(),
        });
    }
    Ok(parsed)
}

impl MigrationParams {
    pub fn validate(self) -> MigrateResult<MigrationRequest> {
        // Required fields first so the caller learns about the most basic gap.
        let source_db_auth_id = required(self.source_db_auth_id, "source_db_auth_id")?;
        let target_db_auth_id = required(self.target_db_auth_id, "target_db_auth_id")?;
        let migration_db_auth_id = required(self.migration_db_auth_id, "migration_db_auth_id")?;
        let source_db_name = required(self.source_db_name, "source_db_name")?;
        let target_db_name = required(self.target_db_name, "target_db_name")?;
        let auth_file = required(self.auth_file, "auth_file")?;

        let source_db_type = match optional(self.source_db_type) {
            None => None,
            Some(raw) => Some(SourceDatabase::parse(&raw).ok_or_else(|| {
                MigrateError::UnsupportedDatabase {
                    role: "source",
                    kind: raw,
                    supported: SourceDatabase::supported_list(),
                }
            })?),
        };
        let target_db_type = match optional(self.target_db_type) {
            None => None,
            Some(raw) => Some(TargetDatabase::parse(&raw).ok_or_else(|| {
                MigrateError::UnsupportedDatabase {
                    role: "target",
                    kind: raw,
                    supported: TargetDatabase::supported_list(),
                }
            })?),
        };

        let tasks = tasks(self.task_list)?;
        let compute_nbrows = string_bool(self.compute_nbrows, "compute_nbrows")?;
        let drop_tables_if_exists = string_bool(self.drop_tables_if_exists, "drop_tables_if_exists")?;

        let license = optional(self.license);
        let license_file = optional(self.license_file);
        if license.is_some() && license_file.is_some() {
            return Err(MigrateError::InvalidParameter {
                field: "license",
                reason: "license and license_file are mutually exclusive".to_string(),
            });
        }

        if let (Some(min), Some(max)) = (self.min_rows, self.max_rows)
            && min > max
        {
            return Err(MigrateError::InvalidParameter {
                field: "min_rows",
                reason: format!("min_rows ({min}) exceeds max_rows ({max})"),
            });
        }

        Ok(MigrationRequest {
            auth_file,
            source_db_type,
            source_db_auth_id,
            source_db_name,
            source_schema_name: optional(self.source_schema_name),
            target_db_type,
            target_db_auth_id,
            target_db_name,
            target_schema_name: optional(self.target_schema_name),
            migration_db_auth_id,
            tasks,
            resume: optional(self.resume),
            fasttransfer_dir_path: optional(self.fasttransfer_dir_path),
            fasttransfer_p: self.fasttransfer_p,
            ft_large_table_th: self.ft_large_table_th,
            n_jobs: self.n_jobs,
            cci_threshold: self.cci_threshold,
            aci_threshold: self.aci_threshold,
            migration_db_mode: mode(
                self.migration_db_mode,
                "migration_db_mode",
                MigrationDbMode::parse,
                MigrationDbMode::supported_list,
            )?,
            compute_nbrows,
            drop_tables_if_exists,
            load_mode: mode(self.load_mode, "load_mode", LoadMode::parse, LoadMode::supported_list)?,
            include_tables: optional(self.include_tables),
            exclude_tables: optional(self.exclude_tables),
            min_rows: self.min_rows,
            max_rows: self.max_rows,
            forced_int_id_prefixes: self.forced_int_id_prefixes.unwrap_or_default(),
            forced_int_id_suffixes: self.forced_int_id_suffixes.unwrap_or_default(),
            profiling_sample_pc: self.profiling_sample_pc,
            p_query: self.p_query,
            min_sample_pc_profile: self.min_sample_pc_profile,
            force: self.force,
            basic_diff: self.basic_diff,
            without_xid: self.without_xid,
            fk_mode: mode(self.fk_mode, "fk_mode", FkMode::parse, FkMode::supported_list)?,
            log_level: mode(self.log_level, "log_level", LogLevel::parse, LogLevel::supported_list)?,
            log_dir: optional(self.log_dir),
            no_banner: self.no_banner,
            no_progress: self.no_progress,
            quiet_ft: self.quiet_ft,
            license,
            license_file,
        })
    }
}

#[cfg(test)]
pub(crate) fn minimal_params() -> MigrationParams {
    MigrationParams {
        auth_file: Some("auth.json".into()),
        source_db_auth_id: Some("source_db".into()),
        source_db_name: Some("mydb".into()),
        target_db_auth_id: Some("target_db".into()),
        target_db_name: Some("targetdb".into()),
        migration_db_auth_id: Some("migration_db".into()),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_params_validate() {
        let request = minimal_params().validate().unwrap();
        assert_eq!(request.source_db_name, "mydb");
        assert!(request.tasks.is_empty());
        assert!(request.license.is_none());
    }

    #[test]
    fn test_missing_parameter_names_field() {
        let cases: [(&str, fn(&mut MigrationParams)); 6] = [
            ("source_db_auth_id", |p| p.source_db_auth_id = None),
            ("target_db_auth_id", |p| p.target_db_auth_id = None),
            ("migration_db_auth_id", |p| p.migration_db_auth_id = Some("  ".into())),
            ("source_db_name", |p| p.source_db_name = None),
            ("target_db_name", |p| p.target_db_name = Some(String::new())),
            ("auth_file", |p| p.auth_file = None),
        ];
        for (field, clear) in cases {
            let mut params = minimal_params();
            clear(&mut params);
            match params.validate() {
                Err(MigrateError::MissingParameter(name)) => assert_eq!(name, field),
                other => panic!("expected MissingParameter({field}), got {other:?}"),
            }
        }
    }

    #[test]
    fn test_unsupported_database() {
        let mut params = minimal_params();
        params.target_db_type = Some("oracle".into());
        assert!(matches!(
            params.validate(),
            Err(MigrateError::UnsupportedDatabase { role: "target", .. })
        ));

        let mut params = minimal_params();
        params.source_db_type = Some("mysql".into());
        assert!(matches!(
            params.validate(),
            Err(MigrateError::UnsupportedDatabase { role: "source", .. })
        ));
    }

    #[test]
    fn test_task_list_rules() {
        let mut params = minimal_params();
        params.task_list = Some(vec!["translate".into(), "bogus".into()]);
        assert!(matches!(
            params.validate(),
            Err(MigrateError::InvalidParameter { field: "task_list", .. })
        ));

        let mut params = minimal_params();
        params.task_list = Some(vec!["all".into(), "diff".into()]);
        assert!(params.validate().is_err());

        let mut params = minimal_params();
        params.task_list = Some(vec!["all".into()]);
        let request = params.validate().unwrap();
        assert!(request.runs_all());
        assert_eq!(request.effective_tasks(), Task::CANONICAL.to_vec());
    }

    #[test]
    fn test_string_booleans_and_license_exclusivity() {
        let mut params = minimal_params();
        params.compute_nbrows = Some("yes".into());
        assert!(matches!(
            params.validate(),
            Err(MigrateError::InvalidParameter { field: "compute_nbrows", .. })
        ));

        let mut params = minimal_params();
        params.drop_tables_if_exists = Some("false".into());
        assert_eq!(params.validate().unwrap().drop_tables_if_exists, Some(false));

        let mut params = minimal_params();
        params.license = Some("KEY".into());
        params.license_file = Some("/etc/license".into());
        assert!(matches!(
            params.validate(),
            Err(MigrateError::InvalidParameter { field: "license", .. })
        ));
    }

    #[test]
    fn test_modes_are_parsed() {
        let mut params = minimal_params();
        params.fk_mode = Some("disabled".into());
        params.load_mode = Some("append".into());
        params.migration_db_mode = Some("drop".into());
        let request = params.validate().unwrap();
        assert_eq!(request.fk_mode, Some(FkMode::Disabled));
        assert_eq!(request.load_mode, Some(LoadMode::Append));
        assert_eq!(request.migration_db_mode, Some(MigrationDbMode::Drop));

        let mut params = minimal_params();
        params.load_mode = Some("merge".into());
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_params_deserialize_from_tool_arguments() {
        let params: MigrationParams = serde_json::from_value(serde_json::json!({
            "auth_file": "auth.json",
            "source_db_auth_id": "src",
            "source_db_name": "db",
            "target_db_auth_id": "tgt",
            "target_db_name": "tdb",
            "migration_db_auth_id": "mig",
            "task_list": ["translate", "create"],
            "force": true
        }))
        .unwrap();
        let request = params.validate().unwrap();
        assert_eq!(request.tasks, vec![Task::Translate, Task::Create]);
        assert!(request.force);
    }
}
