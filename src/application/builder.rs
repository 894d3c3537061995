//! # Command Builder
//!
//! Turns a validated [`MigrationRequest`] into a [`BuiltCommand`] by walking
//! the flag table. Never touches the binary. Path-valued flags are anchored to
//! the server's working directory, since the runner starts the child in the
//! log directory.

use std::path::{Path, PathBuf};

use crate::domain::flags::{FLAG_TABLE, FlagKind, FlagSpec};
use crate::domain::request::MigrationRequest;
use crate::domain::types::BuiltCommand;

/// The value a request carries for one table row.
#[derive(Debug, PartialEq)]
enum FlagValue {
    Absent,
    One(String),
    Many(Vec<String>),
    On,
}

fn one<T: ToString>(value: &Option<T>) -> FlagValue {
    value.as_ref().map_or(FlagValue::Absent, |v| FlagValue::One(v.to_string()))
}

fn many(values: Vec<String>) -> FlagValue {
    if values.is_empty() {
        FlagValue::Absent
    } else {
        FlagValue::Many(values)
    }
}

fn switch(enabled: bool) -> FlagValue {
    if enabled { FlagValue::On } else { FlagValue::Absent }
}

fn string_bool(value: Option<bool>) -> FlagValue {
    value.map_or(FlagValue::Absent, |v| FlagValue::One(v.to_string()))
}

fn value_for(request: &MigrationRequest, spec: &FlagSpec) -> FlagValue {
    let r = request;
    match spec.param {
        "auth_file" => FlagValue::One(r.auth_file.clone()),
        "source_db_type" => one(&r.source_db_type),
        "source_db_auth_id" => FlagValue::One(r.source_db_auth_id.clone()),
        "source_db_name" => FlagValue::One(r.source_db_name.clone()),
        "source_schema_name" => one(&r.source_schema_name),
        "target_db_type" => one(&r.target_db_type),
        "target_db_auth_id" => FlagValue::One(r.target_db_auth_id.clone()),
        "target_db_name" => FlagValue::One(r.target_db_name.clone()),
        "target_schema_name" => one(&r.target_schema_name),
        "migration_db_auth_id" => FlagValue::One(r.migration_db_auth_id.clone()),
        "task_list" => many(r.tasks.iter().map(|t| t.as_str().to_string()).collect()),
        "resume" => one(&r.resume),
        "fasttransfer_dir_path" => one(&r.fasttransfer_dir_path),
        "fasttransfer_p" => one(&r.fasttransfer_p),
        "ft_large_table_th" => one(&r.ft_large_table_th),
        "n_jobs" => one(&r.n_jobs),
        "cci_threshold" => one(&r.cci_threshold),
        "aci_threshold" => one(&r.aci_threshold),
        "migration_db_mode" => one(&r.migration_db_mode),
        "compute_nbrows" => string_bool(r.compute_nbrows),
        "drop_tables_if_exists" => string_bool(r.drop_tables_if_exists),
        "load_mode" => one(&r.load_mode),
        "include_tables" => one(&r.include_tables),
        "exclude_tables" => one(&r.exclude_tables),
        "min_rows" => one(&r.min_rows),
        "max_rows" => one(&r.max_rows),
        "forced_int_id_prefixes" => many(r.forced_int_id_prefixes.clone()),
        "forced_int_id_suffixes" => many(r.forced_int_id_suffixes.clone()),
        "profiling_sample_pc" => one(&r.profiling_sample_pc),
        "p_query" => one(&r.p_query),
        "min_sample_pc_profile" => one(&r.min_sample_pc_profile),
        "force" => switch(r.force),
        "basic_diff" => switch(r.basic_diff),
        "without_xid" => switch(r.without_xid),
        "fk_mode" => one(&r.fk_mode),
        "log_level" => one(&r.log_level),
        "log_dir" => one(&r.log_dir),
        "no_banner" => switch(r.no_banner),
        "no_progress" => switch(r.no_progress),
        "quiet_ft" => switch(r.quiet_ft),
        "license" => one(&r.license),
        "license_file" => one(&r.license_file),
        other => {
            if cfg!(debug_assertions) {
                unreachable!("no request field mapped for flag parameter '{other}'");
            }
            tracing::warn!("No request field mapped for flag parameter '{}'", other);
            FlagValue::Absent
        }
    }
}

/// Makes a relative path absolute against the current directory.
fn anchor(value: String) -> String {
    let path = Path::new(&value);
    if path.is_absolute() {
        return value;
    }
    match std::path::absolute(path) {
        Ok(absolute) => absolute.to_string_lossy().into_owned(),
        Err(e) => {
            tracing::warn!("Cannot resolve path '{}': {}", value, e);
            value
        }
    }
}

/// Builds MigratorXpress invocations for one binary path.
#[derive(Debug, Clone)]
pub struct CommandBuilder {
    binary_path: PathBuf,
}

impl CommandBuilder {
    pub fn new(binary_path: impl Into<PathBuf>) -> Self {
        Self {
            binary_path: binary_path.into(),
        }
    }

    /// Ordered argument list for `request` as given, excluding the program itself.
    pub fn arguments(&self, request: &MigrationRequest) -> Vec<String> {
        self.assemble(request, false)
    }

    fn assemble(&self, request: &MigrationRequest, anchor_paths: bool) -> Vec<String> {
        let mut args = Vec::new();
        for spec in FLAG_TABLE {
            match (spec.kind, value_for(request, spec)) {
                (_, FlagValue::Absent) => {}
                (FlagKind::Switch, FlagValue::On) => args.push(spec.flag.to_string()),
                (FlagKind::Value, FlagValue::One(v)) => {
                    args.push(spec.flag.to_string());
                    args.push(if anchor_paths && spec.path { anchor(v) } else { v });
                }
                (FlagKind::List, FlagValue::Many(values)) => {
                    args.push(spec.flag.to_string());
                    args.extend(values);
                }
                (kind, value) => {
                    tracing::warn!(
                        "Flag {} of kind {:?} got mismatched value {:?}",
                        spec.flag,
                        kind,
                        value
                    );
                }
            }
        }
        args
    }

    /// The command that will actually run, with path values made absolute.
    pub fn build(&self, request: &MigrationRequest) -> BuiltCommand {
        BuiltCommand::new(
            self.binary_path.clone(),
            self.assemble(request, true),
            request.effective_tasks(),
        )
    }

    /// Same as [`CommandBuilder::build`] but keeps paths as written, for
    /// illustrative commands.
    pub fn example(&self, request: &MigrationRequest) -> BuiltCommand {
        BuiltCommand::new(
            self.binary_path.clone(),
            self.arguments(request),
            request.effective_tasks(),
        )
    }
}
