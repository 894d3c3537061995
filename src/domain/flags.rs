//! # Flag Mapping
//!
//! The exhaustive mapping from request parameters to MigratorXpress flags.
//! Arguments are emitted in table order. Redaction is driven by the
//! `sensitive` column only; nothing is pattern-matched. Rows marked `path`
//! carry filesystem paths that are anchored to the server's working
//! directory before execution.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagKind {
    /// `--flag value`
    Value,
    /// `--flag v1 v2 ...`
    List,
    /// `--flag` with no value
    Switch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagSpec {
    pub param: &'static str,
    pub flag: &'static str,
    pub kind: FlagKind,
    pub sensitive: bool,
    pub path: bool,
}

/// Placeholder shown instead of any sensitive value.
pub const REDACTED: &str = "******";

const fn value(param: &'static str, flag: &'static str) -> FlagSpec {
    FlagSpec {
        param,
        flag,
        kind: FlagKind::Value,
        sensitive: false,
        path: false,
    }
}

const fn list(param: &'static str, flag: &'static str) -> FlagSpec {
    FlagSpec {
        param,
        flag,
        kind: FlagKind::List,
        sensitive: false,
        path: false,
    }
}

const fn switch(param: &'static str, flag: &'static str) -> FlagSpec {
    FlagSpec {
        param,
        flag,
        kind: FlagKind::Switch,
        sensitive: false,
        path: false,
    }
}

const fn secret(param: &'static str, flag: &'static str) -> FlagSpec {
    FlagSpec {
        param,
        flag,
        kind: FlagKind::Value,
        sensitive: true,
        path: false,
    }
}

const fn path(param: &'static str, flag: &'static str) -> FlagSpec {
    FlagSpec {
        param,
        flag,
        kind: FlagKind::Value,
        sensitive: false,
        path: true,
    }
}

pub const FLAG_TABLE: &[FlagSpec] = &[
    path("auth_file", "--auth_file"),
    value("source_db_type", "--source_db_type"),
    value("source_db_auth_id", "--source_db_auth_id"),
    value("source_db_name", "--source_db_name"),
    value("source_schema_name", "--source_schema_name"),
    value("target_db_type", "--target_db_type"),
    value("target_db_auth_id", "--target_db_auth_id"),
    value("target_db_name", "--target_db_name"),
    value("target_schema_name", "--target_schema_name"),
    value("migration_db_auth_id", "--migration_db_auth_id"),
    list("task_list", "--task_list"),
    value("resume", "-r"),
    path("fasttransfer_dir_path", "--fasttransfer_dir_path"),
    value("fasttransfer_p", "-p"),
    value("ft_large_table_th", "--ft_large_table_th"),
    value("n_jobs", "--n_jobs"),
    value("cci_threshold", "--cci_threshold"),
    value("aci_threshold", "--aci_threshold"),
    value("migration_db_mode", "--migration_db_mode"),
    value("compute_nbrows", "--compute_nbrows"),
    value("drop_tables_if_exists", "--drop_tables_if_exists"),
    value("load_mode", "--load_mode"),
    value("include_tables", "-i"),
    value("exclude_tables", "-e"),
    value("min_rows", "-min"),
    value("max_rows", "-max"),
    list("forced_int_id_prefixes", "--forced_int_id_prefixes"),
    list("forced_int_id_suffixes", "--forced_int_id_suffixes"),
    value("profiling_sample_pc", "--profiling_sample_pc"),
    value("p_query", "--p_query"),
    value("min_sample_pc_profile", "--min_sample_pc_profile"),
    switch("force", "-f"),
    switch("basic_diff", "--basic_diff"),
    switch("without_xid", "--without_xid"),
    value("fk_mode", "--fk_mode"),
    value("log_level", "--log_level"),
    path("log_dir", "--log_dir"),
    switch("no_banner", "--no_banner"),
    switch("no_progress", "--no_progress"),
    switch("quiet_ft", "--quiet_ft"),
    secret("license", "--license"),
    path("license_file", "--license_file"),
];

pub fn lookup_flag(flag: &str) -> Option<&'static FlagSpec> {
    FLAG_TABLE.iter().find(|spec| spec.flag == flag)
}

pub fn is_sensitive_flag(flag: &str) -> bool {
    lookup_flag(flag).is_some_and(|spec| spec.sensitive)
}
