//! # Domain Errors
//!
//! Every failure a tool call can report back to the client.
//! Validation variants are raised before any subprocess is spawned.

use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum MigrateError {
    #[error("missing required parameter '{0}'")]
    MissingParameter(&'static str),

    #[error("invalid value for '{field}': {reason}")]
    InvalidParameter { field: &'static str, reason: String },

    #[error("unsupported {role} database '{kind}' (supported: {supported})")]
    UnsupportedDatabase {
        role: &'static str,
        kind: String,
        supported: String,
    },

    #[error("file not found: {0}")]
    NotFound(PathBuf),

    #[error("invalid auth file format: {0}")]
    InvalidFormat(String),

    #[error("auth file is missing entries: {}", .0.join(", "))]
    MissingEntry(Vec<String>),

    #[error("execution requires `confirmation: true`")]
    ConfirmationRequired,

    #[error("unknown or expired command handle '{0}'")]
    UnknownHandle(String),

    #[error("execution timed out after {} seconds", .0.as_secs())]
    Timeout(Duration),

    #[error("MigratorXpress exited with code {0}")]
    ExecutionFailure(i32),

    #[error("failed to launch '{program}': {source}")]
    LaunchFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl MigrateError {
    /// Short machine-readable name, used as the headline of error responses.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingParameter(_) => "MissingParameter",
            Self::InvalidParameter { .. } => "InvalidParameter",
            Self::UnsupportedDatabase { .. } => "UnsupportedDatabase",
            Self::NotFound(_) => "NotFound",
            Self::InvalidFormat(_) => "InvalidFormat",
            Self::MissingEntry(_) => "MissingEntry",
            Self::ConfirmationRequired => "ConfirmationRequired",
            Self::UnknownHandle(_) => "UnknownHandle",
            Self::Timeout(_) => "Timeout",
            Self::ExecutionFailure(_) => "ExecutionFailure",
            Self::LaunchFailed { .. } => "LaunchFailed",
            Self::Io(_) => "Io",
        }
    }
}

pub type MigrateResult<T> = Result<T, MigrateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_field() {
        let err = MigrateError::MissingParameter("source_db_name");
        assert!(err.to_string().contains("source_db_name"));
        assert_eq!(err.kind(), "MissingParameter");

        let err = MigrateError::MissingEntry(vec!["a".into(), "b".into()]);
        assert_eq!(err.to_string(), "auth file is missing entries: a, b");
    }
}
