//! # Auth File Validation
//!
//! Checks that an auth file exists, parses as JSON and holds the requested
//! credential entries. Only keys are ever reported; record values are never
//! read beyond locating their id.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::domain::error::{MigrateError, MigrateResult};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthFileReport {
    pub path: PathBuf,
    pub entry_count: usize,
    /// Known auth ids, sorted.
    pub auth_ids: Vec<String>,
    /// The ids the caller asked for, all of them present.
    pub confirmed: Vec<String>,
}

/// Collects auth ids from either supported layout:
/// an object keyed by id, or an array of records carrying an `"id"` member.
fn known_ids(document: &Value) -> MigrateResult<(usize, BTreeSet<String>)> {
    match document {
        Value::Object(map) => Ok((map.len(), map.keys().cloned().collect())),
        Value::Array(entries) => {
            let ids = entries
                .iter()
                .filter_map(|entry| entry.get("id"))
                .filter_map(|id| match id {
                    Value::String(s) => Some(s.clone()),
                    Value::Number(n) => Some(n.to_string()),
                    _ => None,
                })
                .collect();
            Ok((entries.len(), ids))
        }
        _ => Err(MigrateError::InvalidFormat(
            "expected a JSON object or array at the top level".to_string(),
        )),
    }
}

pub async fn validate_auth_file(path: &Path, auth_ids: &[String]) -> MigrateResult<AuthFileReport> {
    let metadata = match tokio::fs::metadata(path).await {
        Ok(m) => m,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(MigrateError::NotFound(path.to_path_buf()));
        }
        Err(e) => return Err(MigrateError::Io(e)),
    };
    if !metadata.is_file() {
        return Err(MigrateError::NotFound(path.to_path_buf()));
    }

    let content = tokio::fs::read_to_string(path).await?;
    // The parse error carries only a position, never file content.
    let document: Value = serde_json::from_str(&content)
        .map_err(|e| MigrateError::InvalidFormat(format!("invalid JSON: {e}")))?;

    let (entry_count, ids) = known_ids(&document)?;

    let mut missing = Vec::new();
    let mut confirmed = Vec::new();
    for wanted in auth_ids {
        if ids.contains(wanted) {
            if !confirmed.contains(wanted) {
                confirmed.push(wanted.clone());
            }
        } else if !missing.contains(wanted) {
            missing.push(wanted.clone());
        }
    }
    if !missing.is_empty() {
        return Err(MigrateError::MissingEntry(missing));
    }

    tracing::debug!(
        "Auth file {} validated with {} entries",
        path.display(),
        entry_count
    );

    Ok(AuthFileReport {
        path: path.to_path_buf(),
        entry_count,
        auth_ids: ids.into_iter().collect(),
        confirmed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let result = validate_auth_file(&dir.path().join("nope.json"), &[]).await;
        assert!(matches!(result, Err(MigrateError::NotFound(_))));

        // A directory is not an auth file either.
        let result = validate_auth_file(dir.path(), &[]).await;
        assert!(matches!(result, Err(MigrateError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "auth.json", "{ not json");
        assert!(matches!(
            validate_auth_file(&path, &[]).await,
            Err(MigrateError::InvalidFormat(_))
        ));

        let path = write(&dir, "scalar.json", "42");
        assert!(matches!(
            validate_auth_file(&path, &[]).await,
            Err(MigrateError::InvalidFormat(_))
        ));
    }

    #[tokio::test]
    async fn test_entry_lookup() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "auth.json",
            r#"{"id1": {"ds_type": "oracle", "auth_mode": "classic", "info": {"password": "hunter2"}}}"#,
        );

        let report = validate_auth_file(&path, &["id1".to_string()]).await.unwrap();
        assert_eq!(report.entry_count, 1);
        assert_eq!(report.auth_ids, vec!["id1"]);
        assert_eq!(report.confirmed, vec!["id1"]);
        assert!(!format!("{report:?}").contains("hunter2"));

        match validate_auth_file(&path, &["id2".to_string()]).await {
            Err(MigrateError::MissingEntry(ids)) => assert_eq!(ids, vec!["id2"]),
            other => panic!("expected MissingEntry, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_array_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "auth.json", r#"[{"id": "src"}, {"id": "tgt"}, {"name": "x"}]"#);
        let report = validate_auth_file(&path, &["tgt".to_string()]).await.unwrap();
        assert_eq!(report.entry_count, 3);
        assert_eq!(report.auth_ids, vec!["src", "tgt"]);
    }
}
