//! Parameter types for the tools that do not take a full migration request.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ExecuteParams {
    /// Handle returned by `preview_command`
    pub handle: String,
    /// Must be `true` to run the command
    #[serde(default)]
    pub confirmation: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ValidateAuthParams {
    /// Path to the MigratorXpress auth file (JSON)
    pub file_path: String,
    /// A single auth_id that must be present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_id: Option<String>,
    /// Auth ids that must all be present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_auth_ids: Option<Vec<String>>,
}

impl ValidateAuthParams {
    /// Every requested id, single id first, without duplicates or blanks.
    pub fn requested_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = Vec::new();
        let candidates = self
            .auth_id
            .iter()
            .chain(self.required_auth_ids.iter().flatten());
        for id in candidates {
            let id = id.trim();
            if !id.is_empty() && !ids.iter().any(|known| known == id) {
                ids.push(id.to_string());
            }
        }
        ids
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SuggestWorkflowParams {
    /// Source database type (oracle, postgresql, sqlserver, netezza)
    pub source_type: String,
    /// Target database type (postgresql, sqlserver)
    pub target_type: String,
    /// Include the copy_pk, copy_ak and copy_fk steps (default: true)
    #[serde(default = "default_true", alias = "has_constraint")]
    pub include_constraints: bool,
}
