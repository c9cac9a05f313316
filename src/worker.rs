//! Remote worker details
//!
//! What the remote service reports about a deployed worker. Secrets come
//! back by name only; their values are never returned.

use crate::error::Result;
use crate::secrets::Secret;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerDetails {
    pub key: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub debug: bool,

    #[serde(default)]
    pub source_code: String,

    #[serde(default)]
    pub action: String,

    #[serde(default)]
    pub secrets: Vec<Secret>,

    #[serde(default)]
    pub project_key: String,
}

impl WorkerDetails {
    /// Parse a worker details response body
    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Key as known by the service: prefixed with `<projectKey>-` when the
    /// worker belongs to a project.
    pub fn key_with_project(&self) -> String {
        let project_key = self.project_key.trim();
        if !project_key.is_empty() {
            let prefix = format!("{}-", project_key);
            if !self.key.starts_with(&prefix) {
                return prefix + &self.key;
            }
        }
        self.key.clone()
    }

    /// Names of the secrets the service holds for this worker
    pub fn secret_names(&self) -> HashSet<String> {
        self.secrets.iter().map(|s| s.key.clone()).collect()
    }
}
