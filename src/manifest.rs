//! Worker manifest
//!
//! The manifest describes one worker of a local project directory. Its
//! `secrets` map holds ciphertext blobs whenever it is on disk; cleartext
//! values only ever live in memory after an explicit decrypt.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;
use tracing::debug;

/// Secret name to ciphertext blob (or cleartext, transiently)
pub type Secrets = HashMap<String, String>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub source_code_path: String,

    #[serde(default)]
    pub action: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application: Option<String>,

    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub debug: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_key: Option<String>,

    #[serde(default)]
    pub secrets: Secrets,

    /// Kept verbatim, validated by the remote service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_criteria: Option<serde_json::Value>,
}

impl Manifest {
    /// Read a manifest file. A truncated or otherwise malformed file is a
    /// parse error, never a partially filled manifest.
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Reading manifest from {:?}", path);

        let content = std::fs::read(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => Error::ManifestNotFound(path.to_path_buf()),
            _ => Error::Io(e),
        })?;

        Ok(serde_json::from_slice(&content)?)
    }

    /// Write the manifest, replacing the file content.
    ///
    /// The file is synced before returning. When both the write and the sync
    /// fail, both errors are reported.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut content = serde_json::to_vec_pretty(self)?;
        content.push(b'\n');

        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        let write_result = file.write_all(&content);
        let close_result = file.sync_all();
        drop(file);

        match (write_result, close_result) {
            (Ok(()), Ok(())) => {
                debug!("Manifest saved to {:?}", path);
                Ok(())
            }
            (Err(e), Ok(())) | (Ok(()), Err(e)) => Err(Error::Io(e)),
            (Err(write), Err(close)) => Err(Error::Persist { write, close }),
        }
    }

    /// Check the fields every worker needs
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::InvalidManifest("missing name".to_string()));
        }

        if self.source_code_path.trim().is_empty() {
            return Err(Error::InvalidManifest("missing source code path".to_string()));
        }

        if self.action.trim().is_empty() {
            return Err(Error::InvalidManifest("missing action".to_string()));
        }

        if self.secrets.keys().any(|name| name.trim().is_empty()) {
            return Err(Error::InvalidManifest("secret with an empty name".to_string()));
        }

        Ok(())
    }
}
