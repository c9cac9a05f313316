//! Configuration management for workerctl

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Default manifest file name inside a worker project directory
pub const DEFAULT_MANIFEST_FILE: &str = "manifest.json";

/// Default environment variable holding the secrets password
pub const DEFAULT_PASSWORD_ENV: &str = "WORKERCTL_SECRETS_PASSWORD";

/// Default environment variable holding a secret value for `add-secret`
pub const DEFAULT_SECRET_VALUE_ENV: &str = "WORKERCTL_ADD_SECRET_VALUE";

/// Minimum secrets password length, in characters
pub const MIN_PASSWORD_LENGTH: usize = 12;

/// Environment variable overriding the manifest file name
pub const MANIFEST_FILE_ENV: &str = "WORKERCTL_MANIFEST_FILE";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Manifest file name, relative to the worker project directory
    pub manifest_file: String,

    /// Secrets handling
    pub secrets: SecretsConfig,
}

/// Where secret material comes from
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecretsConfig {
    /// Environment variable checked for the password before prompting
    pub password_env: String,

    /// Environment variable checked for a new secret value before prompting
    pub secret_value_env: String,

    /// Passwords shorter than this are rejected
    pub min_password_length: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            manifest_file: DEFAULT_MANIFEST_FILE.to_string(),
            secrets: SecretsConfig::default(),
        }
    }
}

impl Default for SecretsConfig {
    fn default() -> Self {
        SecretsConfig {
            password_env: DEFAULT_PASSWORD_ENV.to_string(),
            secret_value_env: DEFAULT_SECRET_VALUE_ENV.to_string(),
            min_password_length: MIN_PASSWORD_LENGTH,
        }
    }
}

impl Config {
    /// Load configuration from a file (YAML or JSON, by extension)
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        let content = std::fs::read_to_string(path_ref)
            .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;

        let config: Config = match path_ref.extension().and_then(|s| s.to_str()) {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content)
                .map_err(|e| Error::Config(format!("Failed to parse YAML config: {}", e)))?,
            _ => serde_json::from_str(&content)
                .map_err(|e| Error::Config(format!("Failed to parse config file: {}", e)))?,
        };

        Ok(config)
    }

    /// Resolve the effective configuration: file if present, defaults
    /// otherwise, then environment overrides, then validation.
    pub fn resolve<P: AsRef<Path>>(path: P, env: &HashMap<String, String>) -> Result<Self> {
        let path_ref = path.as_ref();
        let mut config = if path_ref.exists() {
            Config::load(path_ref)?
        } else {
            tracing::debug!("No config file at {:?}, using defaults", path_ref);
            Config::default()
        };

        config.apply_env_overrides(env);
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides to configuration
    pub fn apply_env_overrides(&mut self, env: &HashMap<String, String>) {
        if let Some(file) = env.get(MANIFEST_FILE_ENV) {
            let file = file.trim();
            if !file.is_empty() {
                self.manifest_file = file.to_string();
            }
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.manifest_file.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "Manifest file name is required".to_string(),
            ));
        }

        if self.secrets.password_env.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "Secrets password environment variable name is required".to_string(),
            ));
        }

        if self.secrets.min_password_length < MIN_PASSWORD_LENGTH {
            return Err(Error::InvalidConfig(format!(
                "Minimum password length cannot be lower than {}",
                MIN_PASSWORD_LENGTH
            )));
        }

        Ok(())
    }

    /// Path of the manifest for a worker project directory
    pub fn manifest_path(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.manifest_file)
    }
}
