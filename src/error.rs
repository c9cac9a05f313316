//! Error types for workerctl

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for workerctl
#[derive(Error, Debug)]
pub enum Error {
    // Crypto errors
    #[error("Encryption error: {0}")]
    Encryption(String),

    /// Deliberately generic: wrong password and corrupted data look the same.
    #[error("Decryption error: {0}")]
    Decryption(String),

    #[error("invalid encrypted secret length")]
    InvalidSecretLength,

    #[error("Key derivation error: {0}")]
    KeyDerivation(String),

    // Input errors
    #[error("a secret should have a minimum length of {min}, got {got}")]
    PasswordTooShort { min: usize, got: usize },

    #[error("secret name cannot be empty")]
    EmptySecretName,

    #[error("manifest not found at {}", .0.display())]
    ManifestNotFound(PathBuf),

    #[error("invalid manifest: {0}")]
    InvalidManifest(String),

    // Secret store errors
    #[error("cannot decrypt secret '{name}', please check the manifest")]
    SecretDecryption { name: String },

    #[error("others secrets are encrypted with a different password, please use the same one")]
    PasswordMismatch,

    #[error("{0} already exists, use --edit to overwrite")]
    SecretAlreadyExists(String),

    #[error("secret '{0}' not found")]
    SecretNotFound(String),

    // Config errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Both the write and the final sync of the manifest failed.
    #[error("failed to write manifest: {write}; failed to close manifest: {close}")]
    Persist { write: io::Error, close: io::Error },

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether the failure is something the user can fix by changing their input
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Error::PasswordTooShort { .. }
                | Error::EmptySecretName
                | Error::ManifestNotFound(_)
                | Error::InvalidManifest(_)
                | Error::SecretDecryption { .. }
                | Error::PasswordMismatch
                | Error::SecretAlreadyExists(_)
                | Error::SecretNotFound(_)
                | Error::InvalidConfig(_)
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(e: serde_yaml::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_messages() {
        let err = Error::SecretDecryption {
            name: "api-token".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "cannot decrypt secret 'api-token', please check the manifest"
        );

        assert_eq!(
            Error::SecretAlreadyExists("api-token".to_string()).to_string(),
            "api-token already exists, use --edit to overwrite"
        );
    }

    #[test]
    fn test_persist_keeps_both_errors() {
        let err = Error::Persist {
            write: io::Error::new(io::ErrorKind::Other, "disk full"),
            close: io::Error::new(io::ErrorKind::Other, "bad descriptor"),
        };
        let message = err.to_string();
        assert!(message.contains("disk full"));
        assert!(message.contains("bad descriptor"));
    }

    #[test]
    fn test_user_errors() {
        assert!(Error::PasswordMismatch.is_user_error());
        assert!(Error::PasswordTooShort { min: 12, got: 3 }.is_user_error());
        assert!(!Error::Decryption("Decryption failed".to_string()).is_user_error());
    }
}
