//! workerctl - worker manifests with encrypted secrets
//!
//! This library keeps the secrets of a worker manifest encrypted at rest and
//! computes the secret updates to send to the remote worker service.

pub mod commands;
pub mod config;
pub mod console;
pub mod credentials;
pub mod crypto;
pub mod error;
pub mod manifest;
pub mod secrets;
pub mod worker;

pub use config::Config;
pub use error::{Error, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::{Error, Result};
    pub use crate::manifest::{Manifest, Secrets};
    pub use crate::secrets::{Secret, SecretStore};
}
