//! Secrets: the wire entity, the manifest secret store and reconciliation
//! against the remote service.

mod reconcile;
mod store;

pub use reconcile::{plan_for_worker, reconcile, ReconcileOptions};
pub use store::{check_can_add, remove_secret, secret_names, SecretStore};

use serde::{Deserialize, Serialize};
use std::fmt;

/// One entry of a secrets update sent to the remote service.
///
/// `value` is cleartext and only set on upserts. Tombstones carry an empty
/// value that the service ignores.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Secret {
    pub key: String,

    #[serde(default)]
    pub value: String,

    #[serde(rename = "markedForRemoval", default)]
    pub marked_for_removal: bool,
}

impl Secret {
    /// Create or replace `key` with `value`
    pub fn upsert(key: impl Into<String>, value: impl Into<String>) -> Self {
        Secret {
            key: key.into(),
            value: value.into(),
            marked_for_removal: false,
        }
    }

    /// Remove `key`
    pub fn tombstone(key: impl Into<String>) -> Self {
        Secret {
            key: key.into(),
            value: String::new(),
            marked_for_removal: true,
        }
    }

    /// Same entry with the value hidden
    pub fn redacted(&self) -> Self {
        Secret {
            key: self.key.clone(),
            value: if self.marked_for_removal {
                String::new()
            } else {
                "***".to_string()
            },
            marked_for_removal: self.marked_for_removal,
        }
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secret")
            .field("key", &self.key)
            .field("value", &"<redacted>")
            .field("marked_for_removal", &self.marked_for_removal)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_shape() {
        let json = serde_json::to_value(vec![Secret::tombstone("a"), Secret::upsert("a", "2")]).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                {"key": "a", "value": "", "markedForRemoval": true},
                {"key": "a", "value": "2", "markedForRemoval": false}
            ])
        );
    }

    #[test]
    fn test_debug_hides_value() {
        let printed = format!("{:?}", Secret::upsert("token", "hunter2-but-longer"));
        assert!(printed.contains("token"));
        assert!(!printed.contains("hunter2"));
    }

    #[test]
    fn test_redacted() {
        assert_eq!(Secret::upsert("a", "value").redacted().value, "***");
        assert_eq!(Secret::tombstone("a").redacted(), Secret::tombstone("a"));
    }
}
