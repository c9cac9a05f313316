//! Manifest secret store
//!
//! Bulk operations over `Manifest::secrets`. Every entry of a persisted
//! manifest is encrypted under the same password, and every bulk operation
//! is all-or-nothing so the map is never left half cleartext.

use crate::crypto::SecretCipher;
use crate::error::{Error, Result};
use crate::manifest::{Manifest, Secrets};
use tracing::debug;

#[derive(Debug, Clone, Copy, Default)]
pub struct SecretStore {
    cipher: SecretCipher,
}

impl SecretStore {
    pub fn new(cipher: SecretCipher) -> Self {
        SecretStore { cipher }
    }

    /// Replace every ciphertext of the manifest with its cleartext.
    ///
    /// If any entry fails to open, the manifest is left untouched and the
    /// error names that secret only.
    pub fn decrypt_all(&self, manifest: &mut Manifest, password: &str) -> Result<()> {
        if manifest.secrets.is_empty() {
            return Ok(());
        }

        let cleartext = self.decrypted(&manifest.secrets, password)?;
        manifest.secrets = cleartext;
        Ok(())
    }

    /// Add (or, with `allow_overwrite`, replace) one encrypted secret.
    ///
    /// The existing secrets must open with `password`; otherwise nothing
    /// changes. Their ciphertexts are kept as they are, only the new entry
    /// is encrypted. The caller persists the manifest.
    pub fn add_secret(
        &self,
        manifest: &mut Manifest,
        name: &str,
        value: &str,
        password: &str,
        allow_overwrite: bool,
    ) -> Result<()> {
        check_can_add(manifest, name, allow_overwrite)?;

        if !manifest.secrets.is_empty() {
            if let Err(e) = self.decrypted(&manifest.secrets, password) {
                debug!("Cannot decrypt existing secrets: {}", e);
                return Err(Error::PasswordMismatch);
            }
        }

        let encrypted = self.cipher.encrypt(password, value)?;
        manifest.secrets.insert(name.to_string(), encrypted);
        Ok(())
    }

    fn decrypted(&self, secrets: &Secrets, password: &str) -> Result<Secrets> {
        let mut cleartext = Secrets::with_capacity(secrets.len());
        for (name, blob) in secrets {
            match self.cipher.decrypt(password, blob) {
                Ok(value) => {
                    cleartext.insert(name.clone(), value);
                }
                Err(e) => {
                    debug!("cannot decrypt secret '{}': {}", name, e);
                    return Err(Error::SecretDecryption { name: name.clone() });
                }
            }
        }
        Ok(cleartext)
    }
}

/// Name and overwrite checks, run before any password is asked for
pub fn check_can_add(manifest: &Manifest, name: &str, allow_overwrite: bool) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::EmptySecretName);
    }

    if manifest.secrets.contains_key(name) && !allow_overwrite {
        return Err(Error::SecretAlreadyExists(name.to_string()));
    }

    Ok(())
}

/// Drop a secret locally. The next deploy removes it remotely.
pub fn remove_secret(manifest: &mut Manifest, name: &str) -> Result<()> {
    manifest
        .secrets
        .remove(name)
        .map(|_| ())
        .ok_or_else(|| Error::SecretNotFound(name.to_string()))
}

/// Secret names, sorted
pub fn secret_names(manifest: &Manifest) -> Vec<String> {
    let mut names: Vec<String> = manifest.secrets.keys().cloned().collect();
    names.sort();
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::KdfParams;

    const PASSWORD: &str = "P@ssw0rd!-long-enough";
    const OTHER_PASSWORD: &str = "another-P@ssw0rd!";

    fn test_store() -> SecretStore {
        SecretStore::new(SecretCipher::new(KdfParams::new(4, 8, 1)))
    }

    fn encrypted(store: &SecretStore, password: &str, entries: &[(&str, &str)]) -> Secrets {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), store.cipher.encrypt(password, v).unwrap()))
            .collect()
    }

    fn manifest_with(store: &SecretStore, password: &str, entries: &[(&str, &str)]) -> Manifest {
        let secrets = encrypted(store, password, entries);
        Manifest {
            name: "my-worker".to_string(),
            secrets,
            ..Default::default()
        }
    }

    #[test]
    fn test_decrypt_all() {
        let store = test_store();
        let mut manifest = manifest_with(&store, PASSWORD, &[("a", "1"), ("b", "2")]);
        assert_ne!(manifest.secrets["a"], "1");

        store.decrypt_all(&mut manifest, PASSWORD).unwrap();
        assert_eq!(manifest.secrets["a"], "1");
        assert_eq!(manifest.secrets["b"], "2");
    }

    #[test]
    fn test_decrypt_all_empty_is_noop() {
        let mut manifest = Manifest::default();
        test_store().decrypt_all(&mut manifest, "whatever").unwrap();
        assert!(manifest.secrets.is_empty());
    }

    #[test]
    fn test_decrypt_all_wrong_password() {
        let store = test_store();
        let mut manifest = manifest_with(&store, PASSWORD, &[("token", "1")]);

        let err = store.decrypt_all(&mut manifest, OTHER_PASSWORD).unwrap_err();
        assert_eq!(
            err.to_string(),
            "cannot decrypt secret 'token', please check the manifest"
        );
    }

    #[test]
    fn test_decrypt_all_is_atomic() {
        let store = test_store();
        let mut manifest = manifest_with(&store, PASSWORD, &[("a", "1"), ("b", "2"), ("c", "3")]);
        manifest
            .secrets
            .extend(encrypted(&store, OTHER_PASSWORD, &[("d", "4")]));
        let before = manifest.clone();

        let result = store.decrypt_all(&mut manifest, PASSWORD);
        assert!(matches!(result, Err(Error::SecretDecryption { ref name }) if name == "d"));
        assert_eq!(manifest, before);
    }

    #[test]
    fn test_corrupted_blob_is_atomic() {
        let store = test_store();
        let mut manifest = manifest_with(&store, PASSWORD, &[("a", "1")]);
        manifest.secrets.insert("b".to_string(), "AAAA".to_string());
        let before = manifest.clone();

        assert!(store.decrypt_all(&mut manifest, PASSWORD).is_err());
        assert_eq!(manifest, before);
    }

    #[test]
    fn test_empty_values_round_trip() {
        let store = test_store();
        let mut manifest = manifest_with(&store, PASSWORD, &[("a", "1"), ("b", "")]);

        store.decrypt_all(&mut manifest, PASSWORD).unwrap();
        assert_eq!(manifest.secrets["a"], "1");
        assert_eq!(manifest.secrets["b"], "");
    }

    #[test]
    fn test_add_secret_to_empty_manifest() {
        let store = test_store();
        let mut manifest = Manifest::default();

        store
            .add_secret(&mut manifest, "token", "value", PASSWORD, false)
            .unwrap();
        assert_ne!(manifest.secrets["token"], "value");

        store.decrypt_all(&mut manifest, PASSWORD).unwrap();
        assert_eq!(manifest.secrets["token"], "value");
    }

    #[test]
    fn test_add_secret_keeps_existing_ciphertexts() {
        let store = test_store();
        let mut manifest = manifest_with(&store, PASSWORD, &[("a", "1")]);
        let existing = manifest.secrets["a"].clone();

        store.add_secret(&mut manifest, "b", "2", PASSWORD, false).unwrap();
        assert_eq!(manifest.secrets["a"], existing);

        store.decrypt_all(&mut manifest, PASSWORD).unwrap();
        assert_eq!(manifest.secrets["a"], "1");
        assert_eq!(manifest.secrets["b"], "2");
    }

    #[test]
    fn test_add_secret_password_mismatch() {
        let store = test_store();
        let mut manifest = manifest_with(&store, PASSWORD, &[("a", "1")]);
        let before = manifest.clone();

        let err = store
            .add_secret(&mut manifest, "b", "2", OTHER_PASSWORD, false)
            .unwrap_err();
        assert!(matches!(err, Error::PasswordMismatch));
        assert_eq!(
            err.to_string(),
            "others secrets are encrypted with a different password, please use the same one"
        );
        assert_eq!(manifest, before);
    }

    #[test]
    fn test_add_existing_requires_overwrite() {
        let store = test_store();
        let mut manifest = manifest_with(&store, PASSWORD, &[("a", "1")]);

        let err = store
            .add_secret(&mut manifest, "a", "2", PASSWORD, false)
            .unwrap_err();
        assert!(matches!(err, Error::SecretAlreadyExists(ref name) if name == "a"));

        store.add_secret(&mut manifest, "a", "2", PASSWORD, true).unwrap();
        store.decrypt_all(&mut manifest, PASSWORD).unwrap();
        assert_eq!(manifest.secrets["a"], "2");
    }

    #[test]
    fn test_add_empty_name_rejected() {
        let store = test_store();
        let mut manifest = Manifest::default();
        assert!(matches!(
            store.add_secret(&mut manifest, " ", "v", PASSWORD, false),
            Err(Error::EmptySecretName)
        ));
        assert!(manifest.secrets.is_empty());
    }

    #[test]
    fn test_remove_and_list() {
        let store = test_store();
        let mut manifest = manifest_with(&store, PASSWORD, &[("b", "2"), ("a", "1"), ("c", "3")]);
        assert_eq!(secret_names(&manifest), vec!["a", "b", "c"]);

        remove_secret(&mut manifest, "b").unwrap();
        assert_eq!(secret_names(&manifest), vec!["a", "c"]);

        assert!(matches!(
            remove_secret(&mut manifest, "b"),
            Err(Error::SecretNotFound(_))
        ));
    }
}
