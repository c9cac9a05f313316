//! Password based key derivation
//!
//! Keys are derived with scrypt. The default work factors (N=16384, r=8, p=1)
//! make offline brute force of the secrets password expensive.

use crate::crypto::{KEY_SIZE, SALT_SIZE};
use crate::error::{Error, Result};
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroizing;

/// scrypt work factors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    log_n: u8,
    r: u32,
    p: u32,
}

impl KdfParams {
    /// N = 2^14
    pub const DEFAULT_LOG_N: u8 = 14;
    pub const DEFAULT_R: u32 = 8;
    pub const DEFAULT_P: u32 = 1;

    /// Custom work factors. Blobs carry no parameters, so anything other
    /// than the defaults only round-trips with the same `KdfParams`.
    pub const fn new(log_n: u8, r: u32, p: u32) -> Self {
        KdfParams { log_n, r, p }
    }

    fn to_scrypt(self) -> Result<scrypt::Params> {
        scrypt::Params::new(self.log_n, self.r, self.p, KEY_SIZE)
            .map_err(|e| Error::KeyDerivation(format!("Invalid scrypt parameters: {}", e)))
    }
}

impl Default for KdfParams {
    fn default() -> Self {
        KdfParams::new(Self::DEFAULT_LOG_N, Self::DEFAULT_R, Self::DEFAULT_P)
    }
}

/// Key derived from a password, with the salt it was derived from
pub struct DerivedKey {
    key: Zeroizing<[u8; KEY_SIZE]>,
    salt: [u8; SALT_SIZE],
}

impl DerivedKey {
    /// Get the raw key bytes
    pub fn key(&self) -> &[u8; KEY_SIZE] {
        &self.key
    }

    /// Get the salt
    pub fn salt(&self) -> &[u8; SALT_SIZE] {
        &self.salt
    }
}

/// Derive a key from a password.
///
/// Without a salt a fresh random one is generated (encryption path). With a
/// salt the derivation is deterministic (decryption path).
pub fn derive_key(password: &[u8], salt: Option<&[u8]>, params: &KdfParams) -> Result<DerivedKey> {
    let salt = match salt {
        Some(existing) => {
            if existing.len() != SALT_SIZE {
                return Err(Error::KeyDerivation(format!(
                    "Invalid salt length: expected {}, got {}",
                    SALT_SIZE,
                    existing.len()
                )));
            }
            let mut salt = [0u8; SALT_SIZE];
            salt.copy_from_slice(existing);
            salt
        }
        None => {
            let mut salt = [0u8; SALT_SIZE];
            OsRng
                .try_fill_bytes(&mut salt)
                .map_err(|e| Error::KeyDerivation(format!("Failed to generate salt: {}", e)))?;
            salt
        }
    };

    let mut key = Zeroizing::new([0u8; KEY_SIZE]);
    scrypt::scrypt(password, &salt, &params.to_scrypt()?, &mut key[..])
        .map_err(|e| Error::KeyDerivation(format!("scrypt failed: {}", e)))?;

    Ok(DerivedKey { key, salt })
}
