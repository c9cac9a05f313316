//! AES-256-GCM encryption of secret values
//!
//! A ciphertext blob is `base64(nonce || sealed value with tag || salt)`.
//! It is self-contained: only the password is needed to open it.

use crate::crypto::{derive_key, KdfParams, MIN_BLOB_SIZE, NONCE_SIZE, SALT_SIZE, TAG_SIZE};
use crate::error::{Error, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rand::rngs::OsRng;
use rand::RngCore;
use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM};
use zeroize::Zeroizing;

/// Every failure to open a blob is reported with this message
const DECRYPTION_FAILED: &str = "Decryption failed";

/// Password based secret cipher
#[derive(Debug, Clone, Copy, Default)]
pub struct SecretCipher {
    params: KdfParams,
}

impl SecretCipher {
    pub fn new(params: KdfParams) -> Self {
        SecretCipher { params }
    }

    /// Encrypt a secret value into a ciphertext blob.
    ///
    /// Salt and nonce are fresh on every call, so encrypting the same value
    /// twice never yields the same blob.
    pub fn encrypt(&self, password: &str, plaintext: &str) -> Result<String> {
        let derived = derive_key(password.as_bytes(), None, &self.params)?;

        let unbound_key = UnboundKey::new(&AES_256_GCM, derived.key())
            .map_err(|_| Error::Encryption("Failed to create encryption key".to_string()))?;
        let sealing_key = LessSafeKey::new(unbound_key);

        let mut nonce_bytes = [0u8; NONCE_SIZE];
        OsRng
            .try_fill_bytes(&mut nonce_bytes)
            .map_err(|e| Error::Encryption(format!("Failed to generate nonce: {}", e)))?;
        let nonce = Nonce::assume_unique_for_key(nonce_bytes);

        let mut in_out = Zeroizing::new(plaintext.as_bytes().to_vec());
        in_out.reserve(TAG_SIZE);
        sealing_key
            .seal_in_place_append_tag(nonce, Aad::empty(), &mut *in_out)
            .map_err(|_| Error::Encryption("Encryption failed".to_string()))?;

        let mut blob = Vec::with_capacity(NONCE_SIZE + in_out.len() + SALT_SIZE);
        blob.extend_from_slice(&nonce_bytes);
        blob.extend_from_slice(&in_out);
        blob.extend_from_slice(derived.salt());

        Ok(BASE64.encode(blob))
    }

    /// Decrypt a ciphertext blob.
    ///
    /// Wrong password, tampering and bad encoding are indistinguishable to the
    /// caller. Blobs too short to hold nonce, tag and salt are rejected
    /// before any key derivation.
    pub fn decrypt(&self, password: &str, blob: &str) -> Result<String> {
        let bytes = BASE64
            .decode(blob)
            .map_err(|_| Error::Decryption(DECRYPTION_FAILED.to_string()))?;

        if bytes.len() < MIN_BLOB_SIZE {
            return Err(Error::InvalidSecretLength);
        }

        let (data, salt) = bytes.split_at(bytes.len() - SALT_SIZE);
        let derived = derive_key(password.as_bytes(), Some(salt), &self.params)?;

        let unbound_key = UnboundKey::new(&AES_256_GCM, derived.key())
            .map_err(|_| Error::Decryption(DECRYPTION_FAILED.to_string()))?;
        let opening_key = LessSafeKey::new(unbound_key);

        let (nonce_bytes, sealed) = data.split_at(NONCE_SIZE);
        let nonce = Nonce::try_assume_unique_for_key(nonce_bytes)
            .map_err(|_| Error::Decryption(DECRYPTION_FAILED.to_string()))?;

        let mut in_out = Zeroizing::new(sealed.to_vec());
        let plaintext = opening_key
            .open_in_place(nonce, Aad::empty(), &mut *in_out)
            .map_err(|_| Error::Decryption(DECRYPTION_FAILED.to_string()))?;

        String::from_utf8(plaintext.to_vec())
            .map_err(|_| Error::Decryption(DECRYPTION_FAILED.to_string()))
    }
}

/// Encrypt with the default work factors
pub fn encrypt_secret(password: &str, plaintext: &str) -> Result<String> {
    SecretCipher::default().encrypt(password, plaintext)
}

/// Decrypt with the default work factors
pub fn decrypt_secret(password: &str, blob: &str) -> Result<String> {
    SecretCipher::default().decrypt(password, blob)
}
