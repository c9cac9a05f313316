//! Cryptography module for workerctl
//!
//! Provides AES-256-GCM encryption of individual secret values with scrypt
//! key derivation. Secrets never reach the manifest file in cleartext.

mod cipher;
mod kdf;

pub use cipher::{decrypt_secret, encrypt_secret, SecretCipher};
pub use kdf::{derive_key, DerivedKey, KdfParams};

/// Size of AES-256 key in bytes
pub const KEY_SIZE: usize = 32;

/// Size of GCM nonce in bytes
pub const NONCE_SIZE: usize = 12;

/// Size of GCM authentication tag in bytes
pub const TAG_SIZE: usize = 16;

/// Size of salt for key derivation
pub const SALT_SIZE: usize = 32;

/// Smallest decodable ciphertext blob: nonce, tag of an empty value, salt
pub const MIN_BLOB_SIZE: usize = NONCE_SIZE + TAG_SIZE + SALT_SIZE;
