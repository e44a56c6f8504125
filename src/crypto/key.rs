//! Encryption key handling
//!
//! The key is a single 256-bit symmetric secret supplied out-of-band,
//! conventionally as a 64-character hex string in the environment.
//! Absence or wrong length is a hard error, never silently substituted
//! with a default key.

use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{GuardError, GuardResult};

/// Environment variable holding the hex-encoded encryption key
pub const KEY_ENV_VAR: &str = "FINGUARD_ENCRYPTION_KEY";

/// Size of the AES-256 key in bytes
pub const KEY_SIZE: usize = 32;

/// A 256-bit encryption key, zeroed on drop
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct EncryptionKey {
    key: [u8; KEY_SIZE],
}

impl EncryptionKey {
    /// Create a key from exactly 32 raw bytes
    pub fn from_bytes(bytes: &[u8]) -> GuardResult<Self> {
        if bytes.len() != KEY_SIZE {
            return Err(GuardError::KeyFormat(format!(
                "key must be exactly {} bytes, got {}",
                KEY_SIZE,
                bytes.len()
            )));
        }
        let mut key = [0u8; KEY_SIZE];
        key.copy_from_slice(bytes);
        Ok(Self { key })
    }

    /// Create a key from a 64-character hex string
    pub fn from_hex(hex_str: &str) -> GuardResult<Self> {
        let bytes = hex::decode(hex_str.trim())
            .map_err(|_| GuardError::KeyFormat("key is not valid hex".to_string()))?;
        Self::from_bytes(&bytes)
    }

    /// Load the key from the configured environment variable
    pub fn from_env() -> GuardResult<Self> {
        let hex_str = std::env::var(KEY_ENV_VAR).map_err(|_| {
            GuardError::KeyFormat(format!("{} is not set", KEY_ENV_VAR))
        })?;
        Self::from_hex(&hex_str)
    }

    /// Get the key bytes
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.key
    }
}

// Never print key material in Debug output
impl fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptionKey")
            .field("len", &KEY_SIZE)
            .finish()
    }
}
