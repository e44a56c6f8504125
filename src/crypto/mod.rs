//! Cryptographic core for finguard
//!
//! AES-256-GCM authenticated encryption of individual financial values,
//! plus the object codec that applies it across a record's fields. The
//! key is an externally supplied 256-bit secret; see [`key`].

pub mod cipher;
pub mod codec;
pub mod key;

pub use cipher::{decrypt_value, encrypt_value, NONCE_SIZE, TAG_SIZE};
pub use codec::{decrypt_object, encrypt_object, financial_fields};
pub use key::{EncryptionKey, KEY_ENV_VAR, KEY_SIZE};
