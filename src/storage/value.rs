//! The plaintext-or-ciphertext union at the storage-model level
//!
//! A stored financial field holds either an encrypted envelope string
//! or, transitionally, a legacy raw number. Write paths always choose
//! `Encrypted`; `Plain` exists only for reads of not-yet-migrated rows.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A stored financial field value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredValue {
    /// Legacy plaintext number from before the encryption migration
    Plain(f64),
    /// Self-contained ciphertext envelope
    Encrypted(String),
}

impl StoredValue {
    /// Whether this value is an encrypted envelope
    pub fn is_encrypted(&self) -> bool {
        matches!(self, StoredValue::Encrypted(_))
    }

    /// Classify a raw JSON value as stored-field content.
    ///
    /// Returns None for nulls and for shapes that are neither a number
    /// nor a string (those are not field values this model covers).
    pub fn from_value(value: &Value) -> Option<StoredValue> {
        match value {
            Value::Number(n) => n.as_f64().map(StoredValue::Plain),
            Value::String(s) => Some(StoredValue::Encrypted(s.clone())),
            _ => None,
        }
    }
}
