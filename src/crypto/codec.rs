//! Object-level encryption codec
//!
//! Applies the field cipher across a named subset of a record's fields,
//! encrypting on write and decrypting on read. The input record is never
//! mutated; a transformed copy is returned.
//!
//! Fields already in the "wrong" representation for the operation (a
//! string on encrypt, a number on decrypt) pass through unchanged. This
//! tolerance exists for the migration window where plaintext and
//! encrypted rows coexist; it is not a steady-state design goal.

use serde_json::Value;

use crate::classify::requires_encryption;
use crate::error::GuardResult;

use super::{decrypt_value, encrypt_value, EncryptionKey};

/// Encrypt the listed fields of a record.
///
/// For each listed field present and holding a number, the value is
/// replaced by its envelope string. Null fields, absent fields, and
/// fields not listed pass through untouched.
pub fn encrypt_object(key: &EncryptionKey, record: &Value, fields: &[&str]) -> GuardResult<Value> {
    let mut out = record.clone();
    let map = match out.as_object_mut() {
        Some(map) => map,
        None => return Ok(out),
    };

    for field in fields {
        let Some(value) = map.get(*field) else {
            continue;
        };
        if let Some(number) = value.as_f64() {
            if let Some(envelope) = encrypt_value(key, Some(number))? {
                map.insert((*field).to_string(), Value::String(envelope));
            }
        }
    }

    Ok(out)
}

/// Decrypt the listed fields of a record.
///
/// String fields are decrypted back to numbers. A field already holding a
/// plain number is treated as not-yet-migrated legacy data and passes
/// through as-is. Decryption failures propagate: a tampered envelope must
/// not silently survive a read.
pub fn decrypt_object(key: &EncryptionKey, record: &Value, fields: &[&str]) -> GuardResult<Value> {
    let mut out = record.clone();
    let map = match out.as_object_mut() {
        Some(map) => map,
        None => return Ok(out),
    };

    for field in fields {
        let Some(value) = map.get(*field) else {
            continue;
        };
        if let Some(envelope) = value.as_str() {
            if let Some(number) = decrypt_value(key, Some(envelope))? {
                // Finite f64 always converts
                if let Some(n) = serde_json::Number::from_f64(number) {
                    map.insert((*field).to_string(), Value::Number(n));
                }
            }
        }
    }

    Ok(out)
}

/// The fields of a record that must be stored encrypted.
pub fn financial_fields(record: &Value) -> Vec<String> {
    match record.as_object() {
        Some(map) => map
            .keys()
            .filter(|k| requires_encryption(k))
            .cloned()
            .collect(),
        None => Vec::new(),
    }
}
