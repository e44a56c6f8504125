//! Read-only encryption verification sweep

use serde::Serialize;

use crate::crypto::{decrypt_value, financial_fields, EncryptionKey};
use crate::error::GuardResult;
use crate::storage::{Storage, StoredValue};

/// Report of a verification sweep
#[derive(Debug, Clone, Default, Serialize)]
pub struct VerificationReport {
    pub records_scanned: usize,
    /// Fields holding an envelope
    pub encrypted_fields: usize,
    /// Fields still holding a legacy plaintext number
    pub plaintext_fields: usize,
    /// Fields that are null or absent
    pub null_fields: usize,
    /// (user id, field name) pairs whose envelope did not decrypt with
    /// the configured key. Values are never included.
    pub decrypt_failures: Vec<(String, String)>,
}

impl VerificationReport {
    /// Whether every stored envelope decrypted with the configured key
    pub fn key_confirmed(&self) -> bool {
        self.decrypt_failures.is_empty()
    }

    /// Proportion of non-null financial fields that are encrypted
    pub fn encrypted_ratio(&self) -> f64 {
        let total = self.encrypted_fields + self.plaintext_fields;
        if total == 0 {
            1.0
        } else {
            self.encrypted_fields as f64 / total as f64
        }
    }
}

/// Sample every stored record, count encrypted vs. legacy vs. null
/// fields, and attempt a decrypt of each envelope to confirm the key.
///
/// Strictly read-only: nothing is written, and decrypted values are
/// dropped inside this function, never returned.
pub fn verify_encryption(storage: &Storage, key: &EncryptionKey) -> GuardResult<VerificationReport> {
    let mut report = VerificationReport::default();

    for user_id in storage.records.user_ids()? {
        let Some(record) = storage.records.get(&user_id)? else {
            continue;
        };
        report.records_scanned += 1;

        for field in financial_fields(&record) {
            let value = record.get(&field).cloned().unwrap_or(serde_json::Value::Null);
            match StoredValue::from_value(&value) {
                None => report.null_fields += 1,
                Some(StoredValue::Plain(_)) => report.plaintext_fields += 1,
                Some(StoredValue::Encrypted(envelope)) => {
                    report.encrypted_fields += 1;
                    if decrypt_value(key, Some(&envelope)).is_err() {
                        report.decrypt_failures.push((user_id.clone(), field.clone()));
                    }
                }
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::GuardPaths;
    use crate::crypto::encrypt_value;
    use serde_json::json;
    use tempfile::TempDir;

    fn test_key() -> EncryptionKey {
        EncryptionKey::from_bytes(&[0x42; 32]).unwrap()
    }

    fn storage_with(records: &[(&str, serde_json::Value)]) -> (Storage, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let paths = GuardPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        for (user_id, record) in records {
            storage.records.upsert(user_id, record.clone()).unwrap();
        }
        (storage, temp_dir)
    }

    #[test]
    fn test_counts_mixed_states() {
        let key = test_key();
        let envelope = encrypt_value(&key, Some(5000.0)).unwrap().unwrap();
        let (storage, _temp) = storage_with(&[
            ("user-1", json!({"monthly_income": envelope, "net_worth": 100.0})),
            ("user-2", json!({"savings_balance": null})),
        ]);

        let report = verify_encryption(&storage, &key).unwrap();
        assert_eq!(report.records_scanned, 2);
        assert_eq!(report.encrypted_fields, 1);
        assert_eq!(report.plaintext_fields, 1);
        assert_eq!(report.null_fields, 1);
        assert!(report.key_confirmed());
        assert_eq!(report.encrypted_ratio(), 0.5);
    }

    #[test]
    fn test_wrong_key_reported_per_field() {
        let other_key = EncryptionKey::from_bytes(&[0x43; 32]).unwrap();
        let envelope = encrypt_value(&other_key, Some(5000.0)).unwrap().unwrap();
        let (storage, _temp) = storage_with(&[("user-1", json!({"monthly_income": envelope}))]);

        let report = verify_encryption(&storage, &test_key()).unwrap();
        assert!(!report.key_confirmed());
        assert_eq!(
            report.decrypt_failures,
            vec![("user-1".to_string(), "monthly_income".to_string())]
        );
    }

    #[test]
    fn test_empty_storage() {
        let (storage, _temp) = storage_with(&[]);
        let report = verify_encryption(&storage, &test_key()).unwrap();
        assert_eq!(report.records_scanned, 0);
        assert!(report.key_confirmed());
        assert_eq!(report.encrypted_ratio(), 1.0);
    }
}
