//! The encryption migration sweep

use serde::Serialize;
use serde_json::Value;

use crate::crypto::{encrypt_value, financial_fields, EncryptionKey};
use crate::error::GuardResult;
use crate::storage::{Storage, StoredValue};

/// Outcome of one field during the sweep
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome", content = "reason")]
pub enum FieldOutcome {
    /// The field held a plaintext number and was encrypted
    Updated,
    /// The field already held an envelope
    SkippedAlreadyEncrypted,
    /// The field was null or absent
    SkippedNull,
    /// The field could not be migrated
    Error(String),
}

/// Outcome of one record during the sweep
#[derive(Debug, Clone, Serialize)]
pub struct RecordOutcome {
    pub user_id: String,
    pub fields: Vec<(String, FieldOutcome)>,
}

/// Aggregated report of a migration run
#[derive(Debug, Clone, Serialize)]
pub struct MigrationReport {
    /// Whether this run was a dry run (no writes)
    pub dry_run: bool,
    pub records_scanned: usize,
    pub fields_updated: usize,
    pub fields_skipped_encrypted: usize,
    pub fields_skipped_null: usize,
    pub errors: usize,
    pub records: Vec<RecordOutcome>,
}

impl MigrationReport {
    fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            records_scanned: 0,
            fields_updated: 0,
            fields_skipped_encrypted: 0,
            fields_skipped_null: 0,
            errors: 0,
            records: Vec::new(),
        }
    }

    fn tally(&mut self, outcome: &FieldOutcome) {
        match outcome {
            FieldOutcome::Updated => self.fields_updated += 1,
            FieldOutcome::SkippedAlreadyEncrypted => self.fields_skipped_encrypted += 1,
            FieldOutcome::SkippedNull => self.fields_skipped_null += 1,
            FieldOutcome::Error(_) => self.errors += 1,
        }
    }
}

/// Sweep all records, encrypting legacy plaintext financial fields.
///
/// Running the sweep twice is safe: the second run reports every field
/// as already encrypted. With `dry_run` set (the default for the CLI),
/// outcomes are computed but nothing is written.
pub fn run_migration(
    storage: &Storage,
    key: &EncryptionKey,
    dry_run: bool,
) -> GuardResult<MigrationReport> {
    let mut report = MigrationReport::new(dry_run);
    let mut dirty = false;

    for user_id in storage.records.user_ids()? {
        let Some(mut record) = storage.records.get(&user_id)? else {
            continue;
        };
        report.records_scanned += 1;

        let mut outcomes = Vec::new();
        for field in financial_fields(&record) {
            let outcome = migrate_field(key, &mut record, &field, dry_run);
            report.tally(&outcome);
            if outcome == FieldOutcome::Updated && !dry_run {
                dirty = true;
            }
            outcomes.push((field, outcome));
        }

        if !dry_run {
            storage.records.upsert(&user_id, record)?;
        }
        report.records.push(RecordOutcome {
            user_id,
            fields: outcomes,
        });
    }

    if dirty {
        storage.records.save()?;
    }

    Ok(report)
}

fn migrate_field(
    key: &EncryptionKey,
    record: &mut Value,
    field: &str,
    dry_run: bool,
) -> FieldOutcome {
    let Some(map) = record.as_object_mut() else {
        return FieldOutcome::Error("record is not an object".to_string());
    };

    let current = match map.get(field) {
        None | Some(Value::Null) => return FieldOutcome::SkippedNull,
        Some(value) => value,
    };

    match StoredValue::from_value(current) {
        Some(StoredValue::Encrypted(_)) => FieldOutcome::SkippedAlreadyEncrypted,
        Some(StoredValue::Plain(number)) => {
            if dry_run {
                return FieldOutcome::Updated;
            }
            match encrypt_value(key, Some(number)) {
                Ok(Some(envelope)) => {
                    map.insert(field.to_string(), Value::String(envelope));
                    FieldOutcome::Updated
                }
                Ok(None) => FieldOutcome::SkippedNull,
                Err(err) => FieldOutcome::Error(err.to_string()),
            }
        }
        None => FieldOutcome::Error("unsupported value type".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::GuardPaths;
    use crate::crypto::decrypt_value;
    use serde_json::json;
    use tempfile::TempDir;

    fn test_key() -> EncryptionKey {
        EncryptionKey::from_bytes(&[0x42; 32]).unwrap()
    }

    fn seeded_storage() -> (Storage, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let paths = GuardPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();

        storage
            .records
            .upsert(
                "user-1",
                json!({
                    "user_id": "user-1",
                    "monthly_income": 5000.0,
                    "net_worth": null,
                    "currency": "USD"
                }),
            )
            .unwrap();
        storage
            .records
            .upsert("user-2", json!({"user_id": "user-2", "savings_balance": 120.5}))
            .unwrap();
        storage.records.save().unwrap();

        (storage, temp_dir)
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let (storage, _temp) = seeded_storage();
        let key = test_key();

        let report = run_migration(&storage, &key, true).unwrap();
        assert!(report.dry_run);
        assert_eq!(report.records_scanned, 2);
        assert_eq!(report.fields_updated, 2);
        assert_eq!(report.fields_skipped_null, 1);

        // Still plaintext on disk and in memory
        let record = storage.records.get("user-1").unwrap().unwrap();
        assert_eq!(record["monthly_income"], json!(5000.0));
    }

    #[test]
    fn test_apply_encrypts_in_place() {
        let (storage, _temp) = seeded_storage();
        let key = test_key();

        let report = run_migration(&storage, &key, false).unwrap();
        assert_eq!(report.fields_updated, 2);
        assert_eq!(report.errors, 0);

        let record = storage.records.get("user-1").unwrap().unwrap();
        let envelope = record["monthly_income"].as_str().unwrap();
        assert_eq!(decrypt_value(&key, Some(envelope)).unwrap(), Some(5000.0));
        // Null and behavioral fields untouched
        assert_eq!(record["net_worth"], Value::Null);
        assert_eq!(record["currency"], "USD");
    }

    #[test]
    fn test_second_run_is_idempotent() {
        let (storage, _temp) = seeded_storage();
        let key = test_key();

        run_migration(&storage, &key, false).unwrap();
        let envelope_before = storage.records.get("user-1").unwrap().unwrap()["monthly_income"]
            .as_str()
            .unwrap()
            .to_string();

        let second = run_migration(&storage, &key, false).unwrap();
        assert_eq!(second.fields_updated, 0);
        assert_eq!(second.fields_skipped_encrypted, 2);

        // The envelope was not re-encrypted
        let envelope_after = storage.records.get("user-1").unwrap().unwrap()["monthly_income"]
            .as_str()
            .unwrap()
            .to_string();
        assert_eq!(envelope_before, envelope_after);
    }

    #[test]
    fn test_unsupported_type_reported() {
        let (storage, _temp) = seeded_storage();
        storage
            .records
            .upsert("user-3", json!({"monthly_income": {"weird": true}}))
            .unwrap();

        let report = run_migration(&storage, &test_key(), true).unwrap();
        assert_eq!(report.errors, 1);
    }
}
