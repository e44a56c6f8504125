//! Financial profile document repository
//!
//! Stores one JSON document per user, addressed by user id. The
//! documents hold the union field type: encrypted envelope strings for
//! migrated financial fields, raw numbers for legacy rows.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use serde_json::Value;

use crate::error::{GuardError, GuardResult};

use super::file_io::{read_json, write_json_atomic};

/// Serializable record file layout
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct RecordData {
    records: HashMap<String, Value>,
}

/// Repository for financial profile documents
pub struct RecordRepository {
    path: PathBuf,
    data: RwLock<HashMap<String, Value>>,
}

impl RecordRepository {
    /// Create a new record repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    /// Load records from disk
    pub fn load(&self) -> GuardResult<()> {
        let file_data: RecordData = read_json(&self.path)?;

        let mut data = self
            .data
            .write()
            .map_err(|e| GuardError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        *data = file_data.records;
        Ok(())
    }

    /// Save records to disk
    pub fn save(&self) -> GuardResult<()> {
        let data = self
            .data
            .read()
            .map_err(|e| GuardError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        write_json_atomic(
            &self.path,
            &RecordData {
                records: data.clone(),
            },
        )
    }

    /// Get a user's document
    pub fn get(&self, user_id: &str) -> GuardResult<Option<Value>> {
        let data = self
            .data
            .read()
            .map_err(|e| GuardError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.get(user_id).cloned())
    }

    /// Insert or replace a user's document
    pub fn upsert(&self, user_id: &str, record: Value) -> GuardResult<()> {
        let mut data = self
            .data
            .write()
            .map_err(|e| GuardError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.insert(user_id.to_string(), record);
        Ok(())
    }

    /// Remove a user's document entirely
    pub fn delete(&self, user_id: &str) -> GuardResult<bool> {
        let mut data = self
            .data
            .write()
            .map_err(|e| GuardError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        Ok(data.remove(user_id).is_some())
    }

    /// All user ids with a document, sorted
    pub fn user_ids(&self) -> GuardResult<Vec<String>> {
        let data = self
            .data
            .read()
            .map_err(|e| GuardError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut ids: Vec<_> = data.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }

    /// Number of stored documents
    pub fn len(&self) -> GuardResult<usize> {
        let data = self
            .data
            .read()
            .map_err(|e| GuardError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.len())
    }

    /// Whether the repository holds no documents
    pub fn is_empty(&self) -> GuardResult<bool> {
        Ok(self.len()? == 0)
    }
}
