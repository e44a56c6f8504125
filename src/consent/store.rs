//! Consent store
//!
//! Tracks per-user consent flags with versioning and timestamps. All
//! mutations are read-modify-write sequences executed under one writer
//! lock with a write-through atomic file save, so a concurrent grant
//! cannot be lost and the first-consent timestamp is always computed
//! from the value just read.
//!
//! The store writes no audit entries itself; the consent service pairs
//! every mutation with one. Keeping the two apart keeps both testable.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use chrono::Utc;

use crate::error::{GuardError, GuardResult};
use crate::storage::file_io::{read_json, write_json_atomic};

use super::record::{ConsentChange, ConsentRecord, ConsentUpdate};

/// Serializable consent file layout
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct ConsentData {
    records: Vec<ConsentRecord>,
}

/// Per-user consent flag lifecycle management
pub struct ConsentStore {
    path: PathBuf,
    data: RwLock<HashMap<String, ConsentRecord>>,
}

impl ConsentStore {
    /// Create a consent store backed by the given file
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    /// Load consent records from disk
    pub fn load(&self) -> GuardResult<()> {
        let file_data: ConsentData = read_json(&self.path)?;

        let mut data = self
            .data
            .write()
            .map_err(|e| GuardError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.clear();
        for record in file_data.records {
            data.insert(record.user_id.clone(), record);
        }

        Ok(())
    }

    /// Get a user's consent flags. Pure read; returns None when the user
    /// has never stated consent.
    pub fn get_flags(&self, user_id: &str) -> GuardResult<Option<ConsentRecord>> {
        let data = self
            .data
            .read()
            .map_err(|e| GuardError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.get(user_id).cloned())
    }

    /// Apply a partial consent update.
    ///
    /// Creates the record with false defaults when absent. Always bumps
    /// `last_updated_at` and `consent_version`. `consented_at` is
    /// re-anchored only when a primary flag transitions false -> true:
    /// a repeated grant (true -> true) leaves it alone, and a re-grant
    /// after withdrawal moves it to the new grant. That re-anchoring is
    /// intentional latest-grant semantics.
    pub fn update(
        &self,
        user_id: &str,
        update: ConsentUpdate,
        version: &str,
        ip: Option<String>,
        user_agent: Option<String>,
    ) -> GuardResult<ConsentChange> {
        let now = Utc::now();

        let mut data = self
            .data
            .write()
            .map_err(|e| GuardError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        let before = data.get(user_id).cloned();

        let mut record = before.clone().unwrap_or_else(|| ConsentRecord {
            user_id: user_id.to_string(),
            onboarding_data_consent: false,
            ai_analysis_consent: false,
            marketing_consent: None,
            consent_version: version.to_string(),
            consented_at: now,
            last_updated_at: now,
            ip_address: None,
            user_agent: None,
        });

        let was_onboarding = record.onboarding_data_consent;
        let was_ai = record.ai_analysis_consent;

        if let Some(flag) = update.onboarding_data_consent {
            record.onboarding_data_consent = flag;
        }
        if let Some(flag) = update.ai_analysis_consent {
            record.ai_analysis_consent = flag;
        }
        if let Some(flag) = update.marketing_consent {
            record.marketing_consent = Some(flag);
        }

        let fresh_grant = (!was_onboarding && record.onboarding_data_consent)
            || (!was_ai && record.ai_analysis_consent);
        if fresh_grant {
            record.consented_at = now;
        }

        record.consent_version = version.to_string();
        record.last_updated_at = now;
        if ip.is_some() {
            record.ip_address = ip;
        }
        if user_agent.is_some() {
            record.user_agent = user_agent;
        }

        data.insert(user_id.to_string(), record.clone());
        self.save_locked(&data)?;

        Ok(ConsentChange {
            before,
            after: record,
        })
    }

    /// Withdraw all consent for a user.
    ///
    /// Sets every flag false and bumps `last_updated_at`, but leaves
    /// `consented_at` and `consent_version` untouched: when consent was
    /// first given remains on record even after withdrawal.
    pub fn withdraw_all(
        &self,
        user_id: &str,
        ip: Option<String>,
        user_agent: Option<String>,
    ) -> GuardResult<ConsentChange> {
        let mut data = self
            .data
            .write()
            .map_err(|e| GuardError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        let before = data
            .get(user_id)
            .cloned()
            .ok_or_else(|| GuardError::consent_not_found(user_id))?;

        let mut record = before.clone();
        record.onboarding_data_consent = false;
        record.ai_analysis_consent = false;
        record.marketing_consent = Some(false);
        record.last_updated_at = Utc::now();
        if ip.is_some() {
            record.ip_address = ip;
        }
        if user_agent.is_some() {
            record.user_agent = user_agent;
        }

        data.insert(user_id.to_string(), record.clone());
        self.save_locked(&data)?;

        Ok(ConsentChange {
            before: Some(before),
            after: record,
        })
    }

    /// All users with a consent record
    pub fn user_ids(&self) -> GuardResult<Vec<String>> {
        let data = self
            .data
            .read()
            .map_err(|e| GuardError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut ids: Vec<_> = data.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }

    fn save_locked(&self, data: &HashMap<String, ConsentRecord>) -> GuardResult<()> {
        let mut records: Vec<_> = data.values().cloned().collect();
        records.sort_by(|a, b| a.user_id.cmp(&b.user_id));
        write_json_atomic(&self.path, &ConsentData { records })
    }
}
