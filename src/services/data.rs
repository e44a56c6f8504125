//! Protected financial data operations
//!
//! Read, update, export, and delete flows over the profile documents.
//! Each flow is: policy gate, codec transform, audit pairing. Staff can
//! reach a record but only ever see envelopes; plaintext is for the data
//! subject alone, and that check happens before any decrypt attempt.

use std::sync::Arc;

use chrono::Utc;
use serde_json::{json, Value};

use crate::audit::{ActorType, AuditAction, AuditDraft, AuditLog};
use crate::crypto::{decrypt_object, encrypt_object, financial_fields, EncryptionKey};
use crate::error::{GuardError, GuardResult};
use crate::policy::AccessPolicy;
use crate::storage::{RoleRepository, Storage};

/// Operations on protected financial profiles
pub struct DataService {
    storage: Arc<Storage>,
    audit: Arc<AuditLog>,
    key: EncryptionKey,
    root_principal: Option<String>,
    audit_strict: bool,
}

impl DataService {
    /// Create a data service
    pub fn new(
        storage: Arc<Storage>,
        audit: Arc<AuditLog>,
        key: EncryptionKey,
        root_principal: Option<String>,
        audit_strict: bool,
    ) -> Self {
        Self {
            storage,
            audit,
            key,
            root_principal,
            audit_strict,
        }
    }

    /// The policy is rebuilt per call: roles are derived, never cached.
    fn policy(&self) -> AccessPolicy<&RoleRepository> {
        AccessPolicy::new(self.root_principal.clone(), &self.storage.roles)
    }

    /// Read a user's profile.
    ///
    /// The data subject gets decrypted values; staff get the record with
    /// envelopes intact. Denied attempts are audited too.
    pub fn read_profile(
        &self,
        actor_id: &str,
        actor_type: ActorType,
        target_id: &str,
    ) -> GuardResult<Value> {
        let policy = self.policy();

        if !policy.can_access(actor_id, target_id) {
            self.log_denied_access(actor_id, actor_type, target_id);
            return Err(GuardError::denied(actor_id, "read_profile"));
        }

        let record = self
            .storage
            .records
            .get(target_id)?
            .ok_or_else(|| GuardError::record_not_found(target_id))?;

        let raw = policy.can_view_raw(actor_id, target_id);
        let fields = financial_fields(&record);
        let field_refs: Vec<&str> = fields.iter().map(String::as_str).collect();

        let result = if raw {
            decrypt_object(&self.key, &record, &field_refs)?
        } else {
            record
        };

        super::report_audit(
            self.audit
                .log_data_access(actor_id, actor_type, target_id, &field_refs, true),
            self.audit_strict,
        )?;

        Ok(result)
    }

    /// Create or update fields of a user's profile.
    ///
    /// Writes always store financial fields encrypted, whatever
    /// representation the caller handed in.
    pub fn update_profile(
        &self,
        actor_id: &str,
        actor_type: ActorType,
        target_id: &str,
        updates: Value,
    ) -> GuardResult<Value> {
        if !self.policy().can_modify(actor_id, target_id) {
            self.log_denied_op(actor_id, actor_type, target_id, "update_profile");
            return Err(GuardError::denied(actor_id, "update_profile"));
        }

        let updates = match updates {
            Value::Object(map) => map,
            _ => {
                return Err(GuardError::Validation(
                    "profile update must be a JSON object".into(),
                ))
            }
        };

        let mut record = self
            .storage
            .records
            .get(target_id)?
            .unwrap_or_else(|| json!({ "user_id": target_id }));

        let field_names: Vec<String> = updates.keys().cloned().collect();
        if let Some(map) = record.as_object_mut() {
            for (field, value) in updates {
                map.insert(field, value);
            }
        }

        let fields = financial_fields(&record);
        let field_refs: Vec<&str> = fields.iter().map(String::as_str).collect();
        let encrypted = encrypt_object(&self.key, &record, &field_refs)?;

        self.storage.records.upsert(target_id, encrypted.clone())?;
        self.storage.records.save()?;

        super::report_audit(
            self.audit.record(
                AuditDraft::new(actor_id, actor_type, target_id, AuditAction::ProfileUpdated)
                    .with_details(&json!({ "fields": field_names }))
                    .with_resource("financial_profile", target_id),
            ),
            self.audit_strict,
        )?;

        Ok(encrypted)
    }

    /// Export a user's profile with decrypted values.
    ///
    /// Raw export is for the data subject only; the check runs before
    /// any decrypt attempt.
    pub fn export_profile(
        &self,
        actor_id: &str,
        actor_type: ActorType,
        target_id: &str,
    ) -> GuardResult<Value> {
        if !self.policy().can_view_raw(actor_id, target_id) {
            self.log_denied_access(actor_id, actor_type, target_id);
            return Err(GuardError::denied(actor_id, "export_profile"));
        }

        let record = self
            .storage
            .records
            .get(target_id)?
            .ok_or_else(|| GuardError::record_not_found(target_id))?;

        let fields = financial_fields(&record);
        let field_refs: Vec<&str> = fields.iter().map(String::as_str).collect();
        let decrypted = decrypt_object(&self.key, &record, &field_refs)?;

        super::report_audit(
            self.audit.record(
                AuditDraft::new(actor_id, actor_type, target_id, AuditAction::DataExport)
                    .with_details(&json!({ "fields": field_refs }))
                    .with_resource("financial_profile", target_id),
            ),
            self.audit_strict,
        )?;

        Ok(decrypted)
    }

    /// Delete a user's profile, softly (tombstone) or hard (removal)
    pub fn delete_profile(
        &self,
        actor_id: &str,
        actor_type: ActorType,
        target_id: &str,
        hard: bool,
        reason: Option<&str>,
    ) -> GuardResult<()> {
        if !self.policy().can_modify(actor_id, target_id) {
            self.log_denied_op(actor_id, actor_type, target_id, "delete_profile");
            return Err(GuardError::denied(actor_id, "delete_profile"));
        }

        if hard {
            if !self.storage.records.delete(target_id)? {
                return Err(GuardError::record_not_found(target_id));
            }
        } else {
            let mut record = self
                .storage
                .records
                .get(target_id)?
                .ok_or_else(|| GuardError::record_not_found(target_id))?;
            if let Some(map) = record.as_object_mut() {
                map.insert("deleted_at".to_string(), json!(Utc::now()));
            }
            self.storage.records.upsert(target_id, record)?;
        }
        self.storage.records.save()?;

        super::report_audit(
            self.audit
                .log_data_deletion(actor_id, actor_type, target_id, hard, reason),
            self.audit_strict,
        )?;

        Ok(())
    }

    /// Denied read attempts still leave a trace. Best-effort even under
    /// strict mode: the operation already fails with the denial.
    fn log_denied_access(&self, actor_id: &str, actor_type: ActorType, target_id: &str) {
        let _ = super::report_audit(
            self.audit
                .log_data_access(actor_id, actor_type, target_id, &[], false),
            false,
        );
    }

    fn log_denied_op(
        &self,
        actor_id: &str,
        actor_type: ActorType,
        target_id: &str,
        operation: &str,
    ) {
        let _ = super::report_audit(
            self.audit.record(
                AuditDraft::new(actor_id, actor_type, target_id, AuditAction::AdminAction)
                    .with_details(&json!({ "description": operation, "granted": false })),
            ),
            false,
        );
    }
}
