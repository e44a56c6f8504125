//! Append-only audit log
//!
//! Writes audit entries to a line-delimited JSON file, one entry per
//! line, flushed on every write. The API surface is append and read:
//! there is deliberately no update or delete method, so immutability is
//! enforced structurally rather than by convention.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;

use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use crate::error::{GuardError, GuardResult};

use super::entry::{sanitize_details, ActorType, AuditAction, AuditDraft, AuditEntry};

/// Append-only record of who did what to whose data
pub struct AuditLog {
    log_path: PathBuf,
}

impl AuditLog {
    /// Create an AuditLog that appends to the given file
    pub fn new(log_path: PathBuf) -> Self {
        Self { log_path }
    }

    /// Record an entry.
    ///
    /// The timestamp and entry id are assigned here, unconditionally;
    /// caller-supplied timestamps are impossible by construction. The
    /// details payload is sanitized before the write. Returns the new
    /// entry's id.
    pub fn record(&self, draft: AuditDraft) -> GuardResult<Uuid> {
        let entry = AuditEntry {
            id: Uuid::new_v4(),
            actor_id: draft.actor_id,
            actor_type: draft.actor_type,
            target_user_id: draft.target_user_id,
            action: draft.action,
            details: draft.details.as_deref().map(sanitize_details),
            resource_type: draft.resource_type,
            resource_id: draft.resource_id,
            timestamp: Utc::now(),
            ip_address: draft.ip_address,
            user_agent: draft.user_agent,
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .map_err(|e| GuardError::Audit(format!("Failed to open audit log: {}", e)))?;

        let line = serde_json::to_string(&entry)
            .map_err(|e| GuardError::Audit(format!("Failed to serialize audit entry: {}", e)))?;

        writeln!(file, "{}", line)
            .map_err(|e| GuardError::Audit(format!("Failed to write audit entry: {}", e)))?;

        file.flush()
            .map_err(|e| GuardError::Audit(format!("Failed to flush audit log: {}", e)))?;

        Ok(entry.id)
    }

    /// Read all entries in chronological order (oldest first)
    pub fn read_all(&self) -> GuardResult<Vec<AuditEntry>> {
        if !self.log_path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.log_path)
            .map_err(|e| GuardError::Audit(format!("Failed to open audit log: {}", e)))?;

        let reader = BufReader::new(file);
        let mut entries = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| {
                GuardError::Audit(format!("Failed to read audit log line {}: {}", line_num + 1, e))
            })?;

            if line.trim().is_empty() {
                continue;
            }

            let entry: AuditEntry = serde_json::from_str(&line).map_err(|e| {
                GuardError::Audit(format!(
                    "Failed to parse audit entry at line {}: {}",
                    line_num + 1,
                    e
                ))
            })?;

            entries.push(entry);
        }

        Ok(entries)
    }

    /// Read the most recent N entries
    pub fn read_recent(&self, count: usize) -> GuardResult<Vec<AuditEntry>> {
        let all = self.read_all()?;
        let start = all.len().saturating_sub(count);
        Ok(all[start..].to_vec())
    }

    /// Entries performed by a given actor
    pub fn for_actor(&self, actor_id: &str) -> GuardResult<Vec<AuditEntry>> {
        Ok(self
            .read_all()?
            .into_iter()
            .filter(|e| e.actor_id == actor_id)
            .collect())
    }

    /// Entries concerning a given target user
    pub fn for_target(&self, target_user_id: &str) -> GuardResult<Vec<AuditEntry>> {
        Ok(self
            .read_all()?
            .into_iter()
            .filter(|e| e.target_user_id == target_user_id)
            .collect())
    }

    /// Entries of a given action kind
    pub fn for_action(&self, action: AuditAction) -> GuardResult<Vec<AuditEntry>> {
        Ok(self
            .read_all()?
            .into_iter()
            .filter(|e| e.action == action)
            .collect())
    }

    /// Number of entries in the log
    pub fn entry_count(&self) -> GuardResult<usize> {
        if !self.log_path.exists() {
            return Ok(0);
        }

        let file = File::open(&self.log_path)
            .map_err(|e| GuardError::Audit(format!("Failed to open audit log: {}", e)))?;

        let reader = BufReader::new(file);
        Ok(reader.lines().filter(|l| l.is_ok()).count())
    }

    /// Check if the audit log file exists
    pub fn exists(&self) -> bool {
        self.log_path.exists()
    }

    /// Path to the log file
    pub fn path(&self) -> &PathBuf {
        &self.log_path
    }

    // Typed wrappers. These fix the action value and the shape of the
    // details payload so call sites cannot drift into ad hoc schemas.

    /// Record a read of a user's protected data
    pub fn log_data_access(
        &self,
        actor_id: &str,
        actor_type: ActorType,
        target_user_id: &str,
        fields: &[&str],
        granted: bool,
    ) -> GuardResult<Uuid> {
        let draft = AuditDraft::new(actor_id, actor_type, target_user_id, AuditAction::DataAccess)
            .with_details(&json!({"fields": fields, "granted": granted}))
            .with_resource("financial_profile", target_user_id);
        self.record(draft)
    }

    /// Record a consent flag change with its before/after booleans
    #[allow(clippy::too_many_arguments)]
    pub fn log_consent_change(
        &self,
        actor_id: &str,
        target_user_id: &str,
        action: AuditAction,
        consent_type: &str,
        before: Option<bool>,
        after: bool,
        ip: Option<String>,
        user_agent: Option<String>,
    ) -> GuardResult<Uuid> {
        let draft = AuditDraft::new(actor_id, ActorType::User, target_user_id, action)
            .with_details(&json!({
                "consent_type": consent_type,
                "before": before,
                "after": after,
            }))
            .with_resource("consent_record", target_user_id)
            .with_origin(ip, user_agent);
        self.record(draft)
    }

    /// Record a soft or hard deletion of a user's data
    pub fn log_data_deletion(
        &self,
        actor_id: &str,
        actor_type: ActorType,
        target_user_id: &str,
        hard: bool,
        reason: Option<&str>,
    ) -> GuardResult<Uuid> {
        let action = if hard {
            AuditAction::DataDeletionHard
        } else {
            AuditAction::DataDeletionSoft
        };
        let draft = AuditDraft::new(actor_id, actor_type, target_user_id, action)
            .with_details(&json!({"reason": reason}))
            .with_resource("financial_profile", target_user_id);
        self.record(draft)
    }

    /// Record a privileged administrative action
    pub fn log_admin_action(
        &self,
        admin_id: &str,
        target_user_id: &str,
        description: &str,
        details: &serde_json::Value,
    ) -> GuardResult<Uuid> {
        let draft = AuditDraft::new(admin_id, ActorType::Admin, target_user_id, AuditAction::AdminAction)
            .with_details(&json!({"description": description, "context": details}));
        self.record(draft)
    }

    /// Record a use of AI analysis over a user's data
    pub fn log_ai_analysis(&self, user_id: &str, feature: &str) -> GuardResult<Uuid> {
        let draft = AuditDraft::new(user_id, ActorType::System, user_id, AuditAction::AiAnalysisUsed)
            .with_details(&json!({"feature": feature}));
        self.record(draft)
    }
}
