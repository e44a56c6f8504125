//! Consent operations with audit pairing
//!
//! The consent store mutates flags; this service gates who may do it and
//! writes the paired audit entries. It also answers the one question the
//! rest of the application asks before running any AI feature: has this
//! user consented to AI analysis?

use std::sync::Arc;

use crate::audit::{AuditAction, AuditLog};
use crate::consent::{ConsentChange, ConsentRecord, ConsentUpdate};
use crate::error::{GuardError, GuardResult};
use crate::policy::AccessPolicy;
use crate::storage::{RoleRepository, Storage};

/// Consent lifecycle operations
pub struct ConsentService {
    storage: Arc<Storage>,
    audit: Arc<AuditLog>,
    root_principal: Option<String>,
    audit_strict: bool,
    consent_version: String,
}

impl ConsentService {
    /// Create a consent service using the given consent text version
    pub fn new(
        storage: Arc<Storage>,
        audit: Arc<AuditLog>,
        root_principal: Option<String>,
        audit_strict: bool,
        consent_version: String,
    ) -> Self {
        Self {
            storage,
            audit,
            root_principal,
            audit_strict,
            consent_version,
        }
    }

    fn policy(&self) -> AccessPolicy<&RoleRepository> {
        AccessPolicy::new(self.root_principal.clone(), &self.storage.roles)
    }

    /// Read a user's consent flags
    pub fn get_flags(&self, user_id: &str) -> GuardResult<Option<ConsentRecord>> {
        self.storage.consent.get_flags(user_id)
    }

    /// Apply a partial consent update on behalf of the data subject.
    ///
    /// Consent is personal: only the subject may state it, no role
    /// bypasses that. Every changed flag gets its own audit entry so the
    /// trail records each before/after boolean.
    pub fn update_consent(
        &self,
        actor_id: &str,
        user_id: &str,
        update: ConsentUpdate,
        ip: Option<String>,
        user_agent: Option<String>,
    ) -> GuardResult<ConsentRecord> {
        if !self.policy().can_modify(actor_id, user_id) {
            return Err(GuardError::denied(actor_id, "update_consent"));
        }
        if update.is_empty() {
            return Err(GuardError::Validation("consent update carries no flags".into()));
        }

        let change = self.storage.consent.update(
            user_id,
            update,
            &self.consent_version,
            ip.clone(),
            user_agent.clone(),
        )?;

        self.audit_flag_changes(actor_id, user_id, &change, ip, user_agent)?;

        Ok(change.after)
    }

    /// Withdraw all consent for a user.
    ///
    /// One audit entry covers the withdrawal; the store preserves the
    /// original consent timestamp and version.
    pub fn withdraw_consent(
        &self,
        actor_id: &str,
        user_id: &str,
        ip: Option<String>,
        user_agent: Option<String>,
    ) -> GuardResult<ConsentRecord> {
        if !self.policy().can_modify(actor_id, user_id) {
            return Err(GuardError::denied(actor_id, "withdraw_consent"));
        }

        let change = self
            .storage
            .consent
            .withdraw_all(user_id, ip.clone(), user_agent.clone())?;

        let before_any = change
            .before
            .as_ref()
            .map(|r| r.any_primary_granted())
            .unwrap_or(false);

        super::report_audit(
            self.audit.log_consent_change(
                actor_id,
                user_id,
                AuditAction::ConsentWithdrawn,
                "all",
                Some(before_any),
                false,
                ip,
                user_agent,
            ),
            self.audit_strict,
        )?;

        Ok(change.after)
    }

    /// Whether AI analysis may run over this user's data at all
    pub fn ai_analysis_allowed(&self, user_id: &str) -> GuardResult<bool> {
        Ok(self
            .storage
            .consent
            .get_flags(user_id)?
            .map(|r| r.ai_analysis_consent)
            .unwrap_or(false))
    }

    /// Gate an AI feature: errors unless consent is granted, and records
    /// the use when it is.
    pub fn require_ai_consent(&self, user_id: &str, feature: &str) -> GuardResult<()> {
        if !self.ai_analysis_allowed(user_id)? {
            return Err(GuardError::ConsentRequired("ai_analysis"));
        }

        super::report_audit(self.audit.log_ai_analysis(user_id, feature), self.audit_strict)
    }

    fn audit_flag_changes(
        &self,
        actor_id: &str,
        user_id: &str,
        change: &ConsentChange,
        ip: Option<String>,
        user_agent: Option<String>,
    ) -> GuardResult<()> {
        let before = change.before.as_ref();
        let after = &change.after;

        let flags: [(&str, Option<bool>, Option<bool>); 3] = [
            (
                "onboarding_data",
                before.map(|r| r.onboarding_data_consent),
                Some(after.onboarding_data_consent),
            ),
            (
                "ai_analysis",
                before.map(|r| r.ai_analysis_consent),
                Some(after.ai_analysis_consent),
            ),
            (
                "marketing",
                before.and_then(|r| r.marketing_consent),
                after.marketing_consent,
            ),
        ];

        for (consent_type, was, now) in flags {
            let Some(now) = now else { continue };
            if was == Some(now) {
                continue;
            }

            let action = if now {
                AuditAction::ConsentGiven
            } else {
                AuditAction::ConsentUpdated
            };

            super::report_audit(
                self.audit.log_consent_change(
                    actor_id,
                    user_id,
                    action,
                    consent_type,
                    was,
                    now,
                    ip.clone(),
                    user_agent.clone(),
                ),
                self.audit_strict,
            )?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::GuardPaths;
    use tempfile::TempDir;

    fn create_service() -> (ConsentService, Arc<AuditLog>, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let paths = GuardPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Arc::new(Storage::new(paths.clone()).unwrap());
        storage.load_all().unwrap();
        let audit = Arc::new(AuditLog::new(paths.audit_log()));
        let service = ConsentService::new(
            Arc::clone(&storage),
            Arc::clone(&audit),
            None,
            false,
            "1.0".to_string(),
        );
        (service, audit, temp_dir)
    }

    #[test]
    fn test_grant_writes_consent_given_entries() {
        let (service, audit, _temp) = create_service();

        service
            .update_consent("user-1", "user-1", ConsentUpdate::grant_all(), None, None)
            .unwrap();

        let given = audit.for_action(AuditAction::ConsentGiven).unwrap();
        assert_eq!(given.len(), 2); // onboarding_data and ai_analysis
        for entry in &given {
            let details: serde_json::Value =
                serde_json::from_str(entry.details.as_ref().unwrap()).unwrap();
            assert_eq!(details["after"], true);
        }
    }

    #[test]
    fn test_unchanged_flags_not_audited() {
        let (service, audit, _temp) = create_service();
        service
            .update_consent("user-1", "user-1", ConsentUpdate::grant_all(), None, None)
            .unwrap();

        // Granting again changes nothing, so no new entries appear
        let before_count = audit.entry_count().unwrap();
        service
            .update_consent("user-1", "user-1", ConsentUpdate::grant_all(), None, None)
            .unwrap();
        assert_eq!(audit.entry_count().unwrap(), before_count);
    }

    #[test]
    fn test_other_actor_cannot_change_consent() {
        let (service, _audit, _temp) = create_service();
        let result = service.update_consent(
            "user-2",
            "user-1",
            ConsentUpdate::grant_all(),
            None,
            None,
        );
        assert!(matches!(result, Err(GuardError::AuthorizationDenied { .. })));
    }

    #[test]
    fn test_empty_update_rejected() {
        let (service, _audit, _temp) = create_service();
        let result =
            service.update_consent("user-1", "user-1", ConsentUpdate::default(), None, None);
        assert!(matches!(result, Err(GuardError::Validation(_))));
    }

    #[test]
    fn test_withdraw_writes_single_entry() {
        let (service, audit, _temp) = create_service();
        service
            .update_consent("user-1", "user-1", ConsentUpdate::grant_all(), None, None)
            .unwrap();

        let record = service
            .withdraw_consent("user-1", "user-1", None, None)
            .unwrap();
        assert!(!record.any_primary_granted());

        let withdrawn = audit.for_action(AuditAction::ConsentWithdrawn).unwrap();
        assert_eq!(withdrawn.len(), 1);
        assert_eq!(withdrawn[0].target_user_id, "user-1");
    }

    #[test]
    fn test_ai_gate() {
        let (service, audit, _temp) = create_service();

        // No consent record at all: gate closed
        assert!(!service.ai_analysis_allowed("user-1").unwrap());
        let result = service.require_ai_consent("user-1", "spending_insights");
        assert!(matches!(result, Err(GuardError::ConsentRequired(_))));

        service
            .update_consent(
                "user-1",
                "user-1",
                ConsentUpdate {
                    ai_analysis_consent: Some(true),
                    ..Default::default()
                },
                None,
                None,
            )
            .unwrap();

        assert!(service.ai_analysis_allowed("user-1").unwrap());
        service.require_ai_consent("user-1", "spending_insights").unwrap();

        let uses = audit.for_action(AuditAction::AiAnalysisUsed).unwrap();
        assert_eq!(uses.len(), 1);
    }

    #[test]
    fn test_withdrawal_preserved_after_regrant_gate() {
        let (service, _audit, _temp) = create_service();
        service
            .update_consent("user-1", "user-1", ConsentUpdate::grant_all(), None, None)
            .unwrap();
        service.withdraw_consent("user-1", "user-1", None, None).unwrap();

        assert!(!service.ai_analysis_allowed("user-1").unwrap());
    }
}
