//! Audit entry data structures
//!
//! Defines the immutable audit log entry: who did what to whose data,
//! with a closed action vocabulary and a sanitized details payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum length kept of a details payload that is not valid JSON
pub const MAX_DETAILS_LEN: usize = 500;

/// The closed set of auditable actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    DataAccess,
    DataExport,
    DataDeletionSoft,
    DataDeletionHard,
    ConsentGiven,
    ConsentWithdrawn,
    ConsentUpdated,
    AdminAction,
    ProfileUpdated,
    AiAnalysisUsed,
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AuditAction::DataAccess => "data_access",
            AuditAction::DataExport => "data_export",
            AuditAction::DataDeletionSoft => "data_deletion_soft",
            AuditAction::DataDeletionHard => "data_deletion_hard",
            AuditAction::ConsentGiven => "consent_given",
            AuditAction::ConsentWithdrawn => "consent_withdrawn",
            AuditAction::ConsentUpdated => "consent_updated",
            AuditAction::AdminAction => "admin_action",
            AuditAction::ProfileUpdated => "profile_updated",
            AuditAction::AiAnalysisUsed => "ai_analysis_used",
        };
        write!(f, "{}", name)
    }
}

/// Kind of principal performing an audited action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActorType {
    User,
    Admin,
    System,
}

impl std::fmt::Display for ActorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActorType::User => write!(f, "user"),
            ActorType::Admin => write!(f, "admin"),
            ActorType::System => write!(f, "system"),
        }
    }
}

/// A single immutable audit log entry
///
/// Once written, an entry is never updated or deleted by any code path in
/// this crate: the log API exposes no mutation surface. The timestamp is
/// assigned by the log at write time, never supplied by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Unique entry identifier
    pub id: Uuid,

    /// Who performed the action
    pub actor_id: String,

    /// What kind of principal the actor is
    pub actor_type: ActorType,

    /// Whose data the action concerned
    pub target_user_id: String,

    /// What was done
    pub action: AuditAction,

    /// Sanitized free-form detail payload (JSON string)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,

    /// Resource type the action touched (e.g. "financial_profile")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,

    /// Identifier of the touched resource
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,

    /// When the entry was written (UTC, assigned by the log)
    pub timestamp: DateTime<Utc>,

    /// Request origin address, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,

    /// Request user agent, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

/// An audit entry as submitted by a caller: everything but the id and
/// timestamp, which the log assigns at write time.
#[derive(Debug, Clone)]
pub struct AuditDraft {
    pub actor_id: String,
    pub actor_type: ActorType,
    pub target_user_id: String,
    pub action: AuditAction,
    pub details: Option<String>,
    pub resource_type: Option<String>,
    pub resource_id: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl AuditDraft {
    /// Create a draft with the required fields
    pub fn new(
        actor_id: impl Into<String>,
        actor_type: ActorType,
        target_user_id: impl Into<String>,
        action: AuditAction,
    ) -> Self {
        Self {
            actor_id: actor_id.into(),
            actor_type,
            target_user_id: target_user_id.into(),
            action,
            details: None,
            resource_type: None,
            resource_id: None,
            ip_address: None,
            user_agent: None,
        }
    }

    /// Attach a structured details payload
    pub fn with_details(mut self, details: &serde_json::Value) -> Self {
        self.details = Some(details.to_string());
        self
    }

    /// Attach a raw details string (sanitized at write time)
    pub fn with_details_raw(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Attach the touched resource
    pub fn with_resource(
        mut self,
        resource_type: impl Into<String>,
        resource_id: impl Into<String>,
    ) -> Self {
        self.resource_type = Some(resource_type.into());
        self.resource_id = Some(resource_id.into());
        self
    }

    /// Attach request origin metadata
    pub fn with_origin(mut self, ip: Option<String>, user_agent: Option<String>) -> Self {
        self.ip_address = ip;
        self.user_agent = user_agent;
        self
    }
}

/// Sanitize a details payload before it is written.
///
/// Valid JSON is re-serialized, which normalizes it and drops anything
/// non-representable. Anything else is truncated rather than rejected:
/// losing the audit record is worse than losing detail fidelity.
pub fn sanitize_details(details: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(details) {
        Ok(value) => value.to_string(),
        Err(_) => {
            let mut truncated: String = details.chars().take(MAX_DETAILS_LEN).collect();
            if truncated.len() < details.len() {
                truncated.push_str("...");
            }
            truncated
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_action_serde_tokens() {
        let json = serde_json::to_string(&AuditAction::DataDeletionSoft).unwrap();
        assert_eq!(json, "\"data_deletion_soft\"");
        let back: AuditAction = serde_json::from_str("\"consent_given\"").unwrap();
        assert_eq!(back, AuditAction::ConsentGiven);
    }

    #[test]
    fn test_action_display_matches_serde() {
        for action in [
            AuditAction::DataAccess,
            AuditAction::DataExport,
            AuditAction::DataDeletionSoft,
            AuditAction::DataDeletionHard,
            AuditAction::ConsentGiven,
            AuditAction::ConsentWithdrawn,
            AuditAction::ConsentUpdated,
            AuditAction::AdminAction,
            AuditAction::ProfileUpdated,
            AuditAction::AiAnalysisUsed,
        ] {
            let serde_token = serde_json::to_string(&action).unwrap();
            assert_eq!(serde_token, format!("\"{}\"", action));
        }
    }

    #[test]
    fn test_draft_builder() {
        let draft = AuditDraft::new("user-1", ActorType::User, "user-1", AuditAction::DataAccess)
            .with_details(&json!({"fields": ["monthly_income"]}))
            .with_resource("financial_profile", "user-1")
            .with_origin(Some("10.0.0.1".into()), None);

        assert_eq!(draft.actor_id, "user-1");
        assert_eq!(draft.resource_type.as_deref(), Some("financial_profile"));
        assert_eq!(draft.ip_address.as_deref(), Some("10.0.0.1"));
        assert!(draft.user_agent.is_none());
    }

    #[test]
    fn test_sanitize_valid_json_normalized() {
        let sanitized = sanitize_details("{ \"a\" :  1 }");
        assert_eq!(sanitized, "{\"a\":1}");
    }

    #[test]
    fn test_sanitize_invalid_json_truncated() {
        let long = "x".repeat(2000);
        let sanitized = sanitize_details(&long);
        assert_eq!(sanitized.len(), MAX_DETAILS_LEN + 3);
        assert!(sanitized.ends_with("..."));
    }

    #[test]
    fn test_sanitize_short_invalid_untouched() {
        assert_eq!(sanitize_details("plain note"), "plain note");
    }
}
