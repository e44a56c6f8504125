//! Consent record data structures
//!
//! One record per user, holding independent boolean consent flags. Two
//! primary flags (onboarding data, AI analysis) plus an optional
//! marketing flag; a user can hold any combination, so this is not a
//! single enum.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-user consent state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsentRecord {
    /// The data subject this record belongs to
    pub user_id: String,

    /// Consent to process onboarding financial data
    pub onboarding_data_consent: bool,

    /// Consent to run AI analysis over the user's data
    pub ai_analysis_consent: bool,

    /// Consent to marketing communication, if ever stated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marketing_consent: Option<bool>,

    /// Version of the consent text the user agreed to
    pub consent_version: String,

    /// When a primary flag last transitioned false -> true.
    /// Preserved across withdrawal for audit purposes.
    pub consented_at: DateTime<Utc>,

    /// When this record was last touched
    pub last_updated_at: DateTime<Utc>,

    /// Origin address of the last consent action, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,

    /// User agent of the last consent action, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl ConsentRecord {
    /// Whether either primary consent is currently granted
    pub fn any_primary_granted(&self) -> bool {
        self.onboarding_data_consent || self.ai_analysis_consent
    }
}

/// Partial update of consent flags.
///
/// Omitted flags are left untouched; this is the partial-update
/// semantics of the store.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ConsentUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub onboarding_data_consent: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_analysis_consent: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub marketing_consent: Option<bool>,
}

impl ConsentUpdate {
    /// An update that grants both primary consents
    pub fn grant_all() -> Self {
        Self {
            onboarding_data_consent: Some(true),
            ai_analysis_consent: Some(true),
            marketing_consent: None,
        }
    }

    /// True when the update carries no flags at all
    pub fn is_empty(&self) -> bool {
        self.onboarding_data_consent.is_none()
            && self.ai_analysis_consent.is_none()
            && self.marketing_consent.is_none()
    }
}

/// The before/after view of a consent mutation, computed atomically
/// inside the store. Callers use it to write the paired audit entries.
#[derive(Debug, Clone)]
pub struct ConsentChange {
    /// State before the mutation; None when the record was created
    pub before: Option<ConsentRecord>,
    /// State after the mutation
    pub after: ConsentRecord,
}

impl ConsentChange {
    /// Whether this change granted a primary consent (false -> true)
    pub fn granted_primary(&self) -> bool {
        let before_onboarding = self.before.as_ref().map(|r| r.onboarding_data_consent);
        let before_ai = self.before.as_ref().map(|r| r.ai_analysis_consent);
        (before_onboarding != Some(true) && self.after.onboarding_data_consent)
            || (before_ai != Some(true) && self.after.ai_analysis_consent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(onboarding: bool, ai: bool) -> ConsentRecord {
        ConsentRecord {
            user_id: "user-1".into(),
            onboarding_data_consent: onboarding,
            ai_analysis_consent: ai,
            marketing_consent: None,
            consent_version: "1.0".into(),
            consented_at: Utc::now(),
            last_updated_at: Utc::now(),
            ip_address: None,
            user_agent: None,
        }
    }

    #[test]
    fn test_any_primary_granted() {
        assert!(record(true, false).any_primary_granted());
        assert!(record(false, true).any_primary_granted());
        assert!(!record(false, false).any_primary_granted());
    }

    #[test]
    fn test_update_is_empty() {
        assert!(ConsentUpdate::default().is_empty());
        assert!(!ConsentUpdate::grant_all().is_empty());
    }

    #[test]
    fn test_granted_primary_detects_transition() {
        let change = ConsentChange {
            before: Some(record(false, false)),
            after: record(false, true),
        };
        assert!(change.granted_primary());

        let no_change = ConsentChange {
            before: Some(record(true, true)),
            after: record(true, true),
        };
        assert!(!no_change.granted_primary());

        let created = ConsentChange {
            before: None,
            after: record(true, false),
        };
        assert!(created.granted_primary());
    }
}
