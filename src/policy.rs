//! Role-based access policy
//!
//! Resolves a role for an actor and answers can-access / can-view-raw /
//! can-modify questions for an (actor, target) pair. Roles are derived
//! at call time, never cached: an actor's role is a pure function of
//! identity plus the roles table.
//!
//! The core privacy invariant is the two-tier check: staff roles may
//! reach a user's record (`can_access`) without ever being able to see
//! plaintext financial values (`can_view_raw`). Support operations work
//! on encrypted envelopes.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::GuardResult;

/// Environment variable naming the break-glass root principal
pub const ROOT_PRINCIPAL_ENV_VAR: &str = "FINGUARD_ROOT_PRINCIPAL";

/// An actor's role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
    Support,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Admin => write!(f, "admin"),
            Role::Support => write!(f, "support"),
        }
    }
}

/// The external roles lookup the policy consults after the root check.
///
/// Implemented by the roles repository; a test double can stand in.
pub trait RoleSource {
    /// Look up an actor's stored role, None when no record exists
    fn lookup(&self, actor_id: &str) -> GuardResult<Option<Role>>;
}

/// Access policy over a configured root principal and a roles source
pub struct AccessPolicy<S: RoleSource> {
    root_principal: Option<String>,
    roles: S,
}

impl<S: RoleSource> AccessPolicy<S> {
    /// Create a policy.
    ///
    /// The root principal is the break-glass admin identity, configured
    /// at startup and checked before any roles lookup. It must not also
    /// live in the roles table: admin access cannot depend on the very
    /// store it is meant to audit.
    pub fn new(root_principal: Option<String>, roles: S) -> Self {
        Self {
            root_principal,
            roles,
        }
    }

    /// Resolve an actor's role.
    ///
    /// The root principal is admin unconditionally. Everyone else
    /// resolves through the roles source; a missing record or a failed
    /// lookup resolves to the least-privileged role.
    pub fn role_of(&self, actor_id: &str) -> Role {
        if self
            .root_principal
            .as_deref()
            .is_some_and(|root| root == actor_id)
        {
            return Role::Admin;
        }
        match self.roles.lookup(actor_id) {
            Ok(Some(role)) => role,
            Ok(None) | Err(_) => Role::User,
        }
    }

    /// May the actor reach the target's record at all?
    ///
    /// Self-access is always allowed; staff may reach any record. This
    /// says nothing about raw-value visibility.
    pub fn can_access(&self, actor_id: &str, target_id: &str) -> bool {
        actor_id == target_id || matches!(self.role_of(actor_id), Role::Admin | Role::Support)
    }

    /// May the actor see the target's plaintext financial values?
    ///
    /// Only the data subject. No role bypasses this.
    pub fn can_view_raw(&self, actor_id: &str, target_id: &str) -> bool {
        actor_id == target_id
    }

    /// May the actor modify the target's record? Self only.
    pub fn can_modify(&self, actor_id: &str, target_id: &str) -> bool {
        actor_id == target_id
    }
}

/// Resolve the configured root principal: environment first, then the
/// settings value. Returns None when neither is set (no break-glass
/// identity exists).
pub fn resolve_root_principal(configured: Option<&str>) -> Option<String> {
    std::env::var(ROOT_PRINCIPAL_ENV_VAR)
        .ok()
        .filter(|v| !v.is_empty())
        .or_else(|| configured.map(str::to_string))
}
