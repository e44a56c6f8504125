//! Custom error types for finguard
//!
//! This module defines the error hierarchy for the data protection core
//! using thiserror for ergonomic error definitions.

use thiserror::Error;

/// The main error type for finguard operations
#[derive(Error, Debug)]
pub enum GuardError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// The configured encryption key is missing or not exactly 32 bytes
    #[error("Key format error: {0}")]
    KeyFormat(String),

    /// The cryptographic provider rejected an encryption operation
    #[error("Encryption failed")]
    Encryption,

    /// Tag verification failed, malformed envelope, or non-numeric payload.
    /// Deliberately carries no cause: callers must not be able to tell
    /// tampering apart from corruption or a wrong key.
    #[error("Could not read this value")]
    Decryption,

    /// An access-policy predicate denied the attempted operation
    #[error("Not permitted: {operation}")]
    AuthorizationDenied {
        actor_id: String,
        operation: &'static str,
    },

    /// Consent gate: the data subject has not granted the required consent
    #[error("Consent required: {0}")]
    ConsentRequired(&'static str),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Validation errors for caller-supplied data
    #[error("Validation error: {0}")]
    Validation(String),

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Audit log write errors
    #[error("Audit error: {0}")]
    Audit(String),
}

impl GuardError {
    /// Create a "not found" error for financial records
    pub fn record_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Record",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for consent records
    pub fn consent_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "ConsentRecord",
            identifier: identifier.into(),
        }
    }

    /// Create an authorization denial for an actor/operation pair
    pub fn denied(actor_id: impl Into<String>, operation: &'static str) -> Self {
        Self::AuthorizationDenied {
            actor_id: actor_id.into(),
            operation,
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is an authorization denial
    pub fn is_denied(&self) -> bool {
        matches!(self, Self::AuthorizationDenied { .. })
    }

    /// Check if this is a decryption failure
    pub fn is_decryption(&self) -> bool {
        matches!(self, Self::Decryption)
    }
}

// Implement From traits for common error types

impl From<std::io::Error> for GuardError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for GuardError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for finguard operations
pub type GuardResult<T> = Result<T, GuardError>;
