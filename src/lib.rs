//! finguard - Financial data protection core
//!
//! This library is the data-protection core of a personal-finance
//! application: it decides what gets encrypted, how it is encrypted, who
//! may decrypt it, whether the data subject has consented to its use,
//! and what gets written to an append-only audit trail.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `classify`: field-name to sensitivity-tier classification
//! - `crypto`: AES-256-GCM field cipher and the object codec
//! - `masking`: log redaction for sensitive values
//! - `consent`: per-user consent flag lifecycle
//! - `audit`: append-only audit logging
//! - `policy`: role-based access predicates
//! - `storage`: JSON document store with atomic writes
//! - `services`: policy + codec + audit glue for each operation
//! - `migrate`: encryption migration and verification sweeps
//! - `config`: configuration and path management
//! - `error`: custom error types
//!
//! # Example
//!
//! ```rust,ignore
//! use finguard::config::{GuardPaths, Settings};
//! use finguard::crypto::EncryptionKey;
//!
//! let paths = GuardPaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! let key = EncryptionKey::from_env()?;
//! ```

pub mod audit;
pub mod classify;
pub mod cli;
pub mod config;
pub mod consent;
pub mod crypto;
pub mod error;
pub mod masking;
pub mod migrate;
pub mod policy;
pub mod services;
pub mod storage;

pub use error::{GuardError, GuardResult};
