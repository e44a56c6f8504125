//! CLI command handlers
//!
//! Bridges clap argument parsing with the service layer. Command output
//! goes to stdout; diagnostics go through the tracing subscriber set up
//! in main.

pub mod audit;
pub mod consent;
pub mod migrate;
pub mod record;

pub use audit::{handle_audit_command, AuditCommands};
pub use consent::{handle_consent_command, ConsentCommands};
pub use migrate::{handle_migrate_command, handle_verify_command};
pub use record::{handle_record_command, RecordCommands};

use std::sync::Arc;

use crate::audit::{ActorType, AuditLog};
use crate::config::{GuardPaths, Settings};
use crate::crypto::EncryptionKey;
use crate::error::GuardResult;
use crate::policy::{resolve_root_principal, AccessPolicy, Role};
use crate::services::{ConsentService, DataService};
use crate::storage::Storage;

/// Everything a command handler needs, loaded once at startup
pub struct AppContext {
    pub storage: Arc<Storage>,
    pub audit: Arc<AuditLog>,
    pub settings: Settings,
    pub root_principal: Option<String>,
}

impl AppContext {
    /// Load paths, settings, and storage
    pub fn load() -> GuardResult<Self> {
        let paths = GuardPaths::new()?;
        paths.ensure_directories()?;
        let settings = Settings::load_or_create(&paths)?;
        let root_principal = resolve_root_principal(settings.root_principal.as_deref());

        let storage = Arc::new(Storage::new(paths.clone())?);
        storage.load_all()?;
        let audit = Arc::new(AuditLog::new(paths.audit_log()));

        Ok(Self {
            storage,
            audit,
            settings,
            root_principal,
        })
    }

    /// Build the data service. Requires the encryption key.
    pub fn data_service(&self) -> GuardResult<DataService> {
        let key = EncryptionKey::from_env()?;
        Ok(DataService::new(
            Arc::clone(&self.storage),
            Arc::clone(&self.audit),
            key,
            self.root_principal.clone(),
            self.settings.audit_strict,
        ))
    }

    /// Build the consent service. No key needed: consent flags are not
    /// encrypted, only gated and audited.
    pub fn consent_service(&self) -> ConsentService {
        ConsentService::new(
            Arc::clone(&self.storage),
            Arc::clone(&self.audit),
            self.root_principal.clone(),
            self.settings.audit_strict,
            self.settings.consent_version.clone(),
        )
    }

    /// Map an actor to the actor type recorded in audit entries
    pub fn actor_type(&self, actor_id: &str) -> ActorType {
        let policy = AccessPolicy::new(self.root_principal.clone(), &self.storage.roles);
        match policy.role_of(actor_id) {
            Role::Admin | Role::Support => ActorType::Admin,
            Role::User => ActorType::User,
        }
    }
}
