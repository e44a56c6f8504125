//! Storage layer for finguard
//!
//! JSON file persistence with atomic writes: profile documents, the
//! roles table, and consent records, coordinated by [`Storage`]. Each
//! record is addressed by user id and updated read-modify-write under
//! that key, so cross-user contention does not occur by construction.

pub mod file_io;
pub mod records;
pub mod roles;
pub mod value;

pub use file_io::{read_json, write_json_atomic};
pub use records::RecordRepository;
pub use roles::RoleRepository;
pub use value::StoredValue;

use crate::config::paths::GuardPaths;
use crate::consent::ConsentStore;
use crate::error::GuardResult;

/// Main storage coordinator providing access to all repositories
pub struct Storage {
    paths: GuardPaths,
    pub records: RecordRepository,
    pub roles: RoleRepository,
    pub consent: ConsentStore,
}

impl Storage {
    /// Create a new Storage instance
    pub fn new(paths: GuardPaths) -> GuardResult<Self> {
        paths.ensure_directories()?;

        Ok(Self {
            records: RecordRepository::new(paths.records_file()),
            roles: RoleRepository::new(paths.roles_file()),
            consent: ConsentStore::new(paths.consent_file()),
            paths,
        })
    }

    /// Get the paths configuration
    pub fn paths(&self) -> &GuardPaths {
        &self.paths
    }

    /// Load all data from disk
    pub fn load_all(&self) -> GuardResult<()> {
        self.records.load()?;
        self.roles.load()?;
        self.consent.load()?;
        Ok(())
    }

    /// Save the repositories that are not write-through
    pub fn save_all(&self) -> GuardResult<()> {
        self.records.save()?;
        self.roles.save()?;
        Ok(())
    }
}
