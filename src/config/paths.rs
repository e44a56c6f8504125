//! Path management for finguard
//!
//! Resolves the directories that hold protected data, the audit log,
//! and configuration.
//!
//! ## Path Resolution Order
//!
//! 1. `FINGUARD_DATA_DIR` environment variable (if set)
//! 2. The platform config directory (`~/.config/finguard` on Unix,
//!    `%APPDATA%\finguard` on Windows) via the `directories` crate

use std::path::PathBuf;

use directories::ProjectDirs;

use crate::error::GuardError;

/// Manages all paths used by finguard
#[derive(Debug, Clone)]
pub struct GuardPaths {
    base_dir: PathBuf,
}

impl GuardPaths {
    /// Create a new GuardPaths instance
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined.
    pub fn new() -> Result<Self, GuardError> {
        let base_dir = if let Ok(custom) = std::env::var("FINGUARD_DATA_DIR") {
            PathBuf::from(custom)
        } else {
            let dirs = ProjectDirs::from("", "", "finguard").ok_or_else(|| {
                GuardError::Config("Could not determine a config directory".into())
            })?;
            dirs.config_dir().to_path_buf()
        };

        Ok(Self { base_dir })
    }

    /// Create GuardPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the data directory
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Get the path to the append-only audit log
    pub fn audit_log(&self) -> PathBuf {
        self.base_dir.join("audit.log")
    }

    /// Get the path to the financial profile documents
    pub fn records_file(&self) -> PathBuf {
        self.data_dir().join("records.json")
    }

    /// Get the path to the roles table
    pub fn roles_file(&self) -> PathBuf {
        self.data_dir().join("roles.json")
    }

    /// Get the path to the consent records
    pub fn consent_file(&self) -> PathBuf {
        self.data_dir().join("consent.json")
    }

    /// Ensure all required directories exist
    pub fn ensure_directories(&self) -> Result<(), GuardError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| GuardError::Io(format!("Failed to create base directory: {}", e)))?;

        std::fs::create_dir_all(self.data_dir())
            .map_err(|e| GuardError::Io(format!("Failed to create data directory: {}", e)))?;

        Ok(())
    }

    /// Check if finguard has been initialized (config file exists)
    pub fn is_initialized(&self) -> bool {
        self.settings_file().exists()
    }
}
