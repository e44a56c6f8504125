//! Settings for finguard
//!
//! Persistent configuration: the break-glass root principal, the audit
//! strictness policy, and the consent text version currently in force.

use serde::{Deserialize, Serialize};

use super::paths::GuardPaths;
use crate::error::GuardError;
use crate::storage::file_io::{read_json, write_json_atomic};

fn default_schema_version() -> u32 {
    1
}

fn default_consent_version() -> String {
    "1.0".to_string()
}

/// Persistent settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// The break-glass admin identity. Resolved once at startup, checked
    /// before any roles lookup, and kept out of the roles table. The
    /// FINGUARD_ROOT_PRINCIPAL environment variable overrides this.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_principal: Option<String>,

    /// When true, a failed audit write fails the operation it records.
    /// When false (the default), audit writes are best-effort and a
    /// failure is logged through the masker instead.
    #[serde(default)]
    pub audit_strict: bool,

    /// Version of the consent text currently presented to users
    #[serde(default = "default_consent_version")]
    pub consent_version: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            root_principal: None,
            audit_strict: false,
            consent_version: default_consent_version(),
        }
    }
}

impl Settings {
    /// Load settings, creating the file with defaults if absent
    pub fn load_or_create(paths: &GuardPaths) -> Result<Self, GuardError> {
        if paths.settings_file().exists() {
            read_json(paths.settings_file())
        } else {
            let settings = Self::default();
            settings.save(paths)?;
            Ok(settings)
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &GuardPaths) -> Result<(), GuardError> {
        write_json_atomic(paths.settings_file(), self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.schema_version, 1);
        assert!(settings.root_principal.is_none());
        assert!(!settings.audit_strict);
        assert_eq!(settings.consent_version, "1.0");
    }

    #[test]
    fn test_load_or_create_writes_file() {
        let temp_dir = TempDir::new().unwrap();
        let paths = GuardPaths::with_base_dir(temp_dir.path().to_path_buf());
        paths.ensure_directories().unwrap();

        assert!(!paths.is_initialized());
        let settings = Settings::load_or_create(&paths).unwrap();
        assert!(paths.is_initialized());
        assert_eq!(settings.schema_version, 1);
    }

    #[test]
    fn test_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let paths = GuardPaths::with_base_dir(temp_dir.path().to_path_buf());
        paths.ensure_directories().unwrap();

        let settings = Settings {
            root_principal: Some("root-0".into()),
            audit_strict: true,
            consent_version: "2.0".into(),
            ..Default::default()
        };
        settings.save(&paths).unwrap();

        let loaded = Settings::load_or_create(&paths).unwrap();
        assert_eq!(loaded.root_principal.as_deref(), Some("root-0"));
        assert!(loaded.audit_strict);
        assert_eq!(loaded.consent_version, "2.0");
    }
}
