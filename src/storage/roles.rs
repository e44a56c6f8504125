//! Roles table repository
//!
//! The external roles lookup consulted by the access policy. Missing
//! entries are not an error: the policy resolves them to the default
//! role. The break-glass root principal is deliberately absent here.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::{GuardError, GuardResult};
use crate::policy::{Role, RoleSource};

use super::file_io::{read_json, write_json_atomic};

/// Serializable roles file layout
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct RoleData {
    roles: HashMap<String, Role>,
}

/// Repository for the user-id -> role table
pub struct RoleRepository {
    path: PathBuf,
    data: RwLock<HashMap<String, Role>>,
}

impl RoleRepository {
    /// Create a new role repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    /// Load roles from disk
    pub fn load(&self) -> GuardResult<()> {
        let file_data: RoleData = read_json(&self.path)?;

        let mut data = self
            .data
            .write()
            .map_err(|e| GuardError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        *data = file_data.roles;
        Ok(())
    }

    /// Save roles to disk
    pub fn save(&self) -> GuardResult<()> {
        let data = self
            .data
            .read()
            .map_err(|e| GuardError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        write_json_atomic(&self.path, &RoleData { roles: data.clone() })
    }

    /// Assign a role to a user
    pub fn set_role(&self, user_id: &str, role: Role) -> GuardResult<()> {
        let mut data = self
            .data
            .write()
            .map_err(|e| GuardError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.insert(user_id.to_string(), role);
        Ok(())
    }

    /// Remove a user's role entry
    pub fn clear_role(&self, user_id: &str) -> GuardResult<bool> {
        let mut data = self
            .data
            .write()
            .map_err(|e| GuardError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        Ok(data.remove(user_id).is_some())
    }
}

impl RoleSource for RoleRepository {
    fn lookup(&self, actor_id: &str) -> GuardResult<Option<Role>> {
        let data = self
            .data
            .read()
            .map_err(|e| GuardError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.get(actor_id).copied())
    }
}

impl RoleSource for &RoleRepository {
    fn lookup(&self, actor_id: &str) -> GuardResult<Option<Role>> {
        (**self).lookup(actor_id)
    }
}
