//! Role Permission Model (RBAC)
//!
//! One row per (role, resource) pair with per-action flags. `ADMIN`
//! bypasses the table entirely; rows exist for it only as visible defaults.

use serde::{Deserialize, Serialize};

/// Permission flags for one role on one resource
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct RolePermission {
    pub id: i64,
    pub role: String,
    pub resource: String,
    pub can_view: bool,
    pub can_create: bool,
    pub can_edit: bool,
    pub can_delete: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl RolePermission {
    /// Check an action name (`view`/`create`/`edit`/`delete`) against the flags
    pub fn allows(&self, action: &str) -> bool {
        match action {
            "view" => self.can_view,
            "create" => self.can_create,
            "edit" => self.can_edit,
            "delete" => self.can_delete,
            _ => false,
        }
    }
}

/// Upsert payload for one (role, resource) row
///
/// Absent flags keep their stored value when the row already exists and
/// default to `false` when a new row is created.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RolePermissionUpsert {
    pub role: String,
    pub resource: String,
    pub can_view: Option<bool>,
    pub can_create: Option<bool>,
    pub can_edit: Option<bool>,
    pub can_delete: Option<bool>,
}
