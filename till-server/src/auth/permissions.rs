//! Permission checks backed by the role_permission table
//!
//! Rows are cached per role; role edits invalidate the `permissions:`
//! prefix so the next request sees the new matrix.

use shared::models::RolePermission;

use crate::auth::CurrentUser;
use crate::cache::{keys, ttl};
use crate::core::ServerState;
use crate::db::repository::role_permission;
use crate::utils::{AppError, AppResult};

/// Load the permission rows for a role, read-through cached.
pub async fn rows_for_role(state: &ServerState, role: &str) -> AppResult<Vec<RolePermission>> {
    let cache_key = keys::key(keys::PERMISSIONS, role);
    let rows = state
        .cache
        .get_or_set(&cache_key, ttl::MEDIUM, || async {
            role_permission::find_by_role(&state.db.pool, role).await
        })
        .await?;
    Ok(rows)
}

/// Check whether `user` may perform `action` on `resource`.
///
/// ADMIN always passes. Other roles consult the stored matrix; a missing
/// (role, resource) row denies.
pub async fn check(
    state: &ServerState,
    user: &CurrentUser,
    resource: &str,
    action: &str,
) -> AppResult<bool> {
    if user.is_admin() {
        return Ok(true);
    }

    let rows = rows_for_role(state, &user.role).await?;
    Ok(rows
        .iter()
        .find(|p| p.resource == resource)
        .is_some_and(|p| p.allows(action)))
}

/// Guard used at the top of handlers: `require(&state, &user, "items", "edit")`.
pub async fn require(
    state: &ServerState,
    user: &CurrentUser,
    resource: &str,
    action: &str,
) -> AppResult<()> {
    if check(state, user, resource, action).await? {
        return Ok(());
    }
    tracing::warn!(
        target: "security",
        user_id = user.id,
        role = %user.role,
        required = %format!("{resource}:{action}"),
        "Permission denied"
    );
    Err(AppError::forbidden(format!(
        "Permission denied: {resource}:{action}"
    )))
}

/// Admin guard for handlers on mixed routers where only some methods are
/// admin-only. Fully admin routers layer
/// [`crate::auth::middleware::require_admin`] instead.
pub fn require_admin_user(user: &CurrentUser) -> AppResult<()> {
    if user.is_admin() {
        return Ok(());
    }
    tracing::warn!(
        target: "security",
        user_id = user.id,
        role = %user.role,
        "Admin access denied"
    );
    Err(AppError::forbidden("Admin access required"))
}
