//! Auth API handlers

use std::time::Duration;

use axum::{
    Extension, Json,
    extract::State,
    http::HeaderMap,
};
use serde::{Deserialize, Serialize};
use shared::models::User;

use crate::api::{MessageResponse, client_ip};
use crate::audit::AuditAction;
use crate::audit_log;
use crate::auth::{CurrentUser, permissions, verify_password};
use crate::core::ServerState;
use crate::db::repository::{role_permission, user};
use crate::utils::{AppError, AppResult};

/// Fixed delay applied to every login attempt so response timing does not
/// reveal whether the email exists.
const AUTH_FIXED_DELAY_MS: u64 = 500;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: User,
}

/// Permission row as served to clients (no row id, no timestamps).
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionEntry {
    pub resource: String,
    pub can_view: bool,
    pub can_create: bool,
    pub can_edit: bool,
    pub can_delete: bool,
}

/// POST /api/auth/login - authenticate and issue a JWT
pub async fn login(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return Err(AppError::validation("Email and password are required"));
    }

    let found = user::find_by_email(&state.db.pool, &payload.email).await?;

    // Uniform timing whether or not the email exists
    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

    let ip = client_ip(&headers);
    let authenticated = match found {
        Some(u) if verify_password(&payload.password, &u.password_hash) => u,
        _ => {
            tracing::warn!(
                target: "security",
                email = %payload.email,
                ip = %ip,
                "Login failed"
            );
            state.audit.log(
                AuditAction::LoginFailed,
                "auth",
                None,
                None,
                serde_json::json!({ "email": payload.email }),
                Some(ip),
            );
            return Err(AppError::invalid_credentials());
        }
    };

    let token = state.jwt.generate_token(&authenticated)?;

    tracing::info!(user_id = authenticated.id, email = %authenticated.email, "Login successful");
    audit_log!(
        state,
        AuditAction::LoginSuccess,
        "auth",
        Some(authenticated.id.to_string()),
        &authenticated,
        Some(ip)
    );

    Ok(Json(LoginResponse {
        token,
        user: authenticated,
    }))
}

/// POST /api/auth/logout - audit only, the JWT itself stays valid until expiry
pub async fn logout(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    headers: HeaderMap,
) -> AppResult<Json<MessageResponse>> {
    audit_log!(
        state,
        AuditAction::Logout,
        "auth",
        Some(user.id.to_string()),
        &user,
        Some(client_ip(&headers))
    );

    Ok(Json(MessageResponse::new("Logout successful")))
}

/// GET /api/auth/me - current user, fresh from the database
pub async fn me(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
) -> AppResult<Json<UserResponse>> {
    let user = user::find_by_id(&state.db.pool, current.id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    Ok(Json(UserResponse { user }))
}

/// GET /api/auth/permissions - permission rows for the caller's role
///
/// ADMIN is not stored in the matrix; its rows are synthesized all-true.
pub async fn permissions(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<Vec<PermissionEntry>>> {
    if user.is_admin() {
        let rows = role_permission::RESOURCES
            .iter()
            .map(|resource| PermissionEntry {
                resource: resource.to_string(),
                can_view: true,
                can_create: true,
                can_edit: true,
                can_delete: true,
            })
            .collect();
        return Ok(Json(rows));
    }

    let rows = permissions::rows_for_role(&state, &user.role)
        .await?
        .into_iter()
        .map(|p| PermissionEntry {
            resource: p.resource,
            can_view: p.can_view,
            can_create: p.can_create,
            can_edit: p.can_edit,
            can_delete: p.can_delete,
        })
        .collect();

    Ok(Json(rows))
}
