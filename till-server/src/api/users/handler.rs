//! User administration handlers
//!
//! `User::password_hash` is `#[serde(skip)]`, so hashes never leave the
//! server regardless of which struct a handler returns.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::HeaderMap,
};
use serde::Serialize;
use shared::models::{ResetPasswordRequest, ROLE_ADMIN, ROLE_CASHIER, User, UserCreate, UserUpdate};

use crate::api::{MessageResponse, client_ip};
use crate::audit::AuditAction;
use crate::audit_log;
use crate::auth::{CurrentUser, hash_password};
use crate::core::ServerState;
use crate::db::repository::user;
use crate::utils::validation::{
    MAX_NAME_LEN, validate_email, validate_password, validate_required_text,
};
use crate::utils::{AppError, AppResult};

const RESOURCE: &str = "users";

#[derive(Debug, Serialize)]
pub struct UsersResponse {
    pub users: Vec<User>,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: User,
}

fn validate_role(role: &str) -> AppResult<()> {
    if role == ROLE_ADMIN || role == ROLE_CASHIER {
        Ok(())
    } else {
        Err(AppError::validation("Invalid role"))
    }
}

fn hash_new_password(password: &str) -> AppResult<String> {
    hash_password(password).map_err(|e| AppError::internal(format!("Failed to hash password: {e}")))
}

/// GET /api/users - all users
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<UsersResponse>> {
    let users = user::find_all(&state.db.pool).await?;
    Ok(Json(UsersResponse { users }))
}

/// GET /api/users/{id} - single user
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<UserResponse>> {
    let user = user::find_by_id(&state.db.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    Ok(Json(UserResponse { user }))
}

/// POST /api/users - create user
pub async fn create(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    headers: HeaderMap,
    Json(payload): Json<UserCreate>,
) -> AppResult<Json<UserResponse>> {
    if payload.name.trim().is_empty()
        || payload.email.trim().is_empty()
        || payload.password.is_empty()
    {
        return Err(AppError::validation("All fields are required"));
    }
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_email(&payload.email)?;
    validate_password(&payload.password)?;
    validate_role(&payload.role)?;

    let password_hash = hash_new_password(&payload.password)?;
    let user = user::create(
        &state.db.pool,
        &payload.name,
        &payload.email,
        &password_hash,
        &payload.role,
    )
    .await?;

    audit_log!(
        state,
        AuditAction::Create,
        RESOURCE,
        Some(user.id.to_string()),
        &current,
        Some(client_ip(&headers)),
        serde_json::json!({ "email": user.email, "role": user.role })
    );

    Ok(Json(UserResponse { user }))
}

/// PUT /api/users/{id} - partial update
pub async fn update(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(payload): Json<UserUpdate>,
) -> AppResult<Json<UserResponse>> {
    if let Some(ref name) = payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    if let Some(ref email) = payload.email {
        validate_email(email)?;
    }
    if let Some(ref role) = payload.role {
        validate_role(role)?;
    }

    let password_hash = match payload.password.as_deref() {
        Some(password) => {
            validate_password(password)?;
            Some(hash_new_password(password)?)
        }
        None => None,
    };

    let user = user::update(&state.db.pool, id, payload, password_hash).await?;

    audit_log!(
        state,
        AuditAction::Update,
        RESOURCE,
        Some(id.to_string()),
        &current,
        Some(client_ip(&headers)),
        serde_json::json!({ "email": user.email, "role": user.role })
    );

    Ok(Json(UserResponse { user }))
}

/// DELETE /api/users/{id} - remove user (not yourself)
pub async fn delete(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> AppResult<Json<MessageResponse>> {
    if id == current.id {
        return Err(AppError::validation("Cannot delete your own account"));
    }

    user::delete(&state.db.pool, id).await?;

    audit_log!(
        state,
        AuditAction::Delete,
        RESOURCE,
        Some(id.to_string()),
        &current,
        Some(client_ip(&headers))
    );

    Ok(Json(MessageResponse::new("User deleted successfully")))
}

/// POST /api/users/{id}/reset-password - set a new password
pub async fn reset_password(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(payload): Json<ResetPasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    validate_password(&payload.password)?;

    // 404 before touching the password
    user::find_by_id(&state.db.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    let password_hash = hash_new_password(&payload.password)?;
    user::update_password(&state.db.pool, id, &password_hash).await?;

    audit_log!(
        state,
        AuditAction::Update,
        RESOURCE,
        Some(id.to_string()),
        &current,
        Some(client_ip(&headers)),
        serde_json::json!({ "action": "reset_password" })
    );

    Ok(Json(MessageResponse::new("Password reset successfully")))
}
