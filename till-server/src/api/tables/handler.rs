//! Table API handlers
//!
//! Tables are served bare (no envelope). Occupancy flips through the sale
//! pipeline, but manual status corrections are allowed via PUT.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::HeaderMap,
};
use serde::Serialize;
use shared::models::{Table, TableCreate, TableUpdate};

use crate::api::client_ip;
use crate::audit::AuditAction;
use crate::audit_log;
use crate::auth::{CurrentUser, permissions};
use crate::core::ServerState;
use crate::db::repository::table;
use crate::utils::validation::{MAX_NAME_LEN, validate_required_text};
use crate::utils::{AppError, AppResult};

const RESOURCE: &str = "tables";

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
}

/// GET /api/tables - all tables, alphabetical
pub async fn list(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<Vec<Table>>> {
    permissions::require(&state, &user, "items", "view").await?;

    let tables = table::find_all(&state.db.pool).await?;
    Ok(Json(tables))
}

/// GET /api/tables/{id} - single table
pub async fn get_by_id(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<Table>> {
    permissions::require(&state, &user, "items", "view").await?;

    let table = table::find_by_id(&state.db.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Table not found"))?;

    Ok(Json(table))
}

/// POST /api/tables - create table (unique name)
pub async fn create(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    headers: HeaderMap,
    Json(payload): Json<TableCreate>,
) -> AppResult<Json<Table>> {
    permissions::require(&state, &user, "items", "create").await?;

    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;

    let table = table::create(&state.db.pool, payload).await?;

    audit_log!(
        state,
        AuditAction::Create,
        RESOURCE,
        Some(table.id.to_string()),
        &user,
        Some(client_ip(&headers)),
        serde_json::json!({ "name": table.name })
    );

    Ok(Json(table))
}

/// PUT /api/tables/{id} - partial update
pub async fn update(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(payload): Json<TableUpdate>,
) -> AppResult<Json<Table>> {
    permissions::require(&state, &user, "items", "edit").await?;

    if let Some(ref name) = payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }

    let table = table::update(&state.db.pool, id, payload).await?;

    audit_log!(
        state,
        AuditAction::Update,
        RESOURCE,
        Some(id.to_string()),
        &user,
        Some(client_ip(&headers)),
        serde_json::json!({ "name": table.name })
    );

    Ok(Json(table))
}

/// DELETE /api/tables/{id} - remove table unless a sale is open on it
pub async fn delete(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> AppResult<Json<DeleteResponse>> {
    permissions::require(&state, &user, "items", "delete").await?;

    table::delete(&state.db.pool, id).await?;

    audit_log!(
        state,
        AuditAction::Delete,
        RESOURCE,
        Some(id.to_string()),
        &user,
        Some(client_ip(&headers))
    );

    Ok(Json(DeleteResponse { success: true }))
}
