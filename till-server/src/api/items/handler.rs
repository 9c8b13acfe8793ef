//! Item API handlers
//!
//! The list is read-through cached under `items:list`; every mutation
//! invalidates the whole `items:` prefix so list and any future item keys
//! drop together.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::HeaderMap,
};
use serde::Serialize;
use shared::models::{Item, ItemCreate, ItemUpdate};

use crate::api::{MessageResponse, client_ip};
use crate::audit::AuditAction;
use crate::audit_log;
use crate::auth::{CurrentUser, permissions};
use crate::cache::{keys, ttl};
use crate::core::ServerState;
use crate::db::repository::item;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_TEXT_LEN, validate_optional_text, validate_price, validate_required_text,
    validate_stock,
};
use crate::utils::{AppError, AppResult};

const RESOURCE: &str = "items";

#[derive(Debug, Serialize)]
pub struct ItemsResponse {
    pub items: Vec<Item>,
}

#[derive(Debug, Serialize)]
pub struct ItemResponse {
    pub item: Item,
}

/// GET /api/items - all items, newest first, category attached
pub async fn list(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<ItemsResponse>> {
    permissions::require(&state, &user, RESOURCE, "view").await?;

    let cache_key = keys::key(keys::ITEMS, "list");
    let items = state
        .cache
        .get_or_set(&cache_key, ttl::LONG, || async {
            item::find_all(&state.db.pool).await
        })
        .await?;

    Ok(Json(ItemsResponse { items }))
}

/// GET /api/items/{id} - single item
pub async fn get_by_id(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<ItemResponse>> {
    permissions::require(&state, &user, RESOURCE, "view").await?;

    let item = item::find_by_id(&state.db.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Item not found"))?;

    Ok(Json(ItemResponse { item }))
}

/// POST /api/items - create item
pub async fn create(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    headers: HeaderMap,
    Json(payload): Json<ItemCreate>,
) -> AppResult<Json<ItemResponse>> {
    permissions::require(&state, &user, RESOURCE, "create").await?;

    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_optional_text(&payload.description, "description", MAX_TEXT_LEN)?;
    validate_price(payload.price, "price")?;
    validate_stock(payload.stock)?;

    let item = item::create(&state.db.pool, payload).await?;

    state.cache.delete_prefix(keys::ITEMS);
    audit_log!(
        state,
        AuditAction::Create,
        RESOURCE,
        Some(item.id.to_string()),
        &user,
        Some(client_ip(&headers)),
        serde_json::json!({ "name": item.name })
    );

    Ok(Json(ItemResponse { item }))
}

/// PUT /api/items/{id} - partial update
pub async fn update(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(payload): Json<ItemUpdate>,
) -> AppResult<Json<ItemResponse>> {
    permissions::require(&state, &user, RESOURCE, "edit").await?;

    if let Some(ref name) = payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    validate_optional_text(&payload.description, "description", MAX_TEXT_LEN)?;
    if let Some(price) = payload.price {
        validate_price(price, "price")?;
    }
    if let Some(stock) = payload.stock {
        validate_stock(stock)?;
    }

    let item = item::update(&state.db.pool, id, payload).await?;

    state.cache.delete_prefix(keys::ITEMS);
    audit_log!(
        state,
        AuditAction::Update,
        RESOURCE,
        Some(id.to_string()),
        &user,
        Some(client_ip(&headers)),
        serde_json::json!({ "name": item.name })
    );

    Ok(Json(ItemResponse { item }))
}

/// DELETE /api/items/{id} - remove item
pub async fn delete(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> AppResult<Json<MessageResponse>> {
    permissions::require(&state, &user, RESOURCE, "delete").await?;

    item::delete(&state.db.pool, id).await?;

    state.cache.delete_prefix(keys::ITEMS);
    audit_log!(
        state,
        AuditAction::Delete,
        RESOURCE,
        Some(id.to_string()),
        &user,
        Some(client_ip(&headers))
    );

    Ok(Json(MessageResponse::new("Item deleted successfully")))
}
