//! Category API handlers

use axum::{
    Extension, Json,
    extract::State,
    http::HeaderMap,
};
use serde::Serialize;
use shared::models::{Category, CategoryCreate};

use crate::api::client_ip;
use crate::audit::AuditAction;
use crate::audit_log;
use crate::auth::{CurrentUser, permissions};
use crate::cache::{keys, ttl};
use crate::core::ServerState;
use crate::db::repository::category;
use crate::utils::AppResult;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_TEXT_LEN, validate_optional_text, validate_required_text,
};

const RESOURCE: &str = "categories";

#[derive(Debug, Serialize)]
pub struct CategoriesResponse {
    pub categories: Vec<Category>,
}

#[derive(Debug, Serialize)]
pub struct CategoryResponse {
    pub category: Category,
}

/// GET /api/categories - all categories with item counts, alphabetical
///
/// Categories gate item visibility, so reads share the items permission.
pub async fn list(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<CategoriesResponse>> {
    permissions::require(&state, &user, "items", "view").await?;

    let cache_key = keys::key(keys::CATEGORIES, "list");
    let categories = state
        .cache
        .get_or_set(&cache_key, ttl::LONG, || async {
            category::find_all(&state.db.pool).await
        })
        .await?;

    Ok(Json(CategoriesResponse { categories }))
}

/// POST /api/categories - create category
pub async fn create(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    headers: HeaderMap,
    Json(payload): Json<CategoryCreate>,
) -> AppResult<Json<CategoryResponse>> {
    permissions::require(&state, &user, "items", "create").await?;

    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_optional_text(&payload.description, "description", MAX_TEXT_LEN)?;

    let category = category::create(&state.db.pool, payload).await?;

    // Items embed their category, so both prefixes go
    state.cache.delete_prefix(keys::CATEGORIES);
    state.cache.delete_prefix(keys::ITEMS);
    audit_log!(
        state,
        AuditAction::Create,
        RESOURCE,
        Some(category.id.to_string()),
        &user,
        Some(client_ip(&headers)),
        serde_json::json!({ "name": category.name })
    );

    Ok(Json(CategoryResponse { category }))
}
