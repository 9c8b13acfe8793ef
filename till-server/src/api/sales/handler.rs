//! Sale API handlers
//!
//! Stock movements, table occupancy and the totals contract live in
//! `repository::sale`; handlers validate input, invalidate caches and
//! write audit entries.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::{HeaderMap, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use shared::models::{Sale, SaleActionRequest, SaleCreate, SaleUpdate};

use crate::api::client_ip;
use crate::audit::AuditAction;
use crate::audit_log;
use crate::auth::{CurrentUser, permissions};
use crate::cache::{keys, ttl};
use crate::core::ServerState;
use crate::db::repository::{sale, settings};
use crate::printing;
use crate::utils::validation::{validate_price, validate_sale_lines};
use crate::utils::{AppError, AppResult};

const RESOURCE: &str = "sales";

#[derive(Debug, Serialize)]
pub struct SalesResponse {
    pub sales: Vec<Sale>,
}

#[derive(Debug, Serialize)]
pub struct SaleResponse {
    pub sale: Sale,
}

/// `{success: true, sale}` body for detail/update/void
#[derive(Debug, Serialize)]
pub struct SaleEnvelope {
    pub success: bool,
    pub sale: Sale,
}

#[derive(Debug, Deserialize)]
pub struct ReceiptQuery {
    /// `text` for a plain preview; anything else returns ESC/POS bytes
    pub format: Option<String>,
}

/// GET /api/sales - all sales, hydrated, newest first
pub async fn list(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<SalesResponse>> {
    permissions::require(&state, &user, RESOURCE, "view").await?;

    // Short TTL: sales churn quickly and mutations invalidate anyway
    let cache_key = keys::key(keys::SALES, "list");
    let sales = state
        .cache
        .get_or_set(&cache_key, ttl::SHORT, || async {
            sale::find_all(&state.db.pool).await
        })
        .await?;

    Ok(Json(SalesResponse { sales }))
}

/// GET /api/sales/active - open tabs, hydrated, newest first
pub async fn active(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<Vec<Sale>>> {
    permissions::require(&state, &user, RESOURCE, "view").await?;

    let sales = sale::find_active(&state.db.pool).await?;
    Ok(Json(sales))
}

/// GET /api/sales/{id} - hydrated detail
pub async fn get_by_id(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<SaleEnvelope>> {
    permissions::require(&state, &user, RESOURCE, "view").await?;

    let sale = sale::find_by_id(&state.db.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Sale {id} not found")))?;

    Ok(Json(SaleEnvelope {
        success: true,
        sale,
    }))
}

/// POST /api/sales - create sale, decrement stock transactionally
pub async fn create(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    headers: HeaderMap,
    Json(payload): Json<SaleCreate>,
) -> AppResult<Json<SaleResponse>> {
    permissions::require(&state, &user, RESOURCE, "create").await?;

    validate_sale_lines(&payload.items)?;
    validate_price(payload.total, "total")?;

    let sale = sale::create(&state.db.pool, user.id, payload).await?;

    // Stock moved, so item reads are stale too
    state.cache.delete_prefix(keys::SALES);
    state.cache.delete_prefix(keys::ITEMS);
    audit_log!(
        state,
        AuditAction::Create,
        RESOURCE,
        Some(sale.id.to_string()),
        &user,
        Some(client_ip(&headers)),
        serde_json::json!({ "total": sale.total, "status": sale.status })
    );

    Ok(Json(SaleResponse { sale }))
}

/// PUT /api/sales/{id} - partial update; completion replaces the line set
pub async fn update(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(payload): Json<SaleUpdate>,
) -> AppResult<Json<SaleEnvelope>> {
    permissions::require(&state, &user, RESOURCE, "edit").await?;

    if let Some(ref items) = payload.items {
        validate_sale_lines(items)?;
    }
    if let Some(total) = payload.total {
        validate_price(total, "total")?;
    }

    let sale = sale::update(&state.db.pool, id, payload).await?;

    state.cache.delete_prefix(keys::SALES);
    state.cache.delete_prefix(keys::ITEMS);
    audit_log!(
        state,
        AuditAction::Update,
        RESOURCE,
        Some(id.to_string()),
        &user,
        Some(client_ip(&headers)),
        serde_json::json!({ "total": sale.total, "status": sale.status })
    );

    Ok(Json(SaleEnvelope {
        success: true,
        sale,
    }))
}

/// PATCH /api/sales/{id} - sale actions; `{"action": "void"}` is the only one
pub async fn action(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(payload): Json<SaleActionRequest>,
) -> AppResult<Json<SaleEnvelope>> {
    permissions::require(&state, &user, RESOURCE, "edit").await?;

    if payload.action != "void" {
        return Err(AppError::validation(format!(
            "Unknown action: {}",
            payload.action
        )));
    }

    let sale = sale::void(&state.db.pool, id).await?;

    state.cache.delete_prefix(keys::SALES);
    state.cache.delete_prefix(keys::ITEMS);
    audit_log!(
        state,
        AuditAction::Void,
        RESOURCE,
        Some(id.to_string()),
        &user,
        Some(client_ip(&headers)),
        serde_json::json!({ "total": sale.total })
    );

    Ok(Json(SaleEnvelope {
        success: true,
        sale,
    }))
}

/// GET /api/sales/{id}/receipt - rendered receipt
///
/// `?format=text` returns the plain preview; the default is raw ESC/POS
/// bytes ready to stream to a printer.
pub async fn receipt(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Query(query): Query<ReceiptQuery>,
) -> AppResult<Response> {
    permissions::require(&state, &user, RESOURCE, "view").await?;

    let sale = sale::find_by_id(&state.db.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Sale {id} not found")))?;
    let settings = settings::get_or_create(&state.db.pool).await?;

    let response = if query.format.as_deref() == Some("text") {
        (
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            printing::render_text(&sale, &settings),
        )
            .into_response()
    } else {
        (
            [(header::CONTENT_TYPE, "application/octet-stream")],
            printing::render_escpos(&sale, &settings),
        )
            .into_response()
    };

    Ok(response)
}
