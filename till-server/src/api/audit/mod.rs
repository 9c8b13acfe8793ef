//! Audit log API module (admin)

use axum::{
    Json, Router,
    extract::{Query, State},
    middleware,
    routing::get,
};

use crate::audit::{AuditListResponse, AuditQuery};
use crate::auth::require_admin;
use crate::core::ServerState;
use crate::utils::AppResult;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/audit", get(list))
        .route_layer(middleware::from_fn(require_admin))
}

/// GET /api/audit - paginated audit entries, newest first
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<AuditQuery>,
) -> AppResult<Json<AuditListResponse>> {
    let page = state.audit.query(&query)?;
    Ok(Json(page))
}
