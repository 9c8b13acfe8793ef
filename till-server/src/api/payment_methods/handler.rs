//! Payment method API handlers

use axum::{
    Extension, Json,
    extract::State,
    http::HeaderMap,
};
use shared::models::{PaymentMethod, PaymentMethodCreate};

use crate::api::client_ip;
use crate::audit::AuditAction;
use crate::audit_log;
use crate::auth::{CurrentUser, permissions};
use crate::core::ServerState;
use crate::db::repository::payment_method;
use crate::utils::AppResult;
use crate::utils::validation::{MAX_NAME_LEN, validate_required_text};

const RESOURCE: &str = "payment_methods";

/// GET /api/payment-methods - all methods, alphabetical
///
/// Any authenticated user; the checkout screen needs these.
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<PaymentMethod>>> {
    let methods = payment_method::find_all(&state.db.pool).await?;
    Ok(Json(methods))
}

/// POST /api/payment-methods - create method (admin)
pub async fn create(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    headers: HeaderMap,
    Json(payload): Json<PaymentMethodCreate>,
) -> AppResult<Json<PaymentMethod>> {
    permissions::require_admin_user(&user)?;

    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;

    let method = payment_method::create(&state.db.pool, payload).await?;

    audit_log!(
        state,
        AuditAction::Create,
        RESOURCE,
        Some(method.id.to_string()),
        &user,
        Some(client_ip(&headers)),
        serde_json::json!({ "name": method.name })
    );

    Ok(Json(method))
}
