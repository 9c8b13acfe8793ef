//! Settings API handlers

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::HeaderMap,
};
use shared::models::{
    Branding, PaymentMethod, PaymentMethodUpdate, ROLE_ADMIN, RolePermission,
    RolePermissionUpsert, Settings, SettingsUpdate,
};

use crate::api::client_ip;
use crate::audit::AuditAction;
use crate::audit_log;
use crate::auth::{CurrentUser, permissions};
use crate::cache::{keys, ttl};
use crate::core::ServerState;
use crate::db::repository::{payment_method, role_permission, settings};
use crate::utils::validation::{MAX_NAME_LEN, validate_optional_text, validate_required_text};
use crate::utils::{AppError, AppResult};

const DEFAULT_APP_NAME: &str = "POS System Restaurant Management";
const DEFAULT_LOGO_PATH: &str = "/burger-logo.svg";

/// GET /api/settings - the singleton, created with defaults on first read
pub async fn get_settings(State(state): State<ServerState>) -> AppResult<Json<Settings>> {
    let cache_key = keys::key(keys::SETTINGS, "singleton");
    let settings = state
        .cache
        .get_or_set(&cache_key, ttl::VERY_LONG, || async {
            settings::get_or_create(&state.db.pool).await
        })
        .await?;

    Ok(Json(settings))
}

/// PUT /api/settings - partial update (admin)
pub async fn update_settings(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    headers: HeaderMap,
    Json(payload): Json<SettingsUpdate>,
) -> AppResult<Json<Settings>> {
    permissions::require_admin_user(&user)?;

    if let Some(rate) = payload.tax_rate
        && !(0.0..=100.0).contains(&rate)
    {
        return Err(AppError::validation(format!(
            "taxRate must be between 0 and 100, got {rate}"
        )));
    }
    if let Some(count) = payload.table_count
        && count < 0
    {
        return Err(AppError::validation("tableCount must be non-negative"));
    }
    validate_optional_text(&payload.app_name, "appName", MAX_NAME_LEN)?;
    validate_optional_text(&payload.tax_name, "taxName", MAX_NAME_LEN)?;

    let settings = settings::update(&state.db.pool, payload).await?;

    state.cache.delete_prefix(keys::SETTINGS);
    audit_log!(
        state,
        AuditAction::Update,
        "settings",
        Some(settings.id.to_string()),
        &user,
        Some(client_ip(&headers))
    );

    Ok(Json(settings))
}

/// GET /api/branding - public app name and logo for the login screen
pub async fn branding(State(state): State<ServerState>) -> AppResult<Json<Branding>> {
    let settings = settings::get(&state.db.pool).await?;

    let (app_name, logo_path) = match settings {
        Some(s) => (
            s.app_name.filter(|n| !n.is_empty()),
            s.logo_path.filter(|p| !p.is_empty()),
        ),
        None => (None, None),
    };

    Ok(Json(Branding {
        app_name: app_name.unwrap_or_else(|| DEFAULT_APP_NAME.to_string()),
        logo_path: logo_path.unwrap_or_else(|| DEFAULT_LOGO_PATH.to_string()),
    }))
}

/// GET /api/settings/roles - permission matrix, seeded if empty (admin)
pub async fn list_roles(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<Vec<RolePermission>>> {
    permissions::require_admin_user(&user)?;

    // Bootstrap seeds this; the lazy path covers databases created before
    // the matrix existed
    if role_permission::count(&state.db.pool).await? == 0 {
        role_permission::seed_defaults(&state.db.pool).await?;
    }

    let rows = role_permission::find_all(&state.db.pool).await?;
    Ok(Json(rows))
}

/// PUT /api/settings/roles - upsert one (role, resource) row (admin)
///
/// The ADMIN settings row is immutable; losing it would lock admins out of
/// this very endpoint.
pub async fn update_role(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    headers: HeaderMap,
    Json(payload): Json<RolePermissionUpsert>,
) -> AppResult<Json<RolePermission>> {
    permissions::require_admin_user(&user)?;

    validate_required_text(&payload.role, "role", MAX_NAME_LEN)?;
    validate_required_text(&payload.resource, "resource", MAX_NAME_LEN)?;

    if payload.role == ROLE_ADMIN && payload.resource == "settings" {
        return Err(AppError::validation(
            "Cannot modify admin settings permissions",
        ));
    }

    let row = role_permission::upsert(&state.db.pool, payload).await?;

    state.cache.delete_prefix(keys::PERMISSIONS);
    audit_log!(
        state,
        AuditAction::Update,
        "roles",
        Some(format!("{}:{}", row.role, row.resource)),
        &user,
        Some(client_ip(&headers)),
        serde_json::json!({ "role": row.role, "resource": row.resource })
    );

    Ok(Json(row))
}

/// PUT /api/settings/payment-methods/{id} - rename or toggle (admin)
pub async fn update_payment_method(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(payload): Json<PaymentMethodUpdate>,
) -> AppResult<Json<PaymentMethod>> {
    permissions::require_admin_user(&user)?;

    if let Some(ref name) = payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }

    let method = payment_method::update(&state.db.pool, id, payload).await?;

    audit_log!(
        state,
        AuditAction::Update,
        "payment_methods",
        Some(id.to_string()),
        &user,
        Some(client_ip(&headers)),
        serde_json::json!({ "name": method.name, "enabled": method.enabled })
    );

    Ok(Json(method))
}
