//! Payment Method Repository

use super::{RepoError, RepoResult};
use shared::models::{PaymentMethod, PaymentMethodCreate, PaymentMethodUpdate};
use sqlx::SqlitePool;

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<PaymentMethod>> {
    let methods = sqlx::query_as::<_, PaymentMethod>(
        "SELECT id, name, enabled, created_at, updated_at FROM payment_method ORDER BY name",
    )
    .fetch_all(pool)
    .await?;
    Ok(methods)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<PaymentMethod>> {
    let method = sqlx::query_as::<_, PaymentMethod>(
        "SELECT id, name, enabled, created_at, updated_at FROM payment_method WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(method)
}

pub async fn create(pool: &SqlitePool, data: PaymentMethodCreate) -> RepoResult<PaymentMethod> {
    let now = shared::util::now_millis();
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO payment_method (name, enabled, created_at, updated_at) VALUES (?1, ?2, ?3, ?3) RETURNING id",
    )
    .bind(&data.name)
    .bind(data.enabled)
    .bind(now)
    .fetch_one(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to read payment method after insert".into()))
}

pub async fn update(
    pool: &SqlitePool,
    id: i64,
    data: PaymentMethodUpdate,
) -> RepoResult<PaymentMethod> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE payment_method SET name = COALESCE(?1, name), enabled = COALESCE(?2, enabled), updated_at = ?3 WHERE id = ?4",
    )
    .bind(&data.name)
    .bind(data.enabled)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!(
            "Payment method {id} not found"
        )));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to read payment method after update".into()))
}
