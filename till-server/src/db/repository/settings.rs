//! Settings Repository (Singleton)
//!
//! One row with a fixed id, created with defaults on first read.

use super::{RepoError, RepoResult};
use shared::models::{Settings, SettingsUpdate};
use sqlx::SqlitePool;

const SINGLETON_ID: i64 = 1;

pub async fn get_or_create(pool: &SqlitePool) -> RepoResult<Settings> {
    if let Some(settings) = get(pool).await? {
        return Ok(settings);
    }

    let now = shared::util::now_millis();
    sqlx::query(
        "INSERT INTO settings (id, currency, currency_symbol, tax_enabled, tax_rate, tax_name, table_count, created_at, updated_at) VALUES (?1, 'USD', '$', 0, 0.0, 'Tax', 6, ?2, ?2)",
    )
    .bind(SINGLETON_ID)
    .bind(now)
    .execute(pool)
    .await?;

    get(pool)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create settings".into()))
}

pub async fn get(pool: &SqlitePool) -> RepoResult<Option<Settings>> {
    let settings = sqlx::query_as::<_, Settings>(
        "SELECT id, currency, currency_symbol, tax_enabled, tax_rate, tax_name, table_count, app_name, logo_path, created_at, updated_at FROM settings WHERE id = ?",
    )
    .bind(SINGLETON_ID)
    .fetch_optional(pool)
    .await?;
    Ok(settings)
}

pub async fn update(pool: &SqlitePool, data: SettingsUpdate) -> RepoResult<Settings> {
    // First write on a fresh database creates the row it is about to update
    get_or_create(pool).await?;

    let now = shared::util::now_millis();
    sqlx::query(
        "UPDATE settings SET currency = COALESCE(?1, currency), currency_symbol = COALESCE(?2, currency_symbol), tax_enabled = COALESCE(?3, tax_enabled), tax_rate = COALESCE(?4, tax_rate), tax_name = COALESCE(?5, tax_name), table_count = COALESCE(?6, table_count), app_name = COALESCE(?7, app_name), logo_path = COALESCE(?8, logo_path), updated_at = ?9 WHERE id = ?10",
    )
    .bind(&data.currency)
    .bind(&data.currency_symbol)
    .bind(data.tax_enabled)
    .bind(data.tax_rate)
    .bind(&data.tax_name)
    .bind(data.table_count)
    .bind(&data.app_name)
    .bind(&data.logo_path)
    .bind(now)
    .bind(SINGLETON_ID)
    .execute(pool)
    .await?;

    get(pool)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to read settings after update".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing::test_pool;

    #[tokio::test]
    async fn test_lazy_creation_defaults() {
        let pool = test_pool().await;
        assert!(get(&pool).await.unwrap().is_none());

        let settings = get_or_create(&pool).await.unwrap();
        assert_eq!(settings.currency, "USD");
        assert_eq!(settings.currency_symbol, "$");
        assert!(!settings.tax_enabled);
        assert_eq!(settings.tax_rate, 0.0);
        assert_eq!(settings.tax_name, "Tax");
        assert_eq!(settings.table_count, 6);
        assert_eq!(settings.app_name, None);

        // Second read returns the same row, not a new one
        let again = get_or_create(&pool).await.unwrap();
        assert_eq!(again.id, settings.id);
    }

    #[tokio::test]
    async fn test_partial_update() {
        let pool = test_pool().await;
        let updated = update(
            &pool,
            SettingsUpdate {
                tax_enabled: Some(true),
                tax_rate: Some(10.0),
                tax_name: Some("VAT".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert!(updated.tax_enabled);
        assert_eq!(updated.tax_rate, 10.0);
        assert_eq!(updated.tax_name, "VAT");
        // Untouched fields keep their defaults
        assert_eq!(updated.currency, "USD");
        assert_eq!(updated.table_count, 6);
    }

    #[tokio::test]
    async fn test_update_branding_fields() {
        let pool = test_pool().await;
        let updated = update(
            &pool,
            SettingsUpdate {
                app_name: Some("Burger Shack".into()),
                logo_path: Some("/logo.svg".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.app_name.as_deref(), Some("Burger Shack"));
        assert_eq!(updated.logo_path.as_deref(), Some("/logo.svg"));
    }
}
