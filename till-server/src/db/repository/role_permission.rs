//! Role Permission Repository (RBAC)
//!
//! One row per (role, resource) pair. The default matrix is seeded when the
//! table is empty, either at bootstrap or lazily on the first roles read.

use super::{RepoError, RepoResult};
use shared::models::{ROLE_ADMIN, ROLE_CASHIER, RolePermission, RolePermissionUpsert};
use sqlx::SqlitePool;

/// Permission resources known to the system.
pub const RESOURCES: [&str; 7] = [
    "dashboard",
    "items",
    "sales",
    "categories",
    "users",
    "settings",
    "reports",
];

/// Cashier defaults: (resource, can_view, can_create, can_edit, can_delete)
const CASHIER_DEFAULTS: [(&str, bool, bool, bool, bool); 7] = [
    ("dashboard", true, false, false, false),
    ("items", true, false, false, false),
    ("sales", true, true, false, false),
    ("categories", true, false, false, false),
    ("users", false, false, false, false),
    ("settings", false, false, false, false),
    ("reports", true, false, false, false),
];

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<RolePermission>> {
    let permissions = sqlx::query_as::<_, RolePermission>(
        "SELECT id, role, resource, can_view, can_create, can_edit, can_delete, created_at, updated_at FROM role_permission ORDER BY role, resource",
    )
    .fetch_all(pool)
    .await?;
    Ok(permissions)
}

pub async fn find_by_role(pool: &SqlitePool, role: &str) -> RepoResult<Vec<RolePermission>> {
    let permissions = sqlx::query_as::<_, RolePermission>(
        "SELECT id, role, resource, can_view, can_create, can_edit, can_delete, created_at, updated_at FROM role_permission WHERE role = ? ORDER BY resource",
    )
    .bind(role)
    .fetch_all(pool)
    .await?;
    Ok(permissions)
}

pub async fn find(
    pool: &SqlitePool,
    role: &str,
    resource: &str,
) -> RepoResult<Option<RolePermission>> {
    let permission = sqlx::query_as::<_, RolePermission>(
        "SELECT id, role, resource, can_view, can_create, can_edit, can_delete, created_at, updated_at FROM role_permission WHERE role = ? AND resource = ?",
    )
    .bind(role)
    .bind(resource)
    .fetch_optional(pool)
    .await?;
    Ok(permission)
}

pub async fn count(pool: &SqlitePool) -> RepoResult<i64> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM role_permission")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Upsert one (role, resource) row. On an existing row absent flags keep
/// their stored value; on a new row they default to false.
pub async fn upsert(pool: &SqlitePool, data: RolePermissionUpsert) -> RepoResult<RolePermission> {
    let now = shared::util::now_millis();

    if find(pool, &data.role, &data.resource).await?.is_some() {
        sqlx::query(
            "UPDATE role_permission SET can_view = COALESCE(?1, can_view), can_create = COALESCE(?2, can_create), can_edit = COALESCE(?3, can_edit), can_delete = COALESCE(?4, can_delete), updated_at = ?5 WHERE role = ?6 AND resource = ?7",
        )
        .bind(data.can_view)
        .bind(data.can_create)
        .bind(data.can_edit)
        .bind(data.can_delete)
        .bind(now)
        .bind(&data.role)
        .bind(&data.resource)
        .execute(pool)
        .await?;
    } else {
        sqlx::query(
            "INSERT INTO role_permission (role, resource, can_view, can_create, can_edit, can_delete, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
        )
        .bind(&data.role)
        .bind(&data.resource)
        .bind(data.can_view.unwrap_or(false))
        .bind(data.can_create.unwrap_or(false))
        .bind(data.can_edit.unwrap_or(false))
        .bind(data.can_delete.unwrap_or(false))
        .bind(now)
        .execute(pool)
        .await?;
    }

    find(pool, &data.role, &data.resource)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to read permission after upsert".into()))
}

/// Insert the default permission matrix: ADMIN gets every flag on every
/// resource, CASHIER gets the restricted set.
pub async fn seed_defaults(pool: &SqlitePool) -> RepoResult<()> {
    let now = shared::util::now_millis();

    for resource in RESOURCES {
        sqlx::query(
            "INSERT OR IGNORE INTO role_permission (role, resource, can_view, can_create, can_edit, can_delete, created_at, updated_at) VALUES (?1, ?2, 1, 1, 1, 1, ?3, ?3)",
        )
        .bind(ROLE_ADMIN)
        .bind(resource)
        .bind(now)
        .execute(pool)
        .await?;
    }

    for (resource, view, create, edit, delete) in CASHIER_DEFAULTS {
        sqlx::query(
            "INSERT OR IGNORE INTO role_permission (role, resource, can_view, can_create, can_edit, can_delete, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
        )
        .bind(ROLE_CASHIER)
        .bind(resource)
        .bind(view)
        .bind(create)
        .bind(edit)
        .bind(delete)
        .bind(now)
        .execute(pool)
        .await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing::test_pool;

    #[tokio::test]
    async fn test_seed_defaults_matrix() {
        let pool = test_pool().await;
        seed_defaults(&pool).await.unwrap();

        let all = find_all(&pool).await.unwrap();
        assert_eq!(all.len(), 14);
        // Sorted role then resource: ADMIN block first
        assert!(all[..7].iter().all(|p| p.role == "ADMIN"));
        assert!(all[..7].iter().all(|p| p.can_view && p.can_delete));

        let cashier_sales = find(&pool, "CASHIER", "sales").await.unwrap().unwrap();
        assert!(cashier_sales.can_view);
        assert!(cashier_sales.can_create);
        assert!(!cashier_sales.can_edit);
        assert!(!cashier_sales.can_delete);

        let cashier_settings = find(&pool, "CASHIER", "settings").await.unwrap().unwrap();
        assert!(!cashier_settings.can_view);

        // Re-seeding does not duplicate rows
        seed_defaults(&pool).await.unwrap();
        assert_eq!(count(&pool).await.unwrap(), 14);
    }

    #[tokio::test]
    async fn test_upsert_absent_flags_keep_values() {
        let pool = test_pool().await;
        seed_defaults(&pool).await.unwrap();

        let updated = upsert(
            &pool,
            RolePermissionUpsert {
                role: "CASHIER".into(),
                resource: "items".into(),
                can_edit: Some(true),
                can_view: None,
                can_create: None,
                can_delete: None,
            },
        )
        .await
        .unwrap();

        assert!(updated.can_edit);
        // Untouched flags keep their seeded values
        assert!(updated.can_view);
        assert!(!updated.can_create);
    }

    #[tokio::test]
    async fn test_upsert_creates_with_false_defaults() {
        let pool = test_pool().await;
        let created = upsert(
            &pool,
            RolePermissionUpsert {
                role: "CASHIER".into(),
                resource: "reports".into(),
                can_view: Some(true),
                can_create: None,
                can_edit: None,
                can_delete: None,
            },
        )
        .await
        .unwrap();

        assert!(created.can_view);
        assert!(!created.can_create);
        assert!(!created.can_edit);
        assert!(!created.can_delete);
    }

    #[tokio::test]
    async fn test_allows_maps_actions() {
        let pool = test_pool().await;
        seed_defaults(&pool).await.unwrap();
        let p = find(&pool, "CASHIER", "sales").await.unwrap().unwrap();
        assert!(p.allows("view"));
        assert!(p.allows("create"));
        assert!(!p.allows("edit"));
        assert!(!p.allows("delete"));
        assert!(!p.allows("unknown"));
    }
}
