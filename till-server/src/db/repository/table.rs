//! Dining Table Repository
//!
//! Table names are unique. Occupation flips through the sale pipeline:
//! an active sale occupies its table, completion or void releases it.

use super::{RepoError, RepoResult};
use shared::models::{Table, TableCreate, TableStatus, TableUpdate};
use sqlx::SqlitePool;

const DEFAULT_CAPACITY: i64 = 4;

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Table>> {
    let tables = sqlx::query_as::<_, Table>(
        "SELECT id, name, capacity, status, created_at, updated_at FROM dining_table ORDER BY name",
    )
    .fetch_all(pool)
    .await?;
    Ok(tables)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Table>> {
    let table = sqlx::query_as::<_, Table>(
        "SELECT id, name, capacity, status, created_at, updated_at FROM dining_table WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(table)
}

pub async fn create(pool: &SqlitePool, data: TableCreate) -> RepoResult<Table> {
    if name_taken(pool, &data.name, None).await? {
        return Err(RepoError::Duplicate("Table name already exists".into()));
    }

    let now = shared::util::now_millis();
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO dining_table (name, capacity, status, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?4) RETURNING id",
    )
    .bind(&data.name)
    .bind(data.capacity.unwrap_or(DEFAULT_CAPACITY))
    .bind(TableStatus::Available)
    .bind(now)
    .fetch_one(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to read table after insert".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: TableUpdate) -> RepoResult<Table> {
    if find_by_id(pool, id).await?.is_none() {
        return Err(RepoError::NotFound(format!("Table {id} not found")));
    }
    if let Some(ref name) = data.name
        && name_taken(pool, name, Some(id)).await?
    {
        return Err(RepoError::Duplicate("Table name already exists".into()));
    }

    let now = shared::util::now_millis();
    sqlx::query(
        "UPDATE dining_table SET name = COALESCE(?1, name), capacity = COALESCE(?2, capacity), status = COALESCE(?3, status), updated_at = ?4 WHERE id = ?5",
    )
    .bind(&data.name)
    .bind(data.capacity)
    .bind(data.status)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to read table after update".into()))
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<()> {
    if find_by_id(pool, id).await?.is_none() {
        return Err(RepoError::NotFound(format!("Table {id} not found")));
    }

    let active = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM sale WHERE table_id = ? AND status = 'active'",
    )
    .bind(id)
    .fetch_one(pool)
    .await?;
    if active > 0 {
        return Err(RepoError::Conflict(
            "Cannot delete table with active sales".into(),
        ));
    }

    // Historical sales keep existing; their table_id nulls out (SET NULL)
    sqlx::query("DELETE FROM dining_table WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

async fn name_taken(pool: &SqlitePool, name: &str, exclude_id: Option<i64>) -> RepoResult<bool> {
    let count = match exclude_id {
        Some(id) => {
            sqlx::query_scalar::<_, i64>(
                "SELECT COUNT(*) FROM dining_table WHERE name = ? AND id != ?",
            )
            .bind(name)
            .bind(id)
            .fetch_one(pool)
            .await?
        }
        None => sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM dining_table WHERE name = ?")
            .bind(name)
            .fetch_one(pool)
            .await?,
    };
    Ok(count > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing::test_pool;

    fn new_table(name: &str) -> TableCreate {
        TableCreate {
            name: name.into(),
            capacity: None,
        }
    }

    #[tokio::test]
    async fn test_create_defaults() {
        let pool = test_pool().await;
        let table = create(&pool, new_table("T1")).await.unwrap();
        assert_eq!(table.capacity, 4);
        assert_eq!(table.status, TableStatus::Available);
    }

    #[tokio::test]
    async fn test_duplicate_name_rejected() {
        let pool = test_pool().await;
        create(&pool, new_table("T1")).await.unwrap();
        let err = create(&pool, new_table("T1")).await.unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));
    }

    #[tokio::test]
    async fn test_rename_to_taken_name_rejected() {
        let pool = test_pool().await;
        create(&pool, new_table("T1")).await.unwrap();
        let t2 = create(&pool, new_table("T2")).await.unwrap();

        let err = update(
            &pool,
            t2.id,
            TableUpdate {
                name: Some("T1".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));

        // Renaming to its own name is not a collision
        let same = update(
            &pool,
            t2.id,
            TableUpdate {
                name: Some("T2".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(same.name, "T2");
    }

    #[tokio::test]
    async fn test_status_update() {
        let pool = test_pool().await;
        let table = create(&pool, new_table("T1")).await.unwrap();
        let updated = update(
            &pool,
            table.id,
            TableUpdate {
                status: Some(TableStatus::Occupied),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.status, TableStatus::Occupied);
    }

    #[tokio::test]
    async fn test_delete_blocked_by_active_sale() {
        let pool = test_pool().await;
        let table = create(&pool, new_table("T1")).await.unwrap();

        sqlx::query("INSERT INTO user (name, email, password_hash, created_at, updated_at) VALUES ('u', 'u@x.com', 'h', 0, 0)")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query(
            "INSERT INTO sale (total, status, user_id, table_id, created_at, updated_at) VALUES (5.0, 'active', 1, ?, 0, 0)",
        )
        .bind(table.id)
        .execute(&pool)
        .await
        .unwrap();

        let err = delete(&pool, table.id).await.unwrap_err();
        assert!(matches!(err, RepoError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_delete_with_completed_sale_nulls_reference() {
        let pool = test_pool().await;
        let table = create(&pool, new_table("T1")).await.unwrap();

        sqlx::query("INSERT INTO user (name, email, password_hash, created_at, updated_at) VALUES ('u', 'u@x.com', 'h', 0, 0)")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query(
            "INSERT INTO sale (total, status, user_id, table_id, created_at, updated_at) VALUES (5.0, 'completed', 1, ?, 0, 0)",
        )
        .bind(table.id)
        .execute(&pool)
        .await
        .unwrap();

        delete(&pool, table.id).await.unwrap();

        let table_id = sqlx::query_scalar::<_, Option<i64>>("SELECT table_id FROM sale WHERE id = 1")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(table_id, None);
    }

    #[tokio::test]
    async fn test_delete_missing() {
        let pool = test_pool().await;
        let err = delete(&pool, 7).await.unwrap_err();
        assert!(matches!(err, RepoError::NotFound(_)));
    }
}
