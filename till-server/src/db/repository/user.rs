//! User Repository
//!
//! Passwords arrive here already hashed; raw credentials never cross the
//! repository boundary.

use super::{RepoError, RepoResult};
use shared::models::{User, UserUpdate};
use sqlx::SqlitePool;

pub async fn count(pool: &SqlitePool) -> RepoResult<i64> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM user")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<User>> {
    let users = sqlx::query_as::<_, User>(
        "SELECT id, name, email, password_hash, role, created_at, updated_at FROM user ORDER BY created_at DESC, id DESC",
    )
    .fetch_all(pool)
    .await?;
    Ok(users)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, name, email, password_hash, role, created_at, updated_at FROM user WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

pub async fn find_by_email(pool: &SqlitePool, email: &str) -> RepoResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, name, email, password_hash, role, created_at, updated_at FROM user WHERE email = ? LIMIT 1",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

pub async fn create(
    pool: &SqlitePool,
    name: &str,
    email: &str,
    password_hash: &str,
    role: &str,
) -> RepoResult<User> {
    if find_by_email(pool, email).await?.is_some() {
        return Err(RepoError::Duplicate(
            "User with this email already exists".into(),
        ));
    }

    let now = shared::util::now_millis();
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO user (name, email, password_hash, role, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?5) RETURNING id",
    )
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .bind(role)
    .bind(now)
    .fetch_one(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to read user after insert".into()))
}

/// Partial update. `data.password` is ignored here; the caller hashes it
/// and passes the result as `password_hash`.
pub async fn update(
    pool: &SqlitePool,
    id: i64,
    data: UserUpdate,
    password_hash: Option<String>,
) -> RepoResult<User> {
    let existing = find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("User {id} not found")))?;

    if let Some(ref email) = data.email
        && email != &existing.email
        && find_by_email(pool, email).await?.is_some()
    {
        return Err(RepoError::Duplicate("Email already taken".into()));
    }

    let now = shared::util::now_millis();
    sqlx::query(
        "UPDATE user SET name = COALESCE(?1, name), email = COALESCE(?2, email), role = COALESCE(?3, role), password_hash = COALESCE(?4, password_hash), updated_at = ?5 WHERE id = ?6",
    )
    .bind(&data.name)
    .bind(&data.email)
    .bind(&data.role)
    .bind(&password_hash)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to read user after update".into()))
}

pub async fn update_password(pool: &SqlitePool, id: i64, password_hash: &str) -> RepoResult<()> {
    let now = shared::util::now_millis();
    let rows = sqlx::query("UPDATE user SET password_hash = ?1, updated_at = ?2 WHERE id = ?3")
        .bind(password_hash)
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("User {id} not found")));
    }
    Ok(())
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<()> {
    let recorded = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM sale WHERE user_id = ?")
        .bind(id)
        .fetch_one(pool)
        .await?;
    if recorded > 0 {
        return Err(RepoError::Conflict(
            "Cannot delete user with recorded sales".into(),
        ));
    }

    let rows = sqlx::query("DELETE FROM user WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("User {id} not found")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing::test_pool;

    async fn seed_user(pool: &SqlitePool, email: &str) -> User {
        create(pool, "Admin User", email, "hash-a", "ADMIN")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_and_find_by_email() {
        let pool = test_pool().await;
        let user = seed_user(&pool, "admin@example.com").await;
        assert_eq!(user.role, "ADMIN");

        let found = find_by_email(&pool, "admin@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, user.id);
        assert_eq!(found.password_hash, "hash-a");
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let pool = test_pool().await;
        seed_user(&pool, "admin@example.com").await;
        let err = create(&pool, "Other", "admin@example.com", "h", "CASHIER")
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));
    }

    #[tokio::test]
    async fn test_update_email_to_taken_rejected() {
        let pool = test_pool().await;
        seed_user(&pool, "a@x.com").await;
        let b = seed_user(&pool, "b@x.com").await;

        let err = update(
            &pool,
            b.id,
            UserUpdate {
                email: Some("a@x.com".into()),
                ..Default::default()
            },
            None,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));

        // Keeping its own email is fine
        let same = update(
            &pool,
            b.id,
            UserUpdate {
                email: Some("b@x.com".into()),
                name: Some("Bee".into()),
                ..Default::default()
            },
            None,
        )
        .await
        .unwrap();
        assert_eq!(same.name, "Bee");
    }

    #[tokio::test]
    async fn test_update_password_hash() {
        let pool = test_pool().await;
        let user = seed_user(&pool, "a@x.com").await;

        update_password(&pool, user.id, "hash-b").await.unwrap();
        let reread = find_by_id(&pool, user.id).await.unwrap().unwrap();
        assert_eq!(reread.password_hash, "hash-b");
    }

    #[tokio::test]
    async fn test_delete_with_sales_rejected() {
        let pool = test_pool().await;
        let user = seed_user(&pool, "a@x.com").await;
        sqlx::query("INSERT INTO sale (total, user_id, created_at, updated_at) VALUES (1.0, ?, 0, 0)")
            .bind(user.id)
            .execute(&pool)
            .await
            .unwrap();

        let err = delete(&pool, user.id).await.unwrap_err();
        assert!(matches!(err, RepoError::Conflict(_)));

        let other = seed_user(&pool, "b@x.com").await;
        delete(&pool, other.id).await.unwrap();
        assert!(find_by_id(&pool, other.id).await.unwrap().is_none());
    }
}
