//! Item Repository
//!
//! Stock is mutated here only by direct edits; the sale pipeline adjusts
//! it inside its own transaction (see `repository::sale`).

use std::collections::{HashMap, HashSet};

use super::{RepoError, RepoResult};
use shared::models::{Category, Item, ItemCreate, ItemUpdate, default_emoji};
use sqlx::SqlitePool;

/// List items newest first, each with its category attached.
pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Item>> {
    let mut items = sqlx::query_as::<_, Item>(
        "SELECT id, name, description, price, stock, category_id, emoji, image, image_type, created_at, updated_at FROM item ORDER BY created_at DESC, id DESC",
    )
    .fetch_all(pool)
    .await?;
    attach_categories(pool, &mut items).await?;
    Ok(items)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Item>> {
    let item = sqlx::query_as::<_, Item>(
        "SELECT id, name, description, price, stock, category_id, emoji, image, image_type, created_at, updated_at FROM item WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    match item {
        Some(mut item) => {
            attach_categories(pool, std::slice::from_mut(&mut item)).await?;
            Ok(Some(item))
        }
        None => Ok(None),
    }
}

pub async fn create(pool: &SqlitePool, data: ItemCreate) -> RepoResult<Item> {
    // Friendlier than letting the FK violation surface as a conflict
    if super::category::find_by_id(pool, data.category_id)
        .await?
        .is_none()
    {
        return Err(RepoError::NotFound(format!(
            "Category {} not found",
            data.category_id
        )));
    }

    let now = shared::util::now_millis();
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO item (name, description, price, stock, category_id, emoji, image, image_type, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9) RETURNING id",
    )
    .bind(&data.name)
    .bind(data.description.unwrap_or_default())
    .bind(data.price)
    .bind(data.stock)
    .bind(data.category_id)
    .bind(data.emoji.unwrap_or_else(default_emoji))
    .bind(&data.image)
    .bind(&data.image_type)
    .bind(now)
    .fetch_one(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to read item after insert".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: ItemUpdate) -> RepoResult<Item> {
    if find_by_id(pool, id).await?.is_none() {
        return Err(RepoError::NotFound(format!("Item {id} not found")));
    }
    if let Some(category_id) = data.category_id
        && super::category::find_by_id(pool, category_id)
            .await?
            .is_none()
    {
        return Err(RepoError::NotFound(format!(
            "Category {category_id} not found"
        )));
    }

    let now = shared::util::now_millis();
    sqlx::query(
        "UPDATE item SET name = COALESCE(?1, name), description = COALESCE(?2, description), price = COALESCE(?3, price), stock = COALESCE(?4, stock), category_id = COALESCE(?5, category_id), emoji = COALESCE(?6, emoji), image = COALESCE(?7, image), image_type = COALESCE(?8, image_type), updated_at = ?9 WHERE id = ?10",
    )
    .bind(&data.name)
    .bind(&data.description)
    .bind(data.price)
    .bind(data.stock)
    .bind(data.category_id)
    .bind(&data.emoji)
    .bind(&data.image)
    .bind(&data.image_type)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to read item after update".into()))
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<()> {
    // Sales keep their line items; an item on any sale cannot be removed
    let referenced =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM sale_item WHERE item_id = ?")
            .bind(id)
            .fetch_one(pool)
            .await?;
    if referenced > 0 {
        return Err(RepoError::Conflict(
            "Cannot delete an item that appears on sales".into(),
        ));
    }

    let rows = sqlx::query("DELETE FROM item WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Item {id} not found")));
    }
    Ok(())
}

/// Attach the owning category to each item (single IN query).
pub(crate) async fn attach_categories(pool: &SqlitePool, items: &mut [Item]) -> RepoResult<()> {
    if items.is_empty() {
        return Ok(());
    }

    let ids: HashSet<i64> = items.iter().map(|i| i.category_id).collect();
    let ids: Vec<i64> = ids.into_iter().collect();

    // Variable number of IN placeholders, so the SQL is built at runtime
    let placeholders = ids.iter().map(|_| "?").collect::<Vec<_>>().join(",");
    let sql = format!(
        "SELECT id, name, description, created_at, updated_at FROM category WHERE id IN ({placeholders})"
    );
    let mut query = sqlx::query_as::<_, Category>(&sql);
    for id in &ids {
        query = query.bind(id);
    }
    let categories: HashMap<i64, Category> = query
        .fetch_all(pool)
        .await?
        .into_iter()
        .map(|c| (c.id, c))
        .collect();

    for item in items.iter_mut() {
        item.category = categories.get(&item.category_id).cloned();
    }
    Ok(())
}
