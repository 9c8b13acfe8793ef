//! Sale Repository
//!
//! The sale pipeline. Every mutation runs inside one transaction spanning
//! the sale header, its line items, item stock and the linked table:
//!
//! - create: insert header + lines, decrement stock per line, occupy the
//!   table when the sale starts `active`
//! - update: partial header update; with a line set and status `completed`
//!   the lines are replaced (only item ids new to the sale decrement
//!   stock); without `completed` lines are edited in place, stock untouched
//! - void: flip to `CANCELLED` exactly once, restore stock per line,
//!   release the table
//!
//! Stock never goes below zero: the decrement is guarded by `stock >= qty`
//! and zero affected rows aborts the whole transaction.

use std::collections::{HashMap, HashSet};

use super::{RepoError, RepoResult};
use shared::models::{
    Item, PaymentMethod, Sale, SaleCreate, SaleItem, SaleLineInput, SaleStatus, SaleUpdate, Table,
    TableStatus, UserSummary,
};
use sqlx::{Sqlite, SqlitePool, Transaction};

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Sale>> {
    let mut sales = sqlx::query_as::<_, Sale>(
        "SELECT id, total, status, user_id, table_id, payment_method_id, created_at, updated_at FROM sale ORDER BY created_at DESC, id DESC",
    )
    .fetch_all(pool)
    .await?;
    load_relations(pool, &mut sales).await?;
    Ok(sales)
}

pub async fn find_active(pool: &SqlitePool) -> RepoResult<Vec<Sale>> {
    let mut sales = sqlx::query_as::<_, Sale>(
        "SELECT id, total, status, user_id, table_id, payment_method_id, created_at, updated_at FROM sale WHERE status = 'active' ORDER BY created_at DESC, id DESC",
    )
    .fetch_all(pool)
    .await?;
    load_relations(pool, &mut sales).await?;
    Ok(sales)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Sale>> {
    let sale = sqlx::query_as::<_, Sale>(
        "SELECT id, total, status, user_id, table_id, payment_method_id, created_at, updated_at FROM sale WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    match sale {
        Some(mut sale) => {
            load_relations(pool, std::slice::from_mut(&mut sale)).await?;
            Ok(Some(sale))
        }
        None => Ok(None),
    }
}

/// Create a sale with its line items, decrementing stock per line.
///
/// `creator_id` is the authenticated user; an explicit `user_id` in the
/// payload (admin backfill) takes precedence.
pub async fn create(pool: &SqlitePool, creator_id: i64, data: SaleCreate) -> RepoResult<Sale> {
    let now = shared::util::now_millis();
    let status = data.status.unwrap_or(SaleStatus::Completed);
    let user_id = data.user_id.unwrap_or(creator_id);

    let mut tx = pool.begin().await?;

    check_references(&mut tx, user_id, data.table_id, data.payment_method_id).await?;

    let sale_id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO sale (total, status, user_id, table_id, payment_method_id, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6) RETURNING id",
    )
    .bind(data.total)
    .bind(status)
    .bind(user_id)
    .bind(data.table_id)
    .bind(data.payment_method_id)
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;

    for line in &data.items {
        insert_line(&mut tx, sale_id, line, true, now).await?;
    }

    // An open tab holds its table until completion or void
    if status == SaleStatus::Active
        && let Some(table_id) = data.table_id
    {
        set_table_status(&mut tx, table_id, TableStatus::Occupied, now).await?;
    }

    tx.commit().await?;

    find_by_id(pool, sale_id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to read sale after insert".into()))
}

/// Partial update of a sale.
///
/// When the payload carries lines and status `completed`, the line set is
/// replaced: item ids already on the sale re-enter with the supplied
/// quantity/price and no stock effect (their stock was taken at creation),
/// item ids new to the sale decrement stock. Without `completed`, existing
/// lines are edited in place and new lines insert without a decrement.
/// Completing releases the sale's table.
pub async fn update(pool: &SqlitePool, id: i64, data: SaleUpdate) -> RepoResult<Sale> {
    let existing = sqlx::query_as::<_, Sale>(
        "SELECT id, total, status, user_id, table_id, payment_method_id, created_at, updated_at FROM sale WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| RepoError::NotFound(format!("Sale {id} not found")))?;

    let now = shared::util::now_millis();
    let completing = data.status == Some(SaleStatus::Completed);

    let mut tx = pool.begin().await?;

    if let Some(method_id) = data.payment_method_id
        && !payment_method_exists(&mut tx, method_id).await?
    {
        return Err(RepoError::NotFound(format!(
            "Payment method {method_id} not found"
        )));
    }

    sqlx::query(
        "UPDATE sale SET status = COALESCE(?1, status), total = COALESCE(?2, total), payment_method_id = COALESCE(?3, payment_method_id), updated_at = ?4 WHERE id = ?5",
    )
    .bind(data.status)
    .bind(data.total)
    .bind(data.payment_method_id)
    .bind(now)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    if let Some(ref lines) = data.items
        && !lines.is_empty()
    {
        let prior_ids: HashSet<i64> =
            sqlx::query_scalar::<_, i64>("SELECT item_id FROM sale_item WHERE sale_id = ?")
                .bind(id)
                .fetch_all(&mut *tx)
                .await?
                .into_iter()
                .collect();

        if completing {
            sqlx::query("DELETE FROM sale_item WHERE sale_id = ?")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            for line in lines {
                let decrement = !prior_ids.contains(&line.item_id);
                insert_line(&mut tx, id, line, decrement, now).await?;
            }
        } else {
            for line in lines {
                if prior_ids.contains(&line.item_id) {
                    sqlx::query(
                        "UPDATE sale_item SET quantity = ?1, price = ?2 WHERE sale_id = ?3 AND item_id = ?4",
                    )
                    .bind(line.quantity)
                    .bind(line.price)
                    .bind(id)
                    .bind(line.item_id)
                    .execute(&mut *tx)
                    .await?;
                } else {
                    insert_line(&mut tx, id, line, false, now).await?;
                }
            }
        }
    }

    if completing && let Some(table_id) = existing.table_id {
        set_table_status(&mut tx, table_id, TableStatus::Available, now).await?;
    }

    tx.commit().await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to read sale after update".into()))
}

/// Void a sale: one-shot transition to `CANCELLED` that restores each
/// line's stock and releases the table. Voiding twice is a conflict.
pub async fn void(pool: &SqlitePool, id: i64) -> RepoResult<Sale> {
    let existing = sqlx::query_as::<_, Sale>(
        "SELECT id, total, status, user_id, table_id, payment_method_id, created_at, updated_at FROM sale WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| RepoError::NotFound(format!("Sale {id} not found")))?;

    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;

    // Guarded flip: the status predicate makes a second void a no-op row
    // count, so the restore below can never run twice
    let rows = sqlx::query(
        "UPDATE sale SET status = ?1, updated_at = ?2 WHERE id = ?3 AND status != ?1",
    )
    .bind(SaleStatus::Cancelled)
    .bind(now)
    .bind(id)
    .execute(&mut *tx)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::Conflict("Sale is already cancelled".into()));
    }

    let lines = sqlx::query_as::<_, SaleItem>(
        "SELECT id, sale_id, item_id, quantity, price FROM sale_item WHERE sale_id = ?",
    )
    .bind(id)
    .fetch_all(&mut *tx)
    .await?;

    for line in &lines {
        sqlx::query("UPDATE item SET stock = stock + ?1, updated_at = ?2 WHERE id = ?3")
            .bind(line.quantity)
            .bind(now)
            .bind(line.item_id)
            .execute(&mut *tx)
            .await?;
    }

    if let Some(table_id) = existing.table_id {
        set_table_status(&mut tx, table_id, TableStatus::Available, now).await?;
    }

    tx.commit().await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to read sale after void".into()))
}

// ========== Transaction helpers ==========

/// Insert one line item; with `decrement` the referenced item's stock is
/// reduced by the line quantity, rejecting the transaction when the item
/// holds less than that.
async fn insert_line(
    tx: &mut Transaction<'_, Sqlite>,
    sale_id: i64,
    line: &SaleLineInput,
    decrement: bool,
    now: i64,
) -> RepoResult<()> {
    let inserted =
        sqlx::query("INSERT INTO sale_item (sale_id, item_id, quantity, price) VALUES (?1, ?2, ?3, ?4)")
            .bind(sale_id)
            .bind(line.item_id)
            .bind(line.quantity)
            .bind(line.price)
            .execute(&mut **tx)
            .await;

    if let Err(err) = inserted {
        // The sale id is ours, so a FK failure can only be the item
        if let sqlx::Error::Database(ref db_err) = err
            && db_err.is_foreign_key_violation()
        {
            return Err(RepoError::NotFound(format!(
                "Item {} not found",
                line.item_id
            )));
        }
        return Err(err.into());
    }

    if decrement {
        let rows = sqlx::query(
            "UPDATE item SET stock = stock - ?1, updated_at = ?2 WHERE id = ?3 AND stock >= ?1",
        )
        .bind(line.quantity)
        .bind(now)
        .bind(line.item_id)
        .execute(&mut **tx)
        .await?;
        if rows.rows_affected() == 0 {
            return Err(RepoError::Conflict(format!(
                "Insufficient stock for item {}",
                line.item_id
            )));
        }
    }

    Ok(())
}

async fn set_table_status(
    tx: &mut Transaction<'_, Sqlite>,
    table_id: i64,
    status: TableStatus,
    now: i64,
) -> RepoResult<()> {
    sqlx::query("UPDATE dining_table SET status = ?1, updated_at = ?2 WHERE id = ?3")
        .bind(status)
        .bind(now)
        .bind(table_id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

async fn payment_method_exists(
    tx: &mut Transaction<'_, Sqlite>,
    id: i64,
) -> RepoResult<bool> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM payment_method WHERE id = ?")
        .bind(id)
        .fetch_one(&mut **tx)
        .await?;
    Ok(count > 0)
}

/// Reject unknown references up front; clearer errors than the FK
/// violations the header insert would raise.
async fn check_references(
    tx: &mut Transaction<'_, Sqlite>,
    user_id: i64,
    table_id: Option<i64>,
    payment_method_id: Option<i64>,
) -> RepoResult<()> {
    let users = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM user WHERE id = ?")
        .bind(user_id)
        .fetch_one(&mut **tx)
        .await?;
    if users == 0 {
        return Err(RepoError::NotFound(format!("User {user_id} not found")));
    }

    if let Some(table_id) = table_id {
        let tables = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM dining_table WHERE id = ?")
            .bind(table_id)
            .fetch_one(&mut **tx)
            .await?;
        if tables == 0 {
            return Err(RepoError::NotFound(format!("Table {table_id} not found")));
        }
    }

    if let Some(method_id) = payment_method_id
        && !payment_method_exists(tx, method_id).await?
    {
        return Err(RepoError::NotFound(format!(
            "Payment method {method_id} not found"
        )));
    }

    Ok(())
}

// ========== Hydration ==========

/// Attach line items (with their items and categories), user summary,
/// table and payment method to each sale. Batched: one IN query per
/// relation regardless of how many sales are loaded.
pub(crate) async fn load_relations(pool: &SqlitePool, sales: &mut [Sale]) -> RepoResult<()> {
    if sales.is_empty() {
        return Ok(());
    }

    let sale_ids: Vec<i64> = sales.iter().map(|s| s.id).collect();
    let mut lines = fetch_lines(pool, &sale_ids).await?;

    let item_ids: Vec<i64> = lines
        .iter()
        .map(|l| l.item_id)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    let items = fetch_items(pool, &item_ids).await?;
    for line in lines.iter_mut() {
        line.item = items.get(&line.item_id).cloned();
    }

    let mut lines_by_sale: HashMap<i64, Vec<SaleItem>> = HashMap::new();
    for line in lines {
        lines_by_sale.entry(line.sale_id).or_default().push(line);
    }

    let user_ids: Vec<i64> = sales
        .iter()
        .map(|s| s.user_id)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    let users = fetch_users(pool, &user_ids).await?;

    let table_ids: Vec<i64> = sales
        .iter()
        .filter_map(|s| s.table_id)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    let tables = fetch_tables(pool, &table_ids).await?;

    let method_ids: Vec<i64> = sales
        .iter()
        .filter_map(|s| s.payment_method_id)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    let methods = fetch_payment_methods(pool, &method_ids).await?;

    for sale in sales.iter_mut() {
        sale.items = lines_by_sale.remove(&sale.id).unwrap_or_default();
        sale.user = users.get(&sale.user_id).cloned();
        sale.table = sale.table_id.and_then(|id| tables.get(&id).cloned());
        sale.payment_method = sale
            .payment_method_id
            .and_then(|id| methods.get(&id).cloned());
    }

    Ok(())
}

async fn fetch_lines(pool: &SqlitePool, sale_ids: &[i64]) -> RepoResult<Vec<SaleItem>> {
    let placeholders = sale_ids.iter().map(|_| "?").collect::<Vec<_>>().join(",");
    let sql = format!(
        "SELECT id, sale_id, item_id, quantity, price FROM sale_item WHERE sale_id IN ({placeholders}) ORDER BY id"
    );
    let mut query = sqlx::query_as::<_, SaleItem>(&sql);
    for id in sale_ids {
        query = query.bind(id);
    }
    Ok(query.fetch_all(pool).await?)
}

async fn fetch_items(pool: &SqlitePool, ids: &[i64]) -> RepoResult<HashMap<i64, Item>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let placeholders = ids.iter().map(|_| "?").collect::<Vec<_>>().join(",");
    let sql = format!(
        "SELECT id, name, description, price, stock, category_id, emoji, image, image_type, created_at, updated_at FROM item WHERE id IN ({placeholders})"
    );
    let mut query = sqlx::query_as::<_, Item>(&sql);
    for id in ids {
        query = query.bind(id);
    }
    let mut items = query.fetch_all(pool).await?;
    super::item::attach_categories(pool, &mut items).await?;
    Ok(items.into_iter().map(|i| (i.id, i)).collect())
}

async fn fetch_users(pool: &SqlitePool, ids: &[i64]) -> RepoResult<HashMap<i64, UserSummary>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let placeholders = ids.iter().map(|_| "?").collect::<Vec<_>>().join(",");
    let sql = format!("SELECT id, name, email FROM user WHERE id IN ({placeholders})");
    let mut query = sqlx::query_as::<_, UserSummary>(&sql);
    for id in ids {
        query = query.bind(id);
    }
    let users = query.fetch_all(pool).await?;
    Ok(users.into_iter().map(|u| (u.id, u)).collect())
}

async fn fetch_tables(pool: &SqlitePool, ids: &[i64]) -> RepoResult<HashMap<i64, Table>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let placeholders = ids.iter().map(|_| "?").collect::<Vec<_>>().join(",");
    let sql = format!(
        "SELECT id, name, capacity, status, created_at, updated_at FROM dining_table WHERE id IN ({placeholders})"
    );
    let mut query = sqlx::query_as::<_, Table>(&sql);
    for id in ids {
        query = query.bind(id);
    }
    let tables = query.fetch_all(pool).await?;
    Ok(tables.into_iter().map(|t| (t.id, t)).collect())
}

async fn fetch_payment_methods(
    pool: &SqlitePool,
    ids: &[i64],
) -> RepoResult<HashMap<i64, PaymentMethod>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let placeholders = ids.iter().map(|_| "?").collect::<Vec<_>>().join(",");
    let sql = format!(
        "SELECT id, name, enabled, created_at, updated_at FROM payment_method WHERE id IN ({placeholders})"
    );
    let mut query = sqlx::query_as::<_, PaymentMethod>(&sql);
    for id in ids {
        query = query.bind(id);
    }
    let methods = query.fetch_all(pool).await?;
    Ok(methods.into_iter().map(|m| (m.id, m)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::{category, item, table, user};
    use crate::db::testing::test_pool;
    use shared::models::{CategoryCreate, ItemCreate, TableCreate};

    struct Fixture {
        user_id: i64,
        coffee: Item,
        tea: Item,
        table: Table,
    }

    async fn seed(pool: &SqlitePool) -> Fixture {
        let user = user::create(pool, "Cashier", "cashier@x.com", "hash", "CASHIER")
            .await
            .unwrap();
        let cat = category::create(
            pool,
            CategoryCreate {
                name: "Beverages".into(),
                description: None,
            },
        )
        .await
        .unwrap();
        let coffee = item::create(
            pool,
            ItemCreate {
                name: "Coffee".into(),
                description: None,
                price: 2.5,
                stock: 10,
                category_id: cat.id,
                emoji: None,
                image: None,
                image_type: None,
            },
        )
        .await
        .unwrap();
        let tea = item::create(
            pool,
            ItemCreate {
                name: "Tea".into(),
                description: None,
                price: 2.0,
                stock: 10,
                category_id: cat.id,
                emoji: None,
                image: None,
                image_type: None,
            },
        )
        .await
        .unwrap();
        let table = table::create(
            pool,
            TableCreate {
                name: "T1".into(),
                capacity: None,
            },
        )
        .await
        .unwrap();

        Fixture {
            user_id: user.id,
            coffee,
            tea,
            table,
        }
    }

    fn line(item_id: i64, quantity: i64, price: f64) -> SaleLineInput {
        SaleLineInput {
            item_id,
            quantity,
            price,
        }
    }

    async fn stock_of(pool: &SqlitePool, item_id: i64) -> i64 {
        item::find_by_id(pool, item_id).await.unwrap().unwrap().stock
    }

    #[tokio::test]
    async fn test_create_decrements_stock_and_keeps_submitted_price() {
        let pool = test_pool().await;
        let fx = seed(&pool).await;

        // Submitted price 2.00 differs from the item master's 2.50
        let sale = create(
            &pool,
            fx.user_id,
            SaleCreate {
                items: vec![line(fx.coffee.id, 2, 2.0)],
                total: 4.0,
                user_id: None,
                payment_method_id: None,
                table_id: None,
                status: None,
            },
        )
        .await
        .unwrap();

        assert_eq!(sale.total, 4.0);
        assert_eq!(sale.status, SaleStatus::Completed);
        assert_eq!(sale.items.len(), 1);
        assert_eq!(sale.items[0].price, 2.0);
        assert_eq!(sale.items[0].item.as_ref().unwrap().name, "Coffee");
        assert_eq!(sale.user.as_ref().unwrap().name, "Cashier");
        assert_eq!(stock_of(&pool, fx.coffee.id).await, 8);
    }

    #[tokio::test]
    async fn test_create_unknown_item_rolls_everything_back() {
        let pool = test_pool().await;
        let fx = seed(&pool).await;

        let err = create(
            &pool,
            fx.user_id,
            SaleCreate {
                items: vec![line(fx.coffee.id, 2, 2.5), line(999, 1, 1.0)],
                total: 6.0,
                user_id: None,
                payment_method_id: None,
                table_id: None,
                status: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RepoError::NotFound(_)));

        // First line's decrement rolled back with the rest
        assert_eq!(stock_of(&pool, fx.coffee.id).await, 10);
        assert!(find_all(&pool).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_insufficient_stock_rejected() {
        let pool = test_pool().await;
        let fx = seed(&pool).await;

        let err = create(
            &pool,
            fx.user_id,
            SaleCreate {
                items: vec![line(fx.coffee.id, 11, 2.5)],
                total: 27.5,
                user_id: None,
                payment_method_id: None,
                table_id: None,
                status: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RepoError::Conflict(_)));
        assert_eq!(stock_of(&pool, fx.coffee.id).await, 10);
        assert!(find_all(&pool).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_active_sale_occupies_table() {
        let pool = test_pool().await;
        let fx = seed(&pool).await;

        let sale = create(
            &pool,
            fx.user_id,
            SaleCreate {
                items: vec![line(fx.coffee.id, 1, 2.5)],
                total: 2.5,
                user_id: None,
                payment_method_id: None,
                table_id: Some(fx.table.id),
                status: Some(SaleStatus::Active),
            },
        )
        .await
        .unwrap();

        assert_eq!(sale.status, SaleStatus::Active);
        assert_eq!(sale.table.as_ref().unwrap().status, TableStatus::Occupied);

        let active = find_active(&pool).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, sale.id);
    }

    #[tokio::test]
    async fn test_create_unknown_table_rejected() {
        let pool = test_pool().await;
        let fx = seed(&pool).await;

        let err = create(
            &pool,
            fx.user_id,
            SaleCreate {
                items: vec![line(fx.coffee.id, 1, 2.5)],
                total: 2.5,
                user_id: None,
                payment_method_id: None,
                table_id: Some(404),
                status: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RepoError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_void_restores_stock_once_and_releases_table() {
        let pool = test_pool().await;
        let fx = seed(&pool).await;

        let sale = create(
            &pool,
            fx.user_id,
            SaleCreate {
                items: vec![line(fx.coffee.id, 2, 2.5)],
                total: 5.0,
                user_id: None,
                payment_method_id: None,
                table_id: Some(fx.table.id),
                status: Some(SaleStatus::Active),
            },
        )
        .await
        .unwrap();
        assert_eq!(stock_of(&pool, fx.coffee.id).await, 8);

        let voided = void(&pool, sale.id).await.unwrap();
        assert_eq!(voided.status, SaleStatus::Cancelled);
        assert_eq!(stock_of(&pool, fx.coffee.id).await, 10);
        assert_eq!(voided.table.as_ref().unwrap().status, TableStatus::Available);

        // Second void: conflict, and no stock drift
        let err = void(&pool, sale.id).await.unwrap_err();
        assert!(matches!(err, RepoError::Conflict(_)));
        assert_eq!(stock_of(&pool, fx.coffee.id).await, 10);
    }

    #[tokio::test]
    async fn test_void_missing_sale() {
        let pool = test_pool().await;
        seed(&pool).await;
        let err = void(&pool, 12345).await.unwrap_err();
        assert!(matches!(err, RepoError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_completing_new_line_decrements_existing_does_not() {
        let pool = test_pool().await;
        let fx = seed(&pool).await;

        let sale = create(
            &pool,
            fx.user_id,
            SaleCreate {
                items: vec![line(fx.coffee.id, 2, 2.5)],
                total: 5.0,
                user_id: None,
                payment_method_id: None,
                table_id: None,
                status: Some(SaleStatus::Active),
            },
        )
        .await
        .unwrap();
        assert_eq!(stock_of(&pool, fx.coffee.id).await, 8);

        let updated = update(
            &pool,
            sale.id,
            SaleUpdate {
                items: Some(vec![line(fx.coffee.id, 5, 2.5), line(fx.tea.id, 3, 2.0)]),
                status: Some(SaleStatus::Completed),
                total: Some(18.5),
                payment_method_id: None,
            },
        )
        .await
        .unwrap();

        assert_eq!(updated.status, SaleStatus::Completed);
        assert_eq!(updated.items.len(), 2);
        let coffee_line = updated
            .items
            .iter()
            .find(|l| l.item_id == fx.coffee.id)
            .unwrap();
        assert_eq!(coffee_line.quantity, 5);

        // Coffee was already on the sale: quantity changed, stock did not
        assert_eq!(stock_of(&pool, fx.coffee.id).await, 8);
        // Tea is new to the sale: stock decremented
        assert_eq!(stock_of(&pool, fx.tea.id).await, 7);
    }

    #[tokio::test]
    async fn test_update_without_completing_edits_lines_in_place() {
        let pool = test_pool().await;
        let fx = seed(&pool).await;

        let sale = create(
            &pool,
            fx.user_id,
            SaleCreate {
                items: vec![line(fx.coffee.id, 2, 2.5)],
                total: 5.0,
                user_id: None,
                payment_method_id: None,
                table_id: None,
                status: Some(SaleStatus::Active),
            },
        )
        .await
        .unwrap();

        let updated = update(
            &pool,
            sale.id,
            SaleUpdate {
                items: Some(vec![line(fx.coffee.id, 7, 2.5), line(fx.tea.id, 1, 2.0)]),
                status: None,
                total: Some(19.5),
                payment_method_id: None,
            },
        )
        .await
        .unwrap();

        // Still an open tab with edited lines; no stock movement at all
        assert_eq!(updated.status, SaleStatus::Active);
        assert_eq!(updated.items.len(), 2);
        let coffee_line = updated
            .items
            .iter()
            .find(|l| l.item_id == fx.coffee.id)
            .unwrap();
        assert_eq!(coffee_line.quantity, 7);
        assert_eq!(stock_of(&pool, fx.coffee.id).await, 8);
        assert_eq!(stock_of(&pool, fx.tea.id).await, 10);
    }

    #[tokio::test]
    async fn test_update_completing_releases_table() {
        let pool = test_pool().await;
        let fx = seed(&pool).await;

        let sale = create(
            &pool,
            fx.user_id,
            SaleCreate {
                items: vec![line(fx.coffee.id, 1, 2.5)],
                total: 2.5,
                user_id: None,
                payment_method_id: None,
                table_id: Some(fx.table.id),
                status: Some(SaleStatus::Active),
            },
        )
        .await
        .unwrap();
        assert_eq!(
            table::find_by_id(&pool, fx.table.id)
                .await
                .unwrap()
                .unwrap()
                .status,
            TableStatus::Occupied
        );

        let updated = update(
            &pool,
            sale.id,
            SaleUpdate {
                items: None,
                status: Some(SaleStatus::Completed),
                total: None,
                payment_method_id: None,
            },
        )
        .await
        .unwrap();

        assert_eq!(updated.status, SaleStatus::Completed);
        assert_eq!(updated.table.as_ref().unwrap().status, TableStatus::Available);
        // Header-only update leaves the lines alone
        assert_eq!(updated.items.len(), 1);
    }

    #[tokio::test]
    async fn test_update_missing_sale() {
        let pool = test_pool().await;
        seed(&pool).await;
        let err = update(&pool, 777, SaleUpdate::default()).await.unwrap_err();
        assert!(matches!(err, RepoError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_detail_read_is_stable() {
        let pool = test_pool().await;
        let fx = seed(&pool).await;

        let sale = create(
            &pool,
            fx.user_id,
            SaleCreate {
                items: vec![line(fx.coffee.id, 1, 2.5)],
                total: 2.5,
                user_id: None,
                payment_method_id: None,
                table_id: None,
                status: None,
            },
        )
        .await
        .unwrap();

        let first = find_by_id(&pool, sale.id).await.unwrap().unwrap();
        let second = find_by_id(&pool, sale.id).await.unwrap().unwrap();
        assert_eq!(
            serde_json::to_value(&first).unwrap(),
            serde_json::to_value(&second).unwrap()
        );
    }
}
