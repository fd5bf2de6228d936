//! Order Repository
//!
//! Orders and their items are written together in one transaction and read
//! together inside one read transaction, so no read path ever observes a
//! header without its items.

use super::{RepoError, RepoResult};
use shared::models::{Order, OrderDetail, OrderItem, OrderStatus, PaymentMethod};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use std::collections::HashMap;

const ORDER_SELECT: &str = "SELECT o.id, o.customer_name, o.table_id, t.number AS table_number, \
    o.total_price, o.payment_method, o.status, o.payment_status, o.created_at, o.updated_at \
    FROM orders o JOIN dining_table t ON t.id = o.table_id";

const ITEM_SELECT: &str = "SELECT i.id, i.order_id, i.menu_id, m.name AS menu_name, \
    i.quantity, i.price, i.note \
    FROM order_item i JOIN menu m ON m.id = i.menu_id";

/// Order header to insert; totals are already computed from catalog prices
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub customer_name: String,
    pub table_id: i64,
    pub total_price: i64,
    pub payment_method: PaymentMethod,
    pub items: Vec<NewOrderItem>,
}

#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub menu_id: i64,
    pub quantity: i64,
    /// Catalog unit price at order time
    pub price: i64,
    pub note: Option<String>,
}

/// Insert the header and all items atomically, returning the new order id
pub async fn create_with_items(pool: &SqlitePool, order: &NewOrder, now: i64) -> RepoResult<i64> {
    if order.items.is_empty() {
        return Err(RepoError::Database("Order must have at least one item".into()));
    }

    let mut tx = pool.begin().await?;

    let order_id: i64 = sqlx::query_scalar(
        "INSERT INTO orders (customer_name, table_id, total_price, payment_method, status, payment_status, created_at, updated_at) \
         VALUES (?, ?, ?, ?, 'PENDING', 'UNPAID', ?, ?) RETURNING id",
    )
    .bind(&order.customer_name)
    .bind(order.table_id)
    .bind(order.total_price)
    .bind(order.payment_method)
    .bind(now)
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;

    let mut qb: QueryBuilder<Sqlite> =
        QueryBuilder::new("INSERT INTO order_item (order_id, menu_id, quantity, price, note) ");
    qb.push_values(&order.items, |mut row, item| {
        row.push_bind(order_id)
            .push_bind(item.menu_id)
            .push_bind(item.quantity)
            .push_bind(item.price)
            .push_bind(&item.note);
    });
    qb.build().execute(&mut *tx).await?;

    tx.commit().await?;
    Ok(order_id)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Order>> {
    let sql = format!("{ORDER_SELECT} WHERE o.id = ?");
    let order = sqlx::query_as::<_, Order>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(order)
}

/// Order header with its items, read from one snapshot
pub async fn find_detail(pool: &SqlitePool, id: i64) -> RepoResult<Option<OrderDetail>> {
    let mut tx = pool.begin().await?;

    let sql = format!("{ORDER_SELECT} WHERE o.id = ?");
    let Some(order) = sqlx::query_as::<_, Order>(&sql)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
    else {
        tx.commit().await?;
        return Ok(None);
    };

    let items = fetch_items(&mut tx, &[id]).await?;
    tx.commit().await?;

    Ok(Some(OrderDetail { order, items }))
}

/// Orders with items, newest first, optionally filtered by status
pub async fn list(
    pool: &SqlitePool,
    status: Option<OrderStatus>,
    limit: i64,
) -> RepoResult<Vec<OrderDetail>> {
    let mut tx = pool.begin().await?;

    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(ORDER_SELECT);
    if let Some(status) = status {
        qb.push(" WHERE o.status = ").push_bind(status);
    }
    qb.push(" ORDER BY o.created_at DESC, o.id DESC LIMIT ")
        .push_bind(limit);
    let orders = qb.build_query_as::<Order>().fetch_all(&mut *tx).await?;

    let ids: Vec<i64> = orders.iter().map(|o| o.id).collect();
    let items = fetch_items(&mut tx, &ids).await?;
    tx.commit().await?;

    let mut by_order: HashMap<i64, Vec<OrderItem>> = HashMap::new();
    for item in items {
        by_order.entry(item.order_id).or_default().push(item);
    }

    Ok(orders
        .into_iter()
        .map(|order| {
            let items = by_order.remove(&order.id).unwrap_or_default();
            OrderDetail { order, items }
        })
        .collect())
}

async fn fetch_items(conn: &mut SqliteConnection, order_ids: &[i64]) -> RepoResult<Vec<OrderItem>> {
    if order_ids.is_empty() {
        return Ok(Vec::new());
    }
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(ITEM_SELECT);
    qb.push(" WHERE i.order_id IN (");
    let mut separated = qb.separated(", ");
    for id in order_ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(") ORDER BY i.order_id, i.id");
    let items = qb.build_query_as::<OrderItem>().fetch_all(conn).await?;
    Ok(items)
}

/// Compare-and-set status change; `false` when the stored status was not `from`
pub async fn transition_status(
    pool: &SqlitePool,
    id: i64,
    from: OrderStatus,
    to: OrderStatus,
    now: i64,
) -> RepoResult<bool> {
    let rows = sqlx::query("UPDATE orders SET status = ?, updated_at = ? WHERE id = ? AND status = ?")
        .bind(to)
        .bind(now)
        .bind(id)
        .bind(from)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() == 1)
}

/// Record payment and advance PENDING orders to PREPARING in one statement
///
/// Returns `false` when nothing changed (already paid and already past
/// PENDING), which is how duplicate notifications are detected.
pub async fn mark_paid(pool: &SqlitePool, id: i64, now: i64) -> RepoResult<bool> {
    let rows = sqlx::query(
        "UPDATE orders SET payment_status = 'PAID', \
         status = CASE WHEN status = 'PENDING' THEN 'PREPARING' ELSE status END, \
         updated_at = ? \
         WHERE id = ? AND (payment_status <> 'PAID' OR status = 'PENDING')",
    )
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected() == 1)
}
