use chrono::{DateTime, Utc};
use log::trace;
use sqlx::{QueryBuilder, SqliteConnection};

use crate::{
    db_types::{NewOrder, Order, OrderId, OrderStatus},
    sre_api::order_objects::OrderQueryFilter,
};

/// Insert a new order in `WaitingPayment` status with the given payment deadline.
/// The subtotal and quantity columns are snapshots computed from the order lines.
pub async fn insert_order(
    order: &NewOrder,
    expires_at: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Order, sqlx::Error> {
    let inserted = sqlx::query_as::<_, Order>(
        r#"INSERT INTO orders (
               order_id, customer_id, recipient_name, recipient_phone, recipient_address,
               subtotal, total_quantity, points_used, status, expires_at, created_at
           ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
           RETURNING *"#,
    )
    .bind(&order.order_id)
    .bind(&order.customer_id)
    .bind(&order.recipient_name)
    .bind(&order.recipient_phone)
    .bind(&order.recipient_address)
    .bind(order.subtotal())
    .bind(order.total_quantity())
    .bind(order.points_used)
    .bind(OrderStatus::WaitingPayment)
    .bind(expires_at)
    .bind(order.created_at)
    .fetch_one(conn)
    .await?;
    trace!("📝️ Order {} inserted", inserted.order_id);
    Ok(inserted)
}

pub async fn fetch_order_by_order_id(
    order_id: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE order_id = $1")
        .bind(order_id)
        .fetch_optional(conn)
        .await
}

/// Move a waiting order into `new_status` and clear its payment deadline.
///
/// The `status = 'WaitingPayment'` guard runs in the same statement as the update, so
/// whichever caller gets here first wins and everyone else sees zero rows. `None`
/// therefore means the order is unknown or already settled; callers look it up to
/// decide which.
pub async fn settle_waiting_order(
    order_id: &OrderId,
    new_status: OrderStatus,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let updated = sqlx::query_as::<_, Order>(
        r#"UPDATE orders
           SET status = $2, expires_at = NULL, updated_at = CURRENT_TIMESTAMP
           WHERE order_id = $1 AND status = $3
           RETURNING *"#,
    )
    .bind(order_id)
    .bind(new_status)
    .bind(OrderStatus::WaitingPayment)
    .fetch_optional(conn)
    .await?;
    if let Some(order) = &updated {
        trace!("📝️ Order {} is now {}", order.order_id, order.status);
    }
    Ok(updated)
}

/// All waiting orders whose payment deadline is at or before `now`, earliest first.
pub async fn overdue_waiting_orders(
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Vec<Order>, sqlx::Error> {
    sqlx::query_as::<_, Order>(
        r#"SELECT * FROM orders
           WHERE status = $1 AND expires_at IS NOT NULL AND expires_at <= $2
           ORDER BY expires_at ASC"#,
    )
    .bind(OrderStatus::WaitingPayment)
    .bind(now)
    .fetch_all(conn)
    .await
}

pub async fn waiting_orders(conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE status = $1 ORDER BY created_at ASC")
        .bind(OrderStatus::WaitingPayment)
        .fetch_all(conn)
        .await
}

pub async fn waiting_order_count(conn: &mut SqliteConnection) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM orders WHERE status = $1")
        .bind(OrderStatus::WaitingPayment)
        .fetch_one(conn)
        .await
}

pub async fn search_orders(query: OrderQueryFilter, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let mut builder = QueryBuilder::new("SELECT * FROM orders ");
    if !query.is_empty() {
        builder.push("WHERE ");
        let mut where_clause = builder.separated(" AND ");
        if let Some(customer_id) = query.customer_id {
            where_clause.push("customer_id = ").push_bind_unseparated(customer_id);
        }
        if let Some(statuses) = query.status {
            let statuses = statuses.iter().map(|s| format!("'{s}'")).collect::<Vec<String>>().join(",");
            where_clause.push(format!("status IN ({statuses})"));
        }
        if let Some(since) = query.since {
            where_clause.push("created_at >= ").push_bind_unseparated(since);
        }
        if let Some(until) = query.until {
            where_clause.push("created_at <= ").push_bind_unseparated(until);
        }
    }
    builder.push(" ORDER BY created_at ASC");
    trace!("📝️ Executing query: {}", builder.sql());
    let orders = builder.build_query_as::<Order>().fetch_all(conn).await?;
    Ok(orders)
}
