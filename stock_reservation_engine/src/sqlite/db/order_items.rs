use sqlx::SqliteConnection;

use crate::db_types::{NewOrderItem, OrderItem};

/// Insert one order line. `order_row_id` is the `orders.id` row id, not the public
/// order id.
pub async fn insert_order_item(
    order_row_id: i64,
    item: &NewOrderItem,
    conn: &mut SqliteConnection,
) -> Result<OrderItem, sqlx::Error> {
    sqlx::query_as::<_, OrderItem>(
        r#"INSERT INTO order_items (order_id, product_id, size_id, quantity, unit_price)
           VALUES ($1, $2, $3, $4, $5)
           RETURNING *"#,
    )
    .bind(order_row_id)
    .bind(item.product_id)
    .bind(item.size_id)
    .bind(item.quantity)
    .bind(item.unit_price)
    .fetch_one(conn)
    .await
}

pub async fn items_for_order(order_row_id: i64, conn: &mut SqliteConnection) -> Result<Vec<OrderItem>, sqlx::Error> {
    sqlx::query_as::<_, OrderItem>("SELECT * FROM order_items WHERE order_id = $1 ORDER BY id ASC")
        .bind(order_row_id)
        .fetch_all(conn)
        .await
}
