use sqlx::SqliteConnection;

use crate::db_types::StockLevel;

/// Try to take `quantity` units off the ledger for a product/size pair.
///
/// The `available >= quantity` guard makes the decrement conditional: when several
/// orders race for the last units, the database serialises the updates and only the
/// ones that fit succeed. Returns `false` when zero rows changed, which covers both
/// "not enough stock" and "no such ledger row"; callers that care re-read the row to
/// tell the two apart.
pub async fn reserve_stock(
    product_id: i64,
    size_id: i64,
    quantity: i64,
    conn: &mut SqliteConnection,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"UPDATE stock
           SET available = available - $3, updated_at = CURRENT_TIMESTAMP
           WHERE product_id = $1 AND size_id = $2 AND available >= $3"#,
    )
    .bind(product_id)
    .bind(size_id)
    .bind(quantity)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Return `quantity` units to the ledger. Returns `false` when the ledger row is
/// missing, which callers treat as a data integrity problem.
pub async fn release_stock(
    product_id: i64,
    size_id: i64,
    quantity: i64,
    conn: &mut SqliteConnection,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"UPDATE stock
           SET available = available + $3, updated_at = CURRENT_TIMESTAMP
           WHERE product_id = $1 AND size_id = $2"#,
    )
    .bind(product_id)
    .bind(size_id)
    .bind(quantity)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn fetch_stock_level(
    product_id: i64,
    size_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<StockLevel>, sqlx::Error> {
    sqlx::query_as::<_, StockLevel>("SELECT * FROM stock WHERE product_id = $1 AND size_id = $2")
        .bind(product_id)
        .bind(size_id)
        .fetch_optional(conn)
        .await
}

/// Create or overwrite the ledger entry for a product/size pair.
pub async fn upsert_stock_level(
    product_id: i64,
    size_id: i64,
    available: i64,
    conn: &mut SqliteConnection,
) -> Result<StockLevel, sqlx::Error> {
    sqlx::query_as::<_, StockLevel>(
        r#"INSERT INTO stock (product_id, size_id, available) VALUES ($1, $2, $3)
           ON CONFLICT (product_id, size_id)
           DO UPDATE SET available = excluded.available, updated_at = CURRENT_TIMESTAMP
           RETURNING *"#,
    )
    .bind(product_id)
    .bind(size_id)
    .bind(available)
    .fetch_one(conn)
    .await
}
