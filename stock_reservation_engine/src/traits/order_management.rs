use thiserror::Error;

use crate::{
    db_types::{Order, OrderId, StockLevel},
    sre_api::order_objects::{OrderQueryFilter, OrderWithItems},
};

#[derive(Debug, Clone, Error)]
pub enum OrderQueryError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Order query error: {0}")]
    QueryError(String),
}

impl From<sqlx::Error> for OrderQueryError {
    fn from(e: sqlx::Error) -> Self {
        Self::DatabaseError(e.to_string())
    }
}

/// The read side of the reservation engine. Nothing here mutates state, so the
/// methods take plain connections from the pool rather than transactions.
#[allow(async_fn_in_trait)]
pub trait OrderManagement {
    /// Fetch the order with the given public id, if it exists.
    async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, OrderQueryError>;

    /// Fetch an order together with its lines.
    async fn fetch_order_with_items(&self, order_id: &OrderId) -> Result<Option<OrderWithItems>, OrderQueryError>;

    /// All orders matching the given filter, oldest first.
    async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, OrderQueryError>;

    /// How many orders are currently waiting for payment.
    async fn waiting_order_count(&self) -> Result<i64, OrderQueryError>;

    /// The current ledger entry for a product/size pair, if one exists.
    async fn fetch_stock_level(&self, product_id: i64, size_id: i64) -> Result<Option<StockLevel>, OrderQueryError>;
}
