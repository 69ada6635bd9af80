use log::trace;

use crate::{
    db_types::{Order, OrderId, StockLevel},
    sre_api::order_objects::{OrderQueryFilter, OrderWithItems},
    traits::{OrderManagement, OrderQueryError},
};

/// Read-only access to orders and stock levels for the HTTP layer.
#[derive(Debug, Clone)]
pub struct OrderQueryApi<B> {
    db: B,
}

impl<B> OrderQueryApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> OrderQueryApi<B>
where B: OrderManagement
{
    pub async fn fetch_order(&self, order_id: &OrderId) -> Result<Option<OrderWithItems>, OrderQueryError> {
        self.db.fetch_order_with_items(order_id).await
    }

    pub async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, OrderQueryError> {
        trace!("🔍️ Searching orders. {query}");
        self.db.search_orders(query).await
    }

    pub async fn waiting_order_count(&self) -> Result<i64, OrderQueryError> {
        self.db.waiting_order_count().await
    }

    pub async fn fetch_stock_level(&self, product_id: i64, size_id: i64) -> Result<Option<StockLevel>, OrderQueryError> {
        self.db.fetch_stock_level(product_id, size_id).await
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}
