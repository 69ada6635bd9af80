use chrono::{DateTime, Utc};
use mockall::mock;
use stock_reservation_engine::{
    db_types::{NewOrder, Order, OrderId, StockLevel},
    order_objects::{OrderQueryFilter, OrderWithItems},
    traits::{ExpiryOutcome, OrderManagement, OrderQueryError, ReservationDatabase, ReservationError},
};

mock! {
    pub ReservationBackend {}
    impl ReservationDatabase for ReservationBackend {
        fn url(&self) -> &str;
        async fn create_order(&self, order: NewOrder, expires_at: DateTime<Utc>) -> Result<OrderWithItems, ReservationError>;
        async fn mark_order_paid(&self, order_id: &OrderId) -> Result<Order, ReservationError>;
        async fn cancel_order(&self, order_id: &OrderId) -> Result<Order, ReservationError>;
        async fn expire_order(&self, order_id: &OrderId) -> Result<ExpiryOutcome, ReservationError>;
        async fn overdue_waiting_orders(&self, now: DateTime<Utc>) -> Result<Vec<Order>, ReservationError>;
        async fn cancel_all_waiting_orders(&self) -> Result<Vec<Order>, ReservationError>;
        async fn set_stock_level(&self, product_id: i64, size_id: i64, available: i64) -> Result<StockLevel, ReservationError>;
    }
    impl OrderManagement for ReservationBackend {
        async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, OrderQueryError>;
        async fn fetch_order_with_items(&self, order_id: &OrderId) -> Result<Option<OrderWithItems>, OrderQueryError>;
        async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, OrderQueryError>;
        async fn waiting_order_count(&self) -> Result<i64, OrderQueryError>;
        async fn fetch_stock_level(&self, product_id: i64, size_id: i64) -> Result<Option<StockLevel>, OrderQueryError>;
    }
}
