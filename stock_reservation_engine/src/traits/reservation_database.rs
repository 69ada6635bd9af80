use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::{
    db_types::{NewOrder, Order, OrderId, OrderStatus, StockLevel},
    sre_api::order_objects::OrderWithItems,
    traits::{data_objects::ExpiryOutcome, order_management::OrderQueryError, OrderManagement},
};

#[derive(Debug, Clone, Error)]
pub enum ReservationError {
    #[error("We have an internal database engine error: {0}")]
    DatabaseError(String),
    #[error("Insufficient stock for product {product_id} size {size_id}. Requested {requested}, available {available}")]
    InsufficientStock { product_id: i64, size_id: i64, requested: i64, available: i64 },
    #[error("Product {product_id} size {size_id} is not stocked")]
    UnknownProductSize { product_id: i64, size_id: i64 },
    #[error("Invalid order request. {0}")]
    ValidationError(String),
    #[error("Order {0} does not exist")]
    OrderNotFound(OrderId),
    #[error("Order {0} is already {1} and cannot change state")]
    OrderAlreadyFinalized(OrderId, OrderStatus),
    #[error("Stock for product {product_id} size {size_id} could not be returned while settling order {order_id}")]
    StockRestoreFailed { order_id: OrderId, product_id: i64, size_id: i64 },
    #[error(transparent)]
    QueryError(#[from] OrderQueryError),
}

impl From<sqlx::Error> for ReservationError {
    fn from(e: sqlx::Error) -> Self {
        Self::DatabaseError(e.to_string())
    }
}

/// The write side of the reservation engine.
///
/// Implementations own the coupling between the order state machine and the
/// stock ledger. The contract every method upholds:
///
/// * Stock is reserved with a conditional decrement that never lets `available`
///   drop below zero. When several orders race for the last units, the database
///   decides the winners; losers get [`ReservationError::InsufficientStock`].
/// * An order reserves stock for all of its lines or for none of them.
/// * Status changes guard on the current status inside the same transaction, so
///   a settled order can never be settled twice and repeated calls are harmless.
#[allow(async_fn_in_trait)]
pub trait ReservationDatabase: OrderManagement {
    /// The database URL for the reservation database
    fn url(&self) -> &str;

    /// Atomically reserve stock for every line of `order` and insert it in
    /// `WaitingPayment` status with the given payment deadline.
    ///
    /// The decrement for each line runs first, as `UPDATE ... WHERE available >= quantity`.
    /// If any line cannot be satisfied, the whole transaction rolls back and no stock
    /// moves. A line for a product/size pair that is not in the ledger at all fails with
    /// [`ReservationError::UnknownProductSize`] before any stock is touched.
    async fn create_order(&self, order: NewOrder, expires_at: DateTime<Utc>) -> Result<OrderWithItems, ReservationError>;

    /// Mark a waiting order as paid and clear its payment deadline.
    ///
    /// Fails with [`ReservationError::OrderAlreadyFinalized`] when the order has already
    /// been settled (paid, expired or cancelled), and [`ReservationError::OrderNotFound`]
    /// when the id is unknown. The reserved stock stays reserved.
    async fn mark_order_paid(&self, order_id: &OrderId) -> Result<Order, ReservationError>;

    /// Cancel a waiting order and return each reserved line to the stock ledger.
    ///
    /// The status change and the stock restoration commit together. Settled orders fail
    /// with [`ReservationError::OrderAlreadyFinalized`].
    async fn cancel_order(&self, order_id: &OrderId) -> Result<Order, ReservationError>;

    /// Expire an order whose payment deadline has lapsed.
    ///
    /// Unlike [`ReservationDatabase::cancel_order`] this is a reconciliation step, not a
    /// user action, so finding the order already settled is a normal outcome rather than
    /// an error. The status check and stock restoration run in one transaction; only when
    /// the order is still `WaitingPayment` does anything change.
    async fn expire_order(&self, order_id: &OrderId) -> Result<ExpiryOutcome, ReservationError>;

    /// All orders still in `WaitingPayment` whose deadline is at or before `now`,
    /// earliest deadline first. This is the safety net behind the in-process expiry
    /// queue; it answers from the orders table alone.
    async fn overdue_waiting_orders(&self, now: DateTime<Utc>) -> Result<Vec<Order>, ReservationError>;

    /// Cancel every waiting order and return all of their stock. Intended for test
    /// environment resets between load runs.
    async fn cancel_all_waiting_orders(&self) -> Result<Vec<Order>, ReservationError>;

    /// Create or overwrite the ledger entry for a product/size pair.
    async fn set_stock_level(&self, product_id: i64, size_id: i64, available: i64) -> Result<StockLevel, ReservationError>;

    /// Close the connection to the database
    async fn close(&mut self) -> Result<(), ReservationError> {
        Ok(())
    }
}
