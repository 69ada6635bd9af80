use serde::{Deserialize, Serialize};

use crate::db_types::{Order, OrderStatus};

/// Published after a payment has been confirmed and committed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderPaidEvent {
    pub order: Order,
}

impl OrderPaidEvent {
    pub fn new(order: Order) -> Self {
        Self { order }
    }
}

/// Published after an order has been settled without payment and its stock
/// returned to the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderAnnulledEvent {
    pub order: Order,
    /// The terminal status the order ended in, `Expired` or `Cancelled`.
    pub status: OrderStatus,
}

impl OrderAnnulledEvent {
    pub fn new(order: Order) -> Self {
        let status = order.status;
        Self { order, status }
    }
}
