use serde::{Deserialize, Serialize};
use srg_common::Money;
use stock_reservation_engine::db_types::{NewOrder, NewOrderItem};

/// The request body for placing a new order. The customer id comes from the `SRG-Customer-Id` header rather than
/// the body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrderRequest {
    pub name: String,
    pub phone: String,
    pub address: String,
    #[serde(default)]
    pub use_points: i64,
    pub items: Vec<OrderItemRequest>,
}

impl NewOrderRequest {
    pub fn into_new_order(self, customer_id: String) -> NewOrder {
        let mut order = NewOrder::new(customer_id, self.name, self.phone, self.address).with_points(self.use_points);
        for item in self.items {
            order = order.with_item(NewOrderItem::new(
                item.product_id,
                item.size_id,
                item.quantity,
                Money::from(item.unit_price),
            ));
        }
        order
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemRequest {
    pub product_id: i64,
    pub size_id: i64,
    pub quantity: i64,
    pub unit_price: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockUpdateRequest {
    pub product_id: i64,
    pub size_id: i64,
    pub available: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetResult {
    pub cancelled: usize,
}
