use std::fmt::Display;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use log::error;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use srg_common::Money;
use thiserror::Error;

use crate::helpers::new_order_id;

//--------------------------------------    OrderStatus      ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum OrderStatus {
    /// The order has been created, stock is reserved, and payment is outstanding.
    WaitingPayment,
    /// Payment was confirmed while the order was still live. The reservation is permanent.
    Paid,
    /// The payment window lapsed and the reserved stock has been returned to the ledger.
    Expired,
    /// The order was cancelled explicitly and the reserved stock has been returned to the ledger.
    Cancelled,
}

impl OrderStatus {
    /// Paid, Expired and Cancelled are terminal. Only waiting orders may change status.
    pub fn is_final(&self) -> bool {
        !matches!(self, OrderStatus::WaitingPayment)
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::WaitingPayment => write!(f, "WaitingPayment"),
            OrderStatus::Paid => write!(f, "Paid"),
            OrderStatus::Expired => write!(f, "Expired"),
            OrderStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

impl From<String> for OrderStatus {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid order status: {value}. But this conversion cannot fail. Defaulting to WaitingPayment");
            OrderStatus::WaitingPayment
        })
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid conversion: {0}")]
pub struct ConversionError(String);

impl FromStr for OrderStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "WaitingPayment" => Ok(Self::WaitingPayment),
            "Paid" => Ok(Self::Paid),
            "Expired" => Ok(Self::Expired),
            "Cancelled" => Ok(Self::Cancelled),
            s => Err(ConversionError(format!("Invalid order status: {s}"))),
        }
    }
}

//--------------------------------------       OrderId       ---------------------------------------------------------
/// The public identifier for an order. Opaque to the engine, unique in the orders table.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct OrderId(pub String);

impl FromStr for OrderId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for OrderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl OrderId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------        Order        ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub order_id: OrderId,
    pub customer_id: String,
    pub recipient_name: String,
    pub recipient_phone: String,
    pub recipient_address: String,
    pub subtotal: Money,
    pub total_quantity: i64,
    pub points_used: i64,
    pub status: OrderStatus,
    /// Payment deadline. Set while the order is waiting for payment, NULL in every terminal state.
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------      NewOrder       ---------------------------------------------------------
#[derive(Debug, Clone)]
pub struct NewOrder {
    /// Freshly minted public id for the order
    pub order_id: OrderId,
    /// The authenticated buyer placing the order
    pub customer_id: String,
    pub recipient_name: String,
    pub recipient_phone: String,
    pub recipient_address: String,
    /// Loyalty points the buyer wants to apply. Carried through as an opaque amount.
    pub points_used: i64,
    /// The order lines. Stock is reserved for every line or for none at all.
    pub items: Vec<NewOrderItem>,
    pub created_at: DateTime<Utc>,
}

impl NewOrder {
    pub fn new(customer_id: String, recipient_name: String, recipient_phone: String, recipient_address: String) -> Self {
        Self {
            order_id: new_order_id(),
            customer_id,
            recipient_name,
            recipient_phone,
            recipient_address,
            points_used: 0,
            items: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn with_item(mut self, item: NewOrderItem) -> Self {
        self.items.push(item);
        self
    }

    pub fn with_points(mut self, points: i64) -> Self {
        self.points_used = points;
        self
    }

    /// The sum of `quantity * unit_price` over all lines, snapshotted at order time.
    pub fn subtotal(&self) -> Money {
        self.items.iter().map(|i| i.unit_price * i.quantity).sum()
    }

    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    pub fn is_equivalent(&self, order: &Order) -> bool {
        self.order_id == order.order_id
            && self.customer_id == order.customer_id
            && self.recipient_name == order.recipient_name
            && self.recipient_phone == order.recipient_phone
            && self.recipient_address == order.recipient_address
            && self.points_used == order.points_used
            && self.subtotal() == order.subtotal
            && self.total_quantity() == order.total_quantity
    }
}

//--------------------------------------    NewOrderItem     ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrderItem {
    pub product_id: i64,
    pub size_id: i64,
    pub quantity: i64,
    /// Unit price as quoted to the buyer when the order was placed.
    pub unit_price: Money,
}

impl NewOrderItem {
    pub fn new(product_id: i64, size_id: i64, quantity: i64, unit_price: Money) -> Self {
        Self { product_id, size_id, quantity, unit_price }
    }
}

//--------------------------------------     OrderItem       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: i64,
    /// Row id of the owning order, i.e. `orders.id` rather than the public order id.
    pub order_id: i64,
    pub product_id: i64,
    pub size_id: i64,
    pub quantity: i64,
    pub unit_price: Money,
}

//--------------------------------------     StockLevel      ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct StockLevel {
    pub product_id: i64,
    pub size_id: i64,
    pub available: i64,
    pub updated_at: DateTime<Utc>,
}
