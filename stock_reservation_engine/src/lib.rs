//! # Stock reservation engine
//!
//! The backend of the storefront reservation gateway. The engine owns three
//! concerns:
//!
//! 1. **The stock ledger and order store.** Orders reserve stock the moment
//!    they are created, inside one transaction, with a conditional decrement
//!    that can never oversell. See [`traits::ReservationDatabase`] for the
//!    contract and [`SqliteDatabase`] for the SQLite implementation.
//! 2. **The order lifecycle.** `WaitingPayment` orders become `Paid`,
//!    `Cancelled` or `Expired` exactly once; the losing transitions see zero
//!    rows and report it. [`OrderFlowApi`] drives the transitions and
//!    publishes [`events`] after each commit.
//! 3. **Expiry reconciliation.** Payment deadlines are tracked twice: in the
//!    advisory in-process [`ExpiryQueue`] that the worker polls every tick,
//!    and in the `orders.expires_at` column that the periodic deadline scan
//!    reads. Both paths funnel into the same status-guarded transaction, so
//!    an order is only ever expired once no matter who finds it first.

pub mod db_types;
pub mod events;
pub mod expiry_queue;
pub mod helpers;
#[cfg(feature = "sqlite")]
mod sqlite;
mod sre_api;
pub mod traits;

pub use expiry_queue::ExpiryQueue;
#[cfg(feature = "sqlite")]
pub use sqlite::{run_migrations, SqliteDatabase};
pub use sre_api::{order_flow_api::OrderFlowApi, order_objects, order_query_api::OrderQueryApi};
pub use traits::{
    ExpiryOutcome,
    ExpirySummary,
    OrderManagement,
    OrderQueryError,
    ReservationDatabase,
    ReservationError,
};
