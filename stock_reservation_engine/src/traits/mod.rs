//! The database abstractions for the reservation engine.
//!
//! There are two traits:
//!
//! * [`ReservationDatabase`]: the write side. Creating orders with their stock
//!   reservations, settling them (paid, cancelled, expired) and maintaining the
//!   stock ledger. Every mutation is transactional and guarded by the current
//!   order status, so calls are safe to repeat.
//! * [`OrderManagement`]: the read side. Fetching and searching orders and
//!   looking up stock levels.
//!
//! The engine ships a SQLite implementation of both; the HTTP layer and the
//! expiry worker only ever talk to these traits.

mod data_objects;
mod order_management;
mod reservation_database;

pub use data_objects::{ExpiryOutcome, ExpirySummary};
pub use order_management::{OrderManagement, OrderQueryError};
pub use reservation_database::{ReservationDatabase, ReservationError};
