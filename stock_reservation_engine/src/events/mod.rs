//! Fire-and-forget order lifecycle events.
//!
//! The flow API publishes an event after the corresponding database
//! transaction commits. Handlers run on their own tasks behind an mpsc
//! channel, so a slow or failing subscriber can never hold up order
//! processing.

mod channel;
mod event_types;
mod hooks;

pub use channel::{EventHandler, EventProducer, Handler};
pub use event_types::{OrderAnnulledEvent, OrderPaidEvent};
pub use hooks::{EventHandlers, EventHooks, EventProducers};
