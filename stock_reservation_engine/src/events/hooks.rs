use std::{future::Future, pin::Pin, sync::Arc};

use log::info;

use crate::events::{
    channel::{EventHandler, EventProducer, Handler},
    event_types::{OrderAnnulledEvent, OrderPaidEvent},
};

/// The producer ends of every configured event channel. The flow API holds a copy and
/// publishes to all producers registered for an event type.
#[derive(Clone, Default)]
pub struct EventProducers {
    pub order_paid_producer: Vec<EventProducer<OrderPaidEvent>>,
    pub order_annulled_producer: Vec<EventProducer<OrderAnnulledEvent>>,
}

/// The receiver ends, one per hook that was actually installed.
pub struct EventHandlers {
    pub on_order_paid: Option<EventHandler<OrderPaidEvent>>,
    pub on_order_annulled: Option<EventHandler<OrderAnnulledEvent>>,
}

impl EventHandlers {
    pub fn new(buffer_size: usize, hooks: EventHooks) -> Self {
        let on_order_paid = hooks.on_order_paid.map(|f| EventHandler::new(buffer_size, f));
        let on_order_annulled = hooks.on_order_annulled.map(|f| EventHandler::new(buffer_size, f));
        Self { on_order_paid, on_order_annulled }
    }

    /// One producer per installed handler. Call before [`EventHandlers::start_handlers`]
    /// consumes `self`.
    pub fn producers(&self) -> EventProducers {
        let mut producers = EventProducers::default();
        if let Some(handler) = &self.on_order_paid {
            producers.order_paid_producer.push(handler.subscribe());
        }
        if let Some(handler) = &self.on_order_annulled {
            producers.order_annulled_producer.push(handler.subscribe());
        }
        producers
    }

    /// Spawn the receive loop for each installed handler.
    pub async fn start_handlers(self) {
        if let Some(handler) = self.on_order_paid {
            info!("📬️ Starting order_paid event handler");
            tokio::spawn(handler.start_handler());
        }
        if let Some(handler) = self.on_order_annulled {
            info!("📬️ Starting order_annulled event handler");
            tokio::spawn(handler.start_handler());
        }
    }
}

/// The hook functions to install at startup. Every hook is optional.
#[derive(Clone, Default)]
pub struct EventHooks {
    pub on_order_paid: Option<Handler<OrderPaidEvent>>,
    pub on_order_annulled: Option<Handler<OrderAnnulledEvent>>,
}

impl EventHooks {
    pub fn on_order_paid<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(OrderPaidEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_order_paid = Some(Arc::new(f));
        self
    }

    pub fn on_order_annulled<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(OrderAnnulledEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_order_annulled = Some(Arc::new(f));
        self
    }
}
