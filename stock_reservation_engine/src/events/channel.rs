use std::{
    fmt::Debug,
    future::Future,
    pin::Pin,
    sync::{
        atomic::{AtomicI64, Ordering},
        Arc,
    },
    time::Duration,
};

use log::*;
use tokio::sync::mpsc;

/// The signature for event hook functions. A handler receives the event by value and
/// returns a boxed future so that implementations are free to do async work.
pub type Handler<E> = Arc<dyn Fn(E) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

/// The receiving half of an event channel.
///
/// Producers obtained from [`EventHandler::subscribe`] push events in;
/// [`EventHandler::start_handler`] consumes them, spawning one task per event so
/// a slow hook never blocks the channel. The handler shuts down once every
/// producer has been dropped and the outstanding tasks have finished.
pub struct EventHandler<E> {
    listener: mpsc::Receiver<E>,
    sender: mpsc::Sender<E>,
    handler: Handler<E>,
}

impl<E> EventHandler<E>
where E: Send + 'static
{
    pub fn new(buffer_size: usize, handler: Handler<E>) -> Self {
        let (sender, listener) = mpsc::channel(buffer_size);
        Self { listener, sender, handler }
    }

    pub fn subscribe(&self) -> EventProducer<E> {
        EventProducer { sender: self.sender.clone() }
    }

    pub async fn start_handler(mut self) {
        // Drop our copy of the sender, otherwise the recv loop below never ends
        drop(self.sender);
        let jobs = Arc::new(AtomicI64::new(0));
        while let Some(event) = self.listener.recv().await {
            let handler = Arc::clone(&self.handler);
            let jobs_count = Arc::clone(&jobs);
            jobs_count.fetch_add(1, Ordering::SeqCst);
            tokio::spawn(async move {
                handler(event).await;
                jobs_count.fetch_sub(1, Ordering::SeqCst);
            });
        }
        debug!("📬️ All producers disconnected. Waiting for outstanding hooks to finish");
        while jobs.load(Ordering::SeqCst) > 0 {
            tokio::time::sleep(Duration::from_millis(25)).await;
        }
        info!("📬️ Event handler shut down");
    }
}

/// The sending half of an event channel. Cheap to clone; publishing never
/// returns an error to the caller, a failed send is logged and dropped.
#[derive(Clone)]
pub struct EventProducer<E> {
    sender: mpsc::Sender<E>,
}

impl<E> EventProducer<E>
where E: Debug
{
    pub async fn publish_event(&self, event: E) {
        trace!("📬️ Publishing event {event:?}");
        if let Err(e) = self.sender.send(event).await {
            error!("📬️ Failed to publish event. {e}");
        }
    }
}
