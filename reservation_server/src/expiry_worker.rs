use chrono::{Duration, Utc};
use log::*;
use stock_reservation_engine::{db_types::Order, events::EventProducers, ExpiryQueue, OrderFlowApi, SqliteDatabase};
use tokio::task::JoinHandle;

/// Starts the expiry worker. Do not await the returned JoinHandle, as it will run indefinitely.
///
/// The worker drives two timers. The poll timer fires every `poll_interval` and expires the orders whose deadline
/// has passed according to the in-process timer queue. The sweep timer fires every `sweep_interval` and re-reads
/// the deadlines straight from the database, catching orders the queue lost track of (for example after a
/// restart).
pub fn start_expiry_worker(
    db: SqliteDatabase,
    queue: ExpiryQueue,
    producers: EventProducers,
    payment_window: Duration,
    poll_interval: std::time::Duration,
    sweep_interval: std::time::Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let api = OrderFlowApi::new(db, queue, producers, payment_window);
        let mut poll = tokio::time::interval(poll_interval);
        let mut sweep = tokio::time::interval(sweep_interval);
        info!("🕰️ Order expiry worker started");
        loop {
            tokio::select! {
                _ = poll.tick() => {
                    let summary = api.expire_due_orders(Utc::now()).await;
                    if !summary.is_empty() {
                        info!("🕰️ {summary}");
                        debug!("🕰️ Expired orders: {}", order_list(&summary.expired));
                    }
                    if summary.failed > 0 {
                        warn!("🕰️ {} due orders could not be expired. They stay queued for the next tick.", summary.failed);
                    }
                },
                _ = sweep.tick() => {
                    debug!("🕰️ Running payment deadline scan");
                    match api.sweep_overdue_orders(Utc::now()).await {
                        Ok(summary) => {
                            if !summary.is_empty() {
                                info!("🕰️ Deadline scan: {summary}");
                                debug!("🕰️ Expired orders: {}", order_list(&summary.expired));
                            }
                        },
                        Err(e) => {
                            error!("🕰️ Error running the payment deadline scan: {e}");
                        },
                    }
                },
            }
        }
    })
}

fn order_list(orders: &[Order]) -> String {
    orders
        .iter()
        .map(|o| format!("[{}] order_id: {} cust_id: {}", o.id, o.order_id, o.customer_id))
        .collect::<Vec<String>>()
        .join(", ")
}
