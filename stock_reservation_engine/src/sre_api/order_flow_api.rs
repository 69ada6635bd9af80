use std::fmt::Debug;

use chrono::{DateTime, Duration, Utc};
use log::*;

use crate::{
    db_types::{NewOrder, Order, OrderId},
    events::{EventProducers, OrderAnnulledEvent, OrderPaidEvent},
    expiry_queue::ExpiryQueue,
    sre_api::order_objects::OrderWithItems,
    traits::{ExpiryOutcome, ExpirySummary, ReservationDatabase, ReservationError},
};

/// `OrderFlowApi` drives the order lifecycle from placement to settlement.
///
/// Placing an order reserves stock and sets a payment deadline. From there the
/// order either gets paid or cancelled through the methods here, or lapses and
/// is picked up by [`OrderFlowApi::expire_due_orders`] (fed by the in-process
/// expiry queue) or by [`OrderFlowApi::sweep_overdue_orders`] (fed by the
/// orders table). The database has the final say in every path; the queue only
/// decides when to look.
pub struct OrderFlowApi<B> {
    db: B,
    queue: ExpiryQueue,
    producers: EventProducers,
    payment_window: Duration,
}

impl<B> Debug for OrderFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi")
    }
}

impl<B> OrderFlowApi<B> {
    pub fn new(db: B, queue: ExpiryQueue, producers: EventProducers, payment_window: Duration) -> Self {
        Self { db, queue, producers, payment_window }
    }
}

impl<B> OrderFlowApi<B>
where B: ReservationDatabase
{
    /// Place a new order, reserving stock for every line.
    ///
    /// The reservation is all-or-nothing and first-committed-wins; when stock runs out
    /// mid-burst the order fails with [`ReservationError::InsufficientStock`] and the
    /// ledger is untouched. On success the order sits in `WaitingPayment` with a
    /// deadline of now plus the configured payment window, and the deadline is queued
    /// for the expiry worker.
    pub async fn place_order(&self, order: NewOrder) -> Result<OrderWithItems, ReservationError> {
        validate_new_order(&order)?;
        let expires_at = Utc::now() + self.payment_window;
        let created = self.db.create_order(order, expires_at).await?;
        // Queue the deadline only after the transaction has committed. A stale queue
        // entry is harmless; an entry for an order that never made it in is not.
        self.queue.schedule(created.order.order_id.clone(), expires_at);
        debug!("🔄️📦️ Order {} placed. Payment due by {expires_at}", created.order.order_id);
        Ok(created)
    }

    /// Confirm payment for a waiting order. The order becomes `Paid`, keeps its stock,
    /// and its deadline entry is dropped from the queue.
    pub async fn confirm_payment(&self, order_id: &OrderId) -> Result<Order, ReservationError> {
        let order = self.db.mark_order_paid(order_id).await?;
        self.queue.remove(order_id);
        self.call_order_paid_hook(&order).await;
        debug!("🔄️✅️ Order {order_id} paid");
        Ok(order)
    }

    /// Cancel a waiting order, returning its stock to the ledger.
    pub async fn cancel_order(&self, order_id: &OrderId) -> Result<Order, ReservationError> {
        let order = self.db.cancel_order(order_id).await?;
        self.queue.remove(order_id);
        self.call_order_annulled_hook(&order).await;
        debug!("🔄️❌️ Order {order_id} cancelled");
        Ok(order)
    }

    /// One reconciliation pass over the expiry queue, as of `now`.
    ///
    /// Each due entry is checked against the database. Orders still waiting are
    /// expired with their stock restored; entries for settled or unknown orders are
    /// dropped as stale. When an expiry transaction fails the entry stays queued and
    /// the next tick retries it.
    pub async fn expire_due_orders(&self, now: DateTime<Utc>) -> ExpirySummary {
        let due = self.queue.due(now);
        self.reconcile_orders(due).await
    }

    /// The safety net behind the queue: expire every waiting order whose deadline
    /// in the *database* has lapsed, regardless of what the in-process queue holds.
    /// This catches deadlines lost to a restart. It runs the same per-order
    /// reconciliation as the queue path, so the two never disagree.
    pub async fn sweep_overdue_orders(&self, now: DateTime<Utc>) -> Result<ExpirySummary, ReservationError> {
        let overdue = self.db.overdue_waiting_orders(now).await?;
        if overdue.is_empty() {
            return Ok(ExpirySummary::default());
        }
        info!("🔄️ Deadline scan found {} overdue waiting orders", overdue.len());
        let ids = overdue.into_iter().map(|o| o.order_id).collect();
        Ok(self.reconcile_orders(ids).await)
    }

    /// Cancel every waiting order and restore their stock. Used to reset the shop
    /// between load test runs.
    pub async fn cancel_all_waiting_orders(&self) -> Result<Vec<Order>, ReservationError> {
        let cancelled = self.db.cancel_all_waiting_orders().await?;
        for order in &cancelled {
            self.queue.remove(&order.order_id);
            self.call_order_annulled_hook(order).await;
        }
        info!("🔄️ Reset cancelled {} waiting orders", cancelled.len());
        Ok(cancelled)
    }

    async fn reconcile_orders(&self, order_ids: Vec<OrderId>) -> ExpirySummary {
        let mut summary = ExpirySummary::default();
        for order_id in order_ids {
            match self.db.expire_order(&order_id).await {
                Ok(ExpiryOutcome::Expired(order)) => {
                    self.queue.remove(&order_id);
                    self.call_order_annulled_hook(&order).await;
                    summary.expired.push(order);
                },
                Ok(ExpiryOutcome::AlreadySettled(order)) => {
                    self.queue.remove(&order_id);
                    debug!("🔄️ Order {order_id} was already {} when its deadline came up", order.status);
                    summary.stale += 1;
                },
                Ok(ExpiryOutcome::NotFound) => {
                    self.queue.remove(&order_id);
                    warn!("🔄️ The expiry queue held unknown order {order_id}. Entry dropped");
                    summary.stale += 1;
                },
                Err(e) => {
                    // Keep the queue entry so the next tick retries this order
                    error!("🔄️ Could not expire order {order_id}: {e}");
                    summary.failed += 1;
                },
            }
        }
        summary
    }

    async fn call_order_paid_hook(&self, order: &Order) {
        for producer in &self.producers.order_paid_producer {
            let event = OrderPaidEvent::new(order.clone());
            producer.publish_event(event).await;
        }
    }

    async fn call_order_annulled_hook(&self, order: &Order) {
        for producer in &self.producers.order_annulled_producer {
            let event = OrderAnnulledEvent::new(order.clone());
            producer.publish_event(event).await;
        }
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    pub fn db_mut(&mut self) -> &mut B {
        &mut self.db
    }

    pub fn queue(&self) -> &ExpiryQueue {
        &self.queue
    }
}

fn validate_new_order(order: &NewOrder) -> Result<(), ReservationError> {
    if order.items.is_empty() {
        return Err(ReservationError::ValidationError("An order needs at least one line".to_string()));
    }
    if let Some(line) = order.items.iter().find(|i| i.quantity < 1) {
        return Err(ReservationError::ValidationError(format!(
            "Quantity for product {} size {} must be at least 1",
            line.product_id, line.size_id
        )));
    }
    if let Some(line) = order.items.iter().find(|i| i.unit_price.is_negative()) {
        return Err(ReservationError::ValidationError(format!(
            "Unit price for product {} size {} cannot be negative",
            line.product_id, line.size_id
        )));
    }
    if order.points_used < 0 {
        return Err(ReservationError::ValidationError("Points cannot be negative".to_string()));
    }
    if order.recipient_name.trim().is_empty() ||
        order.recipient_phone.trim().is_empty() ||
        order.recipient_address.trim().is_empty()
    {
        return Err(ReservationError::ValidationError("Recipient name, phone and address are required".to_string()));
    }
    Ok(())
}
