//! An in-process, deadline-ordered queue of payment deadlines.
//!
//! The queue is advisory. It tells the expiry worker *when to look*, and the
//! database decides *what is true*: every order id handed out by [`ExpiryQueue::due`]
//! is re-checked against the current order status inside a transaction before
//! anything is expired. Entries are only removed after that transaction commits,
//! so a crash in between leaves a stale entry that the next poll discards.
//!
//! Because the queue lives in process memory it empties on restart. The periodic
//! deadline scan re-derives due orders from the `orders` table, so nothing is
//! rebuilt at startup.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use log::trace;

use crate::db_types::OrderId;

#[derive(Debug, Clone, Default)]
pub struct ExpiryQueue {
    inner: Arc<Mutex<QueueInner>>,
}

#[derive(Debug, Default)]
struct QueueInner {
    deadlines: HashMap<OrderId, DateTime<Utc>>,
    ordering: BTreeSet<(DateTime<Utc>, OrderId)>,
}

impl ExpiryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record (or move) the payment deadline for an order. An existing entry for the
    /// same order is replaced rather than duplicated.
    pub fn schedule(&self, order_id: OrderId, expires_at: DateTime<Utc>) {
        let mut q = self.lock();
        if let Some(old) = q.deadlines.insert(order_id.clone(), expires_at) {
            q.ordering.remove(&(old, order_id.clone()));
        }
        trace!("⏳️ Order {order_id} queued for expiry at {expires_at}");
        q.ordering.insert((expires_at, order_id));
    }

    /// The ids of all orders whose deadline is at or before `now`, earliest deadline
    /// first. The entries stay queued; call [`ExpiryQueue::remove`] once the order has
    /// been settled in the database.
    pub fn due(&self, now: DateTime<Utc>) -> Vec<OrderId> {
        let q = self.lock();
        q.ordering.iter().take_while(|(at, _)| *at <= now).map(|(_, id)| id.clone()).collect()
    }

    /// Drop the entry for an order, if there is one. Returns `false` for unknown ids.
    pub fn remove(&self, order_id: &OrderId) -> bool {
        let mut q = self.lock();
        match q.deadlines.remove(order_id) {
            Some(at) => {
                q.ordering.remove(&(at, order_id.clone()));
                trace!("⏳️ Order {order_id} removed from the expiry queue");
                true
            },
            None => false,
        }
    }

    pub fn contains(&self, order_id: &OrderId) -> bool {
        self.lock().deadlines.contains_key(order_id)
    }

    pub fn len(&self) -> usize {
        self.lock().deadlines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().deadlines.is_empty()
    }

    pub fn clear(&self) {
        let mut q = self.lock();
        q.deadlines.clear();
        q.ordering.clear();
    }

    fn lock(&self) -> MutexGuard<'_, QueueInner> {
        // A poisoned lock only means another thread panicked mid-update. The maps are
        // always mutated in pairs under the guard, so the state is still usable.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod test {
    use chrono::{Duration, Utc};

    use super::ExpiryQueue;
    use crate::db_types::OrderId;

    fn oid(s: &str) -> OrderId {
        OrderId(s.to_string())
    }

    #[test]
    fn due_returns_lapsed_deadlines_in_order() {
        let queue = ExpiryQueue::new();
        let now = Utc::now();
        queue.schedule(oid("late"), now + Duration::minutes(15));
        queue.schedule(oid("second"), now - Duration::seconds(5));
        queue.schedule(oid("first"), now - Duration::minutes(2));
        let due = queue.due(now);
        assert_eq!(due, vec![oid("first"), oid("second")]);
        // Entries survive a poll until they are removed explicitly
        assert_eq!(queue.len(), 3);
    }

    #[test]
    fn rescheduling_replaces_the_deadline() {
        let queue = ExpiryQueue::new();
        let now = Utc::now();
        queue.schedule(oid("a"), now - Duration::seconds(1));
        queue.schedule(oid("a"), now + Duration::minutes(10));
        assert_eq!(queue.len(), 1);
        assert!(queue.due(now).is_empty());
    }

    #[test]
    fn remove_is_idempotent() {
        let queue = ExpiryQueue::new();
        queue.schedule(oid("a"), Utc::now());
        assert!(queue.remove(&oid("a")));
        assert!(!queue.remove(&oid("a")));
        assert!(queue.is_empty());
    }

    #[test]
    fn clear_empties_the_queue() {
        let queue = ExpiryQueue::new();
        let now = Utc::now();
        queue.schedule(oid("a"), now);
        queue.schedule(oid("b"), now);
        queue.clear();
        assert!(queue.is_empty());
        assert!(queue.due(now + Duration::hours(1)).is_empty());
    }
}
