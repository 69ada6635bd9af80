use std::fmt::Display;

use crate::db_types::Order;

/// What the database found when asked to expire a single order.
#[derive(Debug, Clone)]
pub enum ExpiryOutcome {
    /// The order was still waiting for payment. It is now `Expired` and its stock is
    /// back in the ledger.
    Expired(Order),
    /// The order reached a terminal state before the reconciler got to it. Nothing
    /// was changed.
    AlreadySettled(Order),
    /// No order with this id exists.
    NotFound,
}

/// Tally of one reconciliation pass over due orders.
#[derive(Debug, Clone, Default)]
pub struct ExpirySummary {
    pub expired: Vec<Order>,
    /// Queue entries that pointed at already-settled or unknown orders. They have been
    /// dropped from the queue.
    pub stale: usize,
    /// Orders whose expiry transaction failed. Their queue entries are kept so the next
    /// tick retries them.
    pub failed: usize,
}

impl ExpirySummary {
    pub fn expired_count(&self) -> usize {
        self.expired.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expired.is_empty() && self.stale == 0 && self.failed == 0
    }
}

impl Display for ExpirySummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} orders expired, {} stale entries dropped, {} failed", self.expired.len(), self.stale, self.failed)
    }
}
