use std::fmt::Display;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db_types::{Order, OrderItem, OrderStatus};

/// An order together with its lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrderQueryFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Vec<OrderStatus>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub since: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub until: Option<DateTime<Utc>>,
}

impl OrderQueryFilter {
    pub fn with_customer_id<S: Into<String>>(mut self, customer_id: S) -> Self {
        self.customer_id = Some(customer_id.into());
        self
    }

    pub fn with_status(mut self, status: OrderStatus) -> Self {
        if self.status.is_none() {
            self.status = Some(Vec::with_capacity(4));
        }
        if let Some(statuses) = &mut self.status {
            statuses.push(status);
        }
        self
    }

    pub fn since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    pub fn until(mut self, until: DateTime<Utc>) -> Self {
        self.until = Some(until);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.customer_id.is_none() && self.status.is_none() && self.since.is_none() && self.until.is_none()
    }
}

impl Display for OrderQueryFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            write!(f, "No filters.")?;
            return Ok(());
        }
        if let Some(customer_id) = &self.customer_id {
            write!(f, "customer_id: {customer_id}. ")?;
        }
        if let Some(since) = &self.since {
            write!(f, "since {since}. ")?;
        }
        if let Some(until) = &self.until {
            write!(f, "until {until}. ")?;
        }
        if let Some(statuses) = &self.status {
            let statuses = statuses.iter().map(|s| s.to_string()).collect::<Vec<String>>().join(",");
            write!(f, "statuses: [{statuses}]. ")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::OrderQueryFilter;
    use crate::db_types::OrderStatus;

    #[test]
    fn filter_builder_and_display() {
        let filter = OrderQueryFilter::default();
        assert!(filter.is_empty());
        assert_eq!(filter.to_string(), "No filters.");
        let filter = filter
            .with_customer_id("cust-77")
            .with_status(OrderStatus::WaitingPayment)
            .with_status(OrderStatus::Paid);
        assert!(!filter.is_empty());
        assert_eq!(filter.to_string(), "customer_id: cust-77. statuses: [WaitingPayment,Paid]. ");
    }

    #[test]
    fn filter_rejects_unknown_fields() {
        let filter = serde_json::from_str::<OrderQueryFilter>(r#"{"customer_id": "a", "size": 4}"#);
        assert!(filter.is_err());
        let filter: OrderQueryFilter = serde_json::from_str(r#"{"status": ["Expired"]}"#).unwrap();
        assert_eq!(filter.status, Some(vec![OrderStatus::Expired]));
    }
}
