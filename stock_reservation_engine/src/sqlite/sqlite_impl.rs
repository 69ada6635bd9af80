use chrono::{DateTime, Utc};
use log::debug;
use sqlx::{SqliteConnection, SqlitePool};

use crate::{
    db_types::{NewOrder, Order, OrderId, OrderStatus, StockLevel},
    sqlite::db::{new_pool, order_items, orders, stock},
    sre_api::order_objects::{OrderQueryFilter, OrderWithItems},
    traits::{ExpiryOutcome, OrderManagement, OrderQueryError, ReservationDatabase, ReservationError},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl std::fmt::Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SqliteDatabase ({})", self.url)
    }
}

impl SqliteDatabase {
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// Flip a waiting order into `new_status` and put every reserved line back on the
/// stock ledger, all on the caller's transaction. `None` means the status guard
/// matched nothing: the order is unknown or already settled, and nothing changed.
async fn settle_and_restock(
    order_id: &OrderId,
    new_status: OrderStatus,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, ReservationError> {
    let order = match orders::settle_waiting_order(order_id, new_status, conn).await? {
        Some(order) => order,
        None => return Ok(None),
    };
    let items = order_items::items_for_order(order.id, conn).await?;
    for item in &items {
        let restored = stock::release_stock(item.product_id, item.size_id, item.quantity, conn).await?;
        if !restored {
            return Err(ReservationError::StockRestoreFailed {
                order_id: order.order_id.clone(),
                product_id: item.product_id,
                size_id: item.size_id,
            });
        }
    }
    Ok(Some(order))
}

impl ReservationDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        &self.url
    }

    async fn create_order(&self, order: NewOrder, expires_at: DateTime<Utc>) -> Result<OrderWithItems, ReservationError> {
        debug!("🗃️ Creating order {} for customer {}", order.order_id, order.customer_id);
        let mut tx = self.pool.begin().await?;
        for line in &order.items {
            let reserved = stock::reserve_stock(line.product_id, line.size_id, line.quantity, &mut tx).await?;
            if !reserved {
                // Zero rows moved. Re-read the ledger row, still inside the transaction,
                // to tell a missing pair apart from a plain shortage.
                let err = match stock::fetch_stock_level(line.product_id, line.size_id, &mut tx).await? {
                    Some(level) => ReservationError::InsufficientStock {
                        product_id: line.product_id,
                        size_id: line.size_id,
                        requested: line.quantity,
                        available: level.available,
                    },
                    None => ReservationError::UnknownProductSize { product_id: line.product_id, size_id: line.size_id },
                };
                debug!("🗃️ Order {} rejected. {err}", order.order_id);
                // Dropping the transaction rolls back any lines already reserved
                return Err(err);
            }
        }
        let inserted = orders::insert_order(&order, expires_at, &mut tx).await?;
        let mut items = Vec::with_capacity(order.items.len());
        for line in &order.items {
            let item = order_items::insert_order_item(inserted.id, line, &mut tx).await?;
            items.push(item);
        }
        tx.commit().await?;
        debug!("🗃️ Order {} created with {} lines, payment due {expires_at}", inserted.order_id, items.len());
        Ok(OrderWithItems { order: inserted, items })
    }

    async fn mark_order_paid(&self, order_id: &OrderId) -> Result<Order, ReservationError> {
        let mut tx = self.pool.begin().await?;
        match orders::settle_waiting_order(order_id, OrderStatus::Paid, &mut tx).await? {
            Some(order) => {
                tx.commit().await?;
                debug!("🗃️ Order {order_id} marked as paid");
                Ok(order)
            },
            None => {
                drop(tx);
                match self.fetch_order_by_order_id(order_id).await? {
                    Some(order) => Err(ReservationError::OrderAlreadyFinalized(order.order_id, order.status)),
                    None => Err(ReservationError::OrderNotFound(order_id.clone())),
                }
            },
        }
    }

    async fn cancel_order(&self, order_id: &OrderId) -> Result<Order, ReservationError> {
        let mut tx = self.pool.begin().await?;
        match settle_and_restock(order_id, OrderStatus::Cancelled, &mut tx).await? {
            Some(order) => {
                tx.commit().await?;
                debug!("🗃️ Order {order_id} cancelled and its stock returned");
                Ok(order)
            },
            None => {
                drop(tx);
                match self.fetch_order_by_order_id(order_id).await? {
                    Some(order) => Err(ReservationError::OrderAlreadyFinalized(order.order_id, order.status)),
                    None => Err(ReservationError::OrderNotFound(order_id.clone())),
                }
            },
        }
    }

    async fn expire_order(&self, order_id: &OrderId) -> Result<ExpiryOutcome, ReservationError> {
        let mut tx = self.pool.begin().await?;
        match settle_and_restock(order_id, OrderStatus::Expired, &mut tx).await? {
            Some(order) => {
                tx.commit().await?;
                debug!("🗃️ Order {order_id} expired and its stock returned");
                Ok(ExpiryOutcome::Expired(order))
            },
            None => {
                drop(tx);
                match self.fetch_order_by_order_id(order_id).await? {
                    Some(order) => Ok(ExpiryOutcome::AlreadySettled(order)),
                    None => Ok(ExpiryOutcome::NotFound),
                }
            },
        }
    }

    async fn overdue_waiting_orders(&self, now: DateTime<Utc>) -> Result<Vec<Order>, ReservationError> {
        let mut conn = self.pool.acquire().await?;
        let overdue = orders::overdue_waiting_orders(now, &mut conn).await?;
        Ok(overdue)
    }

    async fn cancel_all_waiting_orders(&self) -> Result<Vec<Order>, ReservationError> {
        let mut tx = self.pool.begin().await?;
        let waiting = orders::waiting_orders(&mut tx).await?;
        let mut cancelled = Vec::with_capacity(waiting.len());
        for order in waiting {
            if let Some(order) = settle_and_restock(&order.order_id, OrderStatus::Cancelled, &mut tx).await? {
                cancelled.push(order);
            }
        }
        tx.commit().await?;
        debug!("🗃️ Cancelled {} waiting orders", cancelled.len());
        Ok(cancelled)
    }

    async fn set_stock_level(&self, product_id: i64, size_id: i64, available: i64) -> Result<StockLevel, ReservationError> {
        let mut conn = self.pool.acquire().await?;
        let level = stock::upsert_stock_level(product_id, size_id, available, &mut conn).await?;
        debug!("🗃️ Stock for product {product_id} size {size_id} set to {available}");
        Ok(level)
    }

    async fn close(&mut self) -> Result<(), ReservationError> {
        self.pool.close().await;
        Ok(())
    }
}

impl OrderManagement for SqliteDatabase {
    async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, OrderQueryError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_order_id(order_id, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_order_with_items(&self, order_id: &OrderId) -> Result<Option<OrderWithItems>, OrderQueryError> {
        let mut conn = self.pool.acquire().await?;
        let order = match orders::fetch_order_by_order_id(order_id, &mut conn).await? {
            Some(order) => order,
            None => return Ok(None),
        };
        let items = order_items::items_for_order(order.id, &mut conn).await?;
        Ok(Some(OrderWithItems { order, items }))
    }

    async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, OrderQueryError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::search_orders(query, &mut conn).await?;
        Ok(orders)
    }

    async fn waiting_order_count(&self) -> Result<i64, OrderQueryError> {
        let mut conn = self.pool.acquire().await?;
        let count = orders::waiting_order_count(&mut conn).await?;
        Ok(count)
    }

    async fn fetch_stock_level(&self, product_id: i64, size_id: i64) -> Result<Option<StockLevel>, OrderQueryError> {
        let mut conn = self.pool.acquire().await?;
        let level = stock::fetch_stock_level(product_id, size_id, &mut conn).await?;
        Ok(level)
    }
}
