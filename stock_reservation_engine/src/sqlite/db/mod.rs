//! Low-level database functions.
//!
//! Everything in the submodules runs single statements against a borrowed
//! connection, so callers can compose them inside whatever transaction they
//! need. No business rules live here; the status guards and the
//! reserve-or-reject logic are wired together one level up, in
//! [`super::SqliteDatabase`].

pub mod order_items;
pub mod orders;
pub mod stock;

use std::{str::FromStr, time::Duration};

use log::debug;
use sqlx::{
    migrate::MigrateError,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    SqlitePool,
};

/// Open a connection pool against the given SQLite URL, creating the database
/// file if it does not exist yet.
///
/// Order creation makes the stock ledger a write hotspot. WAL keeps readers
/// moving while a writer holds the lock, and the busy timeout makes concurrent
/// writers queue for it instead of failing with `SQLITE_BUSY`.
pub async fn new_pool(url: &str, max_connections: u32) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5))
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new().max_connections(max_connections).connect_with(options).await?;
    debug!("🗃️ Connection pool established for {url}");
    Ok(pool)
}

/// Bring the schema up to date. The server runs this at startup; tests run it
/// against their throwaway databases.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), MigrateError> {
    sqlx::migrate!("./src/sqlite/migrations").run(pool).await
}
