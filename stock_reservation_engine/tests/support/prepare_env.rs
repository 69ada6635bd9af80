use log::debug;
use rand::Rng;
use sqlx::{migrate::MigrateDatabase, Sqlite};
use stock_reservation_engine::{run_migrations, ReservationDatabase, SqliteDatabase};

/// A unique SQLite URL under the workspace data directory, so tests can run in
/// parallel without stepping on each other.
pub fn random_db_path() -> String {
    let id: u64 = rand::thread_rng().gen();
    format!("sqlite://../data/test_reservations_{id}.db")
}

/// Create a fresh, fully migrated database at `url`, dropping any leftover from a
/// previous run.
pub async fn prepare_test_env(url: &str) {
    dotenvy::from_filename(".env.test").ok();
    let _ = env_logger::try_init();
    std::fs::create_dir_all("../data").ok();
    if Sqlite::database_exists(url).await.unwrap_or(false) {
        Sqlite::drop_database(url).await.expect("Error dropping old test database");
    }
    Sqlite::create_database(url).await.expect("Error creating test database");
    let db = SqliteDatabase::new_with_url(url, 5).await.expect("Error connecting to test database");
    run_migrations(db.pool()).await.expect("Error migrating test database");
    debug!("🚀️ Test database ready at {url}");
}

pub async fn seed_stock(db: &SqliteDatabase, product_id: i64, size_id: i64, available: i64) {
    db.set_stock_level(product_id, size_id, available).await.expect("Error seeding stock");
}
