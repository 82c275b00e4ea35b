// src/shared/db.rs

//! Connection pool and schema management.
//!
//! ## Tables
//!
//! - `products` - catalog, read only from the API
//! - `users` - accounts with bcrypt password hashes
//! - `orders` / `order_items` - written together by the checkout transaction

use std::time::Duration;

use sqlx::migrate::MigrateError;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::DatabaseConfig;

/// Create the shared pool. Connections are opened on first use, so the
/// server can start while the database is still coming up. Callers queue for
/// a connection (up to the acquire timeout) when every one is busy.
pub fn create_pool(config: &DatabaseConfig) -> PgPool {
    PgPoolOptions::new()
        .max_connections(config.pool_size)
        .acquire_timeout(Duration::from_secs(30))
        .connect_lazy_with(config.connect_options())
}

/// Apply the embedded migrations in `migrations/`.
pub async fn run_migrations(pool: &PgPool) -> Result<(), MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Round-trip a trivial query to confirm the store is reachable.
pub async fn ping(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await.map(|_| ())
}
