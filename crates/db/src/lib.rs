//! Storage layer for the work-study scholarship engine.
//!
//! Every entity row carries a `tombstoned` boolean instead of being
//! physically deleted. Reads go through the guarded filter layer (or a
//! hardcoded `tombstoned = FALSE` predicate for point lookups), and removal
//! is an explicit `tombstone` repository method; there is no hard-delete
//! path.

use sqlx::postgres::PgPoolOptions;

pub mod filter;
pub mod models;
pub mod pagination;
pub mod repositories;

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

/// Create a connection pool from the `DATABASE_URL` environment variable,
/// loading `.env` first if present.
pub async fn create_pool_from_env() -> Result<DbPool, sqlx::Error> {
    dotenvy::dotenv().ok();
    let url = std::env::var("DATABASE_URL")
        .map_err(|e| sqlx::Error::Configuration(Box::new(e)))?;
    create_pool(&url).await
}

/// Verify the database connection is usable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
