//! Persistence layer for the Aegle triage backend.
//!
//! - [`store::TriageStore`] / [`store::DoctorDirectory`] — the boundary
//!   traits the engine is written against.
//! - [`pg::PgStore`] — PostgreSQL implementation backed by sqlx.
//! - [`memory::MemoryStore`] — in-memory implementation for tests and
//!   local development, with failure injection.

use sqlx::postgres::PgPoolOptions;

pub mod error;
pub mod memory;
pub mod models;
pub mod pg;
pub mod store;

mod repositories;

pub use error::StoreError;
pub use store::{DoctorDirectory, FailedInsert, NotificationBatch, TriageStore};

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

/// Verify the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply pending migrations from the crate's `migrations/` directory.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
