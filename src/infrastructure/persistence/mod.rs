//! SQLite persistence adapters
//!
//! Plots are stored whole, as JSON documents keyed by plot id, so a plot's
//! characters and episodes are always read and written together.

mod plot_repository;

pub use plot_repository::{normalize_legacy_record, SqlitePlotRepository};

use anyhow::{Context, Result};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

/// Open the connection pool for the configured database
pub async fn connect(database_url: &str) -> Result<SqlitePool> {
    SqlitePoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await
        .with_context(|| format!("Failed to open database at {}", database_url))
}
