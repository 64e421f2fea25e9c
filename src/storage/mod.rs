pub mod memory;
pub mod postgres;
pub mod sqlite;
pub mod trait_def;

pub use memory::MemoryStorage;
pub use postgres::PostgresStorage;
pub use sqlite::SqliteStorage;
pub use trait_def::{Storage, StorageError, StorageResult};

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::config::{DatabaseBackend, DatabaseConfig};

/// Open the configured backend and make sure its schema exists.
pub async fn connect(config: &DatabaseConfig) -> Result<Arc<dyn Storage>> {
    let acquire_timeout = Duration::from_secs(config.acquire_timeout_secs);

    let storage: Arc<dyn Storage> = match (&config.backend, config.url.as_deref()) {
        (DatabaseBackend::Sqlite, Some(url)) => {
            info!("Using SQLite storage: {}", url);
            Arc::new(
                SqliteStorage::connect(url, config.max_connections, acquire_timeout)
                    .await
                    .with_context(|| format!("failed to open SQLite database {url}"))?,
            )
        }
        (DatabaseBackend::Postgres, Some(url)) => {
            info!("Using PostgreSQL storage");
            Arc::new(
                PostgresStorage::connect(url, config.max_connections, acquire_timeout)
                    .await
                    .context("failed to connect to PostgreSQL")?,
            )
        }
        (DatabaseBackend::Memory, _) | (_, None) => {
            info!("DATABASE_URL not set, falling back to in-memory storage");
            Arc::new(MemoryStorage::new())
        }
    };

    info!("Initializing database...");
    storage.init().await?;
    info!("Database initialized successfully");

    Ok(storage)
}
