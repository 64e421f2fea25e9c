use crate::models::Link;
use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("short code already exists")]
    Conflict,
    #[error(transparent)]
    Unavailable(#[from] anyhow::Error),
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db) = err.as_database_error() {
            if db.is_unique_violation() {
                return StorageError::Conflict;
            }
        }
        StorageError::Unavailable(err.into())
    }
}

pub type StorageResult<T> = Result<T, StorageError>;

#[async_trait]
pub trait Storage: Send + Sync {
    /// Initialize the storage (create tables and indexes)
    async fn init(&self) -> Result<()>;

    /// Backend name reported by the health endpoint
    fn kind(&self) -> &'static str;

    /// Whether links survive a process restart
    fn is_durable(&self) -> bool {
        true
    }

    /// Check whether a code is taken. Advisory only; `insert` is authoritative.
    async fn exists(&self, code: &str) -> StorageResult<bool>;

    /// Insert a new link. Fails with [`StorageError::Conflict`] if the code is taken,
    /// atomically with respect to concurrent inserts of the same code.
    async fn insert(&self, code: &str, target_url: &str) -> StorageResult<Link>;

    /// Get a link by code
    async fn get(&self, code: &str) -> StorageResult<Option<Link>>;

    /// All links, newest first
    async fn list(&self) -> StorageResult<Vec<Link>>;

    /// Remove a link. Returns false if it did not exist.
    async fn delete(&self, code: &str) -> StorageResult<bool>;

    /// Record one click and return the target URL, or `None` for an unknown code.
    ///
    /// The read, the increment of `click_count` and the update of `last_clicked_at`
    /// happen as one unit per code: concurrent calls never lose an increment, and a
    /// failure leaves the record untouched.
    async fn increment_and_fetch(&self, code: &str) -> StorageResult<Option<String>>;

    /// Release pooled connections; pooled stores answer `Unavailable` afterwards.
    /// Stores without a pool keep working.
    async fn close(&self) {}
}
