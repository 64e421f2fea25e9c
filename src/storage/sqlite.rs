use crate::models::Link;
use crate::storage::{Storage, StorageError, StorageResult};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

pub struct SqliteStorage {
    pool: Arc<SqlitePool>,
}

impl SqliteStorage {
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        Self::connect(database_url, max_connections, Duration::from_secs(5)).await
    }

    pub async fn connect(
        database_url: &str,
        max_connections: u32,
        acquire_timeout: Duration,
    ) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect_with(options)
            .await?;
        Ok(Self {
            pool: Arc::new(pool),
        })
    }
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn init(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS links (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                code TEXT NOT NULL UNIQUE,
                target_url TEXT NOT NULL,
                created_at TEXT NOT NULL,
                click_count INTEGER NOT NULL DEFAULT 0,
                last_clicked_at TEXT
            )
            "#,
        )
        .execute(self.pool.as_ref())
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_links_created_at ON links(created_at)")
            .execute(self.pool.as_ref())
            .await?;

        Ok(())
    }

    fn kind(&self) -> &'static str {
        "sqlite"
    }

    async fn exists(&self, code: &str) -> StorageResult<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM links WHERE code = ?")
            .bind(code)
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count > 0)
    }

    async fn insert(&self, code: &str, target_url: &str) -> StorageResult<Link> {
        let link = sqlx::query_as::<_, Link>(
            r#"
            INSERT INTO links (code, target_url, created_at, click_count)
            VALUES (?, ?, ?, 0)
            ON CONFLICT(code) DO NOTHING
            RETURNING id, code, target_url, created_at, click_count, last_clicked_at
            "#,
        )
        .bind(code)
        .bind(target_url)
        .bind(Utc::now())
        .fetch_optional(self.pool.as_ref())
        .await?;

        link.ok_or(StorageError::Conflict)
    }

    async fn get(&self, code: &str) -> StorageResult<Option<Link>> {
        let link = sqlx::query_as::<_, Link>(
            r#"
            SELECT id, code, target_url, created_at, click_count, last_clicked_at
            FROM links
            WHERE code = ?
            "#,
        )
        .bind(code)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(link)
    }

    async fn list(&self) -> StorageResult<Vec<Link>> {
        let links = sqlx::query_as::<_, Link>(
            r#"
            SELECT id, code, target_url, created_at, click_count, last_clicked_at
            FROM links
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(links)
    }

    async fn delete(&self, code: &str) -> StorageResult<bool> {
        let result = sqlx::query("DELETE FROM links WHERE code = ?")
            .bind(code)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn increment_and_fetch(&self, code: &str) -> StorageResult<Option<String>> {
        // A single statement runs under SQLite's database write lock, so the
        // read-modify-write cannot interleave with another click. The timestamp
        // is taken before the lock, so a slower click must not overwrite a newer
        // one: fixed-width RFC 3339 text compares in time order.
        let clicked_at = Utc::now().to_rfc3339_opts(SecondsFormat::Nanos, false);
        let target_url = sqlx::query_scalar::<_, String>(
            r#"
            UPDATE links
            SET click_count = click_count + 1,
                last_clicked_at = max(coalesce(last_clicked_at, ''), ?)
            WHERE code = ?
            RETURNING target_url
            "#,
        )
        .bind(clicked_at)
        .bind(code)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(target_url)
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
