//! Integration tests for the link store backends
//!
//! Every scenario runs against the in-memory store and SQLite. PostgreSQL runs
//! too when `DATABASE_URL` points at a reachable server.
//!
//! Tests can be filtered by database backend using the DATABASE_BACKEND environment variable:
//! - `DATABASE_BACKEND=sqlite cargo test` - Run only SQLite tests
//! - `DATABASE_BACKEND=postgres cargo test` - Run only PostgreSQL tests
//! - `DATABASE_BACKEND=memory cargo test` - Run only in-memory tests
//! - By default, all backends are tested

use chrono::Utc;
use snaplink::codegen;
use snaplink::storage::{MemoryStorage, PostgresStorage, SqliteStorage, Storage, StorageError};
use std::sync::Arc;

/// Get the database backend to test from environment variable
fn should_test_backend(backend: &str) -> bool {
    match std::env::var("DATABASE_BACKEND") {
        Ok(val) => val.to_lowercase() == backend.to_lowercase(),
        Err(_) => true, // Test all backends if not specified
    }
}

/// Helper to create SQLite test storage
async fn create_sqlite_storage() -> Arc<dyn Storage> {
    let storage = SqliteStorage::new("sqlite::memory:", 5).await.unwrap();
    storage.init().await.unwrap();
    Arc::new(storage)
}

/// Helper to create PostgreSQL test storage
async fn create_postgres_storage() -> Option<Arc<dyn Storage>> {
    let db_url = std::env::var("DATABASE_URL").ok()?;
    if !db_url.starts_with("postgres") {
        return None;
    }
    let storage = PostgresStorage::new(&db_url, 5).await.ok()?;
    storage.init().await.ok()?;
    Some(Arc::new(storage))
}

/// All backends selected for this run
async fn backends() -> Vec<Arc<dyn Storage>> {
    let mut backends: Vec<Arc<dyn Storage>> = vec![];
    if should_test_backend("memory") {
        backends.push(Arc::new(MemoryStorage::new()));
    }
    if should_test_backend("sqlite") {
        backends.push(create_sqlite_storage().await);
    }
    if should_test_backend("postgres") {
        if let Some(storage) = create_postgres_storage().await {
            backends.push(storage);
        }
    }
    backends
}

/// Fresh code per test so a shared PostgreSQL database does not collide across runs
fn unique_code() -> String {
    format!("t{}", codegen::generate())
}

#[tokio::test]
async fn test_insert_and_get_round_trip() {
    for storage in backends().await {
        let code = unique_code();
        let before = Utc::now() - chrono::Duration::seconds(1);

        let created = storage
            .insert(&code, "https://example.com/docs")
            .await
            .unwrap();
        assert_eq!(created.code, code);
        assert_eq!(created.target_url, "https://example.com/docs");
        assert_eq!(created.click_count, 0);
        assert!(created.last_clicked_at.is_none());
        assert!(created.created_at >= before, "[{}] created_at too old", storage.kind());

        let fetched = storage.get(&code).await.unwrap().unwrap();
        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.target_url, "https://example.com/docs");
        assert_eq!(fetched.click_count, 0);
        assert!(fetched.last_clicked_at.is_none());

        assert!(storage.exists(&code).await.unwrap());
        assert!(!storage.exists(&unique_code()).await.unwrap());
    }
}

#[tokio::test]
async fn test_duplicate_insert_conflicts() {
    for storage in backends().await {
        let code = unique_code();
        storage.insert(&code, "https://example.com/1").await.unwrap();

        let err = storage
            .insert(&code, "https://example.com/2")
            .await
            .unwrap_err();
        assert!(
            matches!(err, StorageError::Conflict),
            "[{}] expected conflict, got {err:?}",
            storage.kind()
        );

        let kept = storage.get(&code).await.unwrap().unwrap();
        assert_eq!(kept.target_url, "https://example.com/1");
    }
}

#[tokio::test]
async fn test_concurrent_inserts_same_code() {
    for storage in backends().await {
        let code = unique_code();

        let mut handles = vec![];
        for i in 0..10 {
            let storage_clone = Arc::clone(&storage);
            let code = code.clone();
            let handle = tokio::spawn(async move {
                storage_clone
                    .insert(&code, &format!("https://example.com/{}", i))
                    .await
            });
            handles.push(handle);
        }

        // Exactly one should succeed, others should get Conflict error
        let mut success_count = 0;
        let mut conflict_count = 0;

        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => success_count += 1,
                Err(StorageError::Conflict) => conflict_count += 1,
                Err(e) => panic!("[{}] Unexpected error: {:?}", storage.kind(), e),
            }
        }

        assert_eq!(success_count, 1, "[{}] Exactly one creation should succeed", storage.kind());
        assert_eq!(conflict_count, 9, "[{}] All others should get conflict", storage.kind());
    }
}

#[tokio::test]
async fn test_list_newest_first() {
    for storage in backends().await {
        let codes: Vec<String> = (0..3).map(|_| unique_code()).collect();
        for code in &codes {
            storage.insert(code, "https://example.com").await.unwrap();
            tokio::time::sleep(tokio::time::Duration::from_millis(5)).await;
        }

        let listed: Vec<String> = storage
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|link| link.code)
            .filter(|code| codes.contains(code))
            .collect();

        let expected: Vec<String> = codes.iter().rev().cloned().collect();
        assert_eq!(listed, expected, "[{}] list should be newest first", storage.kind());
    }
}

#[tokio::test]
async fn test_delete() {
    for storage in backends().await {
        let code = unique_code();
        storage.insert(&code, "https://example.com").await.unwrap();

        assert!(storage.delete(&code).await.unwrap());
        assert!(storage.get(&code).await.unwrap().is_none());
        assert!(!storage.exists(&code).await.unwrap());

        // Second delete reports absence without erroring
        assert!(!storage.delete(&code).await.unwrap());

        // The code is free again
        storage.insert(&code, "https://example.com/new").await.unwrap();
    }
}

#[tokio::test]
async fn test_increment_and_fetch() {
    for storage in backends().await {
        let code = unique_code();
        storage.insert(&code, "https://example.com/target").await.unwrap();

        let before = Utc::now() - chrono::Duration::seconds(1);
        let target = storage.increment_and_fetch(&code).await.unwrap();
        assert_eq!(target.as_deref(), Some("https://example.com/target"));

        let link = storage.get(&code).await.unwrap().unwrap();
        assert_eq!(link.click_count, 1);
        let clicked_at = link.last_clicked_at.expect("last_clicked_at should be set");
        assert!(clicked_at >= before, "[{}] last_clicked_at too old", storage.kind());

        storage.increment_and_fetch(&code).await.unwrap();
        let link = storage.get(&code).await.unwrap().unwrap();
        assert_eq!(link.click_count, 2);
        assert!(link.last_clicked_at.unwrap() >= clicked_at);
    }
}

#[tokio::test]
async fn test_increment_unknown_code_mutates_nothing() {
    for storage in backends().await {
        let code = unique_code();
        let other = unique_code();
        storage.insert(&other, "https://example.com").await.unwrap();

        assert_eq!(storage.increment_and_fetch(&code).await.unwrap(), None);
        assert!(storage.get(&code).await.unwrap().is_none());

        let untouched = storage.get(&other).await.unwrap().unwrap();
        assert_eq!(untouched.click_count, 0);
        assert!(untouched.last_clicked_at.is_none());
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_click_increments() {
    for storage in backends().await {
        let code = unique_code();
        storage.insert(&code, "https://example.com").await.unwrap();

        // Spawn many concurrent increment requests
        let mut handles = vec![];
        for _ in 0..100 {
            let storage_clone = storage.clone();
            let code = code.clone();
            let handle =
                tokio::spawn(async move { storage_clone.increment_and_fetch(&code).await });
            handles.push(handle);
        }

        for handle in handles {
            assert!(handle.await.unwrap().unwrap().is_some());
        }

        let link = storage.get(&code).await.unwrap().unwrap();
        assert_eq!(
            link.click_count,
            100,
            "[{}] Should have exactly 100 clicks",
            storage.kind()
        );
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_clicks_keep_latest_timestamp() {
    for storage in backends().await {
        let code = unique_code();
        storage.insert(&code, "https://example.com").await.unwrap();

        let mut handles = vec![];
        for _ in 0..64 {
            let storage = storage.clone();
            let code = code.clone();
            handles.push(tokio::spawn(async move {
                let invoked_at = Utc::now();
                storage.increment_and_fetch(&code).await.unwrap();
                invoked_at
            }));
        }

        let mut latest_invocation = None;
        for handle in handles {
            let invoked_at = handle.await.unwrap();
            latest_invocation = latest_invocation.max(Some(invoked_at));
        }

        let link = storage.get(&code).await.unwrap().unwrap();
        assert_eq!(link.click_count, 64, "[{}]", storage.kind());
        assert!(
            link.last_clicked_at >= latest_invocation,
            "[{}] last_clicked_at {:?} is older than the last click started at {:?}",
            storage.kind(),
            link.last_clicked_at,
            latest_invocation
        );
    }
}

#[tokio::test]
async fn test_durability_flag() {
    assert!(!MemoryStorage::new().is_durable());
    assert!(create_sqlite_storage().await.is_durable());
}

#[tokio::test]
async fn test_init_is_idempotent() {
    let storage = SqliteStorage::new("sqlite::memory:", 1).await.unwrap();
    storage.init().await.unwrap();
    storage.insert("keep123", "https://example.com").await.unwrap();
    storage.init().await.unwrap();
    assert!(storage.exists("keep123").await.unwrap());
}

#[tokio::test]
async fn test_closed_pool_reports_unavailable() {
    let storage = create_sqlite_storage().await;
    storage.insert("shut123", "https://example.com").await.unwrap();

    storage.close().await;

    assert!(matches!(
        storage.exists("shut123").await,
        Err(StorageError::Unavailable(_))
    ));
}

#[tokio::test]
async fn test_memory_close_is_a_no_op() {
    let storage = MemoryStorage::new();
    storage.insert("keep123", "https://example.com").await.unwrap();
    storage.close().await;
    assert!(storage.exists("keep123").await.unwrap());
}
