use crate::models::Link;
use crate::storage::{Storage, StorageError, StorageResult};
use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use tracing::warn;

/// Process-local link table used when no database is configured.
///
/// Nothing is persisted: all links are lost when the process exits.
/// Each code lives in a DashMap shard whose write lock is held for the whole
/// read-increment-write of a click and for the check-and-insert of a new code.
pub struct MemoryStorage {
    links: DashMap<String, Link>,
    next_id: AtomicI64,
}

impl MemoryStorage {
    pub fn new() -> Self {
        warn!("Using in-memory store: links will NOT survive a restart");
        Self {
            links: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn init(&self) -> Result<()> {
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "memory"
    }

    fn is_durable(&self) -> bool {
        false
    }

    async fn exists(&self, code: &str) -> StorageResult<bool> {
        Ok(self.links.contains_key(code))
    }

    async fn insert(&self, code: &str, target_url: &str) -> StorageResult<Link> {
        match self.links.entry(code.to_string()) {
            Entry::Occupied(_) => Err(StorageError::Conflict),
            Entry::Vacant(slot) => {
                let link = Link {
                    id: self.next_id.fetch_add(1, Ordering::Relaxed),
                    code: code.to_string(),
                    target_url: target_url.to_string(),
                    created_at: Utc::now(),
                    click_count: 0,
                    last_clicked_at: None,
                };
                slot.insert(link.clone());
                Ok(link)
            }
        }
    }

    async fn get(&self, code: &str) -> StorageResult<Option<Link>> {
        Ok(self.links.get(code).map(|entry| entry.value().clone()))
    }

    async fn list(&self) -> StorageResult<Vec<Link>> {
        let mut links: Vec<Link> = self
            .links
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        links.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(links)
    }

    async fn delete(&self, code: &str) -> StorageResult<bool> {
        Ok(self.links.remove(code).is_some())
    }

    async fn increment_and_fetch(&self, code: &str) -> StorageResult<Option<String>> {
        // get_mut keeps the shard write-locked until `link` drops
        let Some(mut link) = self.links.get_mut(code) else {
            return Ok(None);
        };
        link.click_count += 1;
        link.last_clicked_at = Some(Utc::now());
        Ok(Some(link.target_url.clone()))
    }
}
