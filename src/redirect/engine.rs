use std::sync::Arc;

use crate::codegen;
use crate::error::{LinkError, LinkResult};
use crate::storage::Storage;

/// Resolves short codes for visitors, counting each successful resolution.
pub struct RedirectEngine {
    storage: Arc<dyn Storage>,
}

impl RedirectEngine {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Resolve `code` to its target URL and record the click as one unit.
    ///
    /// Either the click is fully recorded and the target returned, or nothing is
    /// mutated and an error is returned. Codes that can never exist are rejected
    /// without touching the store.
    pub async fn resolve_and_record_click(&self, code: &str) -> LinkResult<String> {
        if !codegen::is_valid_code(code) {
            return Err(LinkError::NotFound);
        }

        self.storage
            .increment_and_fetch(code)
            .await?
            .ok_or(LinkError::NotFound)
    }
}
