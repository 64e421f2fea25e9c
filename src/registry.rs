//! Link registry: validation and collision handling over a [`Storage`].

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::codegen;
use crate::error::{LinkError, LinkResult};
use crate::models::Link;
use crate::storage::{Storage, StorageError};

pub struct LinkRegistry {
    storage: Arc<dyn Storage>,
    max_attempts: usize,
}

impl LinkRegistry {
    pub fn new(storage: Arc<dyn Storage>, max_attempts: usize) -> Self {
        Self {
            storage,
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    /// Create a link, using `custom_code` if given or a generated code otherwise.
    ///
    /// An empty `custom_code` is treated as absent. All input is validated
    /// before the store is touched.
    ///
    /// # Errors
    ///
    /// - [`LinkError::InvalidInput`] for a missing or malformed URL or a malformed code
    /// - [`LinkError::Conflict`] if the custom code is taken
    /// - [`LinkError::ResourceExhausted`] if no free code was found within the attempt bound
    /// - [`LinkError::StoreUnavailable`] on store failures
    pub async fn create_link(
        &self,
        target_url: Option<&str>,
        custom_code: Option<&str>,
    ) -> LinkResult<Link> {
        let target_url = target_url
            .filter(|url| !url.is_empty())
            .ok_or_else(|| LinkError::invalid_input("target_url is required"))?;

        if !codegen::is_valid_url(target_url) {
            return Err(LinkError::invalid_input("Invalid URL format"));
        }

        let link = match custom_code.filter(|code| !code.is_empty()) {
            Some(code) => self.create_with_custom_code(code, target_url).await?,
            None => self.create_with_generated_code(target_url).await?,
        };

        info!(code = %link.code, id = link.id, "link created");
        Ok(link)
    }

    async fn create_with_custom_code(&self, code: &str, target_url: &str) -> LinkResult<Link> {
        if !codegen::is_valid_code(code) {
            return Err(LinkError::invalid_input(
                "Code must be 6-8 alphanumeric characters",
            ));
        }

        // Fast path for the common duplicate case; the insert below still decides races.
        if self.storage.exists(code).await? {
            return Err(LinkError::Conflict);
        }

        Ok(self.storage.insert(code, target_url).await?)
    }

    async fn create_with_generated_code(&self, target_url: &str) -> LinkResult<Link> {
        for attempt in 1..=self.max_attempts {
            let code = codegen::generate();

            if self.storage.exists(&code).await? {
                debug!(code = %code, attempt, "generated code already taken");
                continue;
            }

            match self.storage.insert(&code, target_url).await {
                Ok(link) => return Ok(link),
                Err(StorageError::Conflict) => {
                    debug!(code = %code, attempt, "generated code claimed concurrently");
                }
                Err(e) => return Err(e.into()),
            }
        }

        warn!(
            attempts = self.max_attempts,
            "could not find a free short code"
        );
        Err(LinkError::ResourceExhausted {
            attempts: self.max_attempts,
        })
    }

    pub async fn list_links(&self) -> LinkResult<Vec<Link>> {
        Ok(self.storage.list().await?)
    }

    pub async fn get_link(&self, code: &str) -> LinkResult<Link> {
        self.storage.get(code).await?.ok_or(LinkError::NotFound)
    }

    pub async fn delete_link(&self, code: &str) -> LinkResult<()> {
        if self.storage.delete(code).await? {
            info!(code = %code, "link deleted");
            Ok(())
        } else {
            Err(LinkError::NotFound)
        }
    }
}
