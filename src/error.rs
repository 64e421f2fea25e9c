use thiserror::Error;

use crate::storage::StorageError;

/// Failures of the link registry and the redirect engine.
#[derive(Debug, Error)]
pub enum LinkError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("Code already exists")]
    Conflict,
    #[error("Link not found")]
    NotFound,
    #[error("Failed to generate unique code after {attempts} attempts")]
    ResourceExhausted { attempts: usize },
    #[error("storage unavailable: {0}")]
    StoreUnavailable(#[source] anyhow::Error),
}

impl LinkError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}

impl From<StorageError> for LinkError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Conflict => LinkError::Conflict,
            StorageError::Unavailable(e) => LinkError::StoreUnavailable(e),
        }
    }
}

pub type LinkResult<T> = Result<T, LinkError>;
