use axum::{routing::get, Router};
use std::sync::Arc;

use crate::storage::Storage;

use super::engine::RedirectEngine;
use super::handlers::{redirect_url, RedirectState};

pub fn create_redirect_router(storage: Arc<dyn Storage>) -> Router {
    let state = Arc::new(RedirectState {
        engine: RedirectEngine::new(storage),
    });

    Router::new()
        .route("/{code}", get(redirect_url))
        .with_state(state)
}
