use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::config::Config;
use crate::registry::LinkRegistry;
use crate::storage::Storage;

use super::handlers::{create_link, delete_link, get_link, health_check, list_links, AppState};

pub fn create_api_router(storage: Arc<dyn Storage>, config: &Config) -> Router {
    let state = Arc::new(AppState {
        registry: LinkRegistry::new(storage, config.code_generation_attempts),
        public_base_url: config.public_base_url.clone(),
    });

    Router::new()
        .route("/healthz", get(health_check))
        .route("/api/links", post(create_link).get(list_links))
        .route("/api/links/{code}", get(get_link).delete(delete_link))
        .with_state(state)
}
