use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, HeaderMap, StatusCode},
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::error::LinkError;
use crate::models::{CreateLinkRequest, CreateLinkResponse, Link};
use crate::registry::LinkRegistry;

pub struct AppState {
    pub registry: LinkRegistry,
    pub public_base_url: Option<String>,
}

impl AppState {
    /// Origin prefixed to codes in `short_url`.
    ///
    /// Without `PUBLIC_BASE_URL` the scheme comes from the first
    /// `X-Forwarded-Proto` value set by a TLS-terminating proxy, else `http`.
    fn origin(&self, headers: &HeaderMap) -> String {
        if let Some(base) = &self.public_base_url {
            return base.trim_end_matches('/').to_string();
        }
        let host = headers
            .get(header::HOST)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("localhost");
        let scheme = headers
            .get("x-forwarded-proto")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(',').next())
            .map(str::trim)
            .filter(|proto| proto.eq_ignore_ascii_case("https"))
            .map_or("http", |_| "https");
        format!("{scheme}://{host}")
    }
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub version: &'static str,
    pub storage: &'static str,
    pub durable: bool,
}

/// Create a new link
pub async fn create_link(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<CreateLinkRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateLinkResponse>), LinkError> {
    let Json(payload) = payload.map_err(|rejection| {
        tracing::debug!(error = %rejection, "rejected create-link body");
        LinkError::invalid_input("Request body must be a JSON object with a target_url")
    })?;

    let link = state
        .registry
        .create_link(payload.target_url.as_deref(), payload.code.as_deref())
        .await?;

    let response = CreateLinkResponse::new(link, &state.origin(&headers));
    Ok((StatusCode::CREATED, Json(response)))
}

/// List all links, newest first
pub async fn list_links(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Link>>, LinkError> {
    Ok(Json(state.registry.list_links().await?))
}

/// Get a link with its click statistics
pub async fn get_link(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> Result<Json<Link>, LinkError> {
    Ok(Json(state.registry.get_link(&code).await?))
}

/// Delete a link
pub async fn delete_link(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> Result<StatusCode, LinkError> {
    state.registry.delete_link(&code).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Health check endpoint
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let storage = state.registry.storage();
    Json(HealthResponse {
        ok: true,
        version: env!("CARGO_PKG_VERSION"),
        storage: storage.kind(),
        durable: storage.is_durable(),
    })
}
