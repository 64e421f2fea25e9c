use axum::{
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use url::Url;

use super::engine::RedirectEngine;
use crate::error::LinkError;

pub struct RedirectState {
    pub engine: RedirectEngine,
}

/// Redirect to the target URL, recording the click
pub async fn redirect_url(
    State(state): State<Arc<RedirectState>>,
    Path(code): Path<String>,
) -> Response {
    match state.engine.resolve_and_record_click(&code).await {
        Ok(target_url) => match location_header(&target_url) {
            Some(location) => (StatusCode::FOUND, [(header::LOCATION, location)]).into_response(),
            None => {
                tracing::error!(code = %code, "stored target URL cannot be sent as a Location header");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        },
        Err(LinkError::NotFound) => (StatusCode::NOT_FOUND, "Not found").into_response(),
        Err(err) => {
            tracing::error!(code = %code, error = %err, "redirect failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
        }
    }
}

/// Targets that are not sendable verbatim (non-ASCII, stray control
/// characters) are sent in the URL parser's normalized form.
fn location_header(target_url: &str) -> Option<HeaderValue> {
    if target_url.is_ascii() {
        if let Ok(value) = HeaderValue::from_str(target_url) {
            return Some(value);
        }
    }
    let url = Url::parse(target_url).ok()?;
    HeaderValue::from_str(url.as_str()).ok()
}
