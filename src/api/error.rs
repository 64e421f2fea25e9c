use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::error::LinkError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

impl LinkError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            LinkError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            LinkError::Conflict => StatusCode::CONFLICT,
            LinkError::NotFound => StatusCode::NOT_FOUND,
            LinkError::ResourceExhausted { .. } | LinkError::StoreUnavailable(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for LinkError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            LinkError::StoreUnavailable(err) => {
                tracing::error!(error = ?err, "store operation failed");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}
