// src/api/error.rs

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use crate::errors::AgentError;

/// Handler error: an [`AgentError`] rendered as `{"detail": "..."}`.
#[derive(Debug)]
pub struct ApiError(pub AgentError);

impl From<AgentError> for ApiError {
    fn from(err: AgentError) -> Self {
        ApiError(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            AgentError::PlaybookNotFound(_)
            | AgentError::InventoryNotFound(_)
            | AgentError::RunNotFound(_)
            | AgentError::HostNotFound(_) => StatusCode::NOT_FOUND,
            AgentError::PathEscape(_) | AgentError::ConfigError(_) => StatusCode::BAD_REQUEST,
            AgentError::HostConflict(_) => StatusCode::CONFLICT,
            AgentError::CapacityExceeded(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() && status != StatusCode::SERVICE_UNAVAILABLE {
            error!(error = %self.0, "request failed");
        }
        (status, Json(json!({ "detail": self.0.to_string() }))).into_response()
    }
}
