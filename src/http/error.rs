//! Error mapping at the API boundary.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::error::ProxyError;

/// API-visible error type.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or wrong API key.
    #[error("Invalid API Key")]
    Unauthorized,

    /// Caller input rejected.
    #[error("{0}")]
    BadRequest(String),

    /// Referenced session does not exist.
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    /// The outbound request failed.
    #[error("Request failed: {0}")]
    UpstreamFailed(String),
}

impl From<ProxyError> for ApiError {
    fn from(e: ProxyError) -> Self {
        if e.is_client_error() {
            ApiError::BadRequest(e.to_string())
        } else {
            ApiError::UpstreamFailed(e.to_string())
        }
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Error message.
    pub error: String,

    /// Detailed error information.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match &self {
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "Bad Request"),
            ApiError::SessionNotFound(_) => (StatusCode::NOT_FOUND, "Not Found"),
            ApiError::UpstreamFailed(_) => (StatusCode::BAD_GATEWAY, "Bad Gateway"),
        };

        match &self {
            ApiError::UpstreamFailed(_) => {
                tracing::error!(status = %status, error = %self, "Proxy request failed");
            }
            _ => {
                tracing::warn!(status = %status, error = %self, "Client error");
            }
        }

        let body = ErrorBody {
            error: error.to_string(),
            detail: Some(self.to_string()),
        };

        if matches!(self, ApiError::Unauthorized) {
            (status, [("WWW-Authenticate", "ApiKey")], Json(body)).into_response()
        } else {
            (status, Json(body)).into_response()
        }
    }
}
