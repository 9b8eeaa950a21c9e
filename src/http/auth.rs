//! API key authentication middleware.

use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::http::error::ApiError;
use crate::http::server::AppState;

/// Require a matching `X-API-Key` header on the wrapped routes.
pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let provided = request
        .headers()
        .get("x-api-key")
        .and_then(|value| value.to_str().ok());

    match provided {
        Some(key) if key == state.config.auth.api_key => Ok(next.run(request).await),
        _ => Err(ApiError::Unauthorized),
    }
}
