//! Route handlers for the API surface.

use axum::extract::{Path, State};
use axum::Json;
use uuid::Uuid;

use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::http::types::{
    HealthResponse, ProxyRequest, ProxyResponse, SessionCookiesResponse, SessionCreateResponse,
    SessionDeleteResponse,
};

/// GET / - service info.
pub async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "TLS proxy service",
        "health": "/health",
    }))
}

/// GET /health - service status and session statistics.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        active_sessions: state.store.count().await,
        max_sessions: state.config.session.max_sessions,
    })
}

/// POST /proxy/request - forward a request through a TLS client.
pub async fn proxy_request(
    State(state): State<AppState>,
    Json(request): Json<ProxyRequest>,
) -> Result<Json<ProxyResponse>, ApiError> {
    let call = request.into_call()?;
    let outcome = state.executor.execute(call).await?;
    Ok(Json(ProxyResponse::from(outcome)))
}

/// POST /proxy/session/create - create a session with a generated id.
pub async fn create_session(
    State(state): State<AppState>,
) -> Result<Json<SessionCreateResponse>, ApiError> {
    let session_id = Uuid::new_v4().to_string();
    state.store.acquire(Some(&session_id)).await?;

    Ok(Json(SessionCreateResponse {
        session_id,
        message: "Session created successfully".to_string(),
    }))
}

/// DELETE /proxy/session/{id} - delete a session.
pub async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionDeleteResponse>, ApiError> {
    if !state.store.delete(&session_id).await {
        return Err(ApiError::SessionNotFound(session_id));
    }

    Ok(Json(SessionDeleteResponse {
        session_id,
        message: "Session deleted successfully".to_string(),
    }))
}

/// GET /proxy/session/{id}/cookies - read a session's cookie jar.
pub async fn session_cookies(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionCookiesResponse>, ApiError> {
    let cookies = state
        .store
        .cookies(&session_id)
        .await
        .ok_or_else(|| ApiError::SessionNotFound(session_id.clone()))?;

    Ok(Json(SessionCookiesResponse {
        session_id,
        cookies,
    }))
}
