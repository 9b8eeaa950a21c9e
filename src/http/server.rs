//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with all handlers
//! - Wire up middleware (tracing, timeout, API key check)
//! - Bind the server to a listener
//! - Shut down gracefully on Ctrl+C

use std::sync::Arc;
use std::time::Duration;

use axum::middleware;
use axum::routing::{delete, get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::ProxyConfig;
use crate::http::{auth, handlers};
use crate::proxy::RequestExecutor;
use crate::session::SessionStore;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub executor: Arc<RequestExecutor>,
    pub store: Arc<SessionStore>,
    pub config: Arc<ProxyConfig>,
}

/// HTTP server for the proxy API.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(
        config: ProxyConfig,
        store: Arc<SessionStore>,
        executor: Arc<RequestExecutor>,
    ) -> Self {
        let state = AppState {
            executor,
            store,
            config: Arc::new(config),
        };

        let router = Self::build_router(state);
        Self { router }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        // Inbound deadline generous enough for a full redirect chain of
        // upstream calls.
        let deadline = Duration::from_secs(
            state.config.upstream.request_timeout_secs
                * (state.config.upstream.max_redirects as u64 + 1),
        );

        let protected = Router::new()
            .route("/proxy/request", post(handlers::proxy_request))
            .route("/proxy/session/create", post(handlers::create_session))
            .route("/proxy/session/{id}", delete(handlers::delete_session))
            .route(
                "/proxy/session/{id}/cookies",
                get(handlers::session_cookies),
            )
            .layer(middleware::from_fn_with_state(
                state.clone(),
                auth::require_api_key,
            ));

        Router::new()
            .route("/", get(handlers::root))
            .route("/health", get(handlers::health))
            .merge(protected)
            .with_state(state)
            .layer(TimeoutLayer::new(deadline))
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::testing::{response, ScriptedFactory};
    use crate::transport::{HandleFactory, OutboundResponse};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn router_with_scripts(scripts: Vec<Vec<OutboundResponse>>) -> Router {
        let mut config = ProxyConfig::default();
        config.auth.api_key = "test-key".to_string();

        let factory = Arc::new(ScriptedFactory::with_scripts(scripts));
        let store = Arc::new(SessionStore::new(
            config.session.clone(),
            factory as Arc<dyn HandleFactory>,
        ));
        let executor = Arc::new(RequestExecutor::new(
            Arc::clone(&store),
            config.upstream.max_redirects,
        ));

        let state = AppState {
            executor,
            store,
            config: Arc::new(config),
        };
        HttpServer::build_router(state)
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_is_open() {
        let router = router_with_scripts(vec![]);

        let response = router
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["active_sessions"], 0);
    }

    #[tokio::test]
    async fn test_proxy_routes_require_api_key() {
        let router = router_with_scripts(vec![]);

        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/proxy/request")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"method":"GET","url":"https://example.com/"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_proxy_request_round_trip() {
        let router = router_with_scripts(vec![vec![response(200, &[], r#"{"ok":true}"#)]]);

        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/proxy/request")
                    .header("content-type", "application/json")
                    .header("x-api-key", "test-key")
                    .body(Body::from(r#"{"method":"GET","url":"https://example.com/"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status_code"], 200);
        assert_eq!(json["body"]["ok"], true);
        assert_eq!(json["redirect_count"], 0);
        assert_eq!(json["final_url"], "https://example.com/");
    }

    #[tokio::test]
    async fn test_unknown_session_delete_is_404() {
        let router = router_with_scripts(vec![]);

        let response = router
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/proxy/session/nope")
                    .header("x-api-key", "test-key")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_capacity_error_maps_to_bad_request() {
        let mut config = ProxyConfig::default();
        config.auth.api_key = "test-key".to_string();
        config.session.max_sessions = 0;

        let factory = Arc::new(ScriptedFactory::new());
        let store = Arc::new(SessionStore::new(
            config.session.clone(),
            factory as Arc<dyn HandleFactory>,
        ));
        let executor = Arc::new(RequestExecutor::new(Arc::clone(&store), 5));
        let state = AppState {
            executor,
            store,
            config: Arc::new(config),
        };
        let router = HttpServer::build_router(state);

        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/proxy/session/create")
                    .header("x-api-key", "test-key")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
