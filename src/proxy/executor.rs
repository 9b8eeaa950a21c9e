//! Top-level request orchestration.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use http::Method;
use serde::Serialize;
use url::Url;

use crate::error::ProxyError;
use crate::observability::metrics;
use crate::proxy::redirect::RedirectFollower;
use crate::session::SessionStore;
use crate::transport::Payload;

/// A validated proxied request as it enters the core.
#[derive(Debug, Clone)]
pub struct ProxyCall {
    pub method: Method,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub payload: Option<Payload>,
    pub session_id: Option<String>,
    pub proxy: Option<String>,
}

/// Normalized response header value: repeated headers (`Set-Cookie`) keep
/// every value in arrival order, everything else collapses to one string.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum HeaderEntry {
    Single(String),
    Multi(Vec<String>),
}

/// Normalized result of a proxied request.
#[derive(Debug, Clone, Serialize)]
pub struct ProxyOutcome {
    pub status: u16,
    pub headers: BTreeMap<String, HeaderEntry>,
    pub body: serde_json::Value,
    pub elapsed_ms: f64,
    pub session_id: Option<String>,
    pub redirect_count: usize,
    pub redirect_chain: Vec<String>,
    pub final_url: String,
}

/// Resolves a session, delegates to the redirect follower, normalizes the
/// response, and guarantees ephemeral handles are released.
pub struct RequestExecutor {
    store: Arc<SessionStore>,
    follower: RedirectFollower,
}

impl RequestExecutor {
    pub fn new(store: Arc<SessionStore>, max_redirects: usize) -> Self {
        Self {
            store,
            follower: RedirectFollower::new(max_redirects),
        }
    }

    pub async fn execute(&self, call: ProxyCall) -> Result<ProxyOutcome, ProxyError> {
        let url = Url::parse(&call.url)
            .map_err(|e| ProxyError::InvalidRequest(format!("invalid URL {:?}: {e}", call.url)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ProxyError::InvalidRequest(
                "URL must use http or https".to_string(),
            ));
        }
        if call.payload.is_some() && !accepts_payload(&call.method) {
            return Err(ProxyError::InvalidRequest(format!(
                "method {} does not accept a request body",
                call.method
            )));
        }

        // Decided once, before anything can fail; this boolean alone
        // drives the release below. Matches the store: an empty id is
        // ephemeral too.
        let ephemeral = call.session_id.as_deref().map_or(true, str::is_empty);

        let acquired = self.store.acquire(call.session_id.as_deref()).await?;
        let method_label = call.method.to_string();
        let started = Instant::now();

        let result = self
            .follower
            .follow(
                acquired.handle.as_ref(),
                call.method,
                url,
                call.payload,
                call.proxy,
                &call.headers,
            )
            .await;

        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

        if ephemeral {
            acquired.handle.close().await;
        }

        let followed = match result {
            Ok(followed) => followed,
            Err(e) => {
                tracing::error!(error = %e, elapsed_ms, "Proxied request failed");
                return Err(e);
            }
        };

        metrics::record_request(&method_label, followed.response.status, started);
        metrics::record_redirects(followed.hops);

        let body = parse_body(&followed.response.body);
        let headers = normalize_headers(&followed.response.headers);

        Ok(ProxyOutcome {
            status: followed.response.status,
            headers,
            body,
            elapsed_ms,
            session_id: acquired.session_id,
            redirect_count: followed.hops,
            redirect_chain: followed.chain,
            final_url: followed.final_url.to_string(),
        })
    }
}

fn accepts_payload(method: &Method) -> bool {
    *method == Method::POST || *method == Method::PUT || *method == Method::PATCH
}

/// Structured if the body parses as JSON, raw text otherwise.
fn parse_body(body: &str) -> serde_json::Value {
    serde_json::from_str(body).unwrap_or_else(|_| serde_json::Value::String(body.to_string()))
}

fn normalize_headers(pairs: &[(String, String)]) -> BTreeMap<String, HeaderEntry> {
    let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (name, value) in pairs {
        grouped.entry(name.clone()).or_default().push(value.clone());
    }

    grouped
        .into_iter()
        .map(|(name, mut values)| {
            let entry = if values.len() == 1 {
                HeaderEntry::Single(values.remove(0))
            } else {
                HeaderEntry::Multi(values)
            };
            (name, entry)
        })
        .collect()
}
