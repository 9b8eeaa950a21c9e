//! Request and response models for the API surface.

use std::collections::BTreeMap;

use http::Method;
use serde::{Deserialize, Serialize};

use crate::http::error::ApiError;
use crate::proxy::{HeaderEntry, ProxyCall, ProxyOutcome};
use crate::transport::Payload;

/// Supported HTTP methods for proxied requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProxyMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
}

impl From<ProxyMethod> for Method {
    fn from(method: ProxyMethod) -> Self {
        match method {
            ProxyMethod::Get => Method::GET,
            ProxyMethod::Post => Method::POST,
            ProxyMethod::Put => Method::PUT,
            ProxyMethod::Delete => Method::DELETE,
            ProxyMethod::Patch => Method::PATCH,
            ProxyMethod::Head => Method::HEAD,
            ProxyMethod::Options => Method::OPTIONS,
        }
    }
}

/// Body of `POST /proxy/request`.
#[derive(Debug, Deserialize)]
pub struct ProxyRequest {
    /// HTTP method for the request.
    pub method: ProxyMethod,

    /// Target URL to send the request to.
    pub url: String,

    /// Optional headers; they override the generated browser set.
    #[serde(default)]
    pub headers: Option<BTreeMap<String, String>>,

    /// Optional request body (JSON object or string).
    #[serde(default)]
    pub body: Option<serde_json::Value>,

    /// Optional session ID for cookie persistence.
    #[serde(default)]
    pub session_id: Option<String>,

    /// Optional upstream proxy URL.
    #[serde(default)]
    pub proxy: Option<String>,
}

impl ProxyRequest {
    /// Validate caller input and convert it into a core call. The body
    /// shape is decided here, once, so the core branches on a tag rather
    /// than probing the value.
    pub fn into_call(self) -> Result<ProxyCall, ApiError> {
        if !self.url.starts_with("http://") && !self.url.starts_with("https://") {
            return Err(ApiError::BadRequest(
                "URL must start with http:// or https://".to_string(),
            ));
        }

        if let Some(id) = &self.session_id {
            if id.is_empty() {
                return Err(ApiError::BadRequest(
                    "session_id cannot be empty string".to_string(),
                ));
            }
        }

        let payload = match self.body {
            None => None,
            Some(serde_json::Value::String(text)) => Some(Payload::Raw(text)),
            Some(value @ serde_json::Value::Object(_)) => Some(Payload::Structured(value)),
            Some(_) => {
                return Err(ApiError::BadRequest(
                    "body must be a JSON object or a string".to_string(),
                ));
            }
        };

        Ok(ProxyCall {
            method: self.method.into(),
            url: self.url,
            headers: self.headers.unwrap_or_default(),
            payload,
            session_id: self.session_id,
            proxy: self.proxy,
        })
    }
}

/// Response of `POST /proxy/request`.
#[derive(Debug, Serialize)]
pub struct ProxyResponse {
    /// HTTP status code from the target server.
    pub status_code: u16,

    /// Response headers; repeated headers such as Set-Cookie are lists.
    pub headers: BTreeMap<String, HeaderEntry>,

    /// Response body (parsed JSON or raw text).
    pub body: serde_json::Value,

    /// Session ID used for this request, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,

    /// Request duration in milliseconds.
    pub elapsed_ms: f64,

    /// Number of redirects followed.
    pub redirect_count: usize,

    /// URLs in the redirect chain, if any redirects occurred.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_chain: Option<Vec<String>>,

    /// Final URL after following redirects.
    pub final_url: String,
}

impl From<ProxyOutcome> for ProxyResponse {
    fn from(outcome: ProxyOutcome) -> Self {
        Self {
            status_code: outcome.status,
            headers: outcome.headers,
            body: outcome.body,
            session_id: outcome.session_id,
            elapsed_ms: (outcome.elapsed_ms * 100.0).round() / 100.0,
            redirect_count: outcome.redirect_count,
            redirect_chain: if outcome.redirect_chain.is_empty() {
                None
            } else {
                Some(outcome.redirect_chain)
            },
            final_url: outcome.final_url,
        }
    }
}

/// Response of `POST /proxy/session/create`.
#[derive(Debug, Serialize)]
pub struct SessionCreateResponse {
    pub session_id: String,
    pub message: String,
}

/// Response of `DELETE /proxy/session/{id}`.
#[derive(Debug, Serialize)]
pub struct SessionDeleteResponse {
    pub session_id: String,
    pub message: String,
}

/// Response of `GET /proxy/session/{id}/cookies`.
#[derive(Debug, Serialize)]
pub struct SessionCookiesResponse {
    pub session_id: String,
    pub cookies: BTreeMap<String, String>,
}

/// Response of `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub active_sessions: usize,
    pub max_sessions: usize,
}
