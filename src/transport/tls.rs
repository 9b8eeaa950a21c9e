//! reqwest-backed client handles with per-session cookie state.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use cookie_store::CookieStore;
use reqwest_cookie_store::CookieStoreMutex;

use crate::config::UpstreamConfig;
use crate::transport::handle::{
    ClientHandle, HandleFactory, OutboundRequest, OutboundResponse, Payload, TransportError,
};

/// Builds [`TlsClient`] handles from the configured identity profile.
pub struct TlsClientFactory {
    config: UpstreamConfig,
}

impl TlsClientFactory {
    pub fn new(config: UpstreamConfig) -> Self {
        tracing::info!(
            profile = %config.identity_profile,
            timeout_secs = config.request_timeout_secs,
            "TLS client factory initialized"
        );
        Self { config }
    }
}

#[async_trait]
impl HandleFactory for TlsClientFactory {
    async fn create(&self) -> Result<Arc<dyn ClientHandle>, TransportError> {
        let client = TlsClient::new(&self.config)?;
        Ok(Arc::new(client))
    }
}

/// One persistent outbound client: browser identity, dedicated cookie jar,
/// redirects disabled so the follower controls every hop.
pub struct TlsClient {
    client: reqwest::Client,
    jar: Arc<CookieStoreMutex>,
    timeout: Duration,
}

impl TlsClient {
    fn new(config: &UpstreamConfig) -> Result<Self, TransportError> {
        let jar = Arc::new(CookieStoreMutex::new(CookieStore::default()));
        let timeout = config.request_timeout();
        let client = Self::build_client(&jar, timeout, None)?;
        Ok(Self {
            client,
            jar,
            timeout,
        })
    }

    /// Assemble a reqwest client around the shared jar. A proxied request
    /// gets a sibling client so cookie state stays continuous across
    /// proxied and direct hops of the same session.
    fn build_client(
        jar: &Arc<CookieStoreMutex>,
        timeout: Duration,
        proxy: Option<&str>,
    ) -> Result<reqwest::Client, TransportError> {
        let mut builder = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .cookie_provider(Arc::clone(jar))
            .timeout(timeout);

        if let Some(proxy) = proxy {
            let proxy = reqwest::Proxy::all(proxy)
                .map_err(|e| TransportError::InvalidProxy(e.to_string()))?;
            builder = builder.proxy(proxy);
        }

        builder
            .build()
            .map_err(|e| TransportError::Build(e.to_string()))
    }
}

#[async_trait]
impl ClientHandle for TlsClient {
    async fn execute(&self, request: OutboundRequest) -> Result<OutboundResponse, TransportError> {
        let one_off;
        let client = match request.proxy.as_deref() {
            Some(proxy) => {
                one_off = Self::build_client(&self.jar, self.timeout, Some(proxy))?;
                &one_off
            }
            None => &self.client,
        };

        let mut builder = client.request(request.method, request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = match request.payload {
            Some(Payload::Structured(value)) => builder.json(&value),
            Some(Payload::Raw(text)) => builder.body(text),
            None => builder,
        };

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        Ok(OutboundResponse {
            status,
            headers,
            body,
        })
    }

    fn cookies(&self) -> BTreeMap<String, String> {
        let store = self.jar.lock().expect("cookie store mutex poisoned");
        store
            .iter_unexpired()
            .map(|cookie| (cookie.name().to_string(), cookie.value().to_string()))
            .collect()
    }

    async fn close(&self) {
        // reqwest drains its pool on drop; the call is still the single
        // release point so implementations with real teardown stay correct.
        tracing::debug!("Releasing outbound client");
    }
}
