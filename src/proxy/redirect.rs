//! Manual redirect following with browser semantics.

use std::collections::BTreeMap;

use http::Method;
use url::Url;

use crate::error::ProxyError;
use crate::proxy::headers::HeaderComposer;
use crate::transport::{ClientHandle, OutboundRequest, OutboundResponse, Payload};

const REDIRECT_STATUSES: [u16; 5] = [301, 302, 303, 307, 308];

/// Terminal state of a followed request.
#[derive(Debug)]
pub struct Followed {
    /// The non-redirect (or Location-less) response that ended the chain.
    pub response: OutboundResponse,

    /// Every URL that answered with a followed redirect, in visit order.
    pub chain: Vec<String>,

    /// Number of redirects followed.
    pub hops: usize,

    /// URL of the last request actually issued.
    pub final_url: Url,
}

/// Drives the hop loop over an externally supplied client handle.
///
/// The transport never follows redirects itself: `Origin` and `Referer`
/// are functions of the current hop's URL, so the header set has to be
/// rebuilt before every issue.
pub struct RedirectFollower {
    max_redirects: usize,
}

impl RedirectFollower {
    pub fn new(max_redirects: usize) -> Self {
        Self { max_redirects }
    }

    pub async fn follow(
        &self,
        handle: &dyn ClientHandle,
        method: Method,
        url: Url,
        payload: Option<Payload>,
        proxy: Option<String>,
        user_headers: &BTreeMap<String, String>,
    ) -> Result<Followed, ProxyError> {
        let mut current_url = url;
        let mut current_method = method;
        let mut payload = payload;
        let mut chain = Vec::new();
        let mut hops = 0usize;

        loop {
            let headers = HeaderComposer::compose(&current_url, user_headers);
            let response = handle
                .execute(OutboundRequest {
                    method: current_method.clone(),
                    url: current_url.clone(),
                    headers,
                    payload: payload.clone(),
                    proxy: proxy.clone(),
                })
                .await?;

            if !REDIRECT_STATUSES.contains(&response.status) {
                return Ok(Followed {
                    response,
                    chain,
                    hops,
                    final_url: current_url,
                });
            }

            // A redirect without a Location cannot be followed; treat the
            // response as terminal.
            let Some(location) = response.header("location").map(str::to_owned) else {
                return Ok(Followed {
                    response,
                    chain,
                    hops,
                    final_url: current_url,
                });
            };

            chain.push(current_url.to_string());
            hops += 1;
            if hops > self.max_redirects {
                return Err(ProxyError::TooManyRedirects(self.max_redirects));
            }

            // Resolves relative targets against the current hop, absolute
            // targets replace it.
            let next = current_url.join(&location).map_err(|e| {
                ProxyError::InvalidRequest(format!("invalid redirect location {location:?}: {e}"))
            })?;

            tracing::info!(
                hop = hops,
                status = response.status,
                from = %current_url,
                to = %next,
                "Following redirect"
            );

            if response.status == 303 && current_method != Method::GET {
                tracing::debug!(method = %current_method, "303 redirect, reissuing as GET without body");
                current_method = Method::GET;
                payload = None;
            }

            current_url = next;
        }
    }
}
