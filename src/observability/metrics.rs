//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_requests_total` (counter): proxied requests by method, status
//! - `proxy_request_duration_seconds` (histogram): end-to-end latency
//! - `proxy_redirect_hops` (histogram): redirects followed per request
//! - `proxy_session_events_total` (counter): created/deleted/expired
//! - `proxy_active_sessions` (gauge): current stored session count

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on its own listener. Failure is logged
/// and the service runs without a metrics endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one completed proxied request.
pub fn record_request(method: &str, status: u16, start: Instant) {
    counter!(
        "proxy_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("proxy_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

/// Record how many redirects a request followed.
pub fn record_redirects(hops: usize) {
    histogram!("proxy_redirect_hops").record(hops as f64);
}

/// Record a session lifecycle event (created, deleted, expired).
pub fn record_session_event(event: &'static str) {
    counter!("proxy_session_events_total", "event" => event).increment(1);
}

/// Update the stored-session gauge.
pub fn record_active_sessions(count: usize) {
    gauge!("proxy_active_sessions").set(count as f64);
}
