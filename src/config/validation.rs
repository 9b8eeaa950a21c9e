//! Configuration validation.
//!
//! Semantic checks that serde cannot express; all failures are collected
//! and reported together rather than one at a time.

use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::ProxyConfig;

/// A single semantic validation failure.
#[derive(Debug)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate the whole configuration, returning every problem found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError {
            field: "listener.bind_address",
            message: format!("not a valid socket address: {:?}", config.listener.bind_address),
        });
    }

    if config.auth.api_key.is_empty() {
        errors.push(ValidationError {
            field: "auth.api_key",
            message: "must not be empty".to_string(),
        });
    }

    if config.session.max_sessions == 0 {
        errors.push(ValidationError {
            field: "session.max_sessions",
            message: "must be at least 1".to_string(),
        });
    }

    if config.session.ttl_secs == 0 {
        errors.push(ValidationError {
            field: "session.ttl_secs",
            message: "must be at least 1".to_string(),
        });
    }

    if config.session.sweep_interval_secs == 0 {
        errors.push(ValidationError {
            field: "session.sweep_interval_secs",
            message: "must be at least 1".to_string(),
        });
    }

    if config.upstream.request_timeout_secs == 0 {
        errors.push(ValidationError {
            field: "upstream.request_timeout_secs",
            message: "must be at least 1".to_string(),
        });
    }

    if config.upstream.identity_profile.is_empty() {
        errors.push(ValidationError {
            field: "upstream.identity_profile",
            message: "must not be empty".to_string(),
        });
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError {
            field: "observability.metrics_address",
            message: format!(
                "not a valid socket address: {:?}",
                config.observability.metrics_address
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
