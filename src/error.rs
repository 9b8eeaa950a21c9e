//! Error taxonomy for the session and forwarding core.

use crate::transport::TransportError;

/// Error type for session acquisition and proxied request execution.
///
/// Session lookups that miss are not represented here: `SessionStore`
/// returns `Option`/`bool` for those and the HTTP layer maps absence to a
/// 404 on its own.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    /// Session creation attempted while the store is full.
    #[error("maximum number of sessions ({0}) reached")]
    CapacityExceeded(usize),

    /// Redirect chain exceeded the configured hop budget.
    #[error("too many redirects (max: {0})")]
    TooManyRedirects(usize),

    /// Malformed caller input (bad URL, body on a non-mutating method).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Transport-level fault from the outbound client. Never retried here.
    #[error("upstream request failed: {0}")]
    Transport(#[from] TransportError),
}

impl ProxyError {
    /// Whether the error was caused by caller input rather than
    /// infrastructure. The boundary layer maps the two kinds to different
    /// status codes.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, ProxyError::Transport(_))
    }
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, ProxyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_split() {
        assert!(ProxyError::CapacityExceeded(100).is_client_error());
        assert!(ProxyError::TooManyRedirects(5).is_client_error());
        assert!(ProxyError::InvalidRequest("bad".into()).is_client_error());
        assert!(
            !ProxyError::Transport(TransportError::Request("connection refused".into()))
                .is_client_error()
        );
    }

    #[test]
    fn test_display_carries_limit() {
        let err = ProxyError::TooManyRedirects(5);
        assert_eq!(err.to_string(), "too many redirects (max: 5)");
    }
}
