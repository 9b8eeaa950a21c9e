//! Shutdown coordination for background tasks.

use tokio::sync::broadcast;

/// Coordinator for graceful shutdown.
///
/// Provides a broadcast channel that long-running tasks (the session
/// reaper) subscribe to. Triggering is idempotent, and triggering with no
/// live subscribers is a no-op.
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Subscribe to the shutdown signal.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Trigger the shutdown signal.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscribers_observe_trigger() {
        let shutdown = Shutdown::new();
        let mut rx = shutdown.subscribe();

        shutdown.trigger();
        assert!(rx.recv().await.is_ok());
    }

    #[test]
    fn test_trigger_without_subscribers_is_harmless() {
        let shutdown = Shutdown::new();
        shutdown.trigger();
        shutdown.trigger();
    }
}
