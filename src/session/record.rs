//! Per-session bookkeeping around an owned client handle.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::transport::ClientHandle;

/// One stored session: the client handle plus usage metadata.
pub struct SessionRecord {
    handle: Arc<dyn ClientHandle>,
    created_at: Instant,
    last_used: Instant,
    request_count: u64,
}

impl SessionRecord {
    pub fn new(handle: Arc<dyn ClientHandle>) -> Self {
        let now = Instant::now();
        Self {
            handle,
            created_at: now,
            last_used: now,
            request_count: 0,
        }
    }

    /// Mark the record as used: refresh `last_used`, bump the counter.
    pub fn touch(&mut self) {
        self.last_used = Instant::now();
        self.request_count += 1;
    }

    /// Whether the record has been idle longer than the TTL.
    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.last_used.elapsed() > ttl
    }

    pub fn handle(&self) -> Arc<dyn ClientHandle> {
        Arc::clone(&self.handle)
    }

    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }

    pub fn request_count(&self) -> u64 {
        self.request_count
    }

    /// Consume the record, yielding the handle for release.
    pub(crate) fn into_handle(self) -> Arc<dyn ClientHandle> {
        self.handle
    }
}
