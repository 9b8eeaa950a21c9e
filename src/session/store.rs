//! Bounded, time-evicted pool of persistent client handles.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::config::SessionConfig;
use crate::error::ProxyError;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::session::record::SessionRecord;
use crate::transport::{ClientHandle, HandleFactory};

/// Result of a successful acquisition: the handle to issue requests on and
/// the effective session id (`None` for an ephemeral handle that the
/// caller must release itself).
pub struct Acquired {
    pub handle: Arc<dyn ClientHandle>,
    pub session_id: Option<String>,
}

impl std::fmt::Debug for Acquired {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Acquired")
            .field("session_id", &self.session_id)
            .finish_non_exhaustive()
    }
}

/// Owns the session map, enforces capacity and TTL, runs the reaper.
///
/// The mutex guards the map's structural consistency only. Handle
/// construction performs no I/O, so the capacity check and the insert
/// stay atomic under one lock acquisition; outbound requests never run
/// under the lock.
pub struct SessionStore {
    sessions: Mutex<HashMap<String, SessionRecord>>,
    factory: Arc<dyn HandleFactory>,
    config: SessionConfig,
    shutdown: Shutdown,
    reaper: Mutex<Option<JoinHandle<()>>>,
}

impl SessionStore {
    pub fn new(config: SessionConfig, factory: Arc<dyn HandleFactory>) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            factory,
            config,
            shutdown: Shutdown::new(),
            reaper: Mutex::new(None),
        }
    }

    /// Spawn the background reaper. Idempotent; a second call while the
    /// task is alive does nothing.
    pub async fn start(self: &Arc<Self>) {
        let mut reaper = self.reaper.lock().await;
        if reaper.is_some() {
            return;
        }

        let store = Arc::clone(self);
        let mut shutdown_rx = self.shutdown.subscribe();
        let interval = self.config.sweep_interval();

        *reaper = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        store.sweep_expired().await;
                    }
                    _ = shutdown_rx.recv() => {
                        tracing::info!("Session reaper received shutdown signal, exiting loop");
                        break;
                    }
                }
            }
        }));

        tracing::info!(
            interval_secs = self.config.sweep_interval_secs,
            ttl_secs = self.config.ttl_secs,
            "Session reaper started"
        );
    }

    /// Resolve a handle for the request.
    ///
    /// No id (or an empty one): a fresh ephemeral handle, never inserted
    /// into the map. Known id: the stored handle, with `last_used` and the
    /// request counter updated. Unknown id: a new record, unless the store
    /// is already at capacity.
    pub async fn acquire(&self, id: Option<&str>) -> Result<Acquired, ProxyError> {
        let Some(id) = id.filter(|id| !id.is_empty()) else {
            let handle = self.factory.create().await?;
            tracing::debug!("Created ephemeral client");
            return Ok(Acquired {
                handle,
                session_id: None,
            });
        };

        let mut sessions = self.sessions.lock().await;

        if let Some(record) = sessions.get_mut(id) {
            record.touch();
            return Ok(Acquired {
                handle: record.handle(),
                session_id: Some(id.to_string()),
            });
        }

        if sessions.len() >= self.config.max_sessions {
            tracing::warn!(
                session_id = %id,
                max_sessions = self.config.max_sessions,
                "Session capacity exceeded"
            );
            return Err(ProxyError::CapacityExceeded(self.config.max_sessions));
        }

        let handle = self.factory.create().await?;
        sessions.insert(id.to_string(), SessionRecord::new(Arc::clone(&handle)));
        metrics::record_session_event("created");
        metrics::record_active_sessions(sessions.len());
        tracing::info!(session_id = %id, "Created new session");

        Ok(Acquired {
            handle,
            session_id: Some(id.to_string()),
        })
    }

    /// Remove a session and release its handle. Returns whether the id
    /// existed. The handle is released after the lock drops since this
    /// runs on the caller's request path; release failures are logged by
    /// the handle, never surfaced.
    pub async fn delete(&self, id: &str) -> bool {
        let removed = {
            let mut sessions = self.sessions.lock().await;
            let removed = sessions.remove(id);
            if removed.is_some() {
                metrics::record_active_sessions(sessions.len());
            }
            removed
        };

        match removed {
            Some(record) => {
                record.into_handle().close().await;
                metrics::record_session_event("deleted");
                tracing::info!(session_id = %id, "Deleted session");
                true
            }
            None => false,
        }
    }

    /// Current cookie jar of a stored session, or `None` when the id is
    /// unknown. Does not count as a use.
    pub async fn cookies(&self, id: &str) -> Option<BTreeMap<String, String>> {
        let handle = {
            let sessions = self.sessions.lock().await;
            sessions.get(id).map(|record| record.handle())
        }?;
        Some(handle.cookies())
    }

    /// Number of stored (non-ephemeral) sessions.
    pub async fn count(&self) -> usize {
        self.sessions.lock().await.len()
    }

    /// Evict every record idle past the TTL and release its handle.
    ///
    /// Runs on the reaper timer, not the request hot path, so handles are
    /// released inside the critical section; the map never exposes a
    /// half-evicted record.
    pub async fn sweep_expired(&self) -> usize {
        let ttl = self.config.ttl();
        let mut sessions = self.sessions.lock().await;

        let expired: Vec<String> = sessions
            .iter()
            .filter(|(_, record)| record.is_expired(ttl))
            .map(|(id, _)| id.clone())
            .collect();

        for id in &expired {
            if let Some(record) = sessions.remove(id) {
                let age_secs = record.age().as_secs();
                record.into_handle().close().await;
                metrics::record_session_event("expired");
                tracing::info!(session_id = %id, age_secs, "Removed expired session");
            }
        }

        let count = expired.len();
        if count > 0 {
            metrics::record_active_sessions(sessions.len());
            tracing::debug!(count, remaining = sessions.len(), "Sweep finished");
        }
        count
    }

    /// Cancel the reaper, release every remaining handle, clear the map.
    /// Idempotent; no sweep runs after this returns.
    pub async fn shutdown(&self) {
        self.shutdown.trigger();
        if let Some(task) = self.reaper.lock().await.take() {
            if let Err(e) = task.await {
                tracing::error!(error = %e, "Session reaper did not shut down cleanly");
            }
        }

        let drained: Vec<(String, SessionRecord)> = {
            let mut sessions = self.sessions.lock().await;
            sessions.drain().collect()
        };
        for (id, record) in drained {
            record.into_handle().close().await;
            tracing::debug!(session_id = %id, "Closed session at shutdown");
        }

        metrics::record_active_sessions(0);
        tracing::info!("All sessions closed");
    }
}
