//! Scripted transport doubles for unit tests.

use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::transport::handle::{
    ClientHandle, HandleFactory, OutboundRequest, OutboundResponse, TransportError,
};

/// Build a response with string headers, for test scripts.
pub(crate) fn response(status: u16, headers: &[(&str, &str)], body: &str) -> OutboundResponse {
    OutboundResponse {
        status,
        headers: headers
            .iter()
            .map(|(n, v)| (n.to_string(), v.to_string()))
            .collect(),
        body: body.to_string(),
    }
}

/// Handle that replays a queue of canned responses and records every
/// request it was asked to issue.
pub(crate) struct ScriptedHandle {
    script: Mutex<VecDeque<OutboundResponse>>,
    pub requests: Mutex<Vec<OutboundRequest>>,
    pub closed: AtomicUsize,
}

impl ScriptedHandle {
    pub fn new(script: Vec<OutboundResponse>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
            closed: AtomicUsize::new(0),
        })
    }

    pub fn close_count(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn request(&self, index: usize) -> OutboundRequest {
        self.requests.lock().unwrap()[index].clone()
    }
}

#[async_trait]
impl ClientHandle for ScriptedHandle {
    async fn execute(&self, request: OutboundRequest) -> Result<OutboundResponse, TransportError> {
        self.requests.lock().unwrap().push(request);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| TransportError::Request("connection refused".to_string()))
    }

    fn cookies(&self) -> BTreeMap<String, String> {
        BTreeMap::new()
    }

    async fn close(&self) {
        self.closed.fetch_add(1, Ordering::SeqCst);
    }
}

/// Factory that hands out [`ScriptedHandle`]s and keeps a reference to
/// every handle it issued so tests can assert on release behavior.
pub(crate) struct ScriptedFactory {
    scripts: Mutex<VecDeque<Vec<OutboundResponse>>>,
    issued: Mutex<Vec<Arc<ScriptedHandle>>>,
}

impl ScriptedFactory {
    /// Factory whose handles answer nothing (requests fail immediately).
    pub fn new() -> Self {
        Self::with_scripts(Vec::new())
    }

    /// Each element is the response script for one created handle, in
    /// creation order; handles created past the end get an empty script.
    pub fn with_scripts(scripts: Vec<Vec<OutboundResponse>>) -> Self {
        Self {
            scripts: Mutex::new(scripts.into()),
            issued: Mutex::new(Vec::new()),
        }
    }

    pub fn issued_count(&self) -> usize {
        self.issued.lock().unwrap().len()
    }

    pub fn issued(&self, index: usize) -> Arc<ScriptedHandle> {
        Arc::clone(&self.issued.lock().unwrap()[index])
    }
}

#[async_trait]
impl HandleFactory for ScriptedFactory {
    async fn create(&self) -> Result<Arc<dyn ClientHandle>, TransportError> {
        let script = self.scripts.lock().unwrap().pop_front().unwrap_or_default();
        let handle = ScriptedHandle::new(script);
        self.issued.lock().unwrap().push(Arc::clone(&handle));
        Ok(handle)
    }
}
