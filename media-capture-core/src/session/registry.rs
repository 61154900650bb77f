use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::config::CaptureOptions;
use crate::models::error::CaptureError;
use crate::models::outcome::{CaptureFailure, CaptureOutcome};
use crate::models::request::{CallbackToken, CaptureKind, PendingTargets, Request, RequestId};
use crate::models::state::{RequestState, Resolution};
use crate::storage::snapshot::RegistrySnapshot;
use crate::traits::resolution_sink::ResolutionSink;

/// Largest correlation id handed out; external surfaces only carry 16 bits.
pub const MAX_REQUEST_ID: u32 = 0xFFFF;

/// Shared handle to one pending request.
///
/// The per-request lock serializes every mutation of that request
/// (accumulation, cleanup, resolution).
pub type RequestHandle = Arc<Mutex<Request>>;

struct RegistryInner {
    pending: HashMap<RequestId, RequestHandle>,
    next_id: u32,
    max_id: u32,
}

impl RegistryInner {
    /// Next free id at or after the cursor, wrapping over the id space.
    fn allocate_id(&mut self) -> Result<RequestId, CaptureError> {
        let span = self.max_id as u64 + 1;
        for offset in 0..span {
            let candidate = ((self.next_id as u64 + offset) % span) as u32;
            let id = RequestId(candidate);
            if !self.pending.contains_key(&id) {
                self.next_id = ((candidate as u64 + 1) % span) as u32;
                return Ok(id);
            }
        }
        Err(CaptureError::IdSpaceExhausted)
    }
}

/// Keyed store of in-flight capture requests.
///
/// Ids are the only thing that crosses an asynchronous boundary; no caller
/// needs to keep a `Request` reference alive across a launch or prompt.
///
/// Lock order is request → registry. The registry lock is never held while
/// a request lock is being acquired.
pub struct RequestRegistry {
    inner: Mutex<RegistryInner>,
    sink: Arc<dyn ResolutionSink>,
}

impl RequestRegistry {
    pub fn new(sink: Arc<dyn ResolutionSink>) -> Self {
        Self::with_id_limit(sink, MAX_REQUEST_ID)
    }

    /// Registry whose ids range over `0..=max_id`.
    pub fn with_id_limit(sink: Arc<dyn ResolutionSink>, max_id: u32) -> Self {
        Self {
            inner: Mutex::new(RegistryInner {
                pending: HashMap::new(),
                next_id: 0,
                max_id,
            }),
            sink,
        }
    }

    /// Register a new request under a fresh id.
    pub fn create(
        &self,
        kind: CaptureKind,
        options: CaptureOptions,
        callback: CallbackToken,
    ) -> Result<RequestHandle, CaptureError> {
        options.validate().map_err(CaptureError::InvalidOptions)?;

        let mut inner = self.inner.lock();
        let id = inner.allocate_id()?;
        let handle = Arc::new(Mutex::new(Request::new(id, kind, options, callback)));
        inner.pending.insert(id, Arc::clone(&handle));
        log::debug!("registered {:?} request {}", kind, id);
        Ok(handle)
    }

    /// Look up a pending request. Unknown and already-resolved ids yield `None`.
    pub fn get(&self, id: RequestId) -> Option<RequestHandle> {
        self.inner.lock().pending.get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().pending.is_empty()
    }

    /// Ids of all pending requests, ascending.
    pub fn pending_ids(&self) -> Vec<RequestId> {
        let mut ids: Vec<RequestId> = self.inner.lock().pending.keys().copied().collect();
        ids.sort();
        ids
    }

    /// Resolve with the accumulated results.
    ///
    /// A request with no results is reported as `NoMediaFiles` instead, so a
    /// success payload is never empty.
    pub fn resolve_with_success(&self, req: &mut Request) -> Result<(), CaptureError> {
        if req.results.is_empty() && !req.state.is_terminal() {
            log::warn!("request {} resolved without results; reporting no media", req.id);
            return self.resolve_with_failure(req, CaptureFailure::no_media_files("No media captured."));
        }
        let outcome = CaptureOutcome::Success(req.results.clone());
        self.finish(req, Resolution::Success, outcome)
    }

    pub fn resolve_with_failure(&self, req: &mut Request, failure: CaptureFailure) -> Result<(), CaptureError> {
        let resolution = Resolution::Failure(failure.code);
        self.finish(req, resolution, CaptureOutcome::Failure(failure))
    }

    /// Durable image of every still-pending request.
    pub fn snapshot(&self) -> RegistrySnapshot {
        let handles: Vec<RequestHandle> = self.inner.lock().pending.values().cloned().collect();
        let requests = handles
            .iter()
            .map(|handle| handle.lock().clone())
            .filter(|req| !req.state.is_terminal())
            .collect();
        RegistrySnapshot::new(requests)
    }

    /// Re-populate from a snapshot taken before a restart.
    ///
    /// With `reattached` set, every restored request reports to that token
    /// instead of the one it was created with. Nothing is inserted if any id
    /// conflicts with a pending request or falls outside the id space.
    pub fn restore(
        &self,
        snapshot: RegistrySnapshot,
        reattached: Option<CallbackToken>,
    ) -> Result<Vec<RequestId>, CaptureError> {
        let mut inner = self.inner.lock();

        let mut seen = HashSet::new();
        for req in &snapshot.requests {
            if req.id.0 > inner.max_id {
                return Err(CaptureError::SnapshotError(format!(
                    "request id {} outside id space",
                    req.id
                )));
            }
            if req.state.is_terminal() {
                return Err(CaptureError::SnapshotError(format!(
                    "request {} is already resolved",
                    req.id
                )));
            }
            if inner.pending.contains_key(&req.id) || !seen.insert(req.id) {
                return Err(CaptureError::IdConflict(req.id));
            }
        }

        let mut restored = Vec::with_capacity(snapshot.requests.len());
        for mut req in snapshot.requests {
            if let Some(token) = &reattached {
                req.callback = token.clone();
            }
            if req.id.0 >= inner.next_id {
                inner.next_id = ((req.id.0 as u64 + 1) % (inner.max_id as u64 + 1)) as u32;
            }
            restored.push(req.id);
            inner.pending.insert(req.id, Arc::new(Mutex::new(req)));
        }

        log::debug!("restored {} pending request(s)", restored.len());
        Ok(restored)
    }

    fn finish(&self, req: &mut Request, resolution: Resolution, outcome: CaptureOutcome) -> Result<(), CaptureError> {
        if req.state.is_terminal() {
            log::error!(
                "request {} already {:?}; refusing second resolution as {:?}",
                req.id,
                req.state,
                resolution
            );
            return Err(CaptureError::AlreadyResolved(req.id));
        }

        req.state = RequestState::Resolved(resolution);
        req.targets = PendingTargets::default();
        self.inner.lock().pending.remove(&req.id);

        log::debug!("request {} resolved: {:?}", req.id, resolution);
        self.sink.resolve(&req.callback, outcome);
        Ok(())
    }
}
