//! In-memory collaborators for unit tests.

use std::collections::HashSet;
use std::path::Path;

use parking_lot::Mutex;

use crate::models::capability::{Capability, PermissionCheck};
use crate::models::error::CaptureError;
use crate::models::media_file::{FormatData, MediaFile};
use crate::models::outcome::CaptureOutcome;
use crate::models::request::{CallbackToken, RequestId};
use crate::processing::mime::MediaCategory;
use crate::processing::{mime, uri};
use crate::traits::capture_surface::{CaptureSurface, LaunchRequest};
use crate::traits::media_inspector::MediaInspector;
use crate::traits::media_store::{MediaKind, MediaStore};
use crate::traits::permission_gate::PermissionGate;
use crate::traits::resolution_sink::ResolutionSink;

#[derive(Default)]
pub struct RecordingSink {
    outcomes: Mutex<Vec<(CallbackToken, CaptureOutcome)>>,
}

impl RecordingSink {
    pub fn count(&self) -> usize {
        self.outcomes.lock().len()
    }

    pub fn outcomes(&self) -> Vec<(CallbackToken, CaptureOutcome)> {
        self.outcomes.lock().clone()
    }
}

impl ResolutionSink for RecordingSink {
    fn resolve(&self, callback: &CallbackToken, outcome: CaptureOutcome) {
        self.outcomes.lock().push((callback.clone(), outcome));
    }
}

pub struct MockGate {
    camera_declared: bool,
    held: Mutex<HashSet<Capability>>,
    prompts: Mutex<Vec<(Vec<Capability>, RequestId)>>,
}

impl MockGate {
    pub fn new(held: &[Capability], camera_declared: bool) -> Self {
        Self {
            camera_declared,
            held: Mutex::new(held.iter().copied().collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<(Vec<Capability>, RequestId)> {
        self.prompts.lock().clone()
    }
}

impl PermissionGate for MockGate {
    fn is_declared(&self, capability: Capability) -> bool {
        capability != Capability::Camera || self.camera_declared
    }

    fn check(&self, capabilities: &[Capability]) -> PermissionCheck {
        let held = self.held.lock();
        let (granted, missing): (Vec<Capability>, Vec<Capability>) =
            capabilities.iter().partition(|c| held.contains(*c));
        PermissionCheck { granted, missing }
    }

    fn request(&self, capabilities: &[Capability], correlation: RequestId) -> Result<(), CaptureError> {
        self.prompts.lock().push((capabilities.to_vec(), correlation));
        Ok(())
    }
}

pub struct MockSurface {
    supported: bool,
    launches: Mutex<Vec<LaunchRequest>>,
}

impl MockSurface {
    pub fn new(supported: bool) -> Self {
        Self {
            supported,
            launches: Mutex::new(Vec::new()),
        }
    }

    pub fn launches(&self) -> Vec<LaunchRequest> {
        self.launches.lock().clone()
    }

    pub fn last_launch(&self) -> LaunchRequest {
        self.launches.lock().last().cloned().expect("no launch recorded")
    }
}

impl CaptureSurface for MockSurface {
    fn launch(&self, launch: &LaunchRequest) -> Result<(), CaptureError> {
        if !self.supported {
            return Err(CaptureError::NotSupported("no capture application installed".into()));
        }
        self.launches.lock().push(launch.clone());
        Ok(())
    }
}

#[derive(Default)]
struct StoreInner {
    next: u32,
    images: Vec<(String, bool)>,
    videos: Vec<(String, bool)>,
}

/// Media store where commit adds a second image entry, reproducing the
/// double-insert the duplicate heuristic compensates for.
#[derive(Default)]
pub struct MockStore {
    inner: Mutex<StoreInner>,
}

impl MockStore {
    pub fn seed_images(&self, count: usize) {
        for _ in 0..count {
            let uri = self.next_uri(MediaKind::Image);
            self.inner.lock().images.push((uri, true));
        }
    }

    /// Simulate the surface writing into `uri`.
    pub fn fill(&self, uri: &str) {
        let inner = &mut *self.inner.lock();
        for entry in inner.images.iter_mut().chain(inner.videos.iter_mut()) {
            if entry.0 == uri {
                entry.1 = true;
            }
        }
    }

    pub fn images(&self) -> Vec<String> {
        self.inner.lock().images.iter().map(|e| e.0.clone()).collect()
    }

    pub fn videos(&self) -> Vec<String> {
        self.inner.lock().videos.iter().map(|e| e.0.clone()).collect()
    }

    fn next_uri(&self, kind: MediaKind) -> String {
        let mut inner = self.inner.lock();
        inner.next += 1;
        match kind {
            MediaKind::Image => format!("file:///store/images/{:06}.jpg", inner.next),
            MediaKind::Video => format!("file:///store/videos/{:06}.mp4", inner.next),
        }
    }
}

impl MediaStore for MockStore {
    fn create_placeholder(&self, kind: MediaKind, _mime_type: &str) -> Result<String, CaptureError> {
        let uri = self.next_uri(kind);
        let mut inner = self.inner.lock();
        match kind {
            MediaKind::Image => inner.images.push((uri.clone(), false)),
            MediaKind::Video => inner.videos.push((uri.clone(), false)),
        }
        Ok(uri)
    }

    fn has_content(&self, uri: &str) -> bool {
        let inner = self.inner.lock();
        inner
            .images
            .iter()
            .chain(inner.videos.iter())
            .any(|(u, filled)| u == uri && *filled)
    }

    fn remove(&self, uri: &str) -> Result<(), CaptureError> {
        let mut inner = self.inner.lock();
        inner.images.retain(|(u, _)| u != uri);
        inner.videos.retain(|(u, _)| u != uri);
        Ok(())
    }

    fn image_entries(&self) -> Result<Vec<String>, CaptureError> {
        Ok(self.images())
    }

    fn commit_image(&self, _captured: &str) -> Result<String, CaptureError> {
        let uri = self.next_uri(MediaKind::Image);
        self.inner.lock().images.push((uri.clone(), true));
        Ok(uri)
    }
}

#[derive(Default)]
pub struct MockInspector {
    broken: Mutex<HashSet<String>>,
    format: Mutex<Option<FormatData>>,
}

impl MockInspector {
    /// Make `describe` fail for `uri`.
    pub fn break_uri(&self, uri: &str) {
        self.broken.lock().insert(uri.to_string());
    }

    /// Make `probe` succeed with `data`; probing fails until this is set.
    pub fn set_format(&self, data: FormatData) {
        *self.format.lock() = Some(data);
    }
}

impl MediaInspector for MockInspector {
    fn describe(&self, item: &str) -> Result<MediaFile, CaptureError> {
        if self.broken.lock().contains(item) {
            return Err(CaptureError::StorageError(format!("cannot stat {}", item)));
        }
        let path = uri::to_local_path(item);
        Ok(MediaFile {
            name: uri::file_name(&path),
            full_path: uri::file_uri(&path)?,
            local_url: None,
            mime_type: mime::media_type_for(item, &path).unwrap_or_default(),
            last_modified_date: 1_700_000_000_000,
            size: 1024,
        })
    }

    fn probe(&self, _path: &Path, _category: MediaCategory) -> Result<FormatData, CaptureError> {
        self.format
            .lock()
            .clone()
            .ok_or_else(|| CaptureError::StorageError("probe failed".into()))
    }
}
