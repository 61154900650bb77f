use std::sync::Arc;

use crate::models::capability::{Capability, PermissionOutcome, STORAGE_CAPABILITIES};
use crate::models::config::CaptureOptions;
use crate::models::error::CaptureError;
use crate::models::media_file::{FormatData, MediaFile};
use crate::models::outcome::{CaptureFailure, ExternalResult};
use crate::models::request::{CallbackToken, CaptureKind, Request, RequestId};
use crate::models::state::RequestState;
use crate::processing::mime::{self, MediaCategory};
use crate::processing::uri;
use crate::session::registry::RequestRegistry;
use crate::storage::snapshot::RegistrySnapshot;
use crate::traits::capture_surface::{CaptureSurface, LaunchRequest};
use crate::traits::media_inspector::MediaInspector;
use crate::traits::media_store::{MediaKind, MediaStore};
use crate::traits::path_resolver::{NoPathResolver, PathResolver};
use crate::traits::permission_gate::PermissionGate;

/// The collaborators an orchestrator drives.
#[derive(Clone)]
pub struct CaptureHost {
    pub gate: Arc<dyn PermissionGate>,
    pub surface: Arc<dyn CaptureSurface>,
    pub store: Arc<dyn MediaStore>,
    pub inspector: Arc<dyn MediaInspector>,
    pub resolver: Arc<dyn PathResolver>,
}

impl CaptureHost {
    pub fn new(
        gate: Arc<dyn PermissionGate>,
        surface: Arc<dyn CaptureSurface>,
        store: Arc<dyn MediaStore>,
        inspector: Arc<dyn MediaInspector>,
    ) -> Self {
        Self {
            gate,
            surface,
            store,
            inspector,
            resolver: Arc::new(NoPathResolver),
        }
    }

    pub fn with_path_resolver(mut self, resolver: Arc<dyn PathResolver>) -> Self {
        self.resolver = resolver;
        self
    }
}

/// What one successful launch produced.
enum Captured {
    Audio(String),
    Image(String),
    Video(String),
}

impl Captured {
    fn uri(&self) -> &str {
        match self {
            Self::Audio(u) | Self::Image(u) | Self::Video(u) => u,
        }
    }
}

/// Drives capture requests from creation to resolution.
///
/// ```text
/// capture_* → [Registry.create] → [Gate.check] ──missing──→ [Gate.request] ─┐
///                                      │                                    │
///                                      └──held──→ [Surface.launch] ←─grant──┘
///                                                        │
///                            on_external_result(id) → accumulate → relaunch | resolve
/// ```
///
/// Re-entered only through correlation ids, so it keeps working against a
/// registry restored after a restart.
pub struct CaptureOrchestrator {
    registry: Arc<RequestRegistry>,
    host: CaptureHost,
    camera_declared: bool,
}

impl CaptureOrchestrator {
    pub fn new(registry: Arc<RequestRegistry>, host: CaptureHost) -> Self {
        let camera_declared = host.gate.is_declared(Capability::Camera);
        Self {
            registry,
            host,
            camera_declared,
        }
    }

    pub fn registry(&self) -> &Arc<RequestRegistry> {
        &self.registry
    }

    pub fn capture_audio(&self, options: CaptureOptions, callback: CallbackToken) -> Result<RequestId, CaptureError> {
        self.start(CaptureKind::Audio, options, callback)
    }

    pub fn capture_image_or_video(
        &self,
        options: CaptureOptions,
        callback: CallbackToken,
    ) -> Result<RequestId, CaptureError> {
        self.start(CaptureKind::ImageOrVideo, options, callback)
    }

    /// Capabilities a request of `kind` must hold before launching.
    pub fn required_capabilities(&self, kind: CaptureKind) -> Vec<Capability> {
        let mut required = STORAGE_CAPABILITIES.to_vec();
        if kind == CaptureKind::ImageOrVideo && self.camera_declared {
            required.push(Capability::Camera);
        }
        required
    }

    /// Restore pending requests after a restart.
    ///
    /// Requests captured before their first step are started again; the
    /// rest wait for the outcome already in flight.
    pub fn restore(
        &self,
        snapshot: RegistrySnapshot,
        reattached: Option<CallbackToken>,
    ) -> Result<Vec<RequestId>, CaptureError> {
        let ids = self.registry.restore(snapshot, reattached)?;
        for id in &ids {
            let Some(handle) = self.registry.get(*id) else {
                continue;
            };
            let mut req = handle.lock();
            if req.state == RequestState::Created {
                log::debug!("replaying request {} from its first step", id);
                self.execute(&mut req);
            }
        }
        Ok(ids)
    }

    /// Answer to a permission prompt started for request `id`.
    pub fn on_permission_result(&self, id: RequestId, outcome: &PermissionOutcome) {
        let Some(handle) = self.registry.get(id) else {
            log::debug!("permission result for unknown request {}", id);
            return;
        };
        let mut req = handle.lock();
        if !req.state.is_awaiting_permission() {
            log::warn!("request {} is {:?}; ignoring permission result", id, req.state);
            return;
        }

        if outcome.is_granted() {
            self.launch(&mut req);
        } else {
            log::debug!("request {} denied {:?}", id, outcome.denied);
            self.fail(&mut req, CaptureFailure::permission_denied());
        }
    }

    /// Result of the launch made for request `id`.
    pub fn on_external_result(&self, id: RequestId, result: ExternalResult) {
        let Some(handle) = self.registry.get(id) else {
            log::debug!("external result {:?} for unknown request {}", result, id);
            return;
        };
        let mut req = handle.lock();
        if !req.state.is_awaiting_result() {
            log::warn!("request {} is {:?}; ignoring external result", id, req.state);
            return;
        }

        match result {
            ExternalResult::Ok { uri } => {
                let captured = match req.kind {
                    CaptureKind::Audio => uri.map(Captured::Audio),
                    CaptureKind::ImageOrVideo => self.take_visual_result(&mut req),
                };
                self.accept(&mut req, captured);
            }
            ExternalResult::Canceled => self.settle_partial(&mut req, "Canceled."),
            ExternalResult::Other(code) => {
                log::debug!("request {} finished with result code {}", id, code);
                self.settle_partial(&mut req, "Did not complete!");
            }
        }
    }

    /// Format details of a media file; fields default to zero when unknown.
    ///
    /// `file_path` may be a `file://` URI. An empty or `"null"` MIME type is
    /// inferred from the extension.
    pub fn get_format_data(&self, file_path: &str, mime_type: Option<&str>) -> FormatData {
        let path = uri::to_local_path(file_path);
        let mime_type = match mime::normalize(mime_type) {
            Some(m) => m.to_string(),
            None => mime::media_type_for(file_path, &path).unwrap_or_default(),
        };
        log::debug!("mime type = {}", mime_type);

        let category = MediaCategory::classify(&path, &mime_type);
        if category == MediaCategory::Unknown {
            return FormatData::default();
        }
        match self.host.inspector.probe(&path, category) {
            Ok(data) => data,
            Err(e) => {
                log::warn!("failed to probe {}: {}", path.display(), e);
                FormatData::default()
            }
        }
    }

    // --- Internal helpers ---

    fn start(
        &self,
        kind: CaptureKind,
        options: CaptureOptions,
        callback: CallbackToken,
    ) -> Result<RequestId, CaptureError> {
        let handle = self.registry.create(kind, options, callback)?;
        let mut req = handle.lock();
        self.execute(&mut req);
        Ok(req.id)
    }

    /// Permission step, then launch.
    fn execute(&self, req: &mut Request) {
        let required = self.required_capabilities(req.kind);
        let check = self.host.gate.check(&required);
        if check.is_satisfied() {
            self.launch(req);
            return;
        }

        req.state = RequestState::AwaitingPermission;
        log::debug!("request {} waiting for {:?}", req.id, check.missing);
        if let Err(e) = self.host.gate.request(&check.missing, req.id) {
            log::error!("permission prompt for request {} failed: {}", req.id, e);
            self.fail(req, CaptureFailure::from(&e));
        }
    }

    fn launch(&self, req: &mut Request) {
        if let Err(e) = self.try_launch(req) {
            log::warn!("launch for request {} failed: {}", req.id, e);
            self.discard_placeholders(req);
            if req.results.is_empty() {
                self.fail(req, CaptureFailure::from(&e));
            } else {
                self.succeed(req);
            }
        }
    }

    fn try_launch(&self, req: &mut Request) -> Result<(), CaptureError> {
        let mode = req.capture_mode();
        self.discard_placeholders(req);

        if req.kind == CaptureKind::ImageOrVideo {
            // Counted before our own placeholder lands in the store.
            req.targets.baseline_image_count = Some(self.host.store.image_entries()?.len());
            if mode.wants_image() {
                req.targets.image = Some(self.host.store.create_placeholder(MediaKind::Image, mime::IMAGE_JPEG)?);
            }
            if mode.wants_video() {
                req.targets.video = Some(self.host.store.create_placeholder(MediaKind::Video, mime::VIDEO_MP4)?);
            }
        }

        let launch = LaunchRequest {
            id: req.id,
            mode,
            image_target: req.targets.image.clone(),
            video_target: req.targets.video.clone(),
            duration: req.options.duration,
            quality: req.options.quality,
            mime_type_filter: req.options.mime_type_filter.clone(),
        };

        req.state = RequestState::AwaitingExternalResult;
        log::debug!("launching {:?} for request {}", mode, req.id);
        self.host.surface.launch(&launch)
    }

    /// Work out whether the surface recorded a video or took a still.
    fn take_visual_result(&self, req: &mut Request) -> Option<Captured> {
        if let Some(video) = req.targets.video.clone() {
            if self.host.store.has_content(&video) {
                req.targets.video = None;
                req.targets.baseline_image_count = None;
                if let Some(image) = req.targets.image.take() {
                    self.remove_artifact(&image);
                }
                return Some(Captured::Video(video));
            }
        }

        if let Some(video) = req.targets.video.take() {
            self.remove_artifact(&video);
        }
        let image = req.targets.image.take()?;
        if !self.host.store.has_content(&image) {
            self.remove_artifact(&image);
            return None;
        }
        let committed = match self.host.store.commit_image(&image) {
            Ok(uri) => uri,
            Err(e) => {
                log::warn!("failed to commit image {}: {}", image, e);
                image
            }
        };
        Some(Captured::Image(committed))
    }

    fn accept(&self, req: &mut Request, captured: Option<Captured>) {
        let Some(captured) = captured else {
            self.settle_partial(req, "Error: data is null");
            return;
        };

        let file = self.describe(captured.uri());
        if let Err(e) = req.push_result(file) {
            log::error!("{}", e);
        }
        if let Captured::Image(_) = captured {
            self.remove_duplicate_image(req);
        }

        if req.is_complete() {
            self.succeed(req);
        } else {
            log::debug!("request {} has {}/{} items; relaunching", req.id, req.results.len(), req.limit());
            self.launch(req);
        }
    }

    /// Descriptor for `item`; inspection failures degrade to defaults.
    fn describe(&self, item: &str) -> MediaFile {
        let mut file = match self.host.inspector.describe(item) {
            Ok(file) => file,
            Err(e) => {
                log::warn!("failed to inspect {}: {}", item, e);
                MediaFile::fallback(item)
            }
        };
        file.local_url = self.host.resolver.local_url(&file.local_path());
        file
    }

    /// Best-effort cleanup for surfaces that insert a capture twice.
    fn remove_duplicate_image(&self, req: &mut Request) {
        let Some(baseline) = req.targets.baseline_image_count.take() else {
            return;
        };
        let entries = match self.host.store.image_entries() {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("cannot count images after capture: {}", e);
                return;
            }
        };
        if let Some(extra) = duplicate_entry(baseline, &entries) {
            log::debug!("removing duplicate image {}", extra);
            self.remove_artifact(extra);
        }
    }

    /// Cancellation or error: keep partial work, otherwise report no media.
    fn settle_partial(&self, req: &mut Request, reason: &str) {
        self.discard_placeholders(req);
        if req.results.is_empty() {
            self.fail(req, CaptureFailure::no_media_files(reason));
        } else {
            self.succeed(req);
        }
    }

    fn discard_placeholders(&self, req: &mut Request) {
        req.targets.baseline_image_count = None;
        for target in [req.targets.image.take(), req.targets.video.take()].into_iter().flatten() {
            self.remove_artifact(&target);
        }
    }

    fn remove_artifact(&self, item: &str) {
        if let Err(e) = self.host.store.remove(item) {
            log::warn!("failed to remove {}: {}", item, e);
        }
    }

    fn succeed(&self, req: &mut Request) {
        if let Err(e) = self.registry.resolve_with_success(req) {
            log::debug!("success for request {} not delivered: {}", req.id, e);
        }
    }

    fn fail(&self, req: &mut Request, failure: CaptureFailure) {
        if let Err(e) = self.registry.resolve_with_failure(req, failure) {
            log::debug!("failure for request {} not delivered: {}", req.id, e);
        }
    }
}

/// The entry to delete when the store grew by exactly two since `baseline`:
/// the older of the two newest entries. Any other growth yields `None`.
pub fn duplicate_entry(baseline: usize, entries: &[String]) -> Option<&str> {
    if entries.len().checked_sub(baseline) != Some(2) {
        return None;
    }
    entries.get(entries.len() - 2).map(String::as_str)
}
