use std::collections::{HashSet, VecDeque};

use parking_lot::Mutex;

use media_capture_core::models::error::CaptureError;
use media_capture_core::models::request::CaptureMode;
use media_capture_core::traits::capture_surface::{CaptureSurface, LaunchRequest};

/// Capture surface that queues launches for the host application.
///
/// The host drains the queue with [`take_launches`](Self::take_launches),
/// runs the actual capture, writes into the launch's placeholder targets and
/// reports back through `CaptureOrchestrator::on_external_result`.
pub struct QueuedCaptureSurface {
    supported: HashSet<CaptureMode>,
    launches: Mutex<VecDeque<LaunchRequest>>,
}

impl QueuedCaptureSurface {
    pub fn new(supported: &[CaptureMode]) -> Self {
        Self {
            supported: supported.iter().copied().collect(),
            launches: Mutex::new(VecDeque::new()),
        }
    }

    /// Surface able to service every capture mode.
    pub fn supporting_all() -> Self {
        Self::new(&[
            CaptureMode::Audio,
            CaptureMode::Image,
            CaptureMode::Video,
            CaptureMode::ImageOrVideo,
        ])
    }

    pub fn supports(&self, mode: CaptureMode) -> bool {
        match mode {
            // a chooser works as long as one of its choices does
            CaptureMode::ImageOrVideo => {
                self.supported.contains(&mode)
                    || self.supported.contains(&CaptureMode::Image)
                    || self.supported.contains(&CaptureMode::Video)
            }
            _ => self.supported.contains(&mode),
        }
    }

    /// Drain queued launches, oldest first.
    pub fn take_launches(&self) -> Vec<LaunchRequest> {
        self.launches.lock().drain(..).collect()
    }

    pub fn pending(&self) -> usize {
        self.launches.lock().len()
    }
}

impl CaptureSurface for QueuedCaptureSurface {
    fn launch(&self, launch: &LaunchRequest) -> Result<(), CaptureError> {
        if !self.supports(launch.mode) {
            let what = match launch.mode {
                CaptureMode::Audio => "Audio",
                CaptureMode::Image => "Image",
                CaptureMode::Video => "Video",
                CaptureMode::ImageOrVideo => "Image/Video",
            };
            return Err(CaptureError::NotSupported(format!(
                "No Activity found to handle {} Capture.",
                what
            )));
        }
        log::debug!("queued {:?} launch for request {}", launch.mode, launch.id);
        self.launches.lock().push_back(launch.clone());
        Ok(())
    }
}
