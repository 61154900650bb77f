use serde::{Deserialize, Serialize};

use crate::models::error::CaptureError;
use crate::models::request::{CaptureMode, RequestId};

/// Everything the external surface needs for one launch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchRequest {
    /// Correlation id to hand back with the result.
    pub id: RequestId,
    pub mode: CaptureMode,
    /// Placeholder the still camera should write into.
    pub image_target: Option<String>,
    /// Placeholder the video recorder should write into.
    pub video_target: Option<String>,
    pub duration: Option<u32>,
    pub quality: Option<u32>,
    pub mime_type_filter: Option<String>,
}

/// The opaque component that performs the actual acquisition.
///
/// Implemented by:
/// - `QueuedCaptureSurface` (media-capture-fs), which queues launches for a host
///
/// Results come back later through `CaptureOrchestrator::on_external_result`
/// carrying `launch.id`. Implementations must not deliver that result from
/// inside `launch` itself.
pub trait CaptureSurface: Send + Sync {
    /// Hand the launch to the surface.
    ///
    /// Returns `CaptureError::NotSupported` when nothing on this host can
    /// service `launch.mode`.
    fn launch(&self, launch: &LaunchRequest) -> Result<(), CaptureError>;
}
