use std::fmt;

use serde::{Deserialize, Serialize};

use super::config::CaptureOptions;
use super::error::CaptureError;
use super::media_file::MediaFile;
use super::state::RequestState;

/// Correlation id handed to the external capture surface and the permission
/// gate, and returned verbatim with their outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub u32);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque identity of the caller waiting on a request.
///
/// Survives a restart as plain text; the live callback behind it is
/// re-established by whoever owns the resolution sink.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallbackToken(String);

impl CallbackToken {
    /// A fresh random token.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CallbackToken {
    fn default() -> Self {
        Self::new()
    }
}

impl From<String> for CallbackToken {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for CallbackToken {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for CallbackToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Kind of logical capture operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureKind {
    Audio,
    ImageOrVideo,
}

/// What the external surface is asked to open for one launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureMode {
    Audio,
    Image,
    Video,
    /// Let the user pick between still camera and video recorder.
    ImageOrVideo,
}

impl CaptureMode {
    pub fn wants_image(self) -> bool {
        matches!(self, Self::Image | Self::ImageOrVideo)
    }

    pub fn wants_video(self) -> bool {
        matches!(self, Self::Video | Self::ImageOrVideo)
    }
}

/// Artifacts and counters belonging to the launch currently in flight.
///
/// Owned by the request so concurrent captures never see each other's
/// placeholders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingTargets {
    pub image: Option<String>,
    pub video: Option<String>,
    pub baseline_image_count: Option<usize>,
}

impl PendingTargets {
    pub fn is_empty(&self) -> bool {
        self.image.is_none() && self.video.is_none() && self.baseline_image_count.is_none()
    }
}

/// One logical capture request, possibly spanning several launches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub id: RequestId,
    pub kind: CaptureKind,
    pub options: CaptureOptions,
    pub results: Vec<MediaFile>,
    pub callback: CallbackToken,
    pub state: RequestState,
    #[serde(default, skip_serializing_if = "PendingTargets::is_empty")]
    pub targets: PendingTargets,
}

impl Request {
    pub fn new(id: RequestId, kind: CaptureKind, options: CaptureOptions, callback: CallbackToken) -> Self {
        Self {
            id,
            kind,
            options,
            results: Vec::new(),
            callback,
            state: RequestState::Created,
            targets: PendingTargets::default(),
        }
    }

    pub fn limit(&self) -> usize {
        self.options.limit as usize
    }

    pub fn is_complete(&self) -> bool {
        self.results.len() >= self.limit()
    }

    /// Append a result; refuses to grow past the limit.
    pub fn push_result(&mut self, file: MediaFile) -> Result<(), CaptureError> {
        if self.is_complete() {
            return Err(CaptureError::Internal(format!(
                "request {} already holds {} of {} results",
                self.id,
                self.results.len(),
                self.limit()
            )));
        }
        self.results.push(file);
        Ok(())
    }

    /// Which surface to open for the next launch.
    pub fn capture_mode(&self) -> CaptureMode {
        match self.kind {
            CaptureKind::Audio => CaptureMode::Audio,
            CaptureKind::ImageOrVideo if self.options.image => CaptureMode::Image,
            CaptureKind::ImageOrVideo if self.options.video => CaptureMode::Video,
            CaptureKind::ImageOrVideo => CaptureMode::ImageOrVideo,
        }
    }
}
