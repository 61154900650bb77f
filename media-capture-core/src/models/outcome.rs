use serde::{Deserialize, Serialize};

use super::error::{CaptureError, ErrorCode};
use super::media_file::MediaFile;

/// Typed failure delivered to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureFailure {
    pub code: ErrorCode,
    pub message: String,
}

impl CaptureFailure {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn permission_denied() -> Self {
        Self::new(ErrorCode::PermissionDenied, "Permission denied.")
    }

    pub fn no_media_files(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NoMediaFiles, message)
    }
}

impl From<&CaptureError> for CaptureFailure {
    fn from(error: &CaptureError) -> Self {
        let message = match error {
            CaptureError::NotSupported(msg) | CaptureError::NoMediaFiles(msg) => msg.clone(),
            other => other.to_string(),
        };
        Self::new(error.error_code(), message)
    }
}

/// Final outcome of a logical capture request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    Success(Vec<MediaFile>),
    Failure(CaptureFailure),
}

impl CaptureOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Caller-facing JSON: the descriptor array, or `{code, message}`.
    pub fn to_payload(&self) -> serde_json::Value {
        let payload = match self {
            Self::Success(files) => serde_json::to_value(files),
            Self::Failure(failure) => serde_json::to_value(failure),
        };
        // Plain structs with string keys always serialize.
        payload.unwrap_or(serde_json::Value::Null)
    }
}

/// Result reported by the external capture surface for one launch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExternalResult {
    /// Capture completed; audio captures carry the produced item's URI.
    Ok { uri: Option<String> },
    Canceled,
    /// Any other result code; handled like a cancellation.
    Other(i32),
}
