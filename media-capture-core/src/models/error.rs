use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::request::RequestId;

/// Errors that can occur while orchestrating a capture request.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("permission denied")]
    PermissionDenied,

    #[error("no media files: {0}")]
    NoMediaFiles(String),

    #[error("not supported: {0}")]
    NotSupported(String),

    #[error("invalid options: {0}")]
    InvalidOptions(String),

    #[error("request {0} already resolved")]
    AlreadyResolved(RequestId),

    #[error("request {0} is already pending")]
    IdConflict(RequestId),

    #[error("request id space exhausted")]
    IdSpaceExhausted,

    #[error("storage error: {0}")]
    StorageError(String),

    #[error("snapshot error: {0}")]
    SnapshotError(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl CaptureError {
    /// The caller-facing failure code this error is reported under.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::PermissionDenied => ErrorCode::PermissionDenied,
            Self::NoMediaFiles(_) => ErrorCode::NoMediaFiles,
            Self::NotSupported(_) => ErrorCode::NotSupported,
            _ => ErrorCode::InternalError,
        }
    }
}

/// Failure codes delivered to the caller through the resolution sink.
///
/// Serialized as the bare integer code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
pub enum ErrorCode {
    InternalError,
    NoMediaFiles,
    PermissionDenied,
    NotSupported,
}

impl ErrorCode {
    pub fn code(self) -> u16 {
        match self {
            Self::InternalError => 0,
            Self::NoMediaFiles => 3,
            Self::PermissionDenied => 4,
            Self::NotSupported => 20,
        }
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

impl TryFrom<u16> for ErrorCode {
    type Error = String;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::InternalError),
            3 => Ok(Self::NoMediaFiles),
            4 => Ok(Self::PermissionDenied),
            20 => Ok(Self::NotSupported),
            other => Err(format!("unknown capture error code: {}", other)),
        }
    }
}
