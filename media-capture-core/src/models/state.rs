use serde::{Deserialize, Serialize};

use super::error::ErrorCode;

/// How a request left the pending set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    Success,
    Failure(ErrorCode),
}

/// Per-request state machine.
///
/// State transitions:
/// ```text
/// created → awaiting_permission → awaiting_external_result ↺ (multi-shot)
///    ↓               ↓                      ↓
///    └──────────→ resolved(success | failure) ←┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestState {
    Created,
    AwaitingPermission,
    AwaitingExternalResult,
    Resolved(Resolution),
}

impl RequestState {
    pub fn is_awaiting_permission(&self) -> bool {
        matches!(self, Self::AwaitingPermission)
    }

    pub fn is_awaiting_result(&self) -> bool {
        matches!(self, Self::AwaitingExternalResult)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }
}
