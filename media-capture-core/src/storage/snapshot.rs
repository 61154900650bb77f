use serde::{Deserialize, Serialize};

use crate::models::error::CaptureError;
use crate::models::request::Request;

/// Current layout of [`RegistrySnapshot`].
pub const SNAPSHOT_VERSION: u32 = 1;

/// Durable image of every pending request.
///
/// Carries everything needed to resume after the hosting process was
/// killed: ids, kinds, options, partial results, callback tokens, states
/// and in-flight placeholders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    pub version: u32,
    /// Pending requests ordered by id.
    pub requests: Vec<Request>,
}

impl RegistrySnapshot {
    pub fn new(mut requests: Vec<Request>) -> Self {
        requests.sort_by_key(|r| r.id);
        Self {
            version: SNAPSHOT_VERSION,
            requests,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn to_json(&self) -> Result<String, CaptureError> {
        serde_json::to_string(self)
            .map_err(|e| CaptureError::SnapshotError(format!("failed to serialize snapshot: {}", e)))
    }

    pub fn from_json(json: &str) -> Result<Self, CaptureError> {
        let snapshot: RegistrySnapshot = serde_json::from_str(json)
            .map_err(|e| CaptureError::SnapshotError(format!("failed to parse snapshot: {}", e)))?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(CaptureError::SnapshotError(format!(
                "unsupported snapshot version: {}",
                snapshot.version
            )));
        }
        Ok(snapshot)
    }
}

impl Default for RegistrySnapshot {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}
