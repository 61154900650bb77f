use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use media_capture_core::models::error::CaptureError;
use media_capture_core::session::orchestrator::CaptureHost;
use media_capture_core::traits::capture_surface::CaptureSurface;
use media_capture_core::traits::permission_gate::PermissionGate;

use crate::directory_store::DirectoryMediaStore;
use crate::inspector::FsMediaInspector;
use crate::resolver::RootedPathResolver;
use crate::snapshot_file::FileSnapshotStore;

/// Configuration for a filesystem-backed capture host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FsHostConfig {
    /// Directory holding the `images/` and `videos/` stores.
    pub media_root: PathBuf,

    /// File the pending-request snapshot is saved to.
    pub snapshot_path: PathBuf,

    /// URL prefix for descriptors' `localURL`, mapped onto `media_root`
    /// (None = descriptors carry no `localURL`).
    pub local_url_prefix: Option<String>,
}

impl FsHostConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.media_root.as_os_str().is_empty() {
            return Err("media root must be set".into());
        }
        if self.snapshot_path.file_name().is_none() {
            return Err(format!("snapshot path has no file name: {}", self.snapshot_path.display()));
        }
        if self.snapshot_path.starts_with(&self.media_root) {
            return Err("snapshot path must not live inside the media root".into());
        }
        if self.local_url_prefix.as_deref() == Some("") {
            return Err("local URL prefix must not be empty when set".into());
        }
        Ok(())
    }

    pub fn snapshot_store(&self) -> FileSnapshotStore {
        FileSnapshotStore::new(&self.snapshot_path)
    }
}

impl Default for FsHostConfig {
    fn default() -> Self {
        Self {
            media_root: PathBuf::from("media"),
            snapshot_path: PathBuf::from("pending-captures.json"),
            local_url_prefix: None,
        }
    }
}

/// Assemble the collaborators for a `CaptureOrchestrator` from `config`.
///
/// Permission prompts and the capture surface stay with the host
/// application; storage, inspection and path resolution are filesystem
/// backed.
pub fn capture_host(
    config: &FsHostConfig,
    gate: Arc<dyn PermissionGate>,
    surface: Arc<dyn CaptureSurface>,
) -> Result<CaptureHost, CaptureError> {
    config.validate().map_err(CaptureError::InvalidOptions)?;

    let store = Arc::new(DirectoryMediaStore::open(&config.media_root)?);
    let media_root = store.root().to_path_buf();
    let host = CaptureHost::new(gate, surface, store, Arc::new(FsMediaInspector::new()));
    Ok(match &config.local_url_prefix {
        Some(prefix) => {
            let resolver = RootedPathResolver::new(media_root, prefix.as_str());
            host.with_path_resolver(Arc::new(resolver))
        }
        None => host,
    })
}
