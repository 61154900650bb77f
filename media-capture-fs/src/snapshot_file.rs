use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use media_capture_core::models::error::CaptureError;
use media_capture_core::storage::snapshot::{RegistrySnapshot, SNAPSHOT_VERSION};

/// Layout version of the file envelope around the snapshot.
pub const FILE_FORMAT_VERSION: u32 = 1;

/// On-disk envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SnapshotFile {
    format_version: u32,
    saved_at: DateTime<Utc>,
    /// SHA-256 hex digest of the snapshot's JSON encoding.
    checksum: String,
    snapshot: RegistrySnapshot,
}

/// Persists registry snapshots to a single JSON file.
///
/// Saves go through a sibling temp file and a rename, so a crash mid-save
/// leaves the previous snapshot readable.
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    path: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `snapshot`, replacing any previous one.
    pub fn save(&self, snapshot: &RegistrySnapshot) -> Result<(), CaptureError> {
        let envelope = SnapshotFile {
            format_version: FILE_FORMAT_VERSION,
            saved_at: Utc::now(),
            checksum: checksum(&snapshot.to_json()?),
            snapshot: snapshot.clone(),
        };
        let json = serde_json::to_string_pretty(&envelope)
            .map_err(|e| CaptureError::SnapshotError(format!("failed to serialize snapshot file: {}", e)))?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| CaptureError::StorageError(format!("failed to create {}: {}", parent.display(), e)))?;
        }
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json).map_err(|e| CaptureError::StorageError(format!("failed to write snapshot: {}", e)))?;
        fs::rename(&tmp, &self.path)
            .map_err(|e| CaptureError::StorageError(format!("failed to replace snapshot: {}", e)))?;

        log::debug!(
            "saved {} pending request(s) to {}",
            snapshot.requests.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Read the saved snapshot; `None` when nothing was saved.
    pub fn load(&self) -> Result<Option<RegistrySnapshot>, CaptureError> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CaptureError::StorageError(format!("failed to read snapshot: {}", e))),
        };

        let envelope: SnapshotFile = serde_json::from_str(&json)
            .map_err(|e| CaptureError::SnapshotError(format!("failed to parse snapshot file: {}", e)))?;
        if envelope.format_version != FILE_FORMAT_VERSION {
            return Err(CaptureError::SnapshotError(format!(
                "unsupported snapshot file version: {}",
                envelope.format_version
            )));
        }
        if envelope.snapshot.version != SNAPSHOT_VERSION {
            return Err(CaptureError::SnapshotError(format!(
                "unsupported snapshot version: {}",
                envelope.snapshot.version
            )));
        }
        let actual = checksum(&envelope.snapshot.to_json()?);
        if actual != envelope.checksum {
            return Err(CaptureError::SnapshotError(format!(
                "checksum mismatch: expected {}, got {}",
                envelope.checksum, actual
            )));
        }

        log::debug!(
            "loaded {} pending request(s) saved at {}",
            envelope.snapshot.requests.len(),
            envelope.saved_at.to_rfc3339()
        );
        Ok(Some(envelope.snapshot))
    }

    /// Delete the saved snapshot. Clearing an absent file succeeds.
    pub fn clear(&self) -> Result<(), CaptureError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CaptureError::StorageError(format!("failed to remove snapshot: {}", e))),
        }
    }
}

fn checksum(json: &str) -> String {
    let digest = Sha256::digest(json.as_bytes());
    hex_encode(&digest)
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
