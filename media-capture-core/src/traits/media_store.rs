use serde::{Deserialize, Serialize};

use crate::models::error::CaptureError;

/// Store partition a placeholder is created in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

/// Shared media store the external surface writes into.
pub trait MediaStore: Send + Sync {
    /// Pre-create an empty entry for the surface to fill; returns its URI.
    fn create_placeholder(&self, kind: MediaKind, mime_type: &str) -> Result<String, CaptureError>;

    /// Whether the entry behind `uri` has received content.
    fn has_content(&self, uri: &str) -> bool;

    /// Delete the entry behind `uri`. Deleting a missing entry succeeds.
    fn remove(&self, uri: &str) -> Result<(), CaptureError>;

    /// URIs of all image entries, oldest first.
    fn image_entries(&self) -> Result<Vec<String>, CaptureError>;

    /// Run the still-image pipeline on a captured entry and store the
    /// processed copy as a new entry; returns the new URI.
    fn commit_image(&self, captured: &str) -> Result<String, CaptureError>;
}
