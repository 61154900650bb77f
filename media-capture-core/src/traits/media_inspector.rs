use std::path::Path;

use crate::models::error::CaptureError;
use crate::models::media_file::{FormatData, MediaFile};
use crate::processing::mime::MediaCategory;

/// Metadata-extraction collaborator.
pub trait MediaInspector: Send + Sync {
    /// Describe the item behind `uri`. `local_url` is left for the caller.
    fn describe(&self, uri: &str) -> Result<MediaFile, CaptureError>;

    /// Probe format details of a local file already classified as `category`.
    fn probe(&self, path: &Path, category: MediaCategory) -> Result<FormatData, CaptureError>;
}
