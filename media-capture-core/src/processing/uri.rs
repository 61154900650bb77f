//! Conversions between `file:` URIs and local paths.

use std::path::{Path, PathBuf};

use url::Url;

use crate::models::error::CaptureError;

/// Local path for a `file:` URI or a bare path.
///
/// Percent-encoded URIs are decoded. Anything that is not a local `file:`
/// URI is taken as a path as-is.
pub fn to_local_path(item: &str) -> PathBuf {
    match Url::parse(item) {
        Ok(url) if url.scheme() == "file" => url.to_file_path().unwrap_or_else(|()| PathBuf::from(item)),
        _ => PathBuf::from(item),
    }
}

/// Percent-encoded `file:` URI for an absolute local path.
pub fn file_uri(path: &Path) -> Result<String, CaptureError> {
    Url::from_file_path(path)
        .map(String::from)
        .map_err(|()| CaptureError::StorageError(format!("{} is not an absolute path", path.display())))
}

/// Final path component, or an empty string.
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
