use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::processing::{mime, uri};

/// Descriptor of one captured item, as delivered to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaFile {
    pub name: String,
    /// `file://` URI of the item.
    pub full_path: String,
    #[serde(rename = "localURL", default, skip_serializing_if = "Option::is_none")]
    pub local_url: Option<String>,
    #[serde(rename = "type")]
    pub mime_type: String,
    /// Milliseconds since the Unix epoch.
    pub last_modified_date: i64,
    pub size: u64,
}

impl MediaFile {
    /// Best-effort descriptor when the item could not be inspected.
    ///
    /// Everything that would need the file itself takes its zero value.
    pub fn fallback(item_uri: &str) -> Self {
        let path = uri::to_local_path(item_uri);
        Self {
            name: uri::file_name(&path),
            full_path: uri::file_uri(&path).unwrap_or_else(|_| item_uri.to_string()),
            local_url: None,
            mime_type: mime::media_type_for(item_uri, &path).unwrap_or_default(),
            last_modified_date: 0,
            size: 0,
        }
    }

    /// Local filesystem path behind `full_path`.
    pub fn local_path(&self) -> PathBuf {
        uri::to_local_path(&self.full_path)
    }
}

/// Format details of a media file; zero or empty where undeterminable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatData {
    pub height: u32,
    pub width: u32,
    /// Bits per second.
    pub bitrate: u32,
    /// Whole seconds.
    pub duration: u64,
    pub codecs: String,
}
