//! MIME type inference and media classification.

use std::path::Path;

pub const IMAGE_JPEG: &str = "image/jpeg";
pub const IMAGE_PNG: &str = "image/png";
pub const VIDEO_MP4: &str = "video/mp4";
pub const VIDEO_3GPP: &str = "video/3gpp";
pub const AUDIO_3GPP: &str = "audio/3gpp";

/// Audio types whose format data is probed.
pub const AUDIO_TYPES: [&str; 4] = ["audio/3gpp", "audio/aac", "audio/amr", "audio/wav"];

/// Video types whose format data is probed.
pub const VIDEO_TYPES: [&str; 2] = [VIDEO_3GPP, VIDEO_MP4];

/// Broad family of a media file, used to pick a format prober.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaCategory {
    Image,
    Audio,
    Video,
    Unknown,
}

impl MediaCategory {
    /// Classify by MIME type, falling back to the `.jpg` extension check.
    pub fn classify(path: &Path, mime_type: &str) -> Self {
        let is_jpg = extension(path).as_deref() == Some("jpg");
        if mime_type == IMAGE_JPEG || mime_type == IMAGE_PNG || is_jpg {
            Self::Image
        } else if AUDIO_TYPES.contains(&mime_type) {
            Self::Audio
        } else if VIDEO_TYPES.contains(&mime_type) {
            Self::Video
        } else {
            Self::Unknown
        }
    }
}

/// Treat empty and literal `"null"` MIME strings as absent.
pub fn normalize(mime_type: Option<&str>) -> Option<&str> {
    mime_type.filter(|m| !m.is_empty() && *m != "null")
}

/// MIME type guessed from the file extension.
pub fn from_extension(path: &Path) -> Option<&'static str> {
    let mime = match extension(path)?.as_str() {
        "jpg" | "jpeg" => IMAGE_JPEG,
        "png" => IMAGE_PNG,
        "gif" => "image/gif",
        "webp" => "image/webp",
        "mp4" => VIDEO_MP4,
        "3gp" | "3gpp" => VIDEO_3GPP,
        "webm" => "video/webm",
        "avi" => "video/x-msvideo",
        "wav" => "audio/wav",
        "aac" => "audio/aac",
        "amr" => "audio/amr",
        "m4a" => "audio/mp4",
        "mp3" => "audio/mpeg",
        "ogg" => "audio/ogg",
        _ => return None,
    };
    Some(mime)
}

/// MIME type reported for a captured item.
///
/// 3GPP containers are ambiguous by extension; items stored under an
/// `/audio/` URI are reported as audio.
pub fn media_type_for(item_uri: &str, path: &Path) -> Option<String> {
    match extension(path).as_deref() {
        Some("3gp") | Some("3gpp") if item_uri.contains("/audio/") => Some(AUDIO_3GPP.to_string()),
        Some("3gp") | Some("3gpp") => Some(VIDEO_3GPP.to_string()),
        _ => from_extension(path).map(str::to_string),
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension().map(|e| e.to_string_lossy().to_lowercase())
}
