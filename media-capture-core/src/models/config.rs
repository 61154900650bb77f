use serde::{Deserialize, Serialize};

/// Caller-supplied options for a capture request.
///
/// Deserializes from the caller's camelCase option object; missing fields
/// take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CaptureOptions {
    /// Number of items to collect before the request resolves (default: 1).
    pub limit: u32,

    /// Maximum clip length in seconds, forwarded to the capture surface.
    pub duration: Option<u32>,

    /// Video quality hint, forwarded to the capture surface.
    pub quality: Option<u32>,

    /// Optional MIME filter, forwarded to the capture surface.
    pub mime_type_filter: Option<String>,

    /// Launch the still camera directly instead of offering a chooser.
    pub image: bool,

    /// Launch the video recorder directly instead of offering a chooser.
    pub video: bool,
}

impl CaptureOptions {
    pub fn with_limit(limit: u32) -> Self {
        Self {
            limit,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.limit == 0 {
            return Err("limit must be at least 1".into());
        }
        if self.duration == Some(0) {
            return Err("duration must be positive when set".into());
        }
        Ok(())
    }
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            limit: 1,
            duration: None,
            quality: None,
            mime_type_filter: None,
            image: false,
            video: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_single_item() {
        let options = CaptureOptions::default();
        assert_eq!(options.limit, 1);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn zero_limit_is_rejected() {
        assert!(CaptureOptions::with_limit(0).validate().is_err());
    }

    #[test]
    fn parses_caller_options() {
        let options: CaptureOptions =
            serde_json::from_str(r#"{"limit":3,"duration":10,"image":true,"mimeTypeFilter":"image/*"}"#)
                .unwrap();
        assert_eq!(options.limit, 3);
        assert_eq!(options.duration, Some(10));
        assert_eq!(options.quality, None);
        assert!(options.image);
        assert!(!options.video);
        assert_eq!(options.mime_type_filter.as_deref(), Some("image/*"));
    }
}
