//! Metadata extraction for files on the local filesystem.

use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;

use chrono::{DateTime, Utc};

use media_capture_core::models::error::CaptureError;
use media_capture_core::models::media_file::{FormatData, MediaFile};
use media_capture_core::processing::mime::{self, MediaCategory};
use media_capture_core::processing::uri;
use media_capture_core::traits::media_inspector::MediaInspector;

use crate::{mp4, wav};

/// Inspects captured items by reading the files behind their URIs.
///
/// Format probing understands WAV (duration, bitrate, codec), PNG and JPEG
/// (dimensions) and MP4/3GPP (duration). Anything else yields defaults.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsMediaInspector;

impl FsMediaInspector {
    pub fn new() -> Self {
        Self
    }
}

impl MediaInspector for FsMediaInspector {
    fn describe(&self, item: &str) -> Result<MediaFile, CaptureError> {
        let path = uri::to_local_path(item);
        let metadata = fs::metadata(&path)
            .map_err(|e| CaptureError::StorageError(format!("failed to stat {}: {}", path.display(), e)))?;
        let last_modified_date = metadata
            .modified()
            .map(|t| DateTime::<Utc>::from(t).timestamp_millis())
            .unwrap_or_else(|e| {
                log::warn!("no modification time for {}: {}", path.display(), e);
                0
            });

        Ok(MediaFile {
            name: uri::file_name(&path),
            full_path: uri::file_uri(&path)?,
            local_url: None,
            mime_type: mime::media_type_for(item, &path).unwrap_or_default(),
            last_modified_date,
            size: metadata.len(),
        })
    }

    fn probe(&self, path: &Path, category: MediaCategory) -> Result<FormatData, CaptureError> {
        let file = File::open(path)
            .map_err(|e| CaptureError::StorageError(format!("failed to open {}: {}", path.display(), e)))?;
        let mut reader = BufReader::new(file);

        match category {
            MediaCategory::Image => {
                let (width, height) = image_dimensions(reader)?;
                Ok(FormatData {
                    width,
                    height,
                    ..Default::default()
                })
            }
            MediaCategory::Audio => match wav::read_wav_info(&mut reader) {
                Ok(info) => Ok(info.format_data()),
                Err(e) => {
                    log::debug!("{} is not a readable WAV file: {}", path.display(), e);
                    Ok(FormatData::default())
                }
            },
            MediaCategory::Video => {
                let movie = mp4::read_movie_info(&mut reader)?;
                Ok(FormatData {
                    width: movie.width,
                    height: movie.height,
                    duration: movie.duration_secs.unwrap_or_default(),
                    ..Default::default()
                })
            }
            MediaCategory::Unknown => Ok(FormatData::default()),
        }
    }
}

/// Pixel dimensions from the image header; `(0, 0)` for undecodable formats.
fn image_dimensions(reader: BufReader<File>) -> Result<(u32, u32), CaptureError> {
    let reader = image::io::Reader::new(reader)
        .with_guessed_format()
        .map_err(|e| CaptureError::StorageError(format!("failed to read image header: {}", e)))?;
    if reader.format().is_none() {
        return Ok((0, 0));
    }
    reader
        .into_dimensions()
        .map_err(|e| CaptureError::StorageError(format!("failed to decode image header: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn write(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, bytes).unwrap();
        path
    }

    #[test]
    fn describes_file_behind_uri() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "clip.wav", &wav::pcm_header(8000, 16, 1, 0));

        let file = FsMediaInspector.describe(&uri::file_uri(&path).unwrap()).unwrap();
        assert_eq!(file.name, "clip.wav");
        assert_eq!(file.full_path, uri::file_uri(&path).unwrap());
        assert_eq!(file.mime_type, "audio/wav");
        assert_eq!(file.size, 44);
        assert!(file.last_modified_date > 0);
        assert!(file.local_url.is_none());
    }

    #[test]
    fn describe_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("gone.jpg");
        assert!(matches!(
            FsMediaInspector.describe(&uri::file_uri(&missing).unwrap()),
            Err(CaptureError::StorageError(_))
        ));
    }

    #[test]
    fn describes_percent_encoded_uri() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "my clip#1.wav", &wav::pcm_header(8000, 16, 1, 16000));
        let item = uri::file_uri(&path).unwrap();
        assert!(item.ends_with("/my%20clip%231.wav"));

        let file = FsMediaInspector.describe(&item).unwrap();
        assert_eq!(file.name, "my clip#1.wav");
        assert_eq!(file.full_path, item);
        assert_eq!(file.size, 44);
        assert!(file.last_modified_date > 0);
    }

    #[test]
    fn probes_each_category() {
        let dir = tempfile::tempdir().unwrap();
        let inspector = FsMediaInspector::new();

        let wav_path = write(dir.path(), "a.wav", &wav::pcm_header(44100, 16, 2, 176400 * 10));
        let audio = inspector.probe(&wav_path, MediaCategory::Audio).unwrap();
        assert_eq!(audio.duration, 10);
        assert_eq!(audio.bitrate, 1_411_200);
        assert_eq!(audio.codecs, "pcm");

        let jpg = dir.path().join("b.jpg");
        image::RgbImage::new(80, 60).save(&jpg).unwrap();
        let dims = inspector.probe(&jpg, MediaCategory::Image).unwrap();
        assert_eq!((dims.width, dims.height), (80, 60));

        let png = dir.path().join("c.png");
        image::RgbImage::new(32, 16).save(&png).unwrap();
        let dims = inspector.probe(&png, MediaCategory::Image).unwrap();
        assert_eq!((dims.width, dims.height), (32, 16));

        let mp4 = write(dir.path(), "d.mp4", &mp4::mp4_fixture(1000, 7500, 1280, 720));
        let video = inspector.probe(&mp4, MediaCategory::Video).unwrap();
        assert_eq!(video.duration, 7);
        assert_eq!((video.width, video.height), (1280, 720));
    }

    #[test]
    fn unknown_image_format_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let odd = write(dir.path(), "scan.jpg", b"not really an image");
        assert_eq!(
            FsMediaInspector.probe(&odd, MediaCategory::Image).unwrap(),
            FormatData::default()
        );
    }

    #[test]
    fn compressed_audio_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let amr = write(dir.path(), "voice.amr", b"#!AMR\n\x3c\x00");
        assert_eq!(
            FsMediaInspector.probe(&amr, MediaCategory::Audio).unwrap(),
            FormatData::default()
        );
    }
}
