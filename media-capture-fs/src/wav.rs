//! WAV file inspection.
//!
//! Walks the RIFF chunk list of a WAV file far enough to read the `fmt `
//! chunk and the size of the `data` chunk, skipping any metadata chunks
//! (`LIST`, `fact`, ...) in between. Sample data is never read.

use std::io::{Read, Seek, SeekFrom};

use media_capture_core::models::error::CaptureError;
use media_capture_core::models::media_file::FormatData;

/// Size of the RIFF descriptor: "RIFF", chunk size, "WAVE".
const RIFF_HEADER_SIZE: usize = 12;

/// Format fields of a WAV file plus the length of its sample data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavInfo {
    pub format_code: u16,
    pub channels: u16,
    pub sample_rate: u32,
    pub byte_rate: u32,
    pub bits_per_sample: u16,
    pub data_size: u32,
}

impl WavInfo {
    /// Whole seconds of audio in the data chunk.
    pub fn duration_secs(&self) -> u64 {
        if self.byte_rate == 0 {
            return 0;
        }
        self.data_size as u64 / self.byte_rate as u64
    }

    pub fn bitrate(&self) -> u32 {
        self.byte_rate.saturating_mul(8)
    }

    pub fn codec(&self) -> &'static str {
        match self.format_code {
            1 => "pcm",
            3 => "pcm_float",
            6 => "alaw",
            7 => "mulaw",
            0xFFFE => "extensible",
            _ => "wav",
        }
    }

    pub fn format_data(&self) -> FormatData {
        FormatData {
            bitrate: self.bitrate(),
            duration: self.duration_secs(),
            codecs: self.codec().to_string(),
            ..Default::default()
        }
    }
}

/// Whether `bytes` start with a RIFF/WAVE descriptor.
pub fn is_wav(bytes: &[u8]) -> bool {
    bytes.len() >= RIFF_HEADER_SIZE && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WAVE"
}

/// Read the format of the WAV stream positioned at its start.
pub fn read_wav_info<R: Read + Seek>(reader: &mut R) -> Result<WavInfo, CaptureError> {
    let mut riff = [0u8; RIFF_HEADER_SIZE];
    reader.read_exact(&mut riff).map_err(|e| truncated("RIFF header", e))?;
    if !is_wav(&riff) {
        return Err(CaptureError::StorageError("not a RIFF/WAVE file".into()));
    }

    let mut format: Option<WavInfo> = None;
    loop {
        let mut chunk_header = [0u8; 8];
        reader.read_exact(&mut chunk_header).map_err(|e| truncated("chunk header", e))?;
        let id = [chunk_header[0], chunk_header[1], chunk_header[2], chunk_header[3]];
        let size = u32::from_le_bytes([chunk_header[4], chunk_header[5], chunk_header[6], chunk_header[7]]);

        match &id {
            b"fmt " => {
                if size < 16 {
                    return Err(CaptureError::StorageError(format!("fmt chunk too short: {}", size)));
                }
                let mut fmt = [0u8; 16];
                reader.read_exact(&mut fmt).map_err(|e| truncated("fmt chunk", e))?;
                format = Some(WavInfo {
                    format_code: u16::from_le_bytes([fmt[0], fmt[1]]),
                    channels: u16::from_le_bytes([fmt[2], fmt[3]]),
                    sample_rate: u32::from_le_bytes([fmt[4], fmt[5], fmt[6], fmt[7]]),
                    byte_rate: u32::from_le_bytes([fmt[8], fmt[9], fmt[10], fmt[11]]),
                    bits_per_sample: u16::from_le_bytes([fmt[14], fmt[15]]),
                    data_size: 0,
                });
                skip(reader, padded(size) - 16)?;
            }
            b"data" => {
                let mut info = format.ok_or_else(|| CaptureError::StorageError("data chunk before fmt chunk".into()))?;
                info.data_size = size;
                return Ok(info);
            }
            _ => skip(reader, padded(size))?,
        }
    }
}

/// Chunks are word-aligned; odd sizes carry one pad byte.
fn padded(size: u32) -> u64 {
    size as u64 + (size as u64 & 1)
}

fn skip<R: Seek>(reader: &mut R, len: u64) -> Result<(), CaptureError> {
    let offset = i64::try_from(len).map_err(|_| CaptureError::StorageError(format!("chunk too large: {}", len)))?;
    reader
        .seek(SeekFrom::Current(offset))
        .map_err(|e| CaptureError::StorageError(format!("failed to skip chunk: {}", e)))?;
    Ok(())
}

fn truncated(what: &str, e: std::io::Error) -> CaptureError {
    CaptureError::StorageError(format!("failed to read WAV {}: {}", what, e))
}

/// 44-byte PCM header, used to build fixtures.
#[cfg(test)]
pub(crate) fn pcm_header(sample_rate: u32, bit_depth: u16, channels: u16, data_size: u32) -> [u8; 44] {
    let byte_rate = sample_rate * channels as u32 * bit_depth as u32 / 8;
    let block_align = channels * bit_depth / 8;

    let mut header = [0u8; 44];
    header[0..4].copy_from_slice(b"RIFF");
    header[4..8].copy_from_slice(&(36 + data_size).to_le_bytes());
    header[8..12].copy_from_slice(b"WAVE");
    header[12..16].copy_from_slice(b"fmt ");
    header[16..20].copy_from_slice(&16u32.to_le_bytes());
    header[20..22].copy_from_slice(&1u16.to_le_bytes());
    header[22..24].copy_from_slice(&channels.to_le_bytes());
    header[24..28].copy_from_slice(&sample_rate.to_le_bytes());
    header[28..32].copy_from_slice(&byte_rate.to_le_bytes());
    header[32..34].copy_from_slice(&block_align.to_le_bytes());
    header[34..36].copy_from_slice(&bit_depth.to_le_bytes());
    header[36..40].copy_from_slice(b"data");
    header[40..44].copy_from_slice(&data_size.to_le_bytes());
    header
}
