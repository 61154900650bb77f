//! Movie duration and frame size from the `moov` box of MP4 and 3GPP files.
//!
//! ```text
//! moov
//! ├── mvhd            timescale, duration
//! └── trak ...
//!     ├── tkhd        width, height (16.16 fixed point)
//!     └── mdia
//!         └── hdlr    handler type, "vide" for video tracks
//! ```

use std::io::{Read, Seek, SeekFrom};

use media_capture_core::models::error::CaptureError;

/// What the `moov` box says about a movie.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MovieInfo {
    /// Whole seconds, `None` without a usable `mvhd`.
    pub duration_secs: Option<u64>,
    /// Frame size of the first video track; zero without one.
    pub width: u32,
    pub height: u32,
}

struct BoxHeader {
    kind: [u8; 4],
    payload: u64,
    end: u64,
}

/// Read duration and frame size; a file without `moov` yields the default.
pub fn read_movie_info<R: Read + Seek>(reader: &mut R) -> Result<MovieInfo, CaptureError> {
    let end = reader
        .seek(SeekFrom::End(0))
        .map_err(|e| io_error("seek", e))?;

    let mut info = MovieInfo::default();
    let top = children(reader, 0, end)?;
    let Some(moov) = top.iter().find(|b| &b.kind == b"moov") else {
        return Ok(info);
    };

    for child in children(reader, moov.payload, moov.end)? {
        match &child.kind {
            b"mvhd" if info.duration_secs.is_none() => info.duration_secs = read_mvhd(reader, &child)?,
            b"trak" if info.width == 0 && info.height == 0 => {
                if let Some((width, height)) = read_video_track(reader, &child)? {
                    info.width = width;
                    info.height = height;
                }
            }
            _ => {}
        }
    }
    Ok(info)
}

fn read_mvhd<R: Read + Seek>(reader: &mut R, mvhd: &BoxHeader) -> Result<Option<u64>, CaptureError> {
    let version = read_u8_at(reader, mvhd.payload)?;
    let (timescale, duration) = if version == 1 {
        (read_u32_at(reader, mvhd.payload + 20)?, read_u64_at(reader, mvhd.payload + 24)?)
    } else {
        (read_u32_at(reader, mvhd.payload + 12)?, read_u32_at(reader, mvhd.payload + 16)? as u64)
    };
    if timescale == 0 {
        return Ok(None);
    }
    Ok(Some(duration / timescale as u64))
}

/// Frame size of `trak` if it is a video track.
///
/// A track without `hdlr` counts as video when its `tkhd` has a size.
fn read_video_track<R: Read + Seek>(reader: &mut R, trak: &BoxHeader) -> Result<Option<(u32, u32)>, CaptureError> {
    let mut size = None;
    let mut handler = None;
    for child in children(reader, trak.payload, trak.end)? {
        match &child.kind {
            b"tkhd" => size = Some(read_tkhd_size(reader, &child)?),
            b"mdia" => {
                for media in children(reader, child.payload, child.end)? {
                    if &media.kind == b"hdlr" {
                        let mut kind = [0u8; 4];
                        reader
                            .seek(SeekFrom::Start(media.payload + 8))
                            .map_err(|e| io_error("seek", e))?;
                        reader.read_exact(&mut kind).map_err(|e| io_error("hdlr", e))?;
                        handler = Some(kind);
                    }
                }
            }
            _ => {}
        }
    }

    Ok(match (handler, size) {
        (Some(kind), Some(size)) if &kind == b"vide" => Some(size),
        (None, Some((width, height))) if width > 0 && height > 0 => Some((width, height)),
        _ => None,
    })
}

fn read_tkhd_size<R: Read + Seek>(reader: &mut R, tkhd: &BoxHeader) -> Result<(u32, u32), CaptureError> {
    let offset = if read_u8_at(reader, tkhd.payload)? == 1 { 88 } else { 76 };
    let width = read_u32_at(reader, tkhd.payload + offset)?;
    let height = read_u32_at(reader, tkhd.payload + offset + 4)?;
    Ok((width >> 16, height >> 16))
}

/// Headers of the boxes laid out between `start` and `limit`.
fn children<R: Read + Seek>(reader: &mut R, start: u64, limit: u64) -> Result<Vec<BoxHeader>, CaptureError> {
    let mut boxes = Vec::new();
    let mut pos = start;
    while pos + 8 <= limit {
        reader.seek(SeekFrom::Start(pos)).map_err(|e| io_error("seek", e))?;
        let mut header = [0u8; 8];
        reader.read_exact(&mut header).map_err(|e| io_error("box header", e))?;
        let mut size = u32::from_be_bytes([header[0], header[1], header[2], header[3]]) as u64;
        let mut header_len = 8;
        if size == 1 {
            let mut large = [0u8; 8];
            reader.read_exact(&mut large).map_err(|e| io_error("box header", e))?;
            size = u64::from_be_bytes(large);
            header_len = 16;
        } else if size == 0 {
            size = limit - pos;
        }
        if size < header_len {
            return Err(CaptureError::StorageError(format!("bad box size {} at {}", size, pos)));
        }

        let end = pos.saturating_add(size).min(limit);
        boxes.push(BoxHeader {
            kind: [header[4], header[5], header[6], header[7]],
            payload: pos + header_len,
            end,
        });
        pos = end;
    }
    Ok(boxes)
}

fn read_u8_at<R: Read + Seek>(reader: &mut R, pos: u64) -> Result<u8, CaptureError> {
    let mut buf = [0u8; 1];
    read_at(reader, pos, &mut buf)?;
    Ok(buf[0])
}

fn read_u32_at<R: Read + Seek>(reader: &mut R, pos: u64) -> Result<u32, CaptureError> {
    let mut buf = [0u8; 4];
    read_at(reader, pos, &mut buf)?;
    Ok(u32::from_be_bytes(buf))
}

fn read_u64_at<R: Read + Seek>(reader: &mut R, pos: u64) -> Result<u64, CaptureError> {
    let mut buf = [0u8; 8];
    read_at(reader, pos, &mut buf)?;
    Ok(u64::from_be_bytes(buf))
}

fn read_at<R: Read + Seek>(reader: &mut R, pos: u64, buf: &mut [u8]) -> Result<(), CaptureError> {
    reader.seek(SeekFrom::Start(pos)).map_err(|e| io_error("seek", e))?;
    reader.read_exact(buf).map_err(|e| io_error("box body", e))
}

fn io_error(what: &str, e: std::io::Error) -> CaptureError {
    CaptureError::StorageError(format!("failed to read MP4 {}: {}", what, e))
}

#[cfg(test)]
fn mp4_box(kind: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(8 + payload.len());
    bytes.extend_from_slice(&((8 + payload.len()) as u32).to_be_bytes());
    bytes.extend_from_slice(kind);
    bytes.extend_from_slice(payload);
    bytes
}

/// `trak` with a version 0 `tkhd` and an `mdia/hdlr` of `handler`.
#[cfg(test)]
fn trak(handler: &[u8; 4], width: u32, height: u32) -> Vec<u8> {
    let mut tkhd = vec![0u8; 84];
    tkhd[76..80].copy_from_slice(&(width << 16).to_be_bytes());
    tkhd[80..84].copy_from_slice(&(height << 16).to_be_bytes());

    let mut hdlr = vec![0u8; 24];
    hdlr[8..12].copy_from_slice(handler);

    let mut body = mp4_box(b"tkhd", &tkhd);
    body.extend_from_slice(&mp4_box(b"mdia", &mp4_box(b"hdlr", &hdlr)));
    mp4_box(b"trak", &body)
}

/// `ftyp` + `moov` holding a version 0 `mvhd`, a sound track and a
/// `width`x`height` video track.
#[cfg(test)]
pub(crate) fn mp4_fixture(timescale: u32, duration: u32, width: u32, height: u32) -> Vec<u8> {
    let mut mvhd = vec![0u8; 20];
    mvhd[12..16].copy_from_slice(&timescale.to_be_bytes());
    mvhd[16..20].copy_from_slice(&duration.to_be_bytes());

    let mut moov = mp4_box(b"mvhd", &mvhd);
    moov.extend_from_slice(&trak(b"soun", 0, 0));
    moov.extend_from_slice(&trak(b"vide", width, height));

    let mut bytes = mp4_box(b"ftyp", b"isom\0\0\x02\0");
    bytes.extend_from_slice(&mp4_box(b"moov", &moov));
    bytes
}
