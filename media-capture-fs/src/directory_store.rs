use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use media_capture_core::models::error::CaptureError;
use media_capture_core::processing::uri;
use media_capture_core::traits::media_store::{MediaKind, MediaStore};

const IMAGES_DIR: &str = "images";
const VIDEOS_DIR: &str = "videos";

/// Media store kept as two directories under a root.
///
/// ```text
/// <root>/
/// ├── images/   000001.jpg, 000004.jpg, ...
/// └── videos/   000002.mp4, ...
/// ```
///
/// Entries are named by a sequence number shared by both directories, so
/// "oldest first" is numeric order. Placeholders are empty files; an entry
/// has content once something wrote at least one byte into it.
pub struct DirectoryMediaStore {
    root: PathBuf,
    next_seq: Mutex<u64>,
}

impl DirectoryMediaStore {
    /// Open (creating if needed) the store under `root`.
    ///
    /// A relative `root` is resolved against the current directory, so
    /// entries always have a `file:` URI.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, CaptureError> {
        let root = absolute_root(root.into())?;
        let mut highest = 0;
        for dir in [IMAGES_DIR, VIDEOS_DIR] {
            let path = root.join(dir);
            fs::create_dir_all(&path).map_err(|e| {
                CaptureError::StorageError(format!("failed to create {}: {}", path.display(), e))
            })?;
            for (seq, _) in list_entries(&path)? {
                highest = highest.max(seq);
            }
        }
        log::debug!("media store at {} (next entry {})", root.display(), highest + 1);
        Ok(Self {
            root,
            next_seq: Mutex::new(highest + 1),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn dir(&self, kind: MediaKind) -> PathBuf {
        match kind {
            MediaKind::Image => self.root.join(IMAGES_DIR),
            MediaKind::Video => self.root.join(VIDEOS_DIR),
        }
    }

    /// Create a new empty entry; the name is never reused.
    fn create_entry(&self, kind: MediaKind, extension: &str) -> Result<PathBuf, CaptureError> {
        let mut next = self.next_seq.lock();
        loop {
            let path = self.dir(kind).join(format!("{:06}.{}", *next, extension));
            *next += 1;
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(_) => return Ok(path),
                // written behind our back; take the next number
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => {
                    return Err(CaptureError::StorageError(format!(
                        "failed to create {}: {}",
                        path.display(),
                        e
                    )))
                }
            }
        }
    }

    /// Local path for `item` if it names an entry of this store.
    fn entry_path(&self, item: &str) -> Result<PathBuf, CaptureError> {
        let path = uri::to_local_path(item);
        let inside = [IMAGES_DIR, VIDEOS_DIR]
            .iter()
            .any(|dir| path.parent() == Some(self.root.join(dir).as_path()));
        if !inside {
            return Err(CaptureError::StorageError(format!("{} is not in the media store", item)));
        }
        Ok(path)
    }
}

impl MediaStore for DirectoryMediaStore {
    fn create_placeholder(&self, kind: MediaKind, mime_type: &str) -> Result<String, CaptureError> {
        let path = self.create_entry(kind, extension_for(kind, mime_type))?;
        log::debug!("created placeholder {}", path.display());
        uri::file_uri(&path)
    }

    fn has_content(&self, item: &str) -> bool {
        fs::metadata(uri::to_local_path(item))
            .map(|m| m.is_file() && m.len() > 0)
            .unwrap_or(false)
    }

    fn remove(&self, item: &str) -> Result<(), CaptureError> {
        let path = self.entry_path(item)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CaptureError::StorageError(format!(
                "failed to remove {}: {}",
                path.display(),
                e
            ))),
        }
    }

    fn image_entries(&self) -> Result<Vec<String>, CaptureError> {
        list_entries(&self.dir(MediaKind::Image))?
            .into_iter()
            .map(|(_, path)| uri::file_uri(&path))
            .collect()
    }

    fn commit_image(&self, captured: &str) -> Result<String, CaptureError> {
        let source = uri::to_local_path(captured);
        let extension = source
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_else(|| "jpg".to_string());
        let target = self.create_entry(MediaKind::Image, &extension)?;
        if let Err(e) = fs::copy(&source, &target) {
            let _ = fs::remove_file(&target);
            return Err(CaptureError::StorageError(format!(
                "failed to copy {} to {}: {}",
                source.display(),
                target.display(),
                e
            )));
        }
        uri::file_uri(&target)
    }
}

fn absolute_root(root: PathBuf) -> Result<PathBuf, CaptureError> {
    std::path::absolute(&root)
        .map_err(|e| CaptureError::StorageError(format!("failed to resolve {}: {}", root.display(), e)))
}

fn extension_for(kind: MediaKind, mime_type: &str) -> &'static str {
    match (kind, mime_type) {
        (MediaKind::Image, "image/png") => "png",
        (MediaKind::Image, _) => "jpg",
        (MediaKind::Video, "video/3gpp") => "3gp",
        (MediaKind::Video, _) => "mp4",
    }
}

/// Sequence-numbered files in `dir`, ascending.
fn list_entries(dir: &Path) -> Result<Vec<(u64, PathBuf)>, CaptureError> {
    let read_dir = fs::read_dir(dir)
        .map_err(|e| CaptureError::StorageError(format!("failed to list {}: {}", dir.display(), e)))?;
    let mut entries: Vec<(u64, PathBuf)> = read_dir
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter_map(|path| {
            let seq = path.file_stem()?.to_str()?.parse::<u64>().ok()?;
            Some((seq, path))
        })
        .collect();
    entries.sort_by_key(|(seq, _)| *seq);
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, DirectoryMediaStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = DirectoryMediaStore::open(dir.path().join("media")).unwrap();
        (dir, store)
    }

    #[test]
    fn placeholders_start_empty() {
        let (_dir, store) = store();
        let image = store.create_placeholder(MediaKind::Image, "image/jpeg").unwrap();
        let video = store.create_placeholder(MediaKind::Video, "video/mp4").unwrap();

        assert!(image.ends_with("images/000001.jpg"));
        assert!(video.ends_with("videos/000002.mp4"));
        assert!(!store.has_content(&image));

        fs::write(uri::to_local_path(&image), b"jpeg").unwrap();
        assert!(store.has_content(&image));
    }

    #[test]
    fn image_entries_oldest_first() {
        let (_dir, store) = store();
        let first = store.create_placeholder(MediaKind::Image, "image/jpeg").unwrap();
        store.create_placeholder(MediaKind::Video, "video/mp4").unwrap();
        let second = store.create_placeholder(MediaKind::Image, "image/png").unwrap();

        assert_eq!(store.image_entries().unwrap(), vec![first, second]);
    }

    #[test]
    fn commit_copies_into_new_entry() {
        let (_dir, store) = store();
        let raw = store.create_placeholder(MediaKind::Image, "image/jpeg").unwrap();
        fs::write(uri::to_local_path(&raw), b"pixels").unwrap();

        let committed = store.commit_image(&raw).unwrap();
        assert_ne!(committed, raw);
        assert_eq!(fs::read(uri::to_local_path(&committed)).unwrap(), b"pixels");
        assert_eq!(store.image_entries().unwrap().len(), 2);
    }

    #[test]
    fn remove_is_idempotent_and_scoped() {
        let (dir, store) = store();
        let image = store.create_placeholder(MediaKind::Image, "image/jpeg").unwrap();
        store.remove(&image).unwrap();
        store.remove(&image).unwrap();
        assert!(store.image_entries().unwrap().is_empty());

        let outside = dir.path().join("keep.jpg");
        fs::write(&outside, b"x").unwrap();
        assert!(store.remove(&uri::file_uri(&outside).unwrap()).is_err());
        assert!(outside.exists());
    }

    #[test]
    fn sequence_survives_reopen() {
        let (dir, store) = store();
        let first = store.create_placeholder(MediaKind::Image, "image/jpeg").unwrap();
        drop(store);

        let reopened = DirectoryMediaStore::open(dir.path().join("media")).unwrap();
        let second = reopened.create_placeholder(MediaKind::Image, "image/jpeg").unwrap();
        assert_ne!(first, second);
        assert!(second.ends_with("000002.jpg"));
    }

    #[test]
    fn root_with_reserved_characters() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirectoryMediaStore::open(dir.path().join("my media #1")).unwrap();
        let image = store.create_placeholder(MediaKind::Image, "image/jpeg").unwrap();

        assert!(image.starts_with("file:///"));
        assert!(image.ends_with("/my%20media%20%231/images/000001.jpg"));
        assert_eq!(uri::to_local_path(&image), dir.path().join("my media #1/images/000001.jpg"));
        store.remove(&image).unwrap();
        assert!(store.image_entries().unwrap().is_empty());
    }

    #[test]
    fn relative_root_is_made_absolute() {
        let root = absolute_root(PathBuf::from("media")).unwrap();
        assert!(root.is_absolute());
        assert_eq!(root, std::env::current_dir().unwrap().join("media"));
        assert!(uri::file_uri(&root.join("images/000001.jpg")).is_ok());
    }
}
