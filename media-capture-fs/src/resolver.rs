use std::path::{Component, Path, PathBuf};

use media_capture_core::traits::path_resolver::PathResolver;

/// Maps paths below `root` to `prefix` + the `/`-joined relative path.
///
/// ```text
/// root   = /data/app/files
/// prefix = cdvfile://localhost/persistent/
/// /data/app/files/media/images/000001.jpg → cdvfile://localhost/persistent/media/images/000001.jpg
/// ```
#[derive(Debug, Clone)]
pub struct RootedPathResolver {
    root: PathBuf,
    prefix: String,
}

impl RootedPathResolver {
    pub fn new(root: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        let mut prefix = prefix.into();
        if !prefix.ends_with('/') {
            prefix.push('/');
        }
        Self {
            root: root.into(),
            prefix,
        }
    }
}

impl PathResolver for RootedPathResolver {
    fn local_url(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.root).ok()?;
        let mut parts = Vec::new();
        for component in relative.components() {
            match component {
                Component::Normal(part) => parts.push(part.to_str()?),
                // never resolve a path that climbs out of the root
                _ => return None,
            }
        }
        if parts.is_empty() {
            return None;
        }
        Some(format!("{}{}", self.prefix, parts.join("/")))
    }
}
