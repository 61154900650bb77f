use std::path::Path;

/// Maps a local path to the URL the caller's filesystem layer understands.
pub trait PathResolver: Send + Sync {
    fn local_url(&self, path: &Path) -> Option<String>;
}

/// Resolver used when no filesystem layer is installed.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPathResolver;

impl PathResolver for NoPathResolver {
    fn local_url(&self, _path: &Path) -> Option<String> {
        None
    }
}
