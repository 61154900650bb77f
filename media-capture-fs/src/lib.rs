//! # media-capture-fs
//!
//! Filesystem-backed host for media-capture-core.
//!
//! Provides:
//! - `DirectoryMediaStore`: image/video store kept as two sequence-numbered directories
//! - `FsMediaInspector`: file descriptors plus WAV, MP4 and (via `image`) PNG/JPEG format probing
//! - `FileSnapshotStore`: checksummed snapshot file for restart recovery
//! - `RootedPathResolver`: `localURL` mapping below a root directory
//! - `PolicyPermissionGate`: declared/held capability policy with queued prompts
//! - `QueuedCaptureSurface`: launch queue drained by the host application
//!
//! ## Usage
//! ```ignore
//! use std::sync::Arc;
//! use media_capture_core::{CaptureOptions, CallbackToken, CaptureOrchestrator, RequestRegistry};
//! use media_capture_fs::{capture_host, FsHostConfig, PolicyPermissionGate, QueuedCaptureSurface};
//!
//! let config = FsHostConfig::default();
//! let gate = Arc::new(PolicyPermissionGate::new(&declared));
//! let surface = Arc::new(QueuedCaptureSurface::supporting_all());
//! let host = capture_host(&config, gate.clone(), surface.clone())?;
//! let registry = Arc::new(RequestRegistry::new(Arc::new(|token, outcome| deliver(token, outcome))));
//! let orchestrator = CaptureOrchestrator::new(registry, host);
//!
//! if let Some(snapshot) = config.snapshot_store().load()? {
//!     orchestrator.restore(snapshot, None)?;
//! }
//! let id = orchestrator.capture_audio(CaptureOptions::default(), CallbackToken::new())?;
//! ```

pub mod config;
pub mod directory_store;
pub mod inspector;
pub mod mp4;
pub mod permissions;
pub mod resolver;
pub mod snapshot_file;
pub mod surface;
pub mod wav;

pub use config::{capture_host, FsHostConfig};
pub use directory_store::DirectoryMediaStore;
pub use inspector::FsMediaInspector;
pub use permissions::{PermissionPrompt, PolicyPermissionGate};
pub use resolver::RootedPathResolver;
pub use snapshot_file::FileSnapshotStore;
pub use surface::QueuedCaptureSurface;
