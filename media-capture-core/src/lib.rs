//! # media-capture-core
//!
//! Platform-agnostic lifecycle for asynchronous media capture requests.
//!
//! A capture request is created, guarded by a permission check, handed to an
//! external capture surface, and resolved exactly once with the collected
//! media descriptors or a typed failure. Every hop across an asynchronous
//! boundary carries only a small integer correlation id, and the set of
//! pending requests can be snapshotted and restored when the hosting
//! process is killed between a launch and its result.
//!
//! Hosts implement the collaborator traits (`PermissionGate`,
//! `CaptureSurface`, `MediaStore`, `MediaInspector`, `ResolutionSink`) and
//! plug them into a `CaptureOrchestrator`. `media-capture-fs` provides a
//! filesystem-backed set.
//!
//! ## Architecture
//!
//! ```text
//! media-capture-core (this crate)
//! ├── traits/       ← PermissionGate, CaptureSurface, MediaStore, MediaInspector, ResolutionSink, PathResolver
//! ├── models/       ← CaptureError, ErrorCode, Request, RequestState, CaptureOptions, MediaFile, etc.
//! ├── processing/   ← MIME inference, media classification, file URI helpers
//! ├── session/      ← RequestRegistry, CaptureOrchestrator
//! └── storage/      ← RegistrySnapshot
//! ```

pub mod models;
pub mod processing;
pub mod session;
pub mod storage;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use models::capability::{Capability, PermissionCheck, PermissionOutcome};
pub use models::config::CaptureOptions;
pub use models::error::{CaptureError, ErrorCode};
pub use models::media_file::{FormatData, MediaFile};
pub use models::outcome::{CaptureFailure, CaptureOutcome, ExternalResult};
pub use models::request::{CallbackToken, CaptureKind, CaptureMode, Request, RequestId};
pub use models::state::{RequestState, Resolution};
pub use processing::mime::MediaCategory;
pub use session::orchestrator::{CaptureHost, CaptureOrchestrator};
pub use session::registry::{RequestHandle, RequestRegistry};
pub use storage::snapshot::RegistrySnapshot;
pub use traits::capture_surface::{CaptureSurface, LaunchRequest};
pub use traits::media_inspector::MediaInspector;
pub use traits::media_store::{MediaKind, MediaStore};
pub use traits::path_resolver::{NoPathResolver, PathResolver};
pub use traits::permission_gate::PermissionGate;
pub use traits::resolution_sink::ResolutionSink;
