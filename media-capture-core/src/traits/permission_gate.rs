use crate::models::capability::{Capability, PermissionCheck};
use crate::models::error::CaptureError;
use crate::models::request::RequestId;

/// Capability check and prompt abstraction guarding a capture step.
///
/// The gate keeps no request state; prompt answers are routed back through
/// `CaptureOrchestrator::on_permission_result` using `correlation`.
pub trait PermissionGate: Send + Sync {
    /// Whether the hosting application declares use of `capability` at all.
    fn is_declared(&self, capability: Capability) -> bool;

    /// Synchronous, side-effect-free query of currently held capabilities.
    fn check(&self, capabilities: &[Capability]) -> PermissionCheck;

    /// Start a prompt for `capabilities`; the answer arrives out of band.
    fn request(&self, capabilities: &[Capability], correlation: RequestId) -> Result<(), CaptureError>;
}
