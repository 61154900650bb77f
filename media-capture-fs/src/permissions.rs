//! Capability policy for hosts without a platform permission service.
//!
//! The host declares which capabilities it uses at all and which ones are
//! currently held. Prompts are queued for the host to present; the host
//! answers each one and forwards the resulting `PermissionOutcome` to
//! `CaptureOrchestrator::on_permission_result`.

use std::collections::{BTreeSet, VecDeque};

use parking_lot::Mutex;

use media_capture_core::models::capability::{Capability, PermissionCheck, PermissionOutcome};
use media_capture_core::models::error::CaptureError;
use media_capture_core::models::request::RequestId;
use media_capture_core::traits::permission_gate::PermissionGate;

/// A prompt waiting for the host's answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionPrompt {
    pub correlation: RequestId,
    pub capabilities: Vec<Capability>,
}

pub struct PolicyPermissionGate {
    declared: BTreeSet<Capability>,
    held: Mutex<BTreeSet<Capability>>,
    prompts: Mutex<VecDeque<PermissionPrompt>>,
}

impl PolicyPermissionGate {
    /// Gate for a host using `declared`, with nothing held yet.
    pub fn new(declared: &[Capability]) -> Self {
        Self {
            declared: declared.iter().copied().collect(),
            held: Mutex::new(BTreeSet::new()),
            prompts: Mutex::new(VecDeque::new()),
        }
    }

    /// Gate that already holds every declared capability.
    pub fn granting_all(declared: &[Capability]) -> Self {
        let gate = Self::new(declared);
        gate.held.lock().extend(declared.iter().copied());
        gate
    }

    /// Hold `capability`; returns whether it is held afterwards.
    /// Undeclared capabilities cannot be held.
    pub fn grant(&self, capability: Capability) -> bool {
        if !self.declared.contains(&capability) {
            log::warn!("refusing to grant undeclared capability {:?}", capability);
            return false;
        }
        self.held.lock().insert(capability);
        true
    }

    pub fn revoke(&self, capability: Capability) {
        self.held.lock().remove(&capability);
    }

    /// Drain the prompts raised since the last call, oldest first.
    pub fn take_prompts(&self) -> Vec<PermissionPrompt> {
        self.prompts.lock().drain(..).collect()
    }

    /// Record the user's answer to `prompt`.
    ///
    /// With `allow`, every declared capability in the prompt becomes held;
    /// undeclared ones are always denied.
    pub fn answer(&self, prompt: &PermissionPrompt, allow: bool) -> PermissionOutcome {
        let mut outcome = PermissionOutcome::default();
        for &capability in &prompt.capabilities {
            if allow && self.grant(capability) {
                outcome.granted.push(capability);
            } else {
                outcome.denied.push(capability);
            }
        }
        log::debug!("prompt for request {} answered: {:?}", prompt.correlation, outcome);
        outcome
    }
}

impl PermissionGate for PolicyPermissionGate {
    fn is_declared(&self, capability: Capability) -> bool {
        self.declared.contains(&capability)
    }

    fn check(&self, capabilities: &[Capability]) -> PermissionCheck {
        let held = self.held.lock();
        let (granted, missing): (Vec<Capability>, Vec<Capability>) =
            capabilities.iter().partition(|c| held.contains(*c));
        PermissionCheck { granted, missing }
    }

    fn request(&self, capabilities: &[Capability], correlation: RequestId) -> Result<(), CaptureError> {
        log::debug!("queueing prompt for {:?} (request {})", capabilities, correlation);
        self.prompts.lock().push_back(PermissionPrompt {
            correlation,
            capabilities: capabilities.to_vec(),
        });
        Ok(())
    }
}
