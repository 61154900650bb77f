use serde::{Deserialize, Serialize};

/// Named capability guarding a capture step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    ReadStorage,
    WriteStorage,
    Camera,
}

/// Storage access every capture kind needs.
pub const STORAGE_CAPABILITIES: [Capability; 2] = [Capability::ReadStorage, Capability::WriteStorage];

/// Result of a synchronous capability query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionCheck {
    pub granted: Vec<Capability>,
    pub missing: Vec<Capability>,
}

impl PermissionCheck {
    pub fn is_satisfied(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Answer to a permission prompt, delivered out of band.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionOutcome {
    pub granted: Vec<Capability>,
    pub denied: Vec<Capability>,
}

impl PermissionOutcome {
    pub fn granted(capabilities: &[Capability]) -> Self {
        Self {
            granted: capabilities.to_vec(),
            denied: Vec::new(),
        }
    }

    pub fn denied(capabilities: &[Capability]) -> Self {
        Self {
            granted: Vec::new(),
            denied: capabilities.to_vec(),
        }
    }

    /// Fail-closed: any denial, or a prompt that granted nothing, refuses the step.
    pub fn is_granted(&self) -> bool {
        self.denied.is_empty() && !self.granted.is_empty()
    }
}
