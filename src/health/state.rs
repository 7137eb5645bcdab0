//! Instance health state machine.
//!
//! # States
//! - Healthy: instance serves traffic and answers health checks
//! - Broken: instance has crashed but nobody has noticed yet
//! - Initializing: replacement instance is booting
//!
//! # State Transitions
//! ```text
//! Healthy → Broken: pre-sampled crash time reached
//! Initializing → Broken: crash time reached before boot finished
//! Broken → (replaced): health check timed out, new instance installed
//! Initializing → Healthy: boot finished
//! ```
//!
//! # Design Decisions
//! - Broken instances stay routable until detected (models detection lag)
//! - Only the target group engine drives transitions

use serde::Serialize;

/// Health state of one simulated instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InstanceState {
    Healthy,
    Broken,
    Initializing,
}

impl InstanceState {
    /// State after the instance's crash time is reached.
    pub fn on_crash(self) -> Self {
        match self {
            InstanceState::Healthy | InstanceState::Initializing | InstanceState::Broken => {
                InstanceState::Broken
            }
        }
    }

    /// State after initialization finishes. A crashed instance never comes up.
    pub fn on_ready(self) -> Self {
        match self {
            InstanceState::Initializing => InstanceState::Healthy,
            InstanceState::Broken => InstanceState::Broken,
            InstanceState::Healthy => InstanceState::Healthy,
        }
    }

    /// Whether the instance answers requests successfully.
    pub fn is_healthy(self) -> bool {
        matches!(self, InstanceState::Healthy)
    }

    /// Whether the round-robin cursor may select this instance.
    pub fn is_routable(self) -> bool {
        match self {
            InstanceState::Healthy | InstanceState::Broken => true,
            InstanceState::Initializing => false,
        }
    }

    /// Whether periodic health checks are sent to this instance.
    pub fn accepts_health_checks(self) -> bool {
        self.is_routable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transitions() {
        assert_eq!(InstanceState::Healthy.on_crash(), InstanceState::Broken);
        assert_eq!(InstanceState::Initializing.on_ready(), InstanceState::Healthy);
        assert_eq!(InstanceState::Initializing.on_crash(), InstanceState::Broken);
        assert_eq!(InstanceState::Broken.on_ready(), InstanceState::Broken);
    }

    #[test]
    fn test_routing_eligibility() {
        assert!(InstanceState::Healthy.is_routable());
        assert!(InstanceState::Broken.is_routable());
        assert!(!InstanceState::Initializing.is_routable());
        assert!(!InstanceState::Initializing.accepts_health_checks());
    }
}
