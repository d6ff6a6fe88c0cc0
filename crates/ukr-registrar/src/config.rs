//! Auto-approval policy.

use serde::{Deserialize, Serialize};
use ukr_core::Address;
use ukr_ratelimit::{ThrottleState, WindowLimits};

/// Current auto-approval policy of the gate.
///
/// Replaced as a whole by the owner; there are no partial updates. A window
/// size or threshold of zero is valid and disables auto-approval in practice.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RegistrationConfig {
    /// Whether requests may bypass manual review.
    #[serde(default)]
    pub auto_approve_enabled: bool,

    /// Length of the admission window in blocks.
    #[serde(default)]
    pub window_size_blocks: u64,

    /// Maximum auto-approvals per window.
    #[serde(default)]
    pub approval_threshold: u64,

    /// Downstream registry approved requests are forwarded to.
    #[serde(default)]
    pub registry_target: Address,
}

impl RegistrationConfig {
    #[must_use]
    pub const fn new(
        auto_approve_enabled: bool,
        window_size_blocks: u64,
        approval_threshold: u64,
        registry_target: Address,
    ) -> Self {
        Self {
            auto_approve_enabled,
            window_size_blocks,
            approval_threshold,
            registry_target,
        }
    }

    /// Manual-only policy forwarding to `registry_target` on approval.
    #[must_use]
    pub const fn manual(registry_target: Address) -> Self {
        Self::new(false, 0, 0, registry_target)
    }

    /// Throttle limits derived from this policy.
    #[must_use]
    pub const fn limits(&self) -> WindowLimits {
        WindowLimits::new(self.window_size_blocks, self.approval_threshold)
    }
}

/// Policy together with the live throttle counters, for introspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistrationConfigSnapshot {
    pub config: RegistrationConfig,

    /// Minimum token amount a registration must carry.
    pub min_payment: u128,

    /// Stored window start (not adjusted for a pending reset).
    pub window_start: u64,

    /// Stored approval count (not adjusted for a pending reset).
    pub approvals_in_window: u64,

    /// Throttle as it would be seen by a registration arriving now.
    pub throttle: ThrottleState,
}
