//! Test fixtures.
//!
//! Addresses are derived from fixed labels so they are stable across runs
//! and readable in failure output via their label.

use ukr_core::{Address, RegistrationPayload};
use ukr_registrar::{RegistrarSettings, RegistrationConfig};

/// Amount carried by sample registrations.
pub const SAMPLE_AMOUNT: u128 = 5_000_000_000_000_000_000;

/// Balance minted to [`sender`] by a fresh harness.
pub const SENDER_FUNDS: u128 = 1_000 * SAMPLE_AMOUNT;

#[must_use]
pub fn owner() -> Address {
    Address::from_label("owner")
}

/// An address with no role anywhere.
#[must_use]
pub fn stranger() -> Address {
    Address::from_label("stranger")
}

/// Admin named in sample payloads.
#[must_use]
pub fn admin() -> Address {
    Address::from_label("admin")
}

/// Account that pays for registrations.
#[must_use]
pub fn sender() -> Address {
    Address::from_label("sender")
}

#[must_use]
pub fn token_address() -> Address {
    Address::from_label("payment-token")
}

#[must_use]
pub fn registrar_address() -> Address {
    Address::from_label("registrar")
}

#[must_use]
pub fn registry_address() -> Address {
    Address::from_label("registry")
}

#[must_use]
pub fn upkeep_target() -> Address {
    Address::from_label("upkeep-target")
}

/// A well-formed registration payload.
#[must_use]
pub fn sample_payload() -> RegistrationPayload {
    payload_named("SampleUpkeep")
}

/// [`sample_payload`] with a different name.
#[must_use]
pub fn payload_named(name: &str) -> RegistrationPayload {
    RegistrationPayload {
        name: name.to_string(),
        check_data: vec![0x00],
        target: upkeep_target(),
        execute_gas: 100_000,
        admin: admin(),
        admin_extra_info: b"ops@example.com".to_vec(),
        source: 100,
    }
}

/// Auto-approval policy forwarding to [`registry_address`].
#[must_use]
pub fn auto_config(window_size_blocks: u64, approval_threshold: u64) -> RegistrationConfig {
    RegistrationConfig::new(true, window_size_blocks, approval_threshold, registry_address())
}

/// Manual-only policy forwarding to [`registry_address`] on approval.
#[must_use]
pub fn manual_config() -> RegistrationConfig {
    RegistrationConfig::manual(registry_address())
}

/// Settings matching the fixture addresses.
#[must_use]
pub fn settings(policy: RegistrationConfig) -> RegistrarSettings {
    RegistrarSettings {
        token: token_address(),
        owner: owner(),
        registrar: registrar_address(),
        min_payment: 0,
        policy,
    }
}

/// Settings file content matching [`settings`] with [`auto_config`]`(1000, 5)`.
#[must_use]
pub fn settings_toml() -> String {
    format!(
        r#"token = "{token}"
owner = "{owner}"
registrar = "{registrar}"
min_payment = 1000

[policy]
auto_approve_enabled = true
window_size_blocks = 1000
approval_threshold = 5
registry_target = "{registry}"
"#,
        token = token_address(),
        owner = owner(),
        registrar = registrar_address(),
        registry = registry_address(),
    )
}
