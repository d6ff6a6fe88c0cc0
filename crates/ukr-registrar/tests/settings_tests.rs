//! Tests for loading deployment settings and building a gate from them.

use std::io::Write;
use std::sync::Arc;

use ukr_core::ManualBlockClock;
use ukr_registrar::{
    AdmissionGate, PaymentToken, RegistrarSettings, SettingsError, TokenError,
};
use ukr_testkit::{ScriptedRegistry, assert_requested_and_approved, fixtures};

fn write_settings(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

// ============================================================================
// Loading
// ============================================================================

#[test]
fn load_reads_policy_and_addresses() {
    let file = write_settings(&fixtures::settings_toml());

    let settings = RegistrarSettings::load(file.path()).unwrap();

    assert_eq!(settings.token, fixtures::token_address());
    assert_eq!(settings.owner, fixtures::owner());
    assert_eq!(settings.registrar, fixtures::registrar_address());
    assert_eq!(settings.min_payment, 1000);
    assert_eq!(settings.policy, fixtures::auto_config(1000, 5));
}

#[test]
fn load_missing_file_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");

    let err = RegistrarSettings::load(&path).unwrap_err();

    assert!(matches!(err, SettingsError::Io { .. }));
    assert!(err.to_string().contains("absent.toml"));
}

// ============================================================================
// Gate construction
// ============================================================================

#[tokio::test]
async fn gate_from_settings_enforces_loaded_policy() {
    // Given settings loaded from disk
    let file = write_settings(&fixtures::settings_toml());
    let settings = RegistrarSettings::load(file.path()).unwrap();

    // And a gate built from them
    let registry = Arc::new(ScriptedRegistry::new(
        fixtures::registry_address(),
        settings.registrar,
    ));
    let gate = AdmissionGate::from_settings(&settings, Arc::new(ManualBlockClock::new(0)))
        .with_registry(registry.clone());
    let token = PaymentToken::new(settings.token);
    token.mint(fixtures::sender(), 10_000).unwrap();
    let data = fixtures::sample_payload().encode().unwrap();

    // When payments below and at the minimum arrive
    let low = token
        .transfer_and_call(fixtures::sender(), &gate, 999, &data)
        .await;
    let ok = token
        .transfer_and_call(fixtures::sender(), &gate, 1000, &data)
        .await
        .unwrap();

    // Then only the second is accepted and auto-approved
    match low {
        Err(TokenError::Rejected(err)) => assert_eq!(err.code(), "UKR-3001"),
        other => panic!("Expected minimum payment rejection but got: {other:?}"),
    }
    assert_requested_and_approved(&gate.events().await, ok.id());
    assert_eq!(registry.count(), 1);

    // And the configured owner controls the policy
    assert!(
        gate.set_min_payment(&settings.owner, 0).await.is_ok(),
        "settings owner should be the gate owner"
    );
}
