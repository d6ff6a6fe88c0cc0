//! Gate test harness.

use std::sync::Arc;

use ukr_core::{Address, ManualBlockClock, RegistrationPayload, SingleOwner};
use ukr_registrar::{
    AdmissionGate, PaymentToken, RegistrationConfig, RegistrationOutcome, TokenError,
};

use crate::{ScriptedRegistry, fixtures};

/// An [`AdmissionGate`] wired to a payment token, a manual block clock and a
/// [`ScriptedRegistry`], all at the addresses in [`fixtures`].
///
/// The sender starts with [`fixtures::SENDER_FUNDS`].
#[derive(Debug)]
pub struct GateHarness {
    pub gate: Arc<AdmissionGate>,
    pub token: PaymentToken,
    pub registry: Arc<ScriptedRegistry>,
    pub clock: Arc<ManualBlockClock>,
}

impl GateHarness {
    /// Harness starting at block 0.
    #[must_use]
    pub fn new(config: RegistrationConfig) -> Self {
        Self::at_block(config, 0)
    }

    /// Harness whose clock starts at `block`.
    ///
    /// # Panics
    ///
    /// Panics if the sender cannot be funded.
    #[must_use]
    pub fn at_block(config: RegistrationConfig, block: u64) -> Self {
        let clock = Arc::new(ManualBlockClock::new(block));
        let registry = Arc::new(ScriptedRegistry::new(
            fixtures::registry_address(),
            fixtures::registrar_address(),
        ));
        let gate = AdmissionGate::new(
            fixtures::registrar_address(),
            fixtures::token_address(),
            config,
            Arc::new(SingleOwner::new(fixtures::owner())),
            clock.clone(),
        )
        .with_registry(registry.clone());

        let token = PaymentToken::new(fixtures::token_address());
        token
            .mint(fixtures::sender(), fixtures::SENDER_FUNDS)
            .expect("fund sender");

        Self {
            gate: Arc::new(gate),
            token,
            registry,
            clock,
        }
    }

    /// Pay the gate from `sender` and deliver `payload`.
    ///
    /// # Errors
    ///
    /// Returns whatever the token or the gate returns.
    pub async fn submit(
        &self,
        sender: Address,
        payload: &RegistrationPayload,
        amount: u128,
    ) -> Result<RegistrationOutcome, TokenError> {
        let data = payload.encode().map_err(ukr_core::RegistrarError::from)?;
        self.token
            .transfer_and_call(sender, &*self.gate, amount, &data)
            .await
    }

    /// Submit [`fixtures::sample_payload`] from [`fixtures::sender`].
    ///
    /// # Errors
    ///
    /// Returns whatever the token or the gate returns.
    pub async fn submit_sample(&self) -> Result<RegistrationOutcome, TokenError> {
        self.submit(
            fixtures::sender(),
            &fixtures::sample_payload(),
            fixtures::SAMPLE_AMOUNT,
        )
        .await
    }

    /// Advance the chain by `blocks`; returns the new block number.
    pub fn advance(&self, blocks: u64) -> u64 {
        self.clock.advance(blocks)
    }

    /// Token balance held by the gate.
    #[must_use]
    pub fn gate_balance(&self) -> u128 {
        self.token.balance_of(&fixtures::registrar_address())
    }
}
