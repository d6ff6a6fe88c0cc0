//! Admission gate.
//!
//! Receives token-authenticated registration requests and decides, per
//! request, whether to forward it to the downstream registry right away
//! (auto-approval, throttled per window) or to park it for manual review.
//!
//! Every operation runs under a single lock that owns the policy, the
//! throttle, the pending store, the nonce and the event log. Operations are
//! therefore totally ordered and the throttle's check-then-increment is exact.
//! Events of an operation are staged and only committed together with its
//! state changes, so a failed operation (including a downstream rejection)
//! is invisible.
//!
//! This holds only for operations that run to completion. If a `register` or
//! `approve` future is dropped while the downstream `register_upkeep` call is
//! in flight (for example under `tokio::time::timeout`), the registry may
//! already hold the upkeep while the gate commits no event, nonce or throttle
//! slot, and the token transfer that carried the request is not reverted.
//! Callers that need the guarantee must not cancel these futures.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::Mutex;
use ukr_core::{
    AccessPolicy, Address, EventBatch, EventLog, EventRecord, OP_APPROVE, OP_CANCEL,
    OP_SET_CONFIG, OP_SET_MIN_PAYMENT, RegistrarError, RegistrarResult, RegistrationEvent,
    RegistrationPayload, RegistrationRequest, RequestId, SingleOwner, TimeSource, UpkeepId,
};
use ukr_ratelimit::WindowThrottle;

use crate::{
    PendingRequestStore, RegistrarSettings, RegistrationConfig, RegistrationConfigSnapshot,
    RegistryDirectory, TokenReceiver, UpkeepRegistration, UpkeepRegistry,
};

/// Why a request was parked instead of forwarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PendingReason {
    /// Auto-approval is switched off.
    AutoApproveDisabled,
    /// The current window has no approvals left.
    Throttled,
}

/// Result of an accepted registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RegistrationOutcome {
    /// Forwarded to the registry.
    Approved { id: RequestId, upkeep_id: UpkeepId },
    /// Stored for manual disposition.
    Pending { id: RequestId, reason: PendingReason },
}

impl RegistrationOutcome {
    #[must_use]
    pub const fn id(&self) -> &RequestId {
        match self {
            Self::Approved { id, .. } | Self::Pending { id, .. } => id,
        }
    }

    #[must_use]
    pub const fn upkeep_id(&self) -> Option<UpkeepId> {
        match self {
            Self::Approved { upkeep_id, .. } => Some(*upkeep_id),
            Self::Pending { .. } => None,
        }
    }

    #[must_use]
    pub const fn is_approved(&self) -> bool {
        matches!(self, Self::Approved { .. })
    }
}

/// Mutable gate state, guarded by one lock.
#[derive(Debug)]
struct GateState {
    config: RegistrationConfig,
    min_payment: u128,
    throttle: WindowThrottle,
    pending: PendingRequestStore,
    nonce: u64,
    events: EventLog,
}

/// Token-gated registration front-end.
pub struct AdmissionGate {
    address: Address,
    token: Address,
    access: Arc<dyn AccessPolicy>,
    clock: Arc<dyn TimeSource>,
    registries: RegistryDirectory,
    state: Mutex<GateState>,
}

impl std::fmt::Debug for AdmissionGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdmissionGate")
            .field("address", &self.address)
            .field("token", &self.token)
            .field("access", &self.access)
            .field("registries", &self.registries)
            .finish_non_exhaustive()
    }
}

impl AdmissionGate {
    /// Create a gate at `address` that accepts registrations from `token`.
    ///
    /// Starts with the given policy, a zero minimum payment and an empty
    /// registry directory.
    #[must_use]
    pub fn new(
        address: Address,
        token: Address,
        config: RegistrationConfig,
        access: Arc<dyn AccessPolicy>,
        clock: Arc<dyn TimeSource>,
    ) -> Self {
        Self {
            address,
            token,
            access,
            clock,
            registries: RegistryDirectory::new(),
            state: Mutex::new(GateState {
                config,
                min_payment: 0,
                throttle: WindowThrottle::new(),
                pending: PendingRequestStore::new(),
                nonce: 0,
                events: EventLog::new(),
            }),
        }
    }

    /// Create a gate from deployment settings with a single owner.
    #[must_use]
    pub fn from_settings(settings: &RegistrarSettings, clock: Arc<dyn TimeSource>) -> Self {
        Self::new(
            settings.registrar,
            settings.token,
            settings.policy.clone(),
            Arc::new(SingleOwner::new(settings.owner)),
            clock,
        )
        .with_min_payment(settings.min_payment)
    }

    /// Make a downstream registry reachable.
    #[must_use]
    pub fn with_registry(mut self, registry: Arc<dyn UpkeepRegistry>) -> Self {
        self.registries.insert(registry);
        self
    }

    /// Set the initial minimum payment.
    #[must_use]
    pub fn with_min_payment(mut self, min_payment: u128) -> Self {
        self.state.get_mut().min_payment = min_payment;
        self
    }

    #[must_use]
    pub const fn address(&self) -> Address {
        self.address
    }

    #[must_use]
    pub const fn token(&self) -> Address {
        self.token
    }

    fn ensure_token(&self, caller: &Address) -> RegistrarResult<()> {
        if *caller == self.token {
            Ok(())
        } else {
            tracing::warn!(caller = %caller, "registration rejected: caller is not the payment token");
            Err(RegistrarError::Unauthorized { caller: *caller })
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Registration
    // ─────────────────────────────────────────────────────────────────────────

    /// Entry point for transfer-and-call deliveries.
    ///
    /// Authenticates the caller before looking at `data`.
    ///
    /// # Errors
    /// `Unauthorized` if `caller` is not the payment token, `InvalidPayload` if
    /// `data` does not decode, plus everything [`Self::register`] can return.
    pub async fn on_token_transfer(
        &self,
        caller: &Address,
        sender: &Address,
        amount: u128,
        data: &[u8],
    ) -> RegistrarResult<RegistrationOutcome> {
        self.ensure_token(caller)?;
        let payload = RegistrationPayload::decode(data)?;
        self.register(caller, sender, amount, payload).await
    }

    /// Record a registration and auto-approve it if policy and throttle allow.
    ///
    /// `caller` must be the payment token; `sender` is the account that paid.
    ///
    /// # Errors
    /// - `Unauthorized` if `caller` is not the payment token
    /// - `InsufficientPayment` if `amount` is below the minimum
    /// - `Downstream` if the registry rejects an auto-approved request
    ///
    /// On error nothing is recorded: no event, no pending entry, no throttle slot.
    pub async fn register(
        &self,
        caller: &Address,
        sender: &Address,
        amount: u128,
        payload: RegistrationPayload,
    ) -> RegistrarResult<RegistrationOutcome> {
        self.ensure_token(caller)?;

        let mut state = self.state.lock().await;
        if amount < state.min_payment {
            return Err(RegistrarError::InsufficientPayment {
                amount,
                minimum: state.min_payment,
            });
        }

        let now = self.clock.current_unit();
        let encoded = payload.encode()?;
        let nonce = state.nonce;
        let next_nonce = nonce.checked_add(1).ok_or_else(|| RegistrarError::Internal {
            message: "request nonce exhausted".into(),
        })?;
        let request = RegistrationRequest {
            id: RequestId::derive(nonce, sender, &encoded, amount),
            sender: *sender,
            amount,
            payload,
            nonce,
            received_at: now,
        };
        let id = request.id;

        let mut batch = EventBatch::new();
        batch.push(requested_event(&request));

        let config = state.config.clone();
        let mut throttle = state.throttle;
        let outcome = if !config.auto_approve_enabled {
            RegistrationOutcome::Pending {
                id,
                reason: PendingReason::AutoApproveDisabled,
            }
        } else if throttle.try_consume(now, config.limits()) {
            let upkeep_id = self.forward(&config.registry_target, &request).await?;
            batch.push(RegistrationEvent::RegistrationApproved {
                id,
                name: request.payload.name.clone(),
                upkeep_id,
            });
            RegistrationOutcome::Approved { id, upkeep_id }
        } else {
            RegistrationOutcome::Pending {
                id,
                reason: PendingReason::Throttled,
            }
        };

        // Commit.
        state.nonce = next_nonce;
        state.throttle = throttle;
        match outcome {
            RegistrationOutcome::Approved { upkeep_id, .. } => {
                tracing::info!(
                    request_id = %id,
                    upkeep_id = %upkeep_id,
                    window_start = throttle.window_start(),
                    approvals_in_window = throttle.approvals_in_window(),
                    "registration auto-approved"
                );
            }
            RegistrationOutcome::Pending { reason, .. } => {
                tracing::debug!(
                    request_id = %id,
                    reason = ?reason,
                    window_start = throttle.window_start(),
                    approvals_in_window = throttle.approvals_in_window(),
                    "registration pending manual approval"
                );
                if state.pending.insert(request).is_some() {
                    tracing::warn!(request_id = %id, "pending request overwritten");
                }
            }
        }
        state.events.commit(batch, now);

        Ok(outcome)
    }

    async fn forward(
        &self,
        registry_target: &Address,
        request: &RegistrationRequest,
    ) -> RegistrarResult<UpkeepId> {
        let registry = self.registries.get(registry_target).ok_or_else(|| {
            RegistrarError::Downstream {
                message: format!("no registry reachable at {registry_target}"),
                retryable: false,
            }
        })?;

        registry
            .register_upkeep(&self.address, UpkeepRegistration::from(request))
            .await
            .map_err(|err| {
                tracing::warn!(
                    request_id = %request.id,
                    registry = %registry_target,
                    error = %err,
                    "downstream registry rejected registration"
                );
                RegistrarError::from(err)
            })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Manual disposition
    // ─────────────────────────────────────────────────────────────────────────

    /// Forward a pending request. Owner only; does not use a throttle slot.
    ///
    /// # Errors
    /// `PermissionDenied`, `RequestNotFound`, or `Downstream` (request stays pending).
    pub async fn approve(&self, actor: &Address, id: &RequestId) -> RegistrarResult<UpkeepId> {
        self.access.ensure_owner(actor, OP_APPROVE)?;

        let mut state = self.state.lock().await;
        let request = state
            .pending
            .get(id)
            .cloned()
            .ok_or(RegistrarError::RequestNotFound { id: *id })?;

        let registry_target = state.config.registry_target;
        let upkeep_id = self.forward(&registry_target, &request).await?;

        state.pending.remove(id);
        let mut batch = EventBatch::new();
        batch.push(RegistrationEvent::RegistrationApproved {
            id: *id,
            name: request.payload.name,
            upkeep_id,
        });
        state.events.commit(batch, self.clock.current_unit());

        tracing::info!(request_id = %id, upkeep_id = %upkeep_id, actor = %actor, "registration manually approved");
        Ok(upkeep_id)
    }

    /// Drop a pending request without forwarding it.
    ///
    /// Allowed for the owner and for the request's own admin. Returns the
    /// removed request so the caller can settle the escrowed amount.
    ///
    /// # Errors
    /// `RequestNotFound` or `PermissionDenied`.
    pub async fn cancel(
        &self,
        actor: &Address,
        id: &RequestId,
    ) -> RegistrarResult<RegistrationRequest> {
        let mut state = self.state.lock().await;
        let admin = *state
            .pending
            .get(id)
            .ok_or(RegistrarError::RequestNotFound { id: *id })?
            .admin();

        if !self.access.is_owner(actor) && *actor != admin {
            return Err(RegistrarError::PermissionDenied {
                actor: *actor,
                operation: OP_CANCEL.to_string(),
            });
        }

        let request = state
            .pending
            .remove(id)
            .ok_or(RegistrarError::RequestNotFound { id: *id })?;
        let mut batch = EventBatch::new();
        batch.push(RegistrationEvent::RegistrationCancelled { id: *id });
        state.events.commit(batch, self.clock.current_unit());

        tracing::info!(request_id = %id, actor = %actor, amount = %request.amount, "registration cancelled");
        Ok(request)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Policy
    // ─────────────────────────────────────────────────────────────────────────

    /// Replace the auto-approval policy. Owner only.
    ///
    /// Throttle counters are left as they are; the new limits apply from the
    /// next registration on.
    ///
    /// # Errors
    /// `PermissionDenied` if `actor` is not the owner.
    pub async fn set_registration_config(
        &self,
        actor: &Address,
        config: RegistrationConfig,
    ) -> RegistrarResult<()> {
        self.access.ensure_owner(actor, OP_SET_CONFIG)?;

        let mut state = self.state.lock().await;
        let mut batch = EventBatch::new();
        batch.push(RegistrationEvent::ConfigChanged {
            auto_approve_enabled: config.auto_approve_enabled,
            window_size_blocks: config.window_size_blocks,
            approval_threshold: config.approval_threshold,
            registry_target: config.registry_target,
        });
        tracing::info!(
            auto_approve_enabled = config.auto_approve_enabled,
            window_size_blocks = config.window_size_blocks,
            approval_threshold = config.approval_threshold,
            registry_target = %config.registry_target,
            "registration config replaced"
        );
        state.config = config;
        state.events.commit(batch, self.clock.current_unit());
        Ok(())
    }

    /// Change the minimum payment. Owner only.
    ///
    /// # Errors
    /// `PermissionDenied` if `actor` is not the owner.
    pub async fn set_min_payment(&self, actor: &Address, min_payment: u128) -> RegistrarResult<()> {
        self.access.ensure_owner(actor, OP_SET_MIN_PAYMENT)?;
        self.state.lock().await.min_payment = min_payment;
        tracing::info!(min_payment = %min_payment, "minimum payment changed");
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Introspection
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn registration_config(&self) -> RegistrationConfigSnapshot {
        let state = self.state.lock().await;
        let now = self.clock.current_unit();
        RegistrationConfigSnapshot {
            config: state.config.clone(),
            min_payment: state.min_payment,
            window_start: state.throttle.window_start(),
            approvals_in_window: state.throttle.approvals_in_window(),
            throttle: state.throttle.state(now, state.config.limits()),
        }
    }

    pub async fn pending_request(&self, id: &RequestId) -> Option<RegistrationRequest> {
        self.state.lock().await.pending.get(id).cloned()
    }

    pub async fn is_pending(&self, id: &RequestId) -> bool {
        self.state.lock().await.pending.exists(id)
    }

    pub async fn pending_count(&self) -> usize {
        self.state.lock().await.pending.len()
    }

    pub async fn pending_ids(&self) -> Vec<RequestId> {
        self.state.lock().await.pending.ids()
    }

    /// Snapshot of the whole event log.
    pub async fn events(&self) -> Vec<EventRecord> {
        self.state.lock().await.events.records().to_vec()
    }

    /// Events with `seq >= from`.
    pub async fn events_since(&self, from: u64) -> Vec<EventRecord> {
        self.state.lock().await.events.since(from).to_vec()
    }
}

fn requested_event(request: &RegistrationRequest) -> RegistrationEvent {
    let payload = &request.payload;
    RegistrationEvent::RegistrationRequested {
        id: request.id,
        name: payload.name.clone(),
        check_data: payload.check_data.clone(),
        target: payload.target,
        execute_gas: payload.execute_gas,
        admin: payload.admin,
        admin_extra_info: payload.admin_extra_info.clone(),
        source: payload.source,
    }
}

#[async_trait]
impl TokenReceiver for AdmissionGate {
    type Receipt = RegistrationOutcome;

    fn address(&self) -> Address {
        self.address
    }

    async fn on_token_transfer(
        &self,
        caller: &Address,
        sender: &Address,
        amount: u128,
        data: &[u8],
    ) -> RegistrarResult<RegistrationOutcome> {
        AdmissionGate::on_token_transfer(self, caller, sender, amount, data).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_serializes_with_tag() {
        let id = RequestId::from_bytes([1; 32]);
        let pending = RegistrationOutcome::Pending {
            id,
            reason: PendingReason::Throttled,
        };
        let json = serde_json::to_value(pending).unwrap();
        assert_eq!(json["outcome"], "pending");
        assert_eq!(json["reason"], "throttled");
        assert!(pending.upkeep_id().is_none());

        let approved = RegistrationOutcome::Approved {
            id,
            upkeep_id: UpkeepId(3),
        };
        let json = serde_json::to_value(approved).unwrap();
        assert_eq!(json["outcome"], "approved");
        assert_eq!(approved.upkeep_id(), Some(UpkeepId(3)));
        assert_eq!(approved.id(), &id);
    }
}
