//! Downstream job registry interface.
//!
//! The gate only ever calls [`UpkeepRegistry::register_upkeep`]; job state,
//! execution and payment accounting belong to the registry.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use ukr_core::{Address, RegistrarError, RegistrationRequest, UpkeepId};

/// Parameters forwarded to the registry for an approved request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpkeepRegistration {
    pub target: Address,
    pub execute_gas: u32,
    pub admin: Address,
    pub check_data: Vec<u8>,
    pub amount: u128,
    pub source: u8,
}

impl From<&RegistrationRequest> for UpkeepRegistration {
    fn from(request: &RegistrationRequest) -> Self {
        Self {
            target: request.payload.target,
            execute_gas: request.payload.execute_gas,
            admin: request.payload.admin,
            check_data: request.payload.check_data.clone(),
            amount: request.amount,
            source: request.payload.source,
        }
    }
}

/// Registry-side failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("caller {caller} is not the registrar")]
    OnlyRegistrar { caller: Address },

    #[error("registration rejected: {reason}")]
    Rejected { reason: String },

    #[error("registry unavailable: {reason}")]
    Unavailable { reason: String },
}

impl From<RegistryError> for RegistrarError {
    fn from(err: RegistryError) -> Self {
        let retryable = matches!(err, RegistryError::Unavailable { .. });
        Self::Downstream {
            message: err.to_string(),
            retryable,
        }
    }
}

/// A downstream registry accepting approved registrations.
#[async_trait]
pub trait UpkeepRegistry: Send + Sync {
    /// Address the registry is reachable at.
    fn address(&self) -> Address;

    /// Register a job on behalf of `caller`, returning its identifier.
    async fn register_upkeep(
        &self,
        caller: &Address,
        registration: UpkeepRegistration,
    ) -> Result<UpkeepId, RegistryError>;

    /// Number of jobs registered so far.
    async fn upkeep_count(&self) -> u64;
}

/// Registries reachable by the gate, keyed by address.
#[derive(Clone, Default)]
pub struct RegistryDirectory {
    registries: HashMap<Address, Arc<dyn UpkeepRegistry>>,
}

impl RegistryDirectory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `registry` reachable at its own address.
    pub fn insert(&mut self, registry: Arc<dyn UpkeepRegistry>) {
        self.registries.insert(registry.address(), registry);
    }

    #[must_use]
    pub fn get(&self, address: &Address) -> Option<Arc<dyn UpkeepRegistry>> {
        self.registries.get(address).cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.registries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registries.is_empty()
    }
}

impl fmt::Debug for RegistryDirectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.registries.keys()).finish()
    }
}

/// A job as stored by [`InMemoryUpkeepRegistry`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpkeepRecord {
    pub target: Address,
    pub admin: Address,
    pub execute_gas: u32,
    pub check_data: Vec<u8>,
    pub balance: u128,
    pub source: u8,
}

/// Process-local registry with sequential job identifiers.
///
/// Only the address set via [`InMemoryUpkeepRegistry::set_registrar`] may
/// register jobs.
#[derive(Debug)]
pub struct InMemoryUpkeepRegistry {
    address: Address,
    registrar: Mutex<Option<Address>>,
    upkeeps: Mutex<Vec<UpkeepRecord>>,
}

impl InMemoryUpkeepRegistry {
    #[must_use]
    pub fn new(address: Address) -> Self {
        Self {
            address,
            registrar: Mutex::new(None),
            upkeeps: Mutex::new(Vec::new()),
        }
    }

    /// Authorize `registrar` to register jobs.
    pub fn set_registrar(&self, registrar: Address) {
        *self.registrar.lock() = Some(registrar);
    }

    #[must_use]
    pub fn registrar(&self) -> Option<Address> {
        *self.registrar.lock()
    }

    #[must_use]
    pub fn get_upkeep(&self, id: UpkeepId) -> Option<UpkeepRecord> {
        let index = usize::try_from(id.0).ok()?;
        self.upkeeps.lock().get(index).cloned()
    }

    #[must_use]
    pub fn count(&self) -> u64 {
        self.upkeeps.lock().len() as u64
    }
}

#[async_trait]
impl UpkeepRegistry for InMemoryUpkeepRegistry {
    fn address(&self) -> Address {
        self.address
    }

    async fn register_upkeep(
        &self,
        caller: &Address,
        registration: UpkeepRegistration,
    ) -> Result<UpkeepId, RegistryError> {
        if self.registrar() != Some(*caller) {
            return Err(RegistryError::OnlyRegistrar { caller: *caller });
        }

        let mut upkeeps = self.upkeeps.lock();
        let id = UpkeepId(upkeeps.len() as u64);
        upkeeps.push(UpkeepRecord {
            target: registration.target,
            admin: registration.admin,
            execute_gas: registration.execute_gas,
            check_data: registration.check_data,
            balance: registration.amount,
            source: registration.source,
        });
        drop(upkeeps);

        tracing::debug!(upkeep_id = %id, registry = %self.address, "upkeep registered");
        Ok(id)
    }

    async fn upkeep_count(&self) -> u64 {
        self.count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration() -> UpkeepRegistration {
        UpkeepRegistration {
            target: Address::from_label("target"),
            execute_gas: 100_000,
            admin: Address::from_label("admin"),
            check_data: vec![0x00],
            amount: 5,
            source: 100,
        }
    }

    #[tokio::test]
    async fn only_registrar_may_register() {
        let registry = InMemoryUpkeepRegistry::new(Address::from_label("registry"));
        let registrar = Address::from_label("registrar");

        let err = registry
            .register_upkeep(&registrar, registration())
            .await
            .unwrap_err();
        assert_eq!(err, RegistryError::OnlyRegistrar { caller: registrar });

        registry.set_registrar(registrar);
        let id = registry
            .register_upkeep(&registrar, registration())
            .await
            .unwrap();
        assert_eq!(id, UpkeepId(0));
        assert_eq!(registry.upkeep_count().await, 1);

        let stored = registry.get_upkeep(id).unwrap();
        assert_eq!(stored.target, Address::from_label("target"));
        assert_eq!(stored.balance, 5);
        assert!(registry.get_upkeep(UpkeepId(1)).is_none());
    }

    #[test]
    fn unavailable_maps_to_retryable_downstream_error() {
        let err: RegistrarError = RegistryError::Unavailable {
            reason: "paused".into(),
        }
        .into();
        assert!(err.is_retryable());

        let err: RegistrarError = RegistryError::Rejected {
            reason: "gas too low".into(),
        }
        .into();
        assert!(!err.is_retryable());
    }

    #[test]
    fn directory_resolves_by_address() {
        let registry = Arc::new(InMemoryUpkeepRegistry::new(Address::from_label("registry")));
        let mut directory = RegistryDirectory::new();
        directory.insert(registry);

        assert!(directory.get(&Address::from_label("registry")).is_some());
        assert!(directory.get(&Address::from_label("elsewhere")).is_none());
        assert_eq!(directory.len(), 1);
    }
}
