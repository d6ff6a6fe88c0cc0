//! Registry double with failure injection.

use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;
use ukr_core::{Address, UpkeepId};
use ukr_registrar::{
    InMemoryUpkeepRegistry, RegistryError, UpkeepRecord, UpkeepRegistration, UpkeepRegistry,
};

/// A registry that records every call and can be told to fail.
///
/// Successful calls are delegated to an [`InMemoryUpkeepRegistry`] that
/// already trusts `registrar`, so upkeep ids stay sequential.
#[derive(Debug)]
pub struct ScriptedRegistry {
    inner: InMemoryUpkeepRegistry,
    queued_failures: Mutex<VecDeque<RegistryError>>,
    sticky_failure: Mutex<Option<RegistryError>>,
    calls: Mutex<Vec<(Address, UpkeepRegistration)>>,
}

impl ScriptedRegistry {
    #[must_use]
    pub fn new(address: Address, registrar: Address) -> Self {
        let inner = InMemoryUpkeepRegistry::new(address);
        inner.set_registrar(registrar);
        Self {
            inner,
            queued_failures: Mutex::new(VecDeque::new()),
            sticky_failure: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Fail the next call with `error`. Queued failures are used in order.
    pub fn fail_next(&self, error: RegistryError) {
        self.queued_failures.lock().push_back(error);
    }

    /// Fail every call with `error` until [`Self::recover`].
    pub fn fail_always(&self, error: RegistryError) {
        *self.sticky_failure.lock() = Some(error);
    }

    /// Drop all scripted failures.
    pub fn recover(&self) {
        self.queued_failures.lock().clear();
        *self.sticky_failure.lock() = None;
    }

    /// Number of `register_upkeep` calls, failed ones included.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.lock().len()
    }

    /// Registration forwarded by the most recent call.
    #[must_use]
    pub fn last_call(&self) -> Option<(Address, UpkeepRegistration)> {
        self.calls.lock().last().cloned()
    }

    /// Successfully registered upkeeps.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.inner.count()
    }

    #[must_use]
    pub fn get_upkeep(&self, id: UpkeepId) -> Option<UpkeepRecord> {
        self.inner.get_upkeep(id)
    }
}

#[async_trait]
impl UpkeepRegistry for ScriptedRegistry {
    fn address(&self) -> Address {
        self.inner.address()
    }

    async fn register_upkeep(
        &self,
        caller: &Address,
        registration: UpkeepRegistration,
    ) -> Result<UpkeepId, RegistryError> {
        self.calls.lock().push((*caller, registration.clone()));

        let scripted = self
            .queued_failures
            .lock()
            .pop_front()
            .or_else(|| self.sticky_failure.lock().clone());
        if let Some(error) = scripted {
            tracing::debug!(error = %error, "scripted registry failure");
            return Err(error);
        }

        self.inner.register_upkeep(caller, registration).await
    }

    async fn upkeep_count(&self) -> u64 {
        self.inner.count()
    }
}
