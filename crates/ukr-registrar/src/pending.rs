//! Requests awaiting manual approval or cancellation.

use std::collections::HashMap;

use ukr_core::{RegistrationRequest, RequestId};

/// Pending registrations keyed by request identifier.
///
/// Unbounded: growth is only limited by how many requests the policy routes
/// to manual review.
#[derive(Debug, Clone, Default)]
pub struct PendingRequestStore {
    requests: HashMap<RequestId, RegistrationRequest>,
}

impl PendingRequestStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a request under its own identifier.
    ///
    /// Returns the request previously stored under the same identifier, if any.
    pub fn insert(&mut self, request: RegistrationRequest) -> Option<RegistrationRequest> {
        self.requests.insert(request.id, request)
    }

    #[must_use]
    pub fn exists(&self, id: &RequestId) -> bool {
        self.requests.contains_key(id)
    }

    #[must_use]
    pub fn get(&self, id: &RequestId) -> Option<&RegistrationRequest> {
        self.requests.get(id)
    }

    pub fn remove(&mut self, id: &RequestId) -> Option<RegistrationRequest> {
        self.requests.remove(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.requests.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// Identifiers of all pending requests, in ascending order.
    #[must_use]
    pub fn ids(&self) -> Vec<RequestId> {
        let mut ids: Vec<RequestId> = self.requests.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ukr_core::{Address, RegistrationPayload};

    fn request(byte: u8) -> RegistrationRequest {
        RegistrationRequest {
            id: RequestId::from_bytes([byte; 32]),
            sender: Address::from_label("sender"),
            amount: 1,
            payload: RegistrationPayload {
                name: format!("job-{byte}"),
                check_data: Vec::new(),
                target: Address::from_label("target"),
                execute_gas: 500_000,
                admin: Address::from_label("admin"),
                admin_extra_info: Vec::new(),
                source: 0,
            },
            nonce: u64::from(byte),
            received_at: 0,
        }
    }

    #[test]
    fn insert_get_remove() {
        let mut store = PendingRequestStore::new();
        let id = RequestId::from_bytes([1; 32]);

        assert!(store.insert(request(1)).is_none());
        assert!(store.exists(&id));
        assert_eq!(store.get(&id).map(RegistrationRequest::name), Some("job-1"));

        let removed = store.remove(&id).unwrap();
        assert_eq!(removed.id, id);
        assert!(!store.exists(&id));
        assert!(store.remove(&id).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn ids_are_sorted() {
        let mut store = PendingRequestStore::new();
        store.insert(request(3));
        store.insert(request(1));
        store.insert(request(2));
        assert_eq!(
            store.ids(),
            vec![
                RequestId::from_bytes([1; 32]),
                RequestId::from_bytes([2; 32]),
                RequestId::from_bytes([3; 32]),
            ]
        );
        assert_eq!(store.len(), 3);
    }
}
