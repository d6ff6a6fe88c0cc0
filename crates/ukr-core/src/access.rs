//! Access control for privileged gate operations.
//!
//! The gate never stores ownership fields itself; it consults an injected
//! [`AccessPolicy`].

use std::fmt;

use crate::{Address, RegistrarError, RegistrarResult};

/// Privileged operations guarded by an [`AccessPolicy`].
pub const OP_SET_CONFIG: &str = "set_registration_config";
pub const OP_SET_MIN_PAYMENT: &str = "set_min_payment";
pub const OP_APPROVE: &str = "approve";
pub const OP_CANCEL: &str = "cancel";

/// Decides which actors may perform privileged operations.
pub trait AccessPolicy: Send + Sync + fmt::Debug {
    /// Whether `actor` holds owner privileges.
    fn is_owner(&self, actor: &Address) -> bool;

    /// Fail with `PermissionDenied` unless `actor` is an owner.
    ///
    /// # Errors
    /// Returns `RegistrarError::PermissionDenied` if `actor` is not an owner.
    fn ensure_owner(&self, actor: &Address, operation: &str) -> RegistrarResult<()> {
        if self.is_owner(actor) {
            Ok(())
        } else {
            Err(RegistrarError::PermissionDenied {
                actor: *actor,
                operation: operation.to_string(),
            })
        }
    }
}

/// Policy with exactly one owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingleOwner {
    owner: Address,
}

impl SingleOwner {
    #[must_use]
    pub const fn new(owner: Address) -> Self {
        Self { owner }
    }

    #[must_use]
    pub const fn owner(&self) -> &Address {
        &self.owner
    }
}

impl AccessPolicy for SingleOwner {
    fn is_owner(&self, actor: &Address) -> bool {
        *actor == self.owner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_owner_admits_only_owner() {
        let owner = Address::from_label("owner");
        let policy = SingleOwner::new(owner);

        assert!(policy.ensure_owner(&owner, OP_SET_CONFIG).is_ok());

        let stranger = Address::from_label("stranger");
        let err = policy.ensure_owner(&stranger, OP_SET_CONFIG).unwrap_err();
        assert_eq!(
            err,
            RegistrarError::PermissionDenied {
                actor: stranger,
                operation: OP_SET_CONFIG.to_string(),
            }
        );
    }
}
