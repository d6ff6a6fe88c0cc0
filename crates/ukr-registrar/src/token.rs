//! Payment token with transfer-and-call delivery.
//!
//! A registration is paid for and authorized in one step: the token moves the
//! amount to the receiver and then invokes the receiver with the caller's data.
//! The receiver sees the token's own address as the caller, which is what the
//! gate authenticates against.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use ukr_core::{Address, RegistrarError, RegistrarResult};

/// Transfer failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("insufficient balance for {account}: have {balance}, need {required}")]
    InsufficientBalance {
        account: Address,
        balance: u128,
        required: u128,
    },

    #[error("balance overflow for {account}")]
    Overflow { account: Address },

    #[error("receiver rejected transfer: {0}")]
    Rejected(#[from] RegistrarError),
}

/// A contract-like receiver of transfer-and-call payments.
#[async_trait]
pub trait TokenReceiver: Send + Sync {
    /// Value returned to the payer when the receiver accepts a transfer.
    type Receipt: Send;

    /// Address the receiver is credited at.
    fn address(&self) -> Address;

    /// Handle a payment. `caller` is the token that delivered it.
    ///
    /// # Errors
    /// Any error makes the token revert the transfer.
    async fn on_token_transfer(
        &self,
        caller: &Address,
        sender: &Address,
        amount: u128,
        data: &[u8],
    ) -> RegistrarResult<Self::Receipt>;
}

/// In-process token ledger.
#[derive(Debug)]
pub struct PaymentToken {
    address: Address,
    balances: Mutex<HashMap<Address, u128>>,
}

impl PaymentToken {
    #[must_use]
    pub fn new(address: Address) -> Self {
        Self {
            address,
            balances: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub const fn address(&self) -> Address {
        self.address
    }

    /// Credit `amount` to `account` out of thin air.
    ///
    /// # Errors
    /// Returns `TokenError::Overflow` if the balance would exceed `u128::MAX`.
    pub fn mint(&self, account: Address, amount: u128) -> Result<(), TokenError> {
        let mut balances = self.balances.lock();
        let balance = balances.entry(account).or_insert(0);
        *balance = balance
            .checked_add(amount)
            .ok_or(TokenError::Overflow { account })?;
        Ok(())
    }

    #[must_use]
    pub fn balance_of(&self, account: &Address) -> u128 {
        self.balances.lock().get(account).copied().unwrap_or(0)
    }

    /// Move `amount` from `from` to `to`.
    ///
    /// # Errors
    /// Returns an error if `from` cannot cover the amount or `to` would overflow.
    pub fn transfer(&self, from: Address, to: Address, amount: u128) -> Result<(), TokenError> {
        let mut balances = self.balances.lock();
        let balance = balances.get(&from).copied().unwrap_or(0);
        if balance < amount {
            return Err(TokenError::InsufficientBalance {
                account: from,
                balance,
                required: amount,
            });
        }
        if from == to {
            return Ok(());
        }
        let credited = balances
            .get(&to)
            .copied()
            .unwrap_or(0)
            .checked_add(amount)
            .ok_or(TokenError::Overflow { account: to })?;
        balances.insert(from, balance - amount);
        balances.insert(to, credited);
        Ok(())
    }

    /// Pay `receiver` and invoke it with `data`.
    ///
    /// The transfer is reverted if the receiver returns an error.
    ///
    /// # Errors
    /// Returns `TokenError::Rejected` carrying the receiver's error, or a
    /// balance error if the payment itself cannot be made.
    pub async fn transfer_and_call<R>(
        &self,
        from: Address,
        receiver: &R,
        amount: u128,
        data: &[u8],
    ) -> Result<R::Receipt, TokenError>
    where
        R: TokenReceiver + ?Sized,
    {
        let to = receiver.address();
        self.transfer(from, to, amount)?;

        match receiver
            .on_token_transfer(&self.address, &from, amount, data)
            .await
        {
            Ok(receipt) => Ok(receipt),
            Err(err) => {
                if let Err(revert_err) = self.transfer(to, from, amount) {
                    tracing::error!(
                        error = %revert_err,
                        from = %from,
                        to = %to,
                        amount = %amount,
                        "failed to revert rejected transfer"
                    );
                }
                Err(TokenError::Rejected(err))
            }
        }
    }
}
