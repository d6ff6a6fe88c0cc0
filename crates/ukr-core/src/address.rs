//! Account addresses.
//!
//! Callers, the payment token, request admins, job targets and the downstream
//! registry are all identified by a 20-byte address rendered as `0x`-prefixed
//! lowercase hex.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Length of an address in bytes.
pub const ADDRESS_LEN: usize = 20;

/// A 20-byte account address.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address([u8; ADDRESS_LEN]);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    #[error("address must start with `0x`")]
    MissingPrefix,

    #[error("address must be {expected} hex characters, got {len}")]
    InvalidLength { len: usize, expected: usize },

    #[error("address contains invalid hex: {0}")]
    InvalidHex(String),
}

impl Address {
    /// The all-zero address.
    pub const ZERO: Self = Self([0; ADDRESS_LEN]);

    #[must_use]
    pub const fn from_bytes(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == [0; ADDRESS_LEN]
    }

    /// Derive a stable address from a human label (e.g. `"owner"`, `"link-token"`).
    ///
    /// Used by simulations and fixtures that need well-known, reproducible
    /// addresses without shipping key material.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(b"UKR-ADDRESS-LABEL-V1");
        hasher.update(label.as_bytes());
        let digest = hasher.finalize();
        let mut bytes = [0u8; ADDRESS_LEN];
        bytes.copy_from_slice(&digest[..ADDRESS_LEN]);
        Self(bytes)
    }

    fn parse(s: &str) -> Result<Self, AddressError> {
        let hex_part = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .ok_or(AddressError::MissingPrefix)?;

        if hex_part.len() != ADDRESS_LEN * 2 {
            return Err(AddressError::InvalidLength {
                len: hex_part.len(),
                expected: ADDRESS_LEN * 2,
            });
        }

        let mut bytes = [0u8; ADDRESS_LEN];
        hex::decode_to_slice(hex_part, &mut bytes)
            .map_err(|e| AddressError::InvalidHex(e.to_string()))?;
        Ok(Self(bytes))
    }
}

impl TryFrom<String> for Address {
    type Error = AddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Address> for String {
    fn from(value: Address) -> Self {
        value.to_string()
    }
}

impl std::str::FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Address").field(&self.to_string()).finish()
    }
}
