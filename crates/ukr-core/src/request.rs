//! Registration payloads, request identifiers and recorded requests.
//!
//! A registration arrives as the data attached to a token transfer. The data is
//! a canonical CBOR encoding of [`RegistrationPayload`]; the gate wraps it into a
//! [`RegistrationRequest`] keyed by a [`RequestId`].

use std::fmt;

use ciborium::de::from_reader;
use ciborium::ser::into_writer;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{Address, RegistrarError};

/// Domain separator for request identifier hashing.
const REQUEST_ID_DOMAIN_SEPARATOR: &[u8] = b"UKR-REQUEST-ID-V1";

/// Maximum accepted size of an encoded registration payload.
pub const MAX_PAYLOAD_BYTES: usize = 64 * 1024;

/// Registration parameters supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationPayload {
    /// Human-readable job name.
    pub name: String,

    /// Opaque data handed to the job target at check time.
    #[serde(with = "crate::util::hex_or_bytes_vec")]
    pub check_data: Vec<u8>,

    /// Executable target of the job.
    pub target: Address,

    /// Gas budget for a single execution.
    pub execute_gas: u32,

    /// Address allowed to manage the job after registration.
    pub admin: Address,

    /// Auxiliary admin data (contact details etc.), never interpreted.
    #[serde(with = "crate::util::hex_or_bytes_vec")]
    pub admin_extra_info: Vec<u8>,

    /// Origin/channel tag of the registration.
    pub source: u8,
}

/// Failure to encode or decode a registration payload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PayloadError {
    #[error("payload is empty")]
    Empty,

    #[error("payload too large ({len} bytes > {max} bytes)")]
    TooLarge { len: usize, max: usize },

    #[error("payload encoding failed: {0}")]
    Encode(String),

    #[error("payload decoding failed: {0}")]
    Decode(String),
}

impl From<PayloadError> for RegistrarError {
    fn from(err: PayloadError) -> Self {
        Self::InvalidPayload {
            message: err.to_string(),
        }
    }
}

impl RegistrationPayload {
    /// Encode to the CBOR form carried by a token transfer.
    ///
    /// # Errors
    /// Returns an error if serialization fails or the result exceeds [`MAX_PAYLOAD_BYTES`].
    pub fn encode(&self) -> Result<Vec<u8>, PayloadError> {
        let mut buf = Vec::new();
        into_writer(self, &mut buf).map_err(|e| PayloadError::Encode(e.to_string()))?;
        if buf.len() > MAX_PAYLOAD_BYTES {
            return Err(PayloadError::TooLarge {
                len: buf.len(),
                max: MAX_PAYLOAD_BYTES,
            });
        }
        Ok(buf)
    }

    /// Decode a transfer payload.
    ///
    /// # Errors
    /// Returns an error if the bytes are empty, oversized, or not a valid payload.
    pub fn decode(bytes: &[u8]) -> Result<Self, PayloadError> {
        if bytes.is_empty() {
            return Err(PayloadError::Empty);
        }
        if bytes.len() > MAX_PAYLOAD_BYTES {
            return Err(PayloadError::TooLarge {
                len: bytes.len(),
                max: MAX_PAYLOAD_BYTES,
            });
        }
        from_reader(bytes).map_err(|e| PayloadError::Decode(e.to_string()))
    }
}

/// Correlation key of a registration request (32-byte SHA-256 digest).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(#[serde(with = "crate::util::hex_or_bytes")] [u8; 32]);

impl RequestId {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Derive the identifier for a registration.
    ///
    /// The gate nonce is strictly monotonic, so two transfers with identical
    /// sender, payload and amount still receive distinct identifiers.
    #[must_use]
    pub fn derive(nonce: u64, sender: &Address, encoded_payload: &[u8], amount: u128) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(REQUEST_ID_DOMAIN_SEPARATOR);
        hasher.update(nonce.to_be_bytes());
        hasher.update(sender.as_bytes());
        hasher.update(encoded_payload);
        hasher.update(amount.to_be_bytes());
        Self(hasher.finalize().into())
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RequestId").field(&self.to_string()).finish()
    }
}

impl std::str::FromStr for RequestId {
    type Err = PayloadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s.trim_start_matches("0x"), &mut bytes)
            .map_err(|e| PayloadError::Decode(format!("request id: {e}")))?;
        Ok(Self(bytes))
    }
}

/// Identifier assigned to a job by the downstream registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UpkeepId(pub u64);

impl fmt::Display for UpkeepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A registration recorded by the gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationRequest {
    /// Correlation key.
    pub id: RequestId,

    /// Account that paid for the registration.
    pub sender: Address,

    /// Token amount attached to the transfer.
    pub amount: u128,

    /// Caller-supplied registration parameters.
    pub payload: RegistrationPayload,

    /// Gate nonce the identifier was derived from.
    pub nonce: u64,

    /// Time unit (block) at which the request was received.
    pub received_at: u64,
}

impl RegistrationRequest {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.payload.name
    }

    #[must_use]
    pub const fn admin(&self) -> &Address {
        &self.payload.admin
    }
}
