//! Registrar error types and error response structures.
//!
//! Error codes:
//! - UKR-1xxx: Payload errors
//! - UKR-2xxx: Authorization / policy errors
//! - UKR-3xxx: Payment errors
//! - UKR-6xxx: Pending-request errors
//! - UKR-7xxx: Downstream registry errors
//! - UKR-9xxx: Internal errors

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Address, RequestId};

/// Error type covering every failure the gate can report.
///
/// All failures are synchronous and leave gate state untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "category")]
pub enum RegistrarError {
    // ─────────────────────────────────────────────────────────────────────────
    // Payload errors (UKR-1xxx)
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Invalid registration payload: {message}")]
    InvalidPayload { message: String },

    // ─────────────────────────────────────────────────────────────────────────
    // Authorization errors (UKR-2xxx)
    // ─────────────────────────────────────────────────────────────────────────
    /// The inbound call did not come from the designated payment token.
    #[error("Must use LINK token")]
    Unauthorized { caller: Address },

    /// A privileged operation was attempted by an actor lacking the privilege.
    #[error("Not permitted: {operation} by {actor}")]
    PermissionDenied { actor: Address, operation: String },

    // ─────────────────────────────────────────────────────────────────────────
    // Payment errors (UKR-3xxx)
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Insufficient payment: {amount} is below the minimum of {minimum}")]
    InsufficientPayment { amount: u128, minimum: u128 },

    // ─────────────────────────────────────────────────────────────────────────
    // Pending request errors (UKR-6xxx)
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Request not found: {id}")]
    RequestNotFound { id: RequestId },

    // ─────────────────────────────────────────────────────────────────────────
    // Downstream errors (UKR-7xxx)
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Downstream registry rejected registration: {message}")]
    Downstream { message: String, retryable: bool },

    // ─────────────────────────────────────────────────────────────────────────
    // Internal errors (UKR-9xxx)
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl RegistrarError {
    /// Stable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidPayload { .. } => "UKR-1001",
            Self::Unauthorized { .. } => "UKR-2001",
            Self::PermissionDenied { .. } => "UKR-2002",
            Self::InsufficientPayment { .. } => "UKR-3001",
            Self::RequestNotFound { .. } => "UKR-6001",
            Self::Downstream { .. } => "UKR-7001",
            Self::Internal { .. } => "UKR-9001",
        }
    }

    /// Returns true if resubmitting the same call might succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Downstream { retryable: true, .. })
    }

    /// Convert to the response format returned to callers.
    #[must_use]
    pub fn to_response(&self) -> RegistrarErrorResponse {
        RegistrarErrorResponse {
            code: self.code().to_string(),
            message: self.to_string(),
            retryable: self.is_retryable(),
            details: self.details(),
        }
    }

    /// Extract structured details for the error.
    #[must_use]
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Self::Unauthorized { caller } => Some(serde_json::json!({
                "caller": caller,
            })),
            Self::PermissionDenied { actor, operation } => Some(serde_json::json!({
                "actor": actor,
                "operation": operation,
            })),
            Self::InsufficientPayment { amount, minimum } => Some(serde_json::json!({
                "amount": amount.to_string(),
                "minimum": minimum.to_string(),
            })),
            Self::RequestNotFound { id } => Some(serde_json::json!({
                "request_id": id,
            })),
            _ => None,
        }
    }
}

/// Result type alias for registrar operations.
pub type RegistrarResult<T> = Result<T, RegistrarError>;

/// Wire format for error responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrarErrorResponse {
    /// Error code (e.g., "UKR-2001").
    pub code: String,

    /// Human-readable message.
    pub message: String,

    /// Whether retry might succeed.
    pub retryable: bool,

    /// Structured details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}
