//! UKR Registrar - token-gated admission control for upkeep registrations
//!
//! External callers pay for a registration with a transfer-and-call on the
//! payment token. The [`AdmissionGate`] authenticates the token, records the
//! request, and either forwards it to the downstream [`UpkeepRegistry`]
//! (auto-approval, capped per block window) or parks it in the
//! [`PendingRequestStore`] for the owner to approve or cancel.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ukr_core::{Address, ManualBlockClock, SingleOwner};
//! use ukr_registrar::{AdmissionGate, InMemoryUpkeepRegistry, PaymentToken, RegistrationConfig};
//!
//! let token = PaymentToken::new(Address::from_label("link"));
//! let registry = Arc::new(InMemoryUpkeepRegistry::new(Address::from_label("registry")));
//! let gate = AdmissionGate::new(
//!     Address::from_label("registrar"),
//!     token.address(),
//!     RegistrationConfig::new(true, 1000, 5, registry.address()),
//!     Arc::new(SingleOwner::new(Address::from_label("owner"))),
//!     Arc::new(ManualBlockClock::new(0)),
//! )
//! .with_registry(registry.clone());
//! registry.set_registrar(gate.address());
//!
//! let outcome = token.transfer_and_call(payer, &gate, amount, &payload.encode()?).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

mod config;
mod gate;
mod pending;
mod registry;
mod settings;
mod token;

pub use config::*;
pub use gate::*;
pub use pending::*;
pub use registry::*;
pub use settings::*;
pub use token::*;
