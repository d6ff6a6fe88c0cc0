//! UKR Test Kit - shared testing infrastructure for the registration gate
//!
//! - [`GateHarness`] - a gate wired to a payment token, a block clock and a
//!   downstream registry, driven through transfer-and-call
//! - [`ScriptedRegistry`] - a registry that counts calls and fails on demand
//! - [`fixtures`] - well-known addresses, payloads and policies
//! - Assertion helpers over the event log and error codes
//! - Tracing configuration for test output
//!
//! # Example
//!
//! ```rust,ignore
//! use ukr_testkit::{GateHarness, fixtures, assert_requested_and_approved};
//!
//! #[tokio::test]
//! async fn auto_approves() {
//!     ukr_testkit::init_test_tracing();
//!
//!     let harness = GateHarness::new(fixtures::auto_config(1000, 5));
//!     let outcome = harness.submit_sample().await.unwrap();
//!
//!     let events = harness.gate.events().await;
//!     assert_requested_and_approved(&events, outcome.id());
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

mod assertions;
pub mod fixtures;
mod harness;
mod scripted_registry;
mod tracing_config;

pub use assertions::*;
pub use harness::*;
pub use scripted_registry::*;
pub use tracing_config::*;

// Re-export core types for convenience
pub use ukr_core::{Address, RegistrarError, RegistrarResult, RegistrationEvent, RequestId};
