//! UKR Core - shared types for the upkeep registration gate
//!
//! This crate provides the foundational types used by every other crate in the
//! workspace:
//!
//! - [`Address`], [`RequestId`] and [`UpkeepId`] identifiers
//! - [`RegistrationPayload`] (the CBOR body carried by a token transfer) and
//!   [`RegistrationRequest`]
//! - [`RegistrarError`] with stable `UKR-xxxx` codes
//! - [`RegistrationEvent`] and the append-only [`EventLog`]
//! - [`AccessPolicy`] for privileged operations
//! - [`TimeSource`] implementations for block/tick based windows

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

mod access;
mod address;
mod clock;
mod error;
mod event;
mod request;
pub mod util;

pub use access::*;
pub use address::*;
pub use clock::*;
pub use error::*;
pub use event::*;
pub use request::*;

// Re-export commonly used external types
pub use chrono::{DateTime, Utc};
