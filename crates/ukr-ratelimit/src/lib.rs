//! UKR Rate Limit - windowed admission throttling
//!
//! Auto-approvals are capped per rolling window of time units (blocks). The
//! window is a fixed window that restarts at the first admission attempt made
//! after it elapsed:
//!
//! ```rust
//! use ukr_ratelimit::{WindowLimits, WindowThrottle};
//!
//! let limits = WindowLimits::new(1000, 5);
//! let mut throttle = WindowThrottle::new();
//!
//! for _ in 0..5 {
//!     assert!(throttle.try_consume(10, limits));
//! }
//! assert!(!throttle.try_consume(10, limits));
//!
//! // The first window covers blocks 0..1000; block 1000 opens a new one.
//! assert!(throttle.try_consume(1000, limits));
//! assert_eq!(throttle.window_start(), 1000);
//! ```
//!
//! The throttle holds no lock of its own. Check-then-increment is only exact
//! when every call is serialized by the owner of the throttle.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

mod window;

pub use window::*;

/// Throttle state snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct ThrottleState {
    /// Time unit at which the current window began.
    pub window_start: u64,

    /// Admissions granted since `window_start`.
    pub approvals_in_window: u64,

    /// Maximum admissions per window.
    pub threshold: u64,

    /// Remaining admissions in the current window.
    pub remaining: u64,

    /// First time unit that belongs to the next window.
    pub window_ends_at: u64,

    /// Whether an admission attempted now would be refused.
    pub is_limited: bool,
}
