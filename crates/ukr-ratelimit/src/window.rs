//! Fixed window admission counter keyed on time units.

use serde::{Deserialize, Serialize};

use crate::ThrottleState;

/// Window size and per-window admission cap.
///
/// A `window_size` of zero makes every attempt open a fresh window, so the
/// throttle admits iff `threshold > 0`. A `threshold` of zero admits nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WindowLimits {
    /// Window length in time units.
    pub window_size: u64,

    /// Maximum admissions per window.
    pub threshold: u64,
}

impl WindowLimits {
    #[must_use]
    pub const fn new(window_size: u64, threshold: u64) -> Self {
        Self {
            window_size,
            threshold,
        }
    }

    /// Limits that never admit.
    #[must_use]
    pub const fn closed() -> Self {
        Self::new(0, 0)
    }
}

/// Windowed admission counter.
///
/// `Copy` so that callers can stage an admission on a copy and write it back
/// only when the surrounding operation commits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WindowThrottle {
    window_start: u64,
    approvals_in_window: u64,
}

impl WindowThrottle {
    /// A throttle whose first window starts at time unit 0.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            window_start: 0,
            approvals_in_window: 0,
        }
    }

    #[must_use]
    pub const fn window_start(&self) -> u64 {
        self.window_start
    }

    #[must_use]
    pub const fn approvals_in_window(&self) -> u64 {
        self.approvals_in_window
    }

    /// First time unit outside the current window.
    #[must_use]
    pub const fn window_end(&self, limits: WindowLimits) -> u64 {
        self.window_start.saturating_add(limits.window_size)
    }

    const fn window_elapsed(&self, now: u64, limits: WindowLimits) -> bool {
        now >= self.window_end(limits)
    }

    /// Restart the window at `now` if the current one has elapsed.
    fn maybe_reset(&mut self, now: u64, limits: WindowLimits) {
        if self.window_elapsed(now, limits) {
            tracing::debug!(
                previous_start = self.window_start,
                previous_approvals = self.approvals_in_window,
                window_start = now,
                "admission window reset"
            );
            self.window_start = now;
            self.approvals_in_window = 0;
        }
    }

    /// Try to take one admission slot at time unit `now`.
    ///
    /// Returns `true` and counts the admission if the window still has room.
    /// Each `true` consumes exactly one slot.
    pub fn try_consume(&mut self, now: u64, limits: WindowLimits) -> bool {
        self.maybe_reset(now, limits);

        if self.approvals_in_window < limits.threshold {
            self.approvals_in_window += 1;
            true
        } else {
            false
        }
    }

    /// Whether `try_consume(now, limits)` would succeed, without mutating.
    #[must_use]
    pub fn would_admit(&self, now: u64, limits: WindowLimits) -> bool {
        let mut probe = *self;
        probe.try_consume(now, limits)
    }

    /// Snapshot of the throttle as seen at `now`.
    #[must_use]
    pub fn state(&self, now: u64, limits: WindowLimits) -> ThrottleState {
        let mut view = *self;
        view.maybe_reset(now, limits);
        let remaining = limits.threshold.saturating_sub(view.approvals_in_window);

        ThrottleState {
            window_start: view.window_start,
            approvals_in_window: view.approvals_in_window,
            threshold: limits.threshold,
            remaining,
            window_ends_at: view.window_end(limits),
            is_limited: remaining == 0,
        }
    }

    /// Clear the counter and start a new window at `now`.
    pub fn reset(&mut self, now: u64) {
        self.window_start = now;
        self.approvals_in_window = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_basic() {
        let limits = WindowLimits::new(100, 3);
        let mut throttle = WindowThrottle::new();

        for _ in 0..3 {
            assert!(throttle.try_consume(1, limits));
        }
        assert!(!throttle.try_consume(1, limits));
        assert_eq!(throttle.approvals_in_window(), 3);
    }

    #[test]
    fn test_window_reset_at_boundary() {
        let limits = WindowLimits::new(10, 1);
        let mut throttle = WindowThrottle::new();

        assert!(throttle.try_consume(5, limits));
        assert!(!throttle.try_consume(9, limits));
        // Window started at 0, so it ends at 10.
        assert!(throttle.try_consume(10, limits));
        assert_eq!(throttle.window_start(), 10);
        assert_eq!(throttle.approvals_in_window(), 1);
    }

    #[test]
    fn test_zero_window_admits_iff_threshold_positive() {
        let mut throttle = WindowThrottle::new();
        for now in [0, 0, 0, 1, 1] {
            assert!(throttle.try_consume(now, WindowLimits::new(0, 1)));
        }

        let mut throttle = WindowThrottle::new();
        assert!(!throttle.try_consume(0, WindowLimits::closed()));
    }

    #[test]
    fn test_zero_threshold_never_admits() {
        let limits = WindowLimits::new(1000, 0);
        let mut throttle = WindowThrottle::new();
        for now in 0..50 {
            assert!(!throttle.try_consume(now * 100, limits));
        }
        assert_eq!(throttle.approvals_in_window(), 0);
    }

    #[test]
    fn test_would_admit_does_not_consume() {
        let limits = WindowLimits::new(10, 1);
        let throttle = WindowThrottle::new();
        assert!(throttle.would_admit(0, limits));
        assert!(throttle.would_admit(0, limits));
        assert_eq!(throttle.approvals_in_window(), 0);
    }

    #[test]
    fn test_window_end_saturates() {
        let limits = WindowLimits::new(u64::MAX, 1);
        let mut throttle = WindowThrottle::new();
        throttle.reset(5);
        assert_eq!(throttle.window_end(limits), u64::MAX);
        assert!(throttle.try_consume(6, limits));
        assert!(!throttle.try_consume(u64::MAX - 1, limits));
    }

    #[test]
    fn test_state_reflects_pending_reset() {
        let limits = WindowLimits::new(10, 2);
        let mut throttle = WindowThrottle::new();
        assert!(throttle.try_consume(0, limits));
        assert!(throttle.try_consume(0, limits));

        let now = throttle.state(3, limits);
        assert!(now.is_limited);
        assert_eq!(now.remaining, 0);
        assert_eq!(now.window_ends_at, 10);

        let later = throttle.state(25, limits);
        assert!(!later.is_limited);
        assert_eq!(later.window_start, 25);
        assert_eq!(later.remaining, 2);
        // Snapshot must not mutate.
        assert_eq!(throttle.window_start(), 0);
    }
}
