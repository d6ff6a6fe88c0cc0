//! Behavioural tests for the windowed admission throttle.
//!
//! Validates:
//! - Threshold enforcement within a single window
//! - Counter reset once the window elapses
//! - Degenerate limits (zero window, zero threshold)
//! - Limit changes between calls

use ukr_ratelimit::{WindowLimits, WindowThrottle};

// ============================================================================
// Threshold Enforcement
// ============================================================================

#[test]
fn admits_threshold_then_refuses_within_window() {
    // Given a big window and a small threshold
    let limits = WindowLimits::new(1000, 5);
    let mut throttle = WindowThrottle::new();

    // When one admission is made and then ten more in the same window
    assert!(throttle.try_consume(1, limits));
    let admitted = (0..10_u64)
        .filter(|i| throttle.try_consume(2 + *i, limits))
        .count();

    // Then only four more are admitted, five in total
    assert_eq!(admitted, 4);
    assert_eq!(throttle.approvals_in_window(), 5);
    assert!(throttle.approvals_in_window() <= limits.threshold);
}

#[test]
fn refusals_do_not_consume_slots() {
    let limits = WindowLimits::new(100, 2);
    let mut throttle = WindowThrottle::new();

    assert!(throttle.try_consume(0, limits));
    assert!(throttle.try_consume(0, limits));
    for _ in 0..20 {
        assert!(!throttle.try_consume(50, limits));
    }
    assert_eq!(throttle.approvals_in_window(), 2);
}

// ============================================================================
// Window Reset
// ============================================================================

#[test]
fn elapsed_window_restores_full_capacity() {
    let limits = WindowLimits::new(2, 3);
    let mut throttle = WindowThrottle::new();

    for _ in 0..3 {
        assert!(throttle.try_consume(0, limits));
    }
    assert!(!throttle.try_consume(1, limits));

    // Block 2 is the first block outside [0, 2)
    for _ in 0..3 {
        assert!(throttle.try_consume(2, limits));
    }
    assert!(!throttle.try_consume(3, limits));
    assert_eq!(throttle.window_start(), 2);
}

#[test]
fn window_restarts_at_first_attempt_after_gap() {
    let limits = WindowLimits::new(10, 1);
    let mut throttle = WindowThrottle::new();

    assert!(throttle.try_consume(0, limits));
    // A long idle gap: the next window starts where the next attempt lands
    assert!(throttle.try_consume(57, limits));
    assert_eq!(throttle.window_start(), 57);
    assert!(!throttle.try_consume(66, limits));
    assert!(throttle.try_consume(67, limits));
}

// ============================================================================
// Degenerate Limits
// ============================================================================

#[test]
fn zero_window_behaves_as_instantaneous_cap() {
    let mut throttle = WindowThrottle::new();
    let open = WindowLimits::new(0, 1);
    for _ in 0..100 {
        assert!(throttle.try_consume(7, open));
    }

    let mut throttle = WindowThrottle::new();
    let shut = WindowLimits::new(0, 0);
    for _ in 0..100 {
        assert!(!throttle.try_consume(7, shut));
    }
}

#[test]
fn zero_threshold_forces_refusal_across_windows() {
    let limits = WindowLimits::new(1, 0);
    let mut throttle = WindowThrottle::new();
    for now in 0..100 {
        assert!(!throttle.try_consume(now, limits));
    }
}

// ============================================================================
// Limit Changes
// ============================================================================

#[test]
fn raising_threshold_takes_effect_without_resetting_counter() {
    let mut throttle = WindowThrottle::new();
    let tight = WindowLimits::new(1000, 1);
    let loose = WindowLimits::new(1000, 3);

    assert!(throttle.try_consume(5, tight));
    assert!(!throttle.try_consume(6, tight));

    // Counter carries over: two more fit under the new threshold
    assert!(throttle.try_consume(7, loose));
    assert!(throttle.try_consume(8, loose));
    assert!(!throttle.try_consume(9, loose));
}

#[test]
fn shrinking_window_can_close_current_window_early() {
    let mut throttle = WindowThrottle::new();
    let long = WindowLimits::new(1000, 1);
    let short = WindowLimits::new(5, 1);

    assert!(throttle.try_consume(0, long));
    assert!(!throttle.try_consume(10, long));
    assert!(throttle.try_consume(10, short));
}

#[test]
fn state_snapshot_serializes() {
    let limits = WindowLimits::new(10, 4);
    let mut throttle = WindowThrottle::new();
    assert!(throttle.try_consume(3, limits));

    let state = throttle.state(3, limits);
    let json = serde_json::to_value(state).unwrap();
    assert_eq!(json["approvals_in_window"], 1);
    assert_eq!(json["remaining"], 3);
    assert_eq!(json["window_ends_at"], 10);
    assert_eq!(json["is_limited"], false);
}
