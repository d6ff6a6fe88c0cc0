//! Time sources for windowed throttling.
//!
//! Windows are measured in abstract, monotone "time units" (block heights in
//! the ledger deployment, coarse ticks elsewhere). Nothing here reads the
//! wall clock.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Source of the current time unit.
pub trait TimeSource: Send + Sync {
    /// Current time unit. Must never decrease.
    fn current_unit(&self) -> u64;
}

/// Externally driven block counter.
///
/// Used when the gate sits behind a ledger that reports block heights, and in
/// tests/simulations that need exact control over window boundaries.
#[derive(Debug, Default)]
pub struct ManualBlockClock {
    block: AtomicU64,
}

impl ManualBlockClock {
    #[must_use]
    pub const fn new(start: u64) -> Self {
        Self {
            block: AtomicU64::new(start),
        }
    }

    /// Move forward by `blocks`, returning the new height.
    pub fn advance(&self, blocks: u64) -> u64 {
        let previous = self
            .block
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |b| {
                Some(b.saturating_add(blocks))
            })
            .unwrap_or_else(|b| b);
        previous.saturating_add(blocks)
    }

    /// Jump to `block`. Heights lower than the current one are ignored.
    pub fn set(&self, block: u64) {
        self.block.fetch_max(block, Ordering::SeqCst);
    }
}

impl TimeSource for ManualBlockClock {
    fn current_unit(&self) -> u64 {
        self.block.load(Ordering::SeqCst)
    }
}

/// Monotonic tick counter derived from `Instant`.
#[derive(Debug, Clone)]
pub struct MonotonicTicks {
    origin: Instant,
    tick: Duration,
}

impl MonotonicTicks {
    /// Create a counter whose unit is `tick`. A zero tick is treated as 1ms.
    #[must_use]
    pub fn new(tick: Duration) -> Self {
        let tick = if tick.is_zero() {
            Duration::from_millis(1)
        } else {
            tick
        };
        Self {
            origin: Instant::now(),
            tick,
        }
    }

    #[must_use]
    pub const fn tick(&self) -> Duration {
        self.tick
    }
}

impl TimeSource for MonotonicTicks {
    fn current_unit(&self) -> u64 {
        let elapsed = self.origin.elapsed().as_nanos();
        let units = elapsed / self.tick.as_nanos();
        u64::try_from(units).unwrap_or(u64::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_advances_and_never_rewinds() {
        let clock = ManualBlockClock::new(5);
        assert_eq!(clock.current_unit(), 5);
        assert_eq!(clock.advance(3), 8);
        clock.set(2);
        assert_eq!(clock.current_unit(), 8);
        clock.set(20);
        assert_eq!(clock.current_unit(), 20);
    }

    #[test]
    fn manual_clock_saturates() {
        let clock = ManualBlockClock::new(u64::MAX - 1);
        assert_eq!(clock.advance(10), u64::MAX);
    }

    #[test]
    fn ticks_start_at_zero_and_are_monotone() {
        let ticks = MonotonicTicks::new(Duration::from_secs(3600));
        let first = ticks.current_unit();
        let second = ticks.current_unit();
        assert_eq!(first, 0);
        assert!(second >= first);
    }

    #[test]
    fn zero_tick_is_clamped() {
        assert_eq!(
            MonotonicTicks::new(Duration::ZERO).tick(),
            Duration::from_millis(1)
        );
    }
}
