//! Timing
//!
//! Strategies read time through a [`Clock`] so a run can be measured against
//! the monotonic system clock or against a [`ManualClock`] that only moves
//! when an engine advances it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Source of monotonic nanosecond timestamps
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// Nanoseconds since an arbitrary fixed origin
    fn now_ns(&self) -> u64;
}

/// Wall clock backed by [`std::time::Instant`]
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    /// Clock with its origin at the current instant
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    #[inline(always)]
    fn now_ns(&self) -> u64 {
        u64::try_from(self.origin.elapsed().as_nanos()).unwrap_or(u64::MAX)
    }
}

/// Clock that only moves when told to
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    /// Clock starting at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock forward
    pub fn advance(&self, nanos: u64) {
        self.now.fetch_add(nanos, Ordering::SeqCst);
    }

    /// Jump to an absolute timestamp
    pub fn set(&self, nanos: u64) {
        self.now.store(nanos, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ns(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Measures one interval against a clock
#[derive(Debug)]
pub struct Timer<'a> {
    clock: &'a dyn Clock,
    start: u64,
}

impl<'a> Timer<'a> {
    /// Start timing
    #[inline(always)]
    pub fn start(clock: &'a dyn Clock) -> Self {
        Self {
            clock,
            start: clock.now_ns(),
        }
    }

    /// Elapsed nanoseconds since `start`
    #[inline(always)]
    pub fn stop(self) -> u64 {
        self.clock.now_ns().saturating_sub(self.start)
    }
}

/// Convert nanoseconds to fractional milliseconds
#[inline]
pub fn ns_to_ms(nanos: u64) -> f64 {
    nanos as f64 / perfplan_stats::NANOS_PER_MILLI
}
