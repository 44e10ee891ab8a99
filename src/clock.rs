//! Monotonic time source and elapsed-time predicates.
//!
//! Mirrors the firmware's `cxa_timeDiff_t`: a start timestamp plus one-shot
//! (`is_elapsed_ms`) and recurring (`is_elapsed_recurring_ms`) predicates.
//! Recurring mode measures drift from the previous firing, not from startup.

use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::Instant,
};

/// A monotonic millisecond time source.
///
/// Implemented by the real system clock in production and by a
/// deterministic fake in tests.
pub trait MonotonicClock: Send + Sync {
    /// Milliseconds elapsed since some arbitrary but fixed epoch.
    fn now_ms(&self) -> u64;
}

/// The external NTP/RTC collaborator: tells us whether wall-clock time has
/// been set yet, and if so what it is.
pub trait GatewayClock: MonotonicClock {
    /// True once the device has synchronized to a real-world time source.
    fn is_clock_set(&self) -> bool;

    /// Unix timestamp in seconds. Only meaningful when `is_clock_set()`.
    fn unix_timestamp_s(&self) -> u32;
}

impl<T: MonotonicClock + ?Sized> MonotonicClock for std::sync::Arc<T> {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}

impl<T: GatewayClock + ?Sized> GatewayClock for std::sync::Arc<T> {
    fn is_clock_set(&self) -> bool {
        (**self).is_clock_set()
    }

    fn unix_timestamp_s(&self) -> u32 {
        (**self).unix_timestamp_s()
    }
}

/// Monotonic clock backed by [`std::time::Instant`].
#[derive(Debug)]
pub struct SystemClock {
    epoch: Instant,
}

impl SystemClock {
    /// Creates a new system clock, with "now" as its epoch.
    pub fn new() -> Self {
        Self { epoch: Instant::now() }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock for SystemClock {
    fn now_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }
}

/// A deterministic, manually-advanced clock for tests.
#[derive(Debug, Default)]
pub struct FakeClock {
    now_ms: AtomicU64,
    unix_s: AtomicU64,
    clock_set: std::sync::atomic::AtomicBool,
}

impl FakeClock {
    /// Creates a fake clock starting at time zero, with the wall clock unset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances monotonic time by `delta_ms`.
    pub fn advance_ms(&self, delta_ms: u64) {
        self.now_ms.fetch_add(delta_ms, Ordering::SeqCst);
    }

    /// Sets monotonic time to an absolute value.
    pub fn set_now_ms(&self, ms: u64) {
        self.now_ms.store(ms, Ordering::SeqCst);
    }

    /// Sets the wall-clock unix timestamp and marks the clock as set.
    pub fn set_unix_timestamp_s(&self, unix_s: u32) {
        self.unix_s.store(unix_s as u64, Ordering::SeqCst);
        self.clock_set.store(true, Ordering::SeqCst);
    }

    /// Marks the wall clock as unset again.
    pub fn unset_clock(&self) {
        self.clock_set.store(false, Ordering::SeqCst);
    }
}

impl MonotonicClock for FakeClock {
    fn now_ms(&self) -> u64 {
        self.now_ms.load(Ordering::SeqCst)
    }
}

impl GatewayClock for FakeClock {
    fn is_clock_set(&self) -> bool {
        self.clock_set.load(Ordering::SeqCst)
    }

    fn unix_timestamp_s(&self) -> u32 {
        self.unix_s.load(Ordering::SeqCst) as u32
    }
}

/// Elapsed-time predicate over a [`MonotonicClock`], with one-shot and
/// recurring modes.
pub struct TimeDiff<C> {
    clock: C,
    start_ms: AtomicU64,
}

impl<C: MonotonicClock> TimeDiff<C> {
    /// Creates a new `TimeDiff` with its start time set to now.
    pub fn new(clock: C) -> Self {
        let start_ms = clock.now_ms();
        Self { clock, start_ms: AtomicU64::new(start_ms) }
    }

    /// Resets the start time to now.
    pub fn set_start_now(&self) {
        self.start_ms.store(self.clock.now_ms(), Ordering::SeqCst);
    }

    /// Milliseconds elapsed since the start time (or since the last
    /// recurring firing).
    pub fn elapsed_ms(&self) -> u64 {
        self.clock.now_ms().saturating_sub(self.start_ms.load(Ordering::SeqCst))
    }

    /// One-shot predicate: true iff more than `threshold_ms` has elapsed
    /// since the start time. Does not reset the start time.
    pub fn is_elapsed_ms(&self, threshold_ms: u64) -> bool {
        self.elapsed_ms() > threshold_ms
    }

    /// Recurring predicate: true at most once per `period_ms`. When it
    /// fires, the start time is reset to now so the next firing is measured
    /// from this one (drift from previous firing, not from startup).
    pub fn is_elapsed_recurring_ms(&self, period_ms: u64) -> bool {
        if self.is_elapsed_ms(period_ms) {
            self.set_start_now();
            true
        } else {
            false
        }
    }
}
