//! Monotonic time base.
//!
//! Time is carried as [`Ticks`]: a `u32` microsecond counter that wraps
//! after ~71.6 minutes, the same way a free-running hardware tick counter
//! does. All comparisons go through [`Ticks::diff`], which is correct across
//! a wrap as long as the two instants are less than 2^31 µs apart.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};

/// Wrapping microsecond timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Ticks(u32);

impl Ticks {
    /// Zero timestamp.
    pub const ZERO: Self = Self(0);

    /// Create from a raw microsecond count.
    #[inline]
    pub const fn from_micros(us: u32) -> Self {
        Self(us)
    }

    /// Raw microsecond count (modulo 2^32).
    #[inline]
    pub const fn as_micros(self) -> u32 {
        self.0
    }

    /// Advance by `us` microseconds, wrapping.
    #[inline]
    pub const fn wrapping_add(self, us: u32) -> Self {
        Self(self.0.wrapping_add(us))
    }

    /// Signed distance `self - earlier` [µs].
    #[inline]
    pub const fn diff(self, earlier: Ticks) -> i32 {
        self.0.wrapping_sub(earlier.0) as i32
    }

    /// True once `self` is at or past `deadline`.
    #[inline]
    pub const fn has_reached(self, deadline: Ticks) -> bool {
        self.diff(deadline) >= 0
    }

    /// Seconds elapsed since `earlier` (negative if `earlier` is in the future).
    #[inline]
    pub fn secs_since(self, earlier: Ticks) -> f64 {
        self.diff(earlier) as f64 * 1e-6
    }
}

/// Source of monotonic time for the scheduler and simulated hardware.
pub trait Clock: Send + Sync {
    /// Current time.
    fn now(&self) -> Ticks;

    /// Block until `deadline`. Returns immediately if it has already passed.
    fn wait_until(&self, deadline: Ticks) {
        while !self.now().has_reached(deadline) {
            std::hint::spin_loop();
        }
    }
}

/// Wall-clock backed monotonic time (`std::time::Instant`).
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    /// Create a clock whose zero is "now".
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
    fn now(&self) -> Ticks {
        // Truncation to u32 is the intended wrap.
        Ticks(self.origin.elapsed().as_micros() as u32)
    }

    fn wait_until(&self, deadline: Ticks) {
        let remaining = deadline.diff(self.now());
        if remaining > 0 {
            std::thread::sleep(Duration::from_micros(remaining as u64));
        }
    }
}

/// Manually advanced clock for simulation and tests.
///
/// Clones share the same counter, so a test can hold one handle while the
/// scheduler and simulated plant read another.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now_us: Arc<AtomicU32>,
}

impl ManualClock {
    /// Create a clock starting at `start`.
    pub fn starting_at(start: Ticks) -> Self {
        Self {
            now_us: Arc::new(AtomicU32::new(start.as_micros())),
        }
    }

    /// Advance by `us` microseconds (wrapping).
    pub fn advance(&self, us: u32) {
        // fetch_add on AtomicU32 wraps on overflow.
        self.now_us.fetch_add(us, Ordering::SeqCst);
    }

    /// Jump to an absolute time.
    pub fn set(&self, t: Ticks) {
        self.now_us.store(t.as_micros(), Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Ticks {
        Ticks(self.now_us.load(Ordering::SeqCst))
    }

    /// Jumps straight to `deadline`, so a scheduler driven by this clock
    /// runs as a discrete-event simulation.
    fn wait_until(&self, deadline: Ticks) {
        if !self.now().has_reached(deadline) {
            self.set(deadline);
        }
    }
}
