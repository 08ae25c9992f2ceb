//! Quadrature encoder tracking.
//!
//! The hardware counter wraps at 2^N. [`EncoderTracker::update`] turns
//! successive raw samples into an unbounded signed position by assuming
//! the shaft moves less than half the counter range between two updates.
//! That is a physical constraint on the update rate, not something the
//! tracker can detect: a faster shaft yields a silently wrong delta.

use motorlab_common::hal::driver::EncoderCounter;
use std::f64::consts::TAU;

/// Signed displacement between two raw samples of an N-bit counter.
///
/// Applies the half-range correction: a difference above `2^(N-1)` is a
/// backwards wrap, one below `-2^(N-1)` a forwards wrap.
#[inline]
pub fn wrapped_delta(raw: u32, last: u32, bits: u32) -> i64 {
    let modulus = 1i64 << bits;
    let half = modulus >> 1;
    let mut delta = raw as i64 - last as i64;
    if delta > half {
        delta -= modulus;
    } else if delta < -half {
        delta += modulus;
    }
    delta
}

/// Unbounded position tracker over a wrapping hardware counter.
pub struct EncoderTracker {
    counter: Box<dyn EncoderCounter>,
    bits: u32,
    mask: u32,
    last_sample: u32,
    position: i64,
    delta: i64,
}

impl EncoderTracker {
    /// Start tracking from the counter's current value; position starts at 0.
    pub fn new(mut counter: Box<dyn EncoderCounter>) -> Self {
        let bits = counter.width_bits().clamp(1, 32);
        let mask = if bits == 32 { u32::MAX } else { (1u32 << bits) - 1 };
        let last_sample = counter.counter() & mask;
        Self {
            counter,
            bits,
            mask,
            last_sample,
            position: 0,
            delta: 0,
        }
    }

    /// Sample the counter and accumulate the displacement since the last call.
    ///
    /// Returns the new delta [ticks].
    #[inline]
    pub fn update(&mut self) -> i64 {
        let raw = self.counter.counter() & self.mask;
        self.delta = wrapped_delta(raw, self.last_sample, self.bits);
        self.position += self.delta;
        self.last_sample = raw;
        self.delta
    }

    /// Accumulated position [ticks].
    #[inline]
    pub fn position(&self) -> i64 {
        self.position
    }

    /// Displacement measured by the last update [ticks].
    #[inline]
    pub fn delta(&self) -> i64 {
        self.delta
    }

    /// Overwrite the position (typically 0 for "zero here").
    ///
    /// The last raw sample is kept, so the next update still measures real
    /// motion against the hardware counter.
    pub fn set_position(&mut self, position: i64) {
        self.position = position;
    }

    /// Last raw counter value.
    pub fn last_sample(&self) -> u32 {
        self.last_sample
    }

    /// Counter width N [bits].
    pub fn width_bits(&self) -> u32 {
        self.bits
    }
}

/// Tick to SI conversion, applied at the encoder task boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncoderScale {
    rad_per_tick: f64,
}

impl EncoderScale {
    /// Scale for an encoder with `ticks_per_rev` ticks per revolution.
    pub fn new(ticks_per_rev: u32) -> Self {
        Self {
            rad_per_tick: TAU / ticks_per_rev.max(1) as f64,
        }
    }

    /// Radians per tick.
    #[inline]
    pub fn rad_per_tick(&self) -> f64 {
        self.rad_per_tick
    }

    /// Position in radians.
    #[inline]
    pub fn radians(&self, ticks: i64) -> f64 {
        ticks as f64 * self.rad_per_tick
    }

    /// Angular velocity [rad/s] of `delta` ticks over `period_s` seconds.
    #[inline]
    pub fn velocity(&self, delta: i64, period_s: f64) -> f64 {
        self.radians(delta) / period_s
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
