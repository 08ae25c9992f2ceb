//! Discrete PID with trapezoidal integration and output clamping.
//!
//! There is no anti-windup: the integral keeps accumulating while the output
//! is saturated. Callers that need conditional integration must add it
//! around [`PidController::update`].

use crate::error::ControlError;
use serde::{Deserialize, Serialize};

/// PID gains. Hot-swappable between updates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PidGains {
    /// Proportional gain.
    pub kp: f64,
    /// Integral gain.
    pub ki: f64,
    /// Derivative gain.
    pub kd: f64,
}

impl PidGains {
    /// All gains zero (controller output is always 0).
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    /// Create gains.
    pub const fn new(kp: f64, ki: f64, kd: f64) -> Self {
        Self { kp, ki, kd }
    }

    /// True when no gain is NaN or infinite.
    pub fn is_finite(&self) -> bool {
        self.kp.is_finite() && self.ki.is_finite() && self.kd.is_finite()
    }
}

/// Output limits `[low, high]`, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Saturation {
    low: f64,
    high: f64,
}

impl Saturation {
    /// Create limits.
    ///
    /// # Errors
    /// `ControlError::InvalidSaturation` if `low > high` or either is not finite.
    pub fn new(low: f64, high: f64) -> Result<Self, ControlError> {
        if low.is_finite() && high.is_finite() && low <= high {
            Ok(Self { low, high })
        } else {
            Err(ControlError::InvalidSaturation { low, high })
        }
    }

    /// Lower limit.
    #[inline]
    pub fn low(&self) -> f64 {
        self.low
    }

    /// Upper limit.
    #[inline]
    pub fn high(&self) -> f64 {
        self.high
    }

    /// Clamp `value` into the limits. NaN maps to the limit-clamped zero.
    #[inline]
    pub fn clamp(&self, value: f64) -> f64 {
        if value.is_nan() {
            return 0.0f64.clamp(self.low, self.high);
        }
        value.clamp(self.low, self.high)
    }
}

/// PID controller state.
#[derive(Debug, Clone)]
pub struct PidController {
    gains: PidGains,
    limits: Saturation,
    /// Trapezoidal running sum of error over time.
    integral: f64,
    previous_error: f64,
}

impl PidController {
    /// Create a controller with a zeroed accumulator.
    pub fn new(gains: PidGains, limits: Saturation) -> Self {
        Self {
            gains,
            limits,
            integral: 0.0,
            previous_error: 0.0,
        }
    }

    /// Compute one saturated command.
    ///
    /// `dt` must be non-zero and in units consistent with the gains.
    #[inline]
    pub fn update(&mut self, reference: f64, measured: f64, dt: f64) -> f64 {
        let error = reference - measured;

        self.integral += (self.previous_error + error) * dt / 2.0;
        let derivative = (error - self.previous_error) / dt;
        self.previous_error = error;

        let raw = term(self.gains.kp, error)
            + term(self.gains.ki, self.integral)
            + term(self.gains.kd, derivative);
        self.limits.clamp(raw)
    }

    /// Replace the gains. The accumulator is left untouched.
    #[inline]
    pub fn set_gains(&mut self, gains: PidGains) {
        self.gains = gains;
    }

    /// Current gains.
    #[inline]
    pub fn gains(&self) -> PidGains {
        self.gains
    }

    /// Output limits.
    #[inline]
    pub fn limits(&self) -> Saturation {
        self.limits
    }

    /// Clear the integral and the remembered error.
    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.previous_error = 0.0;
    }

    /// Integral accumulator (error × time).
    #[inline]
    pub fn integral(&self) -> f64 {
        self.integral
    }

    /// Error seen by the last update.
    #[inline]
    pub fn previous_error(&self) -> f64 {
        self.previous_error
    }
}

/// `gain * value`, with a zero gain switching the term off even when the
/// value has overflowed to infinity.
#[inline]
fn term(gain: f64, value: f64) -> f64 {
    if gain == 0.0 { 0.0 } else { gain * value }
}

// ─── Tests ──────────────────────────────────────────────────────────
