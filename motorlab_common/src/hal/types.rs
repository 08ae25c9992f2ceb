//! HAL value types.
//!
//! - `MotorId` - Which channel of the dual H-bridge
//! - `Duty` - Signed PWM duty cycle in percent
//! - `FaultLatch` - Sticky fault flag raised by protection hardware

use crate::consts::DUTY_LIMIT;
use crate::hal::driver::HalError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Motor channel identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MotorId {
    /// First channel (lowercase UI commands).
    One,
    /// Second channel (uppercase UI commands).
    Two,
}

impl MotorId {
    /// All channels in priority order.
    pub const ALL: [MotorId; 2] = [MotorId::One, MotorId::Two];

    /// Zero-based index.
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Self::One => 0,
            Self::Two => 1,
        }
    }

    /// One-based number as printed to the operator.
    #[inline]
    pub const fn number(self) -> u8 {
        self.index() as u8 + 1
    }

    /// Channel from a zero-based index.
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::One),
            1 => Some(Self::Two),
            _ => None,
        }
    }
}

impl fmt::Display for MotorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "motor {}", self.number())
    }
}

/// Signed duty cycle [%].
///
/// The sign selects the direction (positive drives output A, negative drives
/// output B) and the magnitude the PWM pulse width. Always within
/// `[-DUTY_LIMIT, DUTY_LIMIT]` and finite.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Duty(f64);

impl Duty {
    /// Neutral command (both outputs low).
    pub const ZERO: Self = Self(0.0);

    /// Checked constructor.
    ///
    /// # Errors
    /// `HalError::DutyOutOfRange` if `percent` is outside `[-100, 100]` or not finite.
    pub fn new(percent: f64) -> Result<Self, HalError> {
        if percent.is_finite() && (-DUTY_LIMIT..=DUTY_LIMIT).contains(&percent) {
            Ok(Self(percent))
        } else {
            Err(HalError::DutyOutOfRange(percent))
        }
    }

    /// Clamp into range. NaN maps to zero.
    pub fn saturating(percent: f64) -> Self {
        if percent.is_nan() {
            Self::ZERO
        } else {
            Self(percent.clamp(-DUTY_LIMIT, DUTY_LIMIT))
        }
    }

    /// Signed value [%].
    #[inline]
    pub const fn percent(self) -> f64 {
        self.0
    }

    /// Pulse width [%], always non-negative.
    #[inline]
    pub fn magnitude(self) -> f64 {
        self.0.abs()
    }

    /// True when driving output B.
    #[inline]
    pub fn is_reverse(self) -> bool {
        self.0 < 0.0
    }
}

/// Sticky fault flag.
///
/// Raised asynchronously by protection hardware (or its simulation) and
/// polled by control tasks. Stays latched until [`FaultLatch::clear`] is
/// called on operator request. Clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct FaultLatch {
    latched: Arc<AtomicBool>,
}

impl FaultLatch {
    /// Create a cleared latch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Latch the fault. Returns `true` if this call latched it.
    pub fn raise(&self) -> bool {
        !self.latched.swap(true, Ordering::SeqCst)
    }

    /// Current state.
    #[inline]
    pub fn is_latched(&self) -> bool {
        self.latched.load(Ordering::SeqCst)
    }

    /// Clear the latch. Returns `true` if a fault was latched.
    pub fn clear(&self) -> bool {
        self.latched.swap(false, Ordering::SeqCst)
    }
}
