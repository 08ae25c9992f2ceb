//! State shared between cooperative tasks.
//!
//! All tasks run on one thread, so a cell is a plain `Rc<Cell<T>>`: no
//! locking, and the compiler refuses to move it to another thread.
//! Producers are registered before consumers, so a consumer always sees
//! the value written earlier in the same poll.

use crate::control::pid::PidGains;
use motorlab_common::hal::types::MotorId;
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

/// One shared value. Clones are handles to the same slot.
pub struct SharedCell<T: Copy> {
    slot: Rc<Cell<T>>,
}

impl<T: Copy> SharedCell<T> {
    /// Create a cell holding `value`.
    pub fn new(value: T) -> Self {
        Self {
            slot: Rc::new(Cell::new(value)),
        }
    }

    /// Current value.
    #[inline]
    pub fn read(&self) -> T {
        self.slot.get()
    }

    /// Overwrite the value.
    #[inline]
    pub fn write(&self, value: T) {
        self.slot.set(value);
    }

    /// Overwrite the value, returning the previous one.
    #[inline]
    pub fn replace(&self, value: T) -> T {
        self.slot.replace(value)
    }
}

impl<T: Copy> Clone for SharedCell<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Rc::clone(&self.slot),
        }
    }
}

impl<T: Copy + Default> Default for SharedCell<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Copy + fmt::Debug> fmt::Debug for SharedCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SharedCell").field(&self.read()).finish()
    }
}

/// Everything the tasks of one motor exchange.
///
/// | Cell | Writer | Readers |
/// |------|--------|---------|
/// | `position`, `velocity` | encoder task | motor task, UI |
/// | `reference_velocity`, `gains` | UI, motor task (fault clear) | motor task |
/// | `zero_request` | UI | encoder task |
/// | `clear_fault_request` | UI | motor task |
/// | `duty`, `fault` | motor task | UI |
#[derive(Debug, Clone)]
pub struct MotorShare {
    /// Which motor.
    pub id: MotorId,
    /// Shaft position [rad].
    pub position: SharedCell<f64>,
    /// Shaft velocity [rad/s].
    pub velocity: SharedCell<f64>,
    /// Velocity setpoint [rad/s].
    pub reference_velocity: SharedCell<f64>,
    /// Zero the position on the next encoder run.
    pub zero_request: SharedCell<bool>,
    /// Clear the latched fault on the next motor run.
    pub clear_fault_request: SharedCell<bool>,
    /// Controller gains.
    pub gains: SharedCell<PidGains>,
    /// Last applied duty [%].
    pub duty: SharedCell<f64>,
    /// Bridge fault latched.
    pub fault: SharedCell<bool>,
}

impl MotorShare {
    /// Fresh share: everything zero, no requests pending.
    pub fn new(id: MotorId) -> Self {
        Self {
            id,
            position: SharedCell::default(),
            velocity: SharedCell::default(),
            reference_velocity: SharedCell::default(),
            zero_request: SharedCell::default(),
            clear_fault_request: SharedCell::default(),
            gains: SharedCell::default(),
            duty: SharedCell::default(),
            fault: SharedCell::default(),
        }
    }

    /// Command standstill: zero setpoint and zero gains.
    pub fn idle(&self) {
        self.reference_velocity.write(0.0);
        self.gains.write(PidGains::ZERO);
    }

    /// Consume a pending zero request.
    #[inline]
    pub fn take_zero_request(&self) -> bool {
        self.zero_request.replace(false)
    }

    /// Consume a pending fault-clear request.
    #[inline]
    pub fn take_clear_fault_request(&self) -> bool {
        self.clear_fault_request.replace(false)
    }
}
