//! Prelude module for common re-exports.
//!
//! ```rust
//! use motorlab_common::prelude::*;
//! ```

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, LogLevel, SharedConfig};

// ─── System Constants ───────────────────────────────────────────────
pub use crate::consts::{DUTY_LIMIT, MAX_MOTORS};

// ─── Time ───────────────────────────────────────────────────────────
pub use crate::time::{Clock, ManualClock, MonotonicClock, Ticks};

// ─── HAL ────────────────────────────────────────────────────────────
pub use crate::hal::config::{BoardConfig, SimulationConfig};
pub use crate::hal::driver::{
    BoardDriver, DriverFactory, EncoderCounter, HalError, MotorBridge, MotorChannel,
};
pub use crate::hal::types::{Duty, FaultLatch, MotorId};
