//! System-wide constants for the motorlab workspace.
//!
//! Single source of truth for numeric limits and defaults.
//! Imported by all crates; no duplication permitted.

use static_assertions::const_assert;

/// Number of motor channels on the board (one H-bridge, two channels).
pub const MAX_MOTORS: usize = 2;

/// Widest hardware counter the encoder tracker supports [bits].
pub const MAX_COUNTER_BITS: u32 = 32;

/// Default hardware counter width [bits] (16-bit timer in encoder mode).
pub const DEFAULT_COUNTER_BITS: u32 = 16;

/// Default encoder resolution [ticks per output-shaft revolution].
pub const DEFAULT_TICKS_PER_REV: u32 = 4000;

/// Default encoder task period [µs].
pub const DEFAULT_ENCODER_PERIOD_US: u32 = 2_000;

/// Default motor (controller) task period [µs].
pub const DEFAULT_MOTOR_PERIOD_US: u32 = 2_000;

/// Default user-interface task period [µs].
pub const DEFAULT_USER_PERIOD_US: u32 = 40_000;

/// Actuator command limit [%]. Duty is signed in `[-DUTY_LIMIT, DUTY_LIMIT]`.
pub const DUTY_LIMIT: f64 = 100.0;

/// Duration of a `g` position/velocity capture [µs].
pub const CAPTURE_DURATION_US: u32 = 30_000_000;

/// Duration of a step-response capture after gain entry [µs].
pub const STEP_CAPTURE_DURATION_US: u32 = 10_000_000;

/// Maximum number of samples a single capture holds.
pub const RECORDER_CAPACITY: usize = 1024;

/// Maximum characters in one numeric-entry field.
pub const ENTRY_CAPACITY: usize = 24;

/// Default configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = "config/motorlab.toml";

// A capture at the default UI rate must fit the recorder.
const_assert!(
    (CAPTURE_DURATION_US / DEFAULT_USER_PERIOD_US) as usize + 1 <= RECORDER_CAPACITY
);
const_assert!(DEFAULT_COUNTER_BITS <= MAX_COUNTER_BITS);
const_assert!(MAX_MOTORS > 0);
