//! Control-side error type.
//!
//! Core algorithms (tracker, PID) never fail. Errors only cross the
//! boundaries: hardware handles, configuration, the operator terminal and
//! task registration. Any error returned by a task halts the loop.

use motorlab_common::config::ConfigError;
use motorlab_common::hal::driver::HalError;
use thiserror::Error;

/// Errors raised by the control unit.
#[derive(Debug, Error)]
pub enum ControlError {
    /// Hardware abstraction layer failure.
    #[error("HAL error: {0}")]
    Hal(#[from] HalError),

    /// Configuration could not be loaded or is invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Operator terminal I/O failed.
    #[error("Terminal I/O error: {0}")]
    Terminal(#[from] std::io::Error),

    /// Task period is zero or too long for the wrapping time base.
    #[error("Invalid period for task '{task}': {period_us} µs")]
    InvalidPeriod {
        /// Task name.
        task: &'static str,
        /// Requested period [µs].
        period_us: u32,
    },

    /// Controller output limits are inverted or not finite.
    #[error("Invalid saturation limits [{low}, {high}]")]
    InvalidSaturation {
        /// Lower limit.
        low: f64,
        /// Upper limit.
        high: f64,
    },
}
