//! Control unit configuration.
//!
//! One TOML file, every section optional:
//!
//! ```toml
//! [shared]
//! log_level = "info"
//!
//! [scheduler]
//! encoder_period_us = 2000
//! motor_period_us = 2000
//! user_period_us = 40000
//!
//! [encoder]
//! counter_bits = 16
//! ticks_per_rev = 4000
//!
//! [controller]
//! kp = 0.3
//! ki = 0.0
//! kd = 0.0
//! saturation_low = -100.0
//! saturation_high = 100.0
//!
//! [simulation]
//! plant_gain = 2.0
//! time_constant_s = 0.05
//! ```

use crate::control::pid::{PidGains, Saturation};
use motorlab_common::config::{ConfigError, ConfigLoader, SharedConfig};
use motorlab_common::consts::{
    DEFAULT_COUNTER_BITS, DEFAULT_ENCODER_PERIOD_US, DEFAULT_MOTOR_PERIOD_US,
    DEFAULT_TICKS_PER_REV, DEFAULT_USER_PERIOD_US, DUTY_LIMIT, MAX_COUNTER_BITS, MAX_MOTORS,
};
use motorlab_common::hal::config::{BoardConfig, SimulationConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;

// ─── Sections ───────────────────────────────────────────────────────

/// Task periods [µs].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Encoder task period.
    pub encoder_period_us: u32,
    /// Motor (controller) task period. Also the PID `dt`.
    pub motor_period_us: u32,
    /// User-interface task period. Also the capture sample interval.
    pub user_period_us: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            encoder_period_us: DEFAULT_ENCODER_PERIOD_US,
            motor_period_us: DEFAULT_MOTOR_PERIOD_US,
            user_period_us: DEFAULT_USER_PERIOD_US,
        }
    }
}

/// Encoder hardware description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    /// Hardware counter width N [bits].
    pub counter_bits: u32,
    /// Resolution [ticks/rev].
    pub ticks_per_rev: u32,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            counter_bits: DEFAULT_COUNTER_BITS,
            ticks_per_rev: DEFAULT_TICKS_PER_REV,
        }
    }
}

/// Initial PID gains and output limits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Proportional gain [%/(rad/s)].
    pub kp: f64,
    /// Integral gain [%/rad].
    pub ki: f64,
    /// Derivative gain [%/(rad/s²)].
    pub kd: f64,
    /// Lowest duty the controller may command [%].
    pub saturation_low: f64,
    /// Highest duty the controller may command [%].
    pub saturation_high: f64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            kp: 0.0,
            ki: 0.0,
            kd: 0.0,
            saturation_low: -DUTY_LIMIT,
            saturation_high: DUTY_LIMIT,
        }
    }
}

impl ControllerConfig {
    /// Gains to start both controllers with.
    pub fn gains(&self) -> PidGains {
        PidGains::new(self.kp, self.ki, self.kd)
    }

    /// Output limits.
    ///
    /// # Errors
    /// `ConfigError::ValidationError` if the limits are inverted or not finite.
    pub fn saturation(&self) -> Result<Saturation, ConfigError> {
        Saturation::new(self.saturation_low, self.saturation_high)
            .map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

// ─── Top Level ──────────────────────────────────────────────────────

/// Complete configuration of the `motorlab` binary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    /// Logging and identity.
    pub shared: SharedConfig,
    /// Task periods.
    pub scheduler: SchedulerConfig,
    /// Encoder hardware.
    pub encoder: EncoderConfig,
    /// Controller defaults.
    pub controller: ControllerConfig,
    /// Simulated plant (ignored by hardware drivers).
    pub simulation: SimulationConfig,
}

impl ControlConfig {
    /// Load and validate a configuration file.
    ///
    /// # Errors
    /// Any `ConfigError` from parsing or [`ControlConfig::validate`].
    pub fn load_validated(path: &Path) -> Result<Self, ConfigError> {
        let config = Self::load(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Semantic validation.
    ///
    /// # Errors
    /// `ConfigError::ValidationError` naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;

        let periods = [
            ("encoder_period_us", self.scheduler.encoder_period_us),
            ("motor_period_us", self.scheduler.motor_period_us),
            ("user_period_us", self.scheduler.user_period_us),
        ];
        for (field, period) in periods {
            if period == 0 || period > i32::MAX as u32 {
                return Err(ConfigError::ValidationError(format!(
                    "scheduler.{field} must be in 1..={}, got {period}",
                    i32::MAX
                )));
            }
        }

        if !(2..=MAX_COUNTER_BITS).contains(&self.encoder.counter_bits) {
            return Err(ConfigError::ValidationError(format!(
                "encoder.counter_bits must be in 2..={MAX_COUNTER_BITS}, got {}",
                self.encoder.counter_bits
            )));
        }
        if self.encoder.ticks_per_rev == 0 {
            return Err(ConfigError::ValidationError(
                "encoder.ticks_per_rev must be > 0".to_string(),
            ));
        }

        if !self.controller.gains().is_finite() {
            return Err(ConfigError::ValidationError(
                "controller gains must be finite".to_string(),
            ));
        }
        self.controller.saturation()?;

        self.board_config()
            .validate()
            .map_err(|e| ConfigError::ValidationError(e.to_string()))
    }

    /// Board description handed to the driver.
    pub fn board_config(&self) -> BoardConfig {
        BoardConfig {
            motors: MAX_MOTORS,
            counter_bits: self.encoder.counter_bits,
            ticks_per_rev: self.encoder.ticks_per_rev,
            simulation: self.simulation.clone(),
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
