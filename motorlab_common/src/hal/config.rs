//! Board configuration types.
//!
//! - `BoardConfig` - What a driver needs at `init()`
//! - `SimulationConfig` - Motor plant parameters for the simulation driver

use crate::consts::{DEFAULT_COUNTER_BITS, DEFAULT_TICKS_PER_REV, MAX_COUNTER_BITS, MAX_MOTORS};
use crate::hal::driver::HalError;
use serde::{Deserialize, Serialize};

fn default_plant_gain() -> f64 {
    2.0
}

fn default_time_constant_s() -> f64 {
    0.05
}

/// Parameters of the simulated first-order DC motor.
///
/// Steady-state speed is `plant_gain * duty`; the response to a step in duty
/// settles with time constant `time_constant_s`.
///
/// # TOML Example
///
/// ```toml
/// [simulation]
/// plant_gain = 2.0          # rad/s per % duty
/// time_constant_s = 0.05
/// overcurrent_duty = 95.0   # optional: |duty| at or above this trips the fault line
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulationConfig {
    /// Steady-state speed per unit duty [rad/s / %].
    #[serde(default = "default_plant_gain")]
    pub plant_gain: f64,

    /// Mechanical time constant [s].
    #[serde(default = "default_time_constant_s")]
    pub time_constant_s: f64,

    /// Duty magnitude that trips the simulated overcurrent protection [%].
    #[serde(default)]
    pub overcurrent_duty: Option<f64>,

    /// Raw counter value at power-up.
    #[serde(default)]
    pub initial_counter: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            plant_gain: default_plant_gain(),
            time_constant_s: default_time_constant_s(),
            overcurrent_duty: None,
            initial_counter: 0,
        }
    }
}

/// Configuration handed to [`BoardDriver::init`](crate::hal::driver::BoardDriver::init).
#[derive(Debug, Clone, PartialEq)]
pub struct BoardConfig {
    /// Number of motor channels in use (1..=MAX_MOTORS).
    pub motors: usize,
    /// Encoder counter width [bits].
    pub counter_bits: u32,
    /// Encoder resolution [ticks/rev].
    pub ticks_per_rev: u32,
    /// Plant parameters (ignored by hardware drivers).
    pub simulation: SimulationConfig,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            motors: MAX_MOTORS,
            counter_bits: DEFAULT_COUNTER_BITS,
            ticks_per_rev: DEFAULT_TICKS_PER_REV,
            simulation: SimulationConfig::default(),
        }
    }
}

impl BoardConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    /// `HalError::ConfigError` describing the first invalid field.
    pub fn validate(&self) -> Result<(), HalError> {
        if self.motors == 0 || self.motors > MAX_MOTORS {
            return Err(HalError::ConfigError(format!(
                "motors must be in 1..={MAX_MOTORS}, got {}",
                self.motors
            )));
        }
        if !(2..=MAX_COUNTER_BITS).contains(&self.counter_bits) {
            return Err(HalError::ConfigError(format!(
                "counter_bits must be in 2..={MAX_COUNTER_BITS}, got {}",
                self.counter_bits
            )));
        }
        if self.ticks_per_rev == 0 {
            return Err(HalError::ConfigError(
                "ticks_per_rev must be > 0".to_string(),
            ));
        }
        let sim = &self.simulation;
        if !sim.plant_gain.is_finite() {
            return Err(HalError::ConfigError(
                "simulation.plant_gain must be finite".to_string(),
            ));
        }
        if !(sim.time_constant_s.is_finite() && sim.time_constant_s > 0.0) {
            return Err(HalError::ConfigError(
                "simulation.time_constant_s must be > 0".to_string(),
            ));
        }
        if let Some(limit) = sim.overcurrent_duty {
            if !(limit > 0.0 && limit <= 100.0) {
                return Err(HalError::ConfigError(format!(
                    "simulation.overcurrent_duty must be in (0, 100], got {limit}"
                )));
            }
        }
        Ok(())
    }

    /// Counter modulus `2^counter_bits`.
    #[inline]
    pub fn counter_modulus(&self) -> u64 {
        1u64 << self.counter_bits
    }
}
