//! First-order DC motor plant.
//!
//! Speed follows `tau * dω/dt = K * duty - ω` while the bridge is powered
//! and coasts down towards zero otherwise. Integration is exact for a duty
//! held constant between updates, so results do not depend on how often the
//! plant is sampled.

use motorlab_common::hal::config::BoardConfig;
use motorlab_common::hal::types::Duty;
use motorlab_common::time::Ticks;
use std::f64::consts::TAU;
use tracing::trace;

/// Simulated motor + encoder disc.
#[derive(Debug, Clone)]
pub struct MotorPlant {
    /// Steady-state speed per % duty [rad/s / %].
    gain: f64,
    /// Time constant [s].
    tau: f64,
    /// Encoder ticks per radian.
    ticks_per_rad: f64,
    /// Counter modulus 2^N.
    modulus: f64,
    /// Shaft speed [rad/s].
    velocity: f64,
    /// Counter position [ticks], kept in `[0, modulus)`.
    counter_ticks: f64,
    /// Commanded duty.
    duty: Duty,
    /// Bridge awake and not faulted.
    powered: bool,
    /// Time of the last integration step.
    last_update: Option<Ticks>,
}

impl MotorPlant {
    /// Create a plant at rest.
    pub fn new(config: &BoardConfig) -> Self {
        let modulus = config.counter_modulus() as f64;
        let ticks_per_rad = config.ticks_per_rev as f64 / TAU;
        Self {
            gain: config.simulation.plant_gain,
            tau: config.simulation.time_constant_s,
            ticks_per_rad,
            modulus,
            velocity: 0.0,
            counter_ticks: (config.simulation.initial_counter as f64).rem_euclid(modulus),
            duty: Duty::ZERO,
            powered: false,
            last_update: None,
        }
    }

    /// Integrate up to `now`.
    pub fn advance(&mut self, now: Ticks) {
        let Some(last) = self.last_update else {
            self.last_update = Some(now);
            return;
        };
        let dt = now.secs_since(last);
        if dt <= 0.0 {
            return;
        }

        let target = if self.powered {
            self.gain * self.duty.percent()
        } else {
            0.0
        };
        let decay = (-dt / self.tau).exp();
        let displacement = target * dt + (self.velocity - target) * self.tau * (1.0 - decay);

        self.velocity = target + (self.velocity - target) * decay;
        self.counter_ticks =
            (self.counter_ticks + displacement * self.ticks_per_rad).rem_euclid(self.modulus);
        self.last_update = Some(now);

        trace!(
            velocity = self.velocity,
            counter = self.counter_ticks,
            dt,
            "plant step"
        );
    }

    /// Change the commanded duty at `now`.
    pub fn set_duty(&mut self, now: Ticks, duty: Duty) {
        self.advance(now);
        self.duty = duty;
    }

    /// Power or unpower the windings at `now`.
    pub fn set_powered(&mut self, now: Ticks, powered: bool) {
        self.advance(now);
        self.powered = powered;
    }

    /// Raw counter value at the last integration step.
    pub fn counter(&self) -> u32 {
        // rem_euclid of a tiny negative value rounds up to the modulus itself.
        let ticks = self.counter_ticks.floor();
        if ticks >= self.modulus { 0 } else { ticks as u32 }
    }

    /// Shaft speed [rad/s].
    #[inline]
    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    /// Commanded duty.
    #[inline]
    pub fn duty(&self) -> Duty {
        self.duty
    }

    /// Whether the windings are powered.
    #[inline]
    pub fn is_powered(&self) -> bool {
        self.powered
    }
}
