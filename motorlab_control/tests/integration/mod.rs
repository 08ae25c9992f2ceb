//! Shared rig for integration tests.

mod closed_loop;
mod encoder_wrap;
mod fault_recovery;
mod operator_session;
mod scheduling;
mod shutdown;
mod startup;

use motorlab_common::hal::types::MotorId;
use motorlab_common::time::{Clock, ManualClock, Ticks};
use motorlab_control::ControlRunner;
use motorlab_control::config::ControlConfig;
use motorlab_control::shares::MotorShare;
use motorlab_control::ui::terminal::ScriptedTerminal;
use motorlab_hal::drivers::simulation::SimulationDriver;
use std::sync::Arc;

/// Poll granularity of the rig [µs].
pub const STEP_US: u32 = 1_000;

/// Simulation board + runner on a manual clock.
pub struct Rig {
    pub runner: ControlRunner,
    pub clock: ManualClock,
    pub term: ScriptedTerminal,
}

impl Rig {
    pub fn new(config: &ControlConfig) -> Self {
        let clock = ManualClock::starting_at(Ticks::ZERO);
        let term = ScriptedTerminal::new();
        let runner = ControlRunner::new(
            config,
            Box::new(SimulationDriver::new()),
            Arc::new(clock.clone()),
            Box::new(term.clone()),
        )
        .expect("runner should start");
        Self {
            runner,
            clock,
            term,
        }
    }

    pub fn share(&self, motor: MotorId) -> MotorShare {
        self.runner.share(motor).expect("motor present").clone()
    }

    /// Advance simulated time, polling every `STEP_US`.
    pub fn advance_ms(&mut self, ms: u32) {
        for _ in 0..(ms * 1_000 / STEP_US) {
            self.clock.advance(STEP_US);
            self.runner
                .poll(self.clock.now())
                .expect("tasks should not fail");
        }
    }

    /// Type keys and give the UI one period per key.
    pub fn type_keys(&mut self, keys: &[u8], user_period_ms: u32) {
        self.term.type_keys(keys);
        while self.term.pending_keys() > 0 {
            self.advance_ms(user_period_ms);
        }
    }
}

/// Configuration with a PI loop that settles in well under a second.
pub fn tuned_config() -> ControlConfig {
    let mut config = ControlConfig::default();
    config.controller.kp = 0.4;
    config.controller.ki = 4.0;
    config
}
