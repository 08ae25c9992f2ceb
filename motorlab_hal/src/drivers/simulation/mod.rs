//! Simulation driver module.
//!
//! Emulates one dual H-bridge with a fault line, two DC motors modelled as
//! first-order velocity plants, and two wrapping quadrature counters, all
//! paced by the same [`Clock`](motorlab_common::time::Clock) as the scheduler.

mod driver;
mod io;
mod physics;

pub use driver::SimulationDriver;
pub use io::{SimBridge, SimEncoder, SimMotorChannel};
pub use physics::MotorPlant;

use motorlab_common::hal::driver::BoardDriver;

/// Factory function to create a simulation driver instance.
pub fn create_driver() -> Box<dyn BoardDriver> {
    Box::new(SimulationDriver::new())
}
