//! Board driver implementations.
//!
//! - [`simulation`] - Software dual H-bridge with first-order motor plants
//!
//! # Adding New Drivers
//!
//! 1. Create a new submodule under `drivers/`
//! 2. Implement `BoardDriver` from `motorlab_common::hal::driver`
//! 3. Register the factory in [`register_all_drivers`]

pub mod simulation;

use crate::driver_registry::DriverRegistry;
use motorlab_common::hal::driver::HalError;

/// Register every built-in driver.
///
/// # Errors
/// `HalError::ConfigError` if a built-in name is already taken.
pub fn register_all_drivers(registry: &mut DriverRegistry) -> Result<(), HalError> {
    registry.register(
        "simulation",
        "first-order motor plants on a simulated dual H-bridge",
        simulation::create_driver,
    )
}
