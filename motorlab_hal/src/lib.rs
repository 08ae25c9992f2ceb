//! # Motorlab HAL Library
//!
//! Board drivers behind the `BoardDriver` trait defined in
//! `motorlab_common::hal::driver`.
//!
//! # Module Structure
//!
//! - [`driver_registry`] - Driver factory registration
//! - [`drivers`] - Driver implementations
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     motorlab_hal                             │
//! │  ┌──────────────────┐         ┌────────────────────────────┐ │
//! │  │ DriverRegistry   │──name──►│ BoardDriver (trait object) │ │
//! │  └──────────────────┘         └─────────────┬──────────────┘ │
//! │                                             │                │
//! │                 ┌───────────────────────────┼──────────────┐ │
//! │                 ▼                           ▼              ▼ │
//! │          EncoderCounter             MotorChannel     MotorBridge
//! └──────────────────────────────────────────────────────────────┘
//! ```

#![deny(missing_docs)]

pub mod driver_registry;
pub mod drivers;

pub use crate::driver_registry::DriverRegistry;

use motorlab_common::hal::driver::HalError;

/// Registry pre-populated with every built-in driver.
///
/// # Errors
/// Propagates a registration conflict from [`drivers::register_all_drivers`].
pub fn default_registry() -> Result<DriverRegistry, HalError> {
    let mut registry = DriverRegistry::new();
    drivers::register_all_drivers(&mut registry)?;
    Ok(registry)
}
