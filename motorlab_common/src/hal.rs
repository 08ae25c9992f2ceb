//! Hardware abstraction layer contracts.
//!
//! - [`config`] - Board configuration handed to drivers at `init()`
//! - [`driver`] - `BoardDriver` and the per-peripheral traits, `HalError`
//! - [`types`] - `Duty`, `FaultLatch`, `MotorId`

pub mod config;
pub mod driver;
pub mod types;
