//! Physics simulation for the simulation driver.

mod motor;

pub use motor::MotorPlant;
