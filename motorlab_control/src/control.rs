//! Control engine root.
//!
//! Velocity loop: PID with fixed output limits, one instance per motor.

pub mod pid;
