//! Periodic tasks run by the [`Scheduler`](crate::scheduler::Scheduler).
//!
//! Registration order is data-flow order: encoder tasks publish position
//! and velocity, motor tasks consume them, the user task observes both.

pub mod encoder;
pub mod motor;
pub mod user;

pub use encoder::EncoderTask;
pub use motor::MotorTask;
pub use user::UserTask;
