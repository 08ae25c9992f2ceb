//! # Motorlab Control Library
//!
//! Closed-loop DC motor velocity control on a cooperative task loop.
//! Encoder tasks turn wrapping hardware counters into position and
//! velocity, motor tasks close a PID loop onto PWM duty, and a user task
//! exposes a single-key command line with data capture.
//!
//! ## Data Flow
//!
//! ```text
//! EncoderCounter ─► EncoderTask ─► MotorShare.{position,velocity}
//!                                         │
//!            MotorShare.reference_velocity ▼
//!                                     MotorTask ─► MotorChannel (duty)
//!                                         ▲
//!                         Terminal ◄─► UserTask
//! ```
//!
//! Everything runs on one thread. Shared cells are `Rc<Cell<T>>`; only
//! the fault latch and the stop flag cross threads.

pub mod config;
pub mod control;
pub mod encoder;
pub mod error;
pub mod runner;
pub mod scheduler;
pub mod shares;
pub mod tasks;
pub mod ui;

pub use error::ControlError;
pub use runner::ControlRunner;
