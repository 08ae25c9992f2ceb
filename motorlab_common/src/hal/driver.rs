//! HAL driver traits and error types.
//!
//! This module defines:
//! - `BoardDriver` trait - Pluggable board backend (simulation, real hardware)
//! - `EncoderCounter` / `MotorChannel` / `MotorBridge` - Per-peripheral handles
//! - `HalError` enum - Error types for HAL operations
//! - `DriverFactory` type alias - Factory function type

use crate::hal::config::BoardConfig;
use crate::hal::types::{Duty, FaultLatch, MotorId};
use crate::time::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Error types for HAL operations.
#[derive(Debug, Clone, Error)]
pub enum HalError {
    /// Driver initialization failed
    #[error("Initialization failed: {0}")]
    InitFailed(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Driver not found
    #[error("Driver not found: {0}")]
    DriverNotFound(String),

    /// Peripheral handle already taken or not present on this board
    #[error("{0} is not available")]
    ChannelUnavailable(MotorId),

    /// Duty command outside [-100, 100] %
    #[error("Duty {0}% outside [-100, 100]")]
    DutyOutOfRange(f64),

    /// Bridge refused to wake because its fault line is still latched
    #[error("Bridge fault latched")]
    FaultLatched,

    /// Hardware communication error
    #[error("Hardware communication error: {0}")]
    CommunicationError(String),

    /// Peripheral requested before `init()`
    #[error("Driver not initialized")]
    NotInitialized,
}

/// Factory function type for creating driver instances.
pub type DriverFactory = fn() -> Box<dyn BoardDriver>;

/// Free-running quadrature counter of a timer in encoder mode.
///
/// The counter increments and decrements on quadrature edges and wraps
/// modulo `2^width_bits()`. Only explicit reconfiguration resets it.
pub trait EncoderCounter: Send {
    /// Current raw count in `0..2^width_bits()`.
    fn counter(&mut self) -> u32;

    /// Counter width N [bits].
    fn width_bits(&self) -> u32;
}

/// One PWM channel pair of the H-bridge.
pub trait MotorChannel: Send {
    /// Channel identity.
    fn id(&self) -> MotorId;

    /// Apply a signed duty cycle.
    fn set_duty(&mut self, duty: Duty) -> Result<(), HalError>;
}

/// The H-bridge driver chip shared by both channels.
///
/// The bridge owns the fault line. When protection circuitry trips, the
/// implementation latches the fault and puts the bridge to sleep; it stays
/// disabled until the control side clears the latch and calls `enable()`.
pub trait MotorBridge: Send + Sync {
    /// Bring the bridge out of sleep.
    fn enable(&self) -> Result<(), HalError>;

    /// Put the bridge to sleep (outputs floating).
    fn disable(&self) -> Result<(), HalError>;

    /// Whether the bridge is awake.
    fn is_enabled(&self) -> bool;

    /// Handle to the latched fault line.
    fn fault(&self) -> FaultLatch;
}

/// Trait defining the interface for board drivers.
///
/// # Lifecycle
///
/// 1. `init()` - Called once before the scheduler starts
/// 2. `encoder()` / `motor()` / `bridge()` - Hand out peripheral handles;
///    each channel handle can be taken once
/// 3. `shutdown()` - Called after every task has driven its outputs safe
pub trait BoardDriver: Send {
    /// Returns the driver's unique identifier (e.g., "simulation").
    fn name(&self) -> &'static str;

    /// Returns the driver's semantic version.
    fn version(&self) -> &'static str;

    /// Initialize the board.
    ///
    /// # Errors
    /// Return `HalError::InitFailed` if initialization cannot complete.
    fn init(&mut self, config: &BoardConfig, clock: Arc<dyn Clock>) -> Result<(), HalError>;

    /// Take the encoder counter of a channel.
    fn encoder(&mut self, id: MotorId) -> Result<Box<dyn EncoderCounter>, HalError>;

    /// Take the PWM outputs of a channel.
    fn motor(&mut self, id: MotorId) -> Result<Box<dyn MotorChannel>, HalError>;

    /// Shared bridge handle.
    fn bridge(&self) -> Result<Arc<dyn MotorBridge>, HalError>;

    /// Graceful shutdown of the driver.
    fn shutdown(&mut self) -> Result<(), HalError>;
}
