//! Simulation driver implementation.
//!
//! The `SimulationDriver` implements the `BoardDriver` trait to provide a
//! software dual H-bridge with encoders for development and testing without
//! the physical board.

use super::io::{SharedPlant, SimBridge, SimEncoder, SimMotorChannel};
use super::physics::MotorPlant;
use motorlab_common::consts::MAX_MOTORS;
use motorlab_common::hal::config::BoardConfig;
use motorlab_common::hal::driver::{
    BoardDriver, EncoderCounter, HalError, MotorBridge, MotorChannel,
};
use motorlab_common::hal::types::MotorId;
use motorlab_common::time::Clock;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info};

/// Everything created by `init()`.
struct Board {
    config: BoardConfig,
    clock: Arc<dyn Clock>,
    plants: Vec<SharedPlant>,
    bridge: Arc<SimBridge>,
    encoder_taken: [bool; MAX_MOTORS],
    motor_taken: [bool; MAX_MOTORS],
}

impl Board {
    fn plant(&self, id: MotorId) -> Result<SharedPlant, HalError> {
        self.plants
            .get(id.index())
            .cloned()
            .ok_or(HalError::ChannelUnavailable(id))
    }
}

/// Simulation driver implementing the BoardDriver trait.
pub struct SimulationDriver {
    /// Driver name
    name: &'static str,
    /// Driver version
    version: &'static str,
    /// Populated by `init()`
    board: Option<Board>,
}

impl SimulationDriver {
    /// Create a new simulation driver instance.
    pub fn new() -> Self {
        Self {
            name: "simulation",
            version: env!("CARGO_PKG_VERSION"),
            board: None,
        }
    }

    /// Concrete bridge handle, for injecting faults.
    pub fn sim_bridge(&self) -> Result<Arc<SimBridge>, HalError> {
        Ok(self.board()?.bridge.clone())
    }

    fn board(&self) -> Result<&Board, HalError> {
        self.board.as_ref().ok_or(HalError::NotInitialized)
    }

    fn board_mut(&mut self) -> Result<&mut Board, HalError> {
        self.board.as_mut().ok_or(HalError::NotInitialized)
    }
}

impl Default for SimulationDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl BoardDriver for SimulationDriver {
    fn name(&self) -> &'static str {
        self.name
    }

    fn version(&self) -> &'static str {
        self.version
    }

    fn init(&mut self, config: &BoardConfig, clock: Arc<dyn Clock>) -> Result<(), HalError> {
        config
            .validate()
            .map_err(|e| HalError::InitFailed(e.to_string()))?;

        info!(
            "Initializing simulation driver with {} motors, {}-bit counters, {} ticks/rev",
            config.motors, config.counter_bits, config.ticks_per_rev
        );

        let plants: Vec<SharedPlant> = (0..config.motors)
            .map(|_| Arc::new(Mutex::new(MotorPlant::new(config))))
            .collect();
        let bridge = Arc::new(SimBridge::new(plants.clone(), clock.clone()));

        self.board = Some(Board {
            config: config.clone(),
            clock,
            plants,
            bridge,
            encoder_taken: [false; MAX_MOTORS],
            motor_taken: [false; MAX_MOTORS],
        });

        debug!(
            plant_gain = config.simulation.plant_gain,
            time_constant_s = config.simulation.time_constant_s,
            overcurrent_duty = ?config.simulation.overcurrent_duty,
            "Simulation plants ready"
        );
        Ok(())
    }

    fn encoder(&mut self, id: MotorId) -> Result<Box<dyn EncoderCounter>, HalError> {
        let board = self.board_mut()?;
        let plant = board.plant(id)?;
        if std::mem::replace(&mut board.encoder_taken[id.index()], true) {
            return Err(HalError::ChannelUnavailable(id));
        }
        debug!("Encoder for {id} handed out");
        Ok(Box::new(SimEncoder::new(
            plant,
            board.clock.clone(),
            board.config.counter_bits,
        )))
    }

    fn motor(&mut self, id: MotorId) -> Result<Box<dyn MotorChannel>, HalError> {
        let board = self.board_mut()?;
        let plant = board.plant(id)?;
        if std::mem::replace(&mut board.motor_taken[id.index()], true) {
            return Err(HalError::ChannelUnavailable(id));
        }
        debug!("PWM channel for {id} handed out");
        Ok(Box::new(SimMotorChannel::new(
            id,
            plant,
            board.bridge.clone(),
            board.clock.clone(),
            board.config.simulation.overcurrent_duty,
        )))
    }

    fn bridge(&self) -> Result<Arc<dyn MotorBridge>, HalError> {
        let bridge: Arc<dyn MotorBridge> = self.board()?.bridge.clone();
        Ok(bridge)
    }

    fn shutdown(&mut self) -> Result<(), HalError> {
        if let Some(board) = &self.board {
            board.bridge.disable()?;
        }
        info!("Simulation driver shutdown complete");
        Ok(())
    }
}
