//! Wiring of board, shares and tasks into one scheduler.
//!
//! ## Startup
//! 1. `BoardDriver::init` with the board section of the configuration.
//! 2. One [`MotorShare`] per motor, seeded with the configured gains.
//! 3. Tasks registered producers first: encoders, motors, then the UI.
//! 4. Bridge enabled.
//!
//! ## Shutdown
//! Scheduler stops → every task drives its outputs safe → bridge disabled →
//! driver shut down. The hardware steps run even if a task failed.

use crate::config::ControlConfig;
use crate::control::pid::PidController;
use crate::encoder::{EncoderScale, EncoderTracker};
use crate::error::ControlError;
use crate::scheduler::Scheduler;
use crate::shares::MotorShare;
use crate::tasks::{EncoderTask, MotorTask, UserTask};
use crate::ui::terminal::Terminal;
use motorlab_common::hal::driver::{BoardDriver, MotorBridge};
use motorlab_common::hal::types::MotorId;
use motorlab_common::time::{Clock, Ticks};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use tracing::{info, warn};

/// A fully wired control unit.
pub struct ControlRunner {
    scheduler: Scheduler,
    driver: Box<dyn BoardDriver>,
    bridge: Arc<dyn MotorBridge>,
    shares: Vec<MotorShare>,
}

impl ControlRunner {
    /// Initialize the board and register every task.
    ///
    /// # Errors
    /// Invalid configuration, or any HAL error while taking handles.
    pub fn new(
        config: &ControlConfig,
        mut driver: Box<dyn BoardDriver>,
        clock: Arc<dyn Clock>,
        terminal: Box<dyn Terminal>,
    ) -> Result<Self, ControlError> {
        config.validate()?;
        let board = config.board_config();
        driver.init(&board, clock.clone())?;
        info!(
            "Board driver '{}' v{} initialized",
            driver.name(),
            driver.version()
        );

        let bridge = driver.bridge()?;
        let saturation = config.controller.saturation()?;
        let gains = config.controller.gains();
        let periods = config.scheduler;
        let scale = EncoderScale::new(config.encoder.ticks_per_rev);

        let motors: Vec<MotorId> = MotorId::ALL.into_iter().take(board.motors).collect();
        let shares: Vec<MotorShare> = motors
            .iter()
            .map(|&id| {
                let share = MotorShare::new(id);
                share.gains.write(gains);
                share
            })
            .collect();

        let mut scheduler = Scheduler::new(clock.now());
        for share in &shares {
            let tracker = EncoderTracker::new(driver.encoder(share.id)?);
            let task = EncoderTask::new(tracker, scale, periods.encoder_period_us, share.clone());
            scheduler.add(periods.encoder_period_us, Box::new(task))?;
        }
        for share in &shares {
            let channel = driver.motor(share.id)?;
            let pid = PidController::new(gains, saturation);
            let task = MotorTask::new(
                channel,
                bridge.clone(),
                pid,
                periods.motor_period_us,
                share.clone(),
            );
            scheduler.add(periods.motor_period_us, Box::new(task))?;
        }
        let user = UserTask::new(terminal, shares.clone());
        scheduler.add(periods.user_period_us, Box::new(user))?;

        bridge.enable()?;
        info!(
            motors = shares.len(),
            encoder_period_us = periods.encoder_period_us,
            motor_period_us = periods.motor_period_us,
            user_period_us = periods.user_period_us,
            "ControlRunner initialized"
        );

        Ok(Self {
            scheduler,
            driver,
            bridge,
            shares,
        })
    }

    /// Shares of every motor, in motor order.
    pub fn shares(&self) -> &[MotorShare] {
        &self.shares
    }

    /// Share of one motor.
    pub fn share(&self, motor: MotorId) -> Option<&MotorShare> {
        self.shares.get(motor.index())
    }

    /// Board bridge.
    pub fn bridge(&self) -> Arc<dyn MotorBridge> {
        self.bridge.clone()
    }

    /// The task loop.
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Run due tasks once (see [`Scheduler::poll`]).
    ///
    /// # Errors
    /// The first task error.
    pub fn poll(&mut self, now: Ticks) -> Result<usize, ControlError> {
        self.scheduler.poll(now)
    }

    /// Run until `running` clears or a task fails, then shut everything down.
    ///
    /// # Errors
    /// The error that stopped the loop, otherwise the first shutdown error.
    pub fn run(&mut self, clock: &dyn Clock, running: &AtomicBool) -> Result<(), ControlError> {
        let outcome = self.scheduler.run(clock, running);
        let hardware = self.shutdown_hardware();
        outcome.and(hardware)
    }

    /// Drive every task safe, then disable the bridge and shut the driver down.
    ///
    /// # Errors
    /// The first error; later steps still run.
    pub fn shutdown(&mut self) -> Result<(), ControlError> {
        let tasks = self.scheduler.shutdown();
        let hardware = self.shutdown_hardware();
        tasks.and(hardware)
    }

    fn shutdown_hardware(&mut self) -> Result<(), ControlError> {
        let bridge = self.bridge.disable();
        if let Err(e) = &bridge {
            warn!("Bridge disable failed: {e}");
        }
        let driver = self.driver.shutdown();
        info!("Hardware shut down");
        bridge.and(driver).map_err(ControlError::from)
    }
}
