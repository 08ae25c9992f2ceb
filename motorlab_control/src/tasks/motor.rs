//! Motor task: velocity PID → PWM duty, with fault latch handling.

use crate::control::pid::{PidController, PidGains};
use crate::error::ControlError;
use crate::scheduler::Task;
use crate::shares::MotorShare;
use motorlab_common::hal::driver::{MotorBridge, MotorChannel};
use motorlab_common::hal::types::{Duty, FaultLatch, MotorId};
use motorlab_common::time::Ticks;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Closes the velocity loop of one motor.
///
/// Each run, in order:
/// 1. a pending fault-clear request zeroes setpoint and gains, resets the
///    PID, clears the latch and wakes the bridge;
/// 2. while the fault is latched the channel is held at 0 %;
/// 3. a latch cleared through the other motor idles this one too;
/// 4. changed gains are hot-swapped into the controller;
/// 5. the PID output is applied as duty.
pub struct MotorTask {
    channel: Box<dyn MotorChannel>,
    bridge: Arc<dyn MotorBridge>,
    fault: FaultLatch,
    pid: PidController,
    period_s: f64,
    share: MotorShare,
    reported_fault: bool,
}

impl MotorTask {
    /// Create the task. `period_us` is the PID `dt` and must match the
    /// scheduler registration.
    pub fn new(
        channel: Box<dyn MotorChannel>,
        bridge: Arc<dyn MotorBridge>,
        pid: PidController,
        period_us: u32,
        share: MotorShare,
    ) -> Self {
        let fault = bridge.fault();
        Self {
            channel,
            bridge,
            fault,
            pid,
            period_s: period_us as f64 * 1e-6,
            share,
            reported_fault: false,
        }
    }

    /// The controller, for diagnostics.
    pub fn pid(&self) -> &PidController {
        &self.pid
    }

    fn apply(&mut self, duty: Duty) -> Result<(), ControlError> {
        self.channel.set_duty(duty)?;
        self.share.duty.write(duty.percent());
        Ok(())
    }

    /// Zero setpoint, gains and accumulator so the motor resumes without a kick.
    fn idle(&mut self) {
        self.share.idle();
        self.pid.set_gains(PidGains::ZERO);
        self.pid.reset();
        self.reported_fault = false;
    }

    fn clear_fault(&mut self) -> Result<(), ControlError> {
        self.idle();
        let was_latched = self.fault.clear();
        self.bridge.enable()?;
        info!(motor = %self.share.id, was_latched, "Fault cleared, bridge re-enabled");
        Ok(())
    }
}

impl Task for MotorTask {
    fn name(&self) -> &'static str {
        match self.share.id {
            MotorId::One => "motor 1",
            MotorId::Two => "motor 2",
        }
    }

    fn run(&mut self, _now: Ticks) -> Result<(), ControlError> {
        if self.share.take_clear_fault_request() {
            self.clear_fault()?;
        }

        if self.fault.is_latched() {
            if !self.reported_fault {
                warn!(motor = %self.share.id, "Bridge fault latched, holding 0% duty");
                self.reported_fault = true;
            }
            self.share.fault.write(true);
            return self.apply(Duty::ZERO);
        }
        if self.reported_fault {
            // The latch is shared by the bridge and was cleared by the other motor.
            self.idle();
            info!(motor = %self.share.id, "Bridge fault cleared elsewhere, motor idled");
        }
        self.share.fault.write(false);

        let gains = self.share.gains.read();
        if gains != self.pid.gains() {
            debug!(motor = %self.share.id, ?gains, "Gains updated");
            self.pid.set_gains(gains);
        }

        let command = self.pid.update(
            self.share.reference_velocity.read(),
            self.share.velocity.read(),
            self.period_s,
        );
        self.apply(Duty::saturating(command))
    }

    fn shutdown(&mut self) -> Result<(), ControlError> {
        debug!(motor = %self.share.id, "Driving motor to 0%");
        self.apply(Duty::ZERO)
    }
}
