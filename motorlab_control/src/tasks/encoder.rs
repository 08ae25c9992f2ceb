//! Encoder task: counter → position/velocity cells.

use crate::encoder::{EncoderScale, EncoderTracker};
use crate::error::ControlError;
use crate::scheduler::Task;
use crate::shares::MotorShare;
use motorlab_common::hal::types::MotorId;
use motorlab_common::time::Ticks;
use tracing::debug;

/// Samples one encoder per period and publishes SI values.
///
/// Velocity is the last delta over the nominal period, not the measured
/// time between runs.
pub struct EncoderTask {
    tracker: EncoderTracker,
    scale: EncoderScale,
    period_s: f64,
    share: MotorShare,
}

impl EncoderTask {
    /// Create the task. `period_us` must match the scheduler registration.
    pub fn new(
        tracker: EncoderTracker,
        scale: EncoderScale,
        period_us: u32,
        share: MotorShare,
    ) -> Self {
        Self {
            tracker,
            scale,
            period_s: period_us as f64 * 1e-6,
            share,
        }
    }
}

impl Task for EncoderTask {
    fn name(&self) -> &'static str {
        match self.share.id {
            MotorId::One => "encoder 1",
            MotorId::Two => "encoder 2",
        }
    }

    fn run(&mut self, _now: Ticks) -> Result<(), ControlError> {
        if self.share.take_zero_request() {
            self.tracker.set_position(0);
            debug!(motor = %self.share.id, "Encoder position zeroed");
        }

        let delta = self.tracker.update();
        self.share
            .position
            .write(self.scale.radians(self.tracker.position()));
        self.share
            .velocity
            .write(self.scale.velocity(delta, self.period_s));
        Ok(())
    }
}
