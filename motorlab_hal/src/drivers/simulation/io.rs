//! Simulated board peripherals.
//!
//! - `SimEncoder` - Wrapping counter reading the plant position
//! - `SimMotorChannel` - PWM pair driving one plant, with overcurrent injection
//! - `SimBridge` - Sleep/fault control shared by both channels

use super::physics::MotorPlant;
use motorlab_common::hal::driver::{EncoderCounter, HalError, MotorBridge, MotorChannel};
use motorlab_common::hal::types::{Duty, FaultLatch, MotorId};
use motorlab_common::time::Clock;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, warn};

/// Plant shared between the encoder and PWM handles of one channel.
pub(crate) type SharedPlant = Arc<Mutex<MotorPlant>>;

/// Simulated quadrature counter.
pub struct SimEncoder {
    plant: SharedPlant,
    clock: Arc<dyn Clock>,
    bits: u32,
}

impl SimEncoder {
    pub(crate) fn new(plant: SharedPlant, clock: Arc<dyn Clock>, bits: u32) -> Self {
        Self { plant, clock, bits }
    }
}

impl EncoderCounter for SimEncoder {
    fn counter(&mut self) -> u32 {
        let now = self.clock.now();
        let mut plant = self.plant.lock();
        plant.advance(now);
        plant.counter()
    }

    fn width_bits(&self) -> u32 {
        self.bits
    }
}

/// Simulated H-bridge (sleep pin + fault line).
pub struct SimBridge {
    enabled: AtomicBool,
    fault: FaultLatch,
    plants: Vec<SharedPlant>,
    clock: Arc<dyn Clock>,
}

impl SimBridge {
    pub(crate) fn new(plants: Vec<SharedPlant>, clock: Arc<dyn Clock>) -> Self {
        Self {
            enabled: AtomicBool::new(false),
            fault: FaultLatch::new(),
            plants,
            clock,
        }
    }

    /// Latch the fault line and put the bridge to sleep, as the driver chip
    /// does on overcurrent or overtemperature.
    ///
    /// Returns `true` if this call latched the fault.
    pub fn trip(&self) -> bool {
        let latched = self.fault.raise();
        self.enabled.store(false, Ordering::SeqCst);
        self.apply_power();
        latched
    }

    fn apply_power(&self) {
        let powered = self.is_enabled();
        let now = self.clock.now();
        for plant in &self.plants {
            plant.lock().set_powered(now, powered);
        }
    }
}

impl MotorBridge for SimBridge {
    fn enable(&self) -> Result<(), HalError> {
        if self.fault.is_latched() {
            return Err(HalError::FaultLatched);
        }
        self.enabled.store(true, Ordering::SeqCst);
        self.apply_power();
        debug!("Bridge enabled");
        Ok(())
    }

    fn disable(&self) -> Result<(), HalError> {
        self.enabled.store(false, Ordering::SeqCst);
        self.apply_power();
        debug!("Bridge disabled");
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst) && !self.fault.is_latched()
    }

    fn fault(&self) -> FaultLatch {
        self.fault.clone()
    }
}

/// Simulated PWM channel pair.
pub struct SimMotorChannel {
    id: MotorId,
    plant: SharedPlant,
    bridge: Arc<SimBridge>,
    clock: Arc<dyn Clock>,
    overcurrent_duty: Option<f64>,
}

impl SimMotorChannel {
    pub(crate) fn new(
        id: MotorId,
        plant: SharedPlant,
        bridge: Arc<SimBridge>,
        clock: Arc<dyn Clock>,
        overcurrent_duty: Option<f64>,
    ) -> Self {
        Self {
            id,
            plant,
            bridge,
            clock,
            overcurrent_duty,
        }
    }
}

impl MotorChannel for SimMotorChannel {
    fn id(&self) -> MotorId {
        self.id
    }

    fn set_duty(&mut self, duty: Duty) -> Result<(), HalError> {
        if let Some(limit) = self.overcurrent_duty {
            if duty.magnitude() >= limit && self.bridge.is_enabled() && self.bridge.trip() {
                warn!(
                    motor = %self.id,
                    duty = duty.percent(),
                    limit,
                    "Overcurrent: bridge fault latched"
                );
            }
        }

        let now = self.clock.now();
        let powered = self.bridge.is_enabled();
        let mut plant = self.plant.lock();
        plant.set_powered(now, powered);
        plant.set_duty(now, duty);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use motorlab_common::hal::config::BoardConfig;
    use motorlab_common::time::{ManualClock, Ticks};

    fn rig(overcurrent: Option<f64>) -> (ManualClock, Arc<SimBridge>, SimMotorChannel, SimEncoder) {
        let clock = ManualClock::starting_at(Ticks::ZERO);
        let shared: Arc<dyn Clock> = Arc::new(clock.clone());
        let plant: SharedPlant = Arc::new(Mutex::new(MotorPlant::new(&BoardConfig::default())));
        let bridge = Arc::new(SimBridge::new(vec![plant.clone()], shared.clone()));
        let channel = SimMotorChannel::new(
            MotorId::One,
            plant.clone(),
            bridge.clone(),
            shared.clone(),
            overcurrent,
        );
        let encoder = SimEncoder::new(plant, shared, 16);
        (clock, bridge, channel, encoder)
    }

    #[test]
    fn sleeping_bridge_does_not_move_motor() {
        let (clock, _bridge, mut channel, mut encoder) = rig(None);
        let start = encoder.counter();
        channel.set_duty(Duty::saturating(80.0)).unwrap();
        clock.advance(200_000);
        assert_eq!(encoder.counter(), start);
    }

    #[test]
    fn enabled_bridge_moves_motor_forward() {
        let (clock, bridge, mut channel, mut encoder) = rig(None);
        bridge.enable().unwrap();
        let start = encoder.counter();
        channel.set_duty(Duty::saturating(40.0)).unwrap();
        clock.advance(50_000);
        let later = encoder.counter();
        assert!(later > start);
    }

    #[test]
    fn overcurrent_latches_fault_and_sleeps() {
        let (_clock, bridge, mut channel, _encoder) = rig(Some(90.0));
        bridge.enable().unwrap();
        channel.set_duty(Duty::saturating(50.0)).unwrap();
        assert!(!bridge.fault().is_latched());

        channel.set_duty(Duty::saturating(-95.0)).unwrap();
        assert!(bridge.fault().is_latched());
        assert!(!bridge.is_enabled());
    }

    #[test]
    fn enable_refused_while_latched() {
        let (_clock, bridge, _channel, _encoder) = rig(None);
        assert!(bridge.trip());
        assert!(matches!(bridge.enable(), Err(HalError::FaultLatched)));

        assert!(bridge.fault().clear());
        bridge.enable().unwrap();
        assert!(bridge.is_enabled());
    }

    #[test]
    fn external_fault_raise_disables_output() {
        let (_clock, bridge, _channel, _encoder) = rig(None);
        bridge.enable().unwrap();
        bridge.fault().raise();
        assert!(!bridge.is_enabled());
    }
}
