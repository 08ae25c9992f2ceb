//! Safe outputs when the loop stops.

use super::{Rig, tuned_config};
use motorlab_common::hal::types::MotorId;
use std::sync::atomic::AtomicBool;

#[test]
fn shutdown_zeroes_duty_and_disables_bridge() {
    let mut rig = Rig::new(&tuned_config());
    let motor = rig.share(MotorId::One);
    motor.reference_velocity.write(40.0);
    rig.advance_ms(500);
    assert!(motor.duty.read() > 0.0);

    rig.runner.shutdown().unwrap();

    assert_eq!(motor.duty.read(), 0.0);
    assert_eq!(rig.share(MotorId::Two).duty.read(), 0.0);
    assert!(!rig.runner.bridge().is_enabled());
}

#[test]
fn cleared_run_flag_stops_loop_and_makes_outputs_safe() {
    let mut rig = Rig::new(&tuned_config());
    let motor = rig.share(MotorId::One);
    motor.reference_velocity.write(40.0);
    rig.advance_ms(200);

    let running = AtomicBool::new(false);
    let clock = rig.clock.clone();
    rig.runner.run(&clock, &running).unwrap();

    assert_eq!(motor.duty.read(), 0.0);
    assert!(!rig.runner.bridge().is_enabled());
}
