//! Bridge fault latch and operator recovery.

use super::{Rig, tuned_config};
use motorlab_common::hal::types::MotorId;
use motorlab_control::config::ControlConfig;
use motorlab_control::control::pid::PidGains;

const USER_PERIOD_MS: u32 = 40;

fn tripping_config() -> ControlConfig {
    let mut config = tuned_config();
    config.controller.kp = 10.0;
    config.controller.ki = 0.0;
    config.simulation.overcurrent_duty = Some(90.0);
    config
}

#[test]
fn overcurrent_latches_fault_and_holds_zero_duty() {
    let mut rig = Rig::new(&tripping_config());
    let motor = rig.share(MotorId::One);
    assert!(rig.runner.bridge().is_enabled());

    motor.reference_velocity.write(50.0);
    rig.advance_ms(20);

    let bridge = rig.runner.bridge();
    assert!(bridge.fault().is_latched());
    assert!(!bridge.is_enabled());
    assert!(motor.fault.read());
    assert_eq!(motor.duty.read(), 0.0);

    // Still latched long after: nothing re-enables the bridge on its own.
    rig.advance_ms(500);
    assert!(bridge.fault().is_latched());
    assert_eq!(motor.duty.read(), 0.0);
    assert!(motor.velocity.read().abs() < 1.0);
}

#[test]
fn fault_is_reported_once_on_the_terminal() {
    let mut rig = Rig::new(&tripping_config());
    rig.share(MotorId::One).reference_velocity.write(50.0);

    rig.advance_ms(400);

    let reports = rig
        .term
        .lines()
        .iter()
        .filter(|line| line.starts_with("Fault detected on motor 1"))
        .count();
    assert_eq!(reports, 1);
}

#[test]
fn clear_command_rearms_the_bridge_and_idles_the_motor() {
    let mut rig = Rig::new(&tripping_config());
    let motor = rig.share(MotorId::One);
    motor.reference_velocity.write(50.0);
    rig.advance_ms(100);
    assert!(motor.fault.read());

    rig.type_keys(b"c", USER_PERIOD_MS);
    rig.advance_ms(10);

    let bridge = rig.runner.bridge();
    assert!(!bridge.fault().is_latched());
    assert!(bridge.is_enabled());
    assert!(!motor.fault.read());
    assert_eq!(motor.reference_velocity.read(), 0.0);
    assert_eq!(motor.gains.read(), PidGains::ZERO);
    assert_eq!(motor.duty.read(), 0.0);
    assert!(rig.term.contains("Clearing fault on motor 1"));
}

#[test]
fn motor_runs_again_after_recovery() {
    let mut rig = Rig::new(&tripping_config());
    let motor = rig.share(MotorId::One);
    motor.reference_velocity.write(50.0);
    rig.advance_ms(100);

    rig.type_keys(b"c", USER_PERIOD_MS);
    rig.advance_ms(10);

    // Gentle gains stay below the trip level.
    motor.gains.write(PidGains::new(0.4, 4.0, 0.0));
    motor.reference_velocity.write(30.0);
    rig.advance_ms(2_000);

    assert!(!rig.runner.bridge().fault().is_latched());
    assert!((motor.velocity.read() - 30.0).abs() < 3.0);
}

#[test]
fn clearing_from_one_motor_idles_the_other() {
    let mut rig = Rig::new(&tripping_config());
    let motor_2 = rig.share(MotorId::Two);
    motor_2.reference_velocity.write(50.0);
    rig.advance_ms(100);
    assert!(rig.runner.bridge().fault().is_latched());
    assert!(motor_2.fault.read());

    // Gains that would drive without tripping, then clear from motor 1.
    motor_2.gains.write(PidGains::new(0.4, 4.0, 0.0));
    rig.type_keys(b"c", USER_PERIOD_MS);
    rig.advance_ms(100);

    assert!(!rig.runner.bridge().fault().is_latched());
    assert!(rig.runner.bridge().is_enabled());
    assert!(!motor_2.fault.read());
    assert_eq!(motor_2.reference_velocity.read(), 0.0);
    assert_eq!(motor_2.gains.read(), PidGains::ZERO);
    assert_eq!(motor_2.duty.read(), 0.0);

    // A second trip on motor 2 is announced again.
    motor_2.gains.write(PidGains::new(10.0, 0.0, 0.0));
    motor_2.reference_velocity.write(50.0);
    rig.advance_ms(100);
    assert!(rig.runner.bridge().fault().is_latched());
    let reports = rig
        .term
        .lines()
        .iter()
        .filter(|line| line.starts_with("Fault detected on motor 2"))
        .count();
    assert_eq!(reports, 2);
}
