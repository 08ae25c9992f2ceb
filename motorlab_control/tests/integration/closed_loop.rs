//! Closed-loop velocity control on the simulated plant.
//!
//! Plant: 2 rad/s per %, τ = 50 ms. With Kp = 0.4, Ki = 4 the closed loop
//! poles sit near -5 and -31 rad/s, so three seconds is plenty to settle.

use super::{Rig, tuned_config};
use motorlab_common::hal::types::MotorId;

fn mean(samples: &[f64]) -> f64 {
    samples.iter().sum::<f64>() / samples.len() as f64
}

#[test]
fn pi_loop_settles_on_the_setpoint() {
    let mut rig = Rig::new(&tuned_config());
    let motor = rig.share(MotorId::One);
    motor.reference_velocity.write(50.0);

    rig.advance_ms(3_000);

    // The measured velocity jitters by one tick per encoder period.
    let mut velocity = Vec::new();
    let mut duty = Vec::new();
    for _ in 0..200 {
        rig.advance_ms(1);
        velocity.push(motor.velocity.read());
        duty.push(motor.duty.read());
    }

    let v = mean(&velocity);
    assert!((v - 50.0).abs() < 1.5, "mean velocity {v}");
    // Steady state duty is setpoint / plant gain.
    let d = mean(&duty);
    assert!((d - 25.0).abs() < 2.0, "mean duty {d}");
    assert!(!motor.fault.read());
}

#[test]
fn other_motor_stays_idle() {
    let mut rig = Rig::new(&tuned_config());
    rig.share(MotorId::One).reference_velocity.write(30.0);

    rig.advance_ms(500);

    let idle = rig.share(MotorId::Two);
    assert_eq!(idle.duty.read(), 0.0);
    assert_eq!(idle.velocity.read(), 0.0);
    assert_eq!(idle.position.read(), 0.0);
    assert!(rig.share(MotorId::One).velocity.read() > 10.0);
}

#[test]
fn large_error_saturates_duty() {
    let mut config = tuned_config();
    config.controller.kp = 2.0;
    config.controller.ki = 0.0;
    let mut rig = Rig::new(&config);
    let motor = rig.share(MotorId::One);
    motor.reference_velocity.write(60.0);

    rig.advance_ms(4);

    // 2 × 60 = 120 % clamps at the upper limit.
    assert_eq!(motor.duty.read(), 100.0);
}

#[test]
fn negative_setpoint_drives_backwards() {
    let mut rig = Rig::new(&tuned_config());
    let motor = rig.share(MotorId::One);
    motor.reference_velocity.write(-20.0);

    rig.advance_ms(2_000);

    assert!(motor.velocity.read() < -15.0);
    assert!(motor.position.read() < 0.0);
    assert!(motor.duty.read() < 0.0);
}

#[test]
fn gains_are_hot_swapped_from_the_share() {
    let mut config = tuned_config();
    config.controller.kp = 0.0;
    config.controller.ki = 0.0;
    let mut rig = Rig::new(&config);
    let motor = rig.share(MotorId::One);
    motor.reference_velocity.write(40.0);

    rig.advance_ms(100);
    assert_eq!(motor.duty.read(), 0.0);

    motor.gains.write(motorlab_control::control::pid::PidGains::new(0.4, 4.0, 0.0));
    rig.advance_ms(2_000);
    assert!((motor.velocity.read() - 40.0).abs() < 3.0);
}
