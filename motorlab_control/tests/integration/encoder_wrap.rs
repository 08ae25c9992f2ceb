//! Position tracking across the 16-bit counter wrap.

use super::{Rig, tuned_config};
use motorlab_common::hal::types::MotorId;
use std::f64::consts::TAU;

#[test]
fn position_is_continuous_through_counter_overflow() {
    let mut config = tuned_config();
    // Six ticks below the wrap: the first forward motion overflows.
    config.simulation.initial_counter = 65_530;
    let mut rig = Rig::new(&config);
    let motor = rig.share(MotorId::One);
    motor.reference_velocity.write(20.0);

    let mut previous = motor.position.read();
    for _ in 0..1_000 {
        rig.advance_ms(1);
        let position = motor.position.read();
        assert!(position >= previous, "position went back: {previous} -> {position}");
        assert!(position - previous < 0.2, "position jumped: {previous} -> {position}");
        previous = position;
    }

    // Roughly one second at 20 rad/s, minus the rise time.
    assert!(previous > 10.0 && previous < 25.0, "position {previous}");
    // Far more than one counter revolution of the 4000 tick encoder.
    assert!(previous > TAU);
}

#[test]
fn reverse_motion_through_zero_counts_negative() {
    let mut config = tuned_config();
    config.simulation.initial_counter = 5;
    let mut rig = Rig::new(&config);
    let motor = rig.share(MotorId::One);
    motor.reference_velocity.write(-20.0);

    rig.advance_ms(1_000);

    let position = motor.position.read();
    assert!(position < -10.0 && position > -25.0, "position {position}");
}

#[test]
fn zero_command_resets_position_without_losing_motion() {
    let mut rig = Rig::new(&tuned_config());
    let motor = rig.share(MotorId::One);
    motor.reference_velocity.write(20.0);
    rig.advance_ms(1_000);
    assert!(motor.position.read() > 10.0);

    rig.type_keys(b"z", 40);
    rig.advance_ms(2);
    let after_zero = motor.position.read();
    assert!(after_zero.abs() < 1.0, "position after zero {after_zero}");

    rig.advance_ms(500);
    let moved = motor.position.read();
    assert!((moved - after_zero - 10.0).abs() < 1.5, "moved {moved}");
}
