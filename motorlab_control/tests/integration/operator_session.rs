//! Operator sessions typed through the scripted terminal.

use super::{Rig, tuned_config};
use motorlab_common::hal::types::MotorId;
use motorlab_control::control::pid::PidGains;
use motorlab_control::config::ControlConfig;
use motorlab_control::ui::recorder::Capture;

const USER_PERIOD_MS: u32 = 40;

fn untuned_config() -> ControlConfig {
    let mut config = tuned_config();
    config.controller.kp = 0.0;
    config.controller.ki = 0.0;
    config
}

/// Lines following the last occurrence of `header`.
fn csv_after(lines: &[String], header: &str) -> Vec<String> {
    let start = lines
        .iter()
        .rposition(|line| line == header)
        .expect("CSV header printed");
    lines[start + 1..]
        .iter()
        .take_while(|line| line.as_str() != "Capture complete")
        .cloned()
        .collect()
}

fn parse_row(row: &str) -> Vec<f64> {
    row.split(',')
        .map(|field| field.trim().parse().expect("numeric CSV field"))
        .collect()
}

#[test]
fn menu_is_printed_on_the_first_user_run() {
    let mut rig = Rig::new(&untuned_config());
    assert!(rig.term.lines().is_empty());

    rig.advance_ms(USER_PERIOD_MS);

    assert!(rig.term.contains("MOTORLAB COMMANDS"));
    assert!(rig.term.contains("c / C   Clear a bridge fault"));
}

#[test]
fn step_response_session_prints_csv_and_idles_motors() {
    let mut rig = Rig::new(&untuned_config());
    rig.advance_ms(USER_PERIOD_MS);

    rig.type_keys(b"1", USER_PERIOD_MS);
    rig.type_keys(b"0.4\r4\r0\r30\r", USER_PERIOD_MS);

    let motor = rig.share(MotorId::One);
    assert_eq!(motor.gains.read(), PidGains::new(0.4, 4.0, 0.0));
    assert_eq!(motor.reference_velocity.read(), 30.0);
    assert!(rig.term.contains("Stepping motor 1 to 30 rad/s"));

    rig.advance_ms(10_000 + 2 * USER_PERIOD_MS);

    let lines = rig.term.lines();
    let rows = csv_after(&lines, Capture::DutyVelocity.header());
    assert_eq!(rows.len(), 250);
    assert!(rig.term.contains("Capture complete"));

    let first = parse_row(&rows[0]);
    assert_eq!(first[0], 0.0);
    let last = parse_row(&rows[rows.len() - 1]);
    assert!((last[0] - 9.96).abs() < 1e-9);
    // Settled: duty near 15 %, velocity near 30 rad/s.
    assert!((last[1] - 15.0).abs() < 2.0, "duty {}", last[1]);
    assert!((last[2] - 30.0).abs() < 1.5, "velocity {}", last[2]);

    for share in rig.runner.shares() {
        assert_eq!(share.reference_velocity.read(), 0.0);
        assert_eq!(share.gains.read(), PidGains::ZERO);
    }
    rig.advance_ms(100);
    assert_eq!(motor.duty.read(), 0.0);
}

#[test]
fn setpoint_entry_sets_reference_of_addressed_motor() {
    let mut rig = Rig::new(&tuned_config());
    rig.advance_ms(USER_PERIOD_MS);

    rig.type_keys(b"M-12.5\r", USER_PERIOD_MS);

    assert_eq!(rig.share(MotorId::Two).reference_velocity.read(), -12.5);
    assert_eq!(rig.share(MotorId::One).reference_velocity.read(), 0.0);
    assert!(rig.term.contains("Motor 2 setpoint: -12.5 rad/s"));

    rig.advance_ms(2_000);
    assert!((rig.share(MotorId::Two).velocity.read() + 12.5).abs() < 1.5);
}

#[test]
fn print_commands_report_position_and_velocity() {
    let mut rig = Rig::new(&tuned_config());
    rig.advance_ms(USER_PERIOD_MS);
    rig.share(MotorId::One).reference_velocity.write(20.0);
    rig.advance_ms(2_000);

    rig.type_keys(b"pd", USER_PERIOD_MS);

    assert!(rig.term.contains("Motor 1 position (rad): "));
    assert!(rig.term.contains("Motor 1 velocity (rad/s): "));
}

#[test]
fn position_capture_can_be_stopped_early() {
    let mut rig = Rig::new(&tuned_config());
    rig.advance_ms(USER_PERIOD_MS);
    rig.share(MotorId::One).reference_velocity.write(10.0);

    rig.type_keys(b"g", USER_PERIOD_MS);
    assert!(rig.term.contains("Collecting motor 1 data for 30 s"));
    rig.advance_ms(1_000);
    rig.type_keys(b"s", USER_PERIOD_MS);

    let lines = rig.term.lines();
    let rows = csv_after(&lines, Capture::PositionVelocity.header());
    assert!(rows.len() >= 20 && rows.len() <= 30, "{} rows", rows.len());
    assert!(rig.term.contains("Capture complete"));

    // Positions in a forward run never decrease.
    let positions: Vec<f64> = rows.iter().map(|row| parse_row(row)[1]).collect();
    assert!(positions.windows(2).all(|pair| pair[1] >= pair[0]));
    assert_eq!(rig.share(MotorId::One).reference_velocity.read(), 0.0);
}

#[test]
fn escape_abandons_entry_and_reprints_menu() {
    let mut rig = Rig::new(&tuned_config());
    rig.advance_ms(USER_PERIOD_MS);
    rig.term.clear_output();

    rig.type_keys(b"m42", USER_PERIOD_MS);
    rig.type_keys(&[motorlab_control::tasks::user::KEY_ESCAPE], USER_PERIOD_MS);
    rig.advance_ms(USER_PERIOD_MS);

    assert!(rig.term.contains("MOTORLAB COMMANDS"));
    assert_eq!(rig.share(MotorId::One).reference_velocity.read(), 0.0);

    // Back in command mode: digits are not a setpoint any more.
    rig.type_keys(b"7\r", USER_PERIOD_MS);
    assert_eq!(rig.share(MotorId::One).reference_velocity.read(), 0.0);
}
