//! Configuration loading and control unit startup.

use super::{Rig, tuned_config};
use motorlab_common::config::ConfigError;
use motorlab_common::hal::driver::HalError;
use motorlab_common::time::{ManualClock, Ticks};
use motorlab_control::config::ControlConfig;
use motorlab_control::control::pid::PidGains;
use motorlab_control::ui::terminal::ScriptedTerminal;
use motorlab_control::{ControlError, ControlRunner};
use motorlab_hal::drivers::simulation::SimulationDriver;
use std::path::Path;
use std::sync::Arc;

fn start(config: &ControlConfig) -> Result<ControlRunner, ControlError> {
    ControlRunner::new(
        config,
        Box::new(SimulationDriver::new()),
        Arc::new(ManualClock::starting_at(Ticks::ZERO)),
        Box::new(ScriptedTerminal::new()),
    )
}

#[test]
fn shipped_config_file_is_valid() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config/motorlab.toml");
    let config = ControlConfig::load_validated(&path).unwrap();

    assert_eq!(config.scheduler.motor_period_us, 2_000);
    assert_eq!(config.encoder.counter_bits, 16);
    assert_eq!(config.controller.gains(), PidGains::new(0.4, 4.0, 0.0));
    assert!(config.simulation.overcurrent_duty.is_none());
}

#[test]
fn runner_starts_with_bridge_enabled_and_seeded_gains() {
    let rig = Rig::new(&tuned_config());

    assert!(rig.runner.bridge().is_enabled());
    assert_eq!(rig.runner.shares().len(), 2);
    for share in rig.runner.shares() {
        assert_eq!(share.gains.read(), PidGains::new(0.4, 4.0, 0.0));
        assert_eq!(share.reference_velocity.read(), 0.0);
    }

    let names: Vec<&str> = rig
        .runner
        .scheduler()
        .tasks()
        .iter()
        .map(|task| task.name())
        .collect();
    assert_eq!(names, ["encoder 1", "encoder 2", "motor 1", "motor 2", "user"]);
}

#[test]
fn zero_period_is_rejected_before_the_board_starts() {
    let mut config = tuned_config();
    config.scheduler.motor_period_us = 0;

    let err = start(&config).err().expect("startup must fail");
    assert!(matches!(err, ControlError::Config(ConfigError::ValidationError(_))));
}

#[test]
fn inverted_saturation_is_rejected() {
    let mut config = tuned_config();
    config.controller.saturation_low = 50.0;
    config.controller.saturation_high = -50.0;

    assert!(start(&config).is_err());
}

#[test]
fn unknown_driver_name_is_reported() {
    let registry = motorlab_hal::default_registry().unwrap();
    assert!(registry.list_drivers().contains(&"simulation"));

    let err = registry.create_driver("stm32").err().expect("no such driver");
    assert!(matches!(err, HalError::DriverNotFound(name) if name == "stm32"));
}
