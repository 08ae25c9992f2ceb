//! # Motorlab
//!
//! Velocity-control workbench for two DC motors on a dual H-bridge.
//!
//! Loads the TOML configuration, creates the board driver by name, wires
//! encoder → motor → user tasks into the cooperative scheduler and runs it
//! on wall-clock time until Ctrl-C (or `--duration-s`). On the way out every
//! motor is commanded to 0 %, the bridge is put to sleep and the driver is
//! shut down.

use clap::Parser;
use motorlab_common::config::ConfigError;
use motorlab_common::consts::DEFAULT_CONFIG_PATH;
use motorlab_common::time::{Clock, MonotonicClock};
use motorlab_control::ControlRunner;
use motorlab_control::config::ControlConfig;
use motorlab_control::ui::terminal::StdioTerminal;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

/// Motorlab: closed-loop DC motor velocity control
#[derive(Parser, Debug)]
#[command(name = "motorlab")]
#[command(author = "Motorlab developers")]
#[command(version)]
#[command(about = "Encoder tracking, PID velocity control and a serial-style command UI")]
struct Args {
    /// Path to the configuration TOML.
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Board driver to use.
    #[arg(long, default_value = "simulation")]
    driver: String,

    /// Stop after this many seconds instead of waiting for Ctrl-C.
    #[arg(long, value_name = "SECONDS")]
    duration_s: Option<f64>,

    /// Enable verbose logging (DEBUG level).
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format.
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();
    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            setup_tracing(&args, Level::INFO);
            error!("FATAL: {e}");
            process::exit(1);
        }
    };
    setup_tracing(&args, config.shared.log_level.as_tracing());

    info!("Motorlab v{} starting...", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(&args, &config) {
        error!("FATAL: {e}");
        process::exit(1);
    }

    info!("Motorlab shutdown complete");
}

/// Load the configuration; a missing default file falls back to built-in defaults.
fn load_config(args: &Args) -> Result<ControlConfig, ConfigError> {
    match ControlConfig::load_validated(&args.config) {
        Err(ConfigError::FileNotFound) if args.config == PathBuf::from(DEFAULT_CONFIG_PATH) => {
            let config = ControlConfig::default();
            config.validate()?;
            Ok(config)
        }
        other => other,
    }
}

fn run(args: &Args, config: &ControlConfig) -> Result<(), Box<dyn std::error::Error>> {
    info!(
        "Config OK: service={}, encoder={}µs, motor={}µs, user={}µs",
        config.shared.service_name,
        config.scheduler.encoder_period_us,
        config.scheduler.motor_period_us,
        config.scheduler.user_period_us,
    );

    let registry = motorlab_hal::default_registry()?;
    for (name, description) in registry.describe() {
        info!(driver = name, "Available driver: {description}");
    }
    let driver = registry.create_driver(&args.driver)?;

    let clock = Arc::new(MonotonicClock::new());
    let terminal = StdioTerminal::spawn()?;
    let mut runner = ControlRunner::new(config, driver, clock.clone(), Box::new(terminal))?;

    // Setup signal handler for graceful shutdown.
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        r.store(false, Ordering::SeqCst);
    })?;

    if let Some(seconds) = args.duration_s {
        let limit = Duration::try_from_secs_f64(seconds)?;
        let r = running.clone();
        std::thread::Builder::new()
            .name("run-timer".to_string())
            .spawn(move || {
                std::thread::sleep(limit);
                info!("Run duration elapsed");
                r.store(false, Ordering::SeqCst);
            })?;
    }

    info!("Entering control loop at t={} µs", clock.now().as_micros());
    if let Err(e) = runner.run(clock.as_ref(), &running) {
        error!("Control loop error: {e}");
        return Err(Box::new(e));
    }
    Ok(())
}

/// Setup tracing subscriber based on CLI arguments and the configured level.
fn setup_tracing(args: &Args, configured: Level) {
    let level = if args.verbose { Level::DEBUG } else { configured };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .compact()
            .init();
    }
}
