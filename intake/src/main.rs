//! # Intake Simulation Runner
//!
//! Runs the intake mechanism against simulated hardware in a paced control
//! loop, holding constant intents from the command line and logging a JSON
//! diagnostics snapshot periodically.
//!
//! # Usage
//!
//! ```bash
//! # Spin the wheels at half speed with the clamp closed
//! intake_sim --config config/intake.toml --rotate 0.5 --clamp
//!
//! # Place an object 12 cm from the left sensor, stop after 500 cycles
//! intake_sim --left-cm 12 --cycles 500 -v
//!
//! # JSON logs
//! intake_sim --json
//! ```

use clap::Parser;
use intake::diagnostics::DiagnosticsRegistry;
use intake::drivers::simulation::{self, LEFT_INFRARED, RIGHT_INFRARED, SimulatedHardware};
use intake::{CycleRunner, Intake};
use intake_common::config::{ConfigError, ConfigLoader};
use intake_common::intake::IntakeConfig;
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tracing::{Level, info, warn};
use tracing_subscriber::EnvFilter;

/// Intake simulation runner
#[derive(Parser, Debug)]
#[command(name = "intake_sim")]
#[command(version)]
#[command(about = "Runs the intake mechanism driver against simulated hardware")]
#[command(long_about = None)]
struct Args {
    /// Path to intake configuration file (intake.toml). Defaults apply if missing.
    #[arg(short, long, default_value = intake_common::consts::DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Stop after this many cycles (runs until Ctrl-C otherwise)
    #[arg(long)]
    cycles: Option<u64>,

    /// Motor command held every cycle
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    rotate: f64,

    /// Hold the clamp closed
    #[arg(long)]
    clamp: bool,

    /// Hold the kicker out
    #[arg(long)]
    push: bool,

    /// Hold the arms extended
    #[arg(long)]
    extend: bool,

    /// Simulated left sensor reading in centimeters
    #[arg(long, default_value_t = 30.0)]
    left_cm: f64,

    /// Simulated right sensor reading in centimeters
    #[arg(long, default_value_t = 30.0)]
    right_cm: f64,

    /// Simulated primary motor current in amperes
    #[arg(long, default_value_t = 0.0)]
    current: f64,

    /// Cycles between diagnostics snapshots
    #[arg(long, default_value_t = 50)]
    report_every: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long)]
    json: bool,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("intake_sim: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_config(&args)?;
    config.validate()?;

    setup_tracing(&args, config.shared.log_level.into());
    info!(
        "{} v{} starting (simulation)",
        config.shared.service_name,
        env!("CARGO_PKG_VERSION")
    );

    let hw = SimulatedHardware::new();
    let handles = simulation::create_handles(&hw, &config.wiring);
    let intake = Intake::new(handles, &config);

    hw.set_raw_distance(LEFT_INFRARED, args.left_cm);
    hw.set_raw_distance(RIGHT_INFRARED, args.right_cm);
    hw.set_motor_current(config.wiring.primary_motor_id, args.current);

    let mut registry = DiagnosticsRegistry::new();
    Intake::register_diagnostics(&mut registry);

    let mut runner = CycleRunner::new(intake, Duration::from_micros(config.cycle_time_us.into()));

    let running = runner.running_flag();
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        running.store(false, Ordering::SeqCst);
    })?;

    let report_every = args.report_every.max(1);
    runner.run(
        args.cycles,
        |_, intake| {
            intake.rotate(args.rotate);
            intake.clamp(args.clamp);
            intake.push(args.push);
            intake.extend(args.extend);
        },
        |cycle, intake| {
            if cycle % report_every == 0 {
                match registry.snapshot_json(intake) {
                    Ok(json) => info!(cycle, diagnostics = %json, "intake diagnostics"),
                    Err(e) => warn!("Failed to encode diagnostics: {}", e),
                }
            }
        },
    )?;

    let stats = runner.stats();
    info!(
        "Intake runner stopped: {} cycles, avg={}us, max={}us, violations={}",
        stats.cycle_count,
        stats.avg_cycle_time_us(),
        stats.max_cycle_time_us,
        stats.timing_violations
    );
    Ok(())
}

/// Load intake.toml, falling back to calibrated defaults when it is absent.
fn load_config(args: &Args) -> Result<IntakeConfig, ConfigError> {
    match IntakeConfig::load(&args.config) {
        Ok(config) => Ok(config),
        Err(ConfigError::FileNotFound) => {
            eprintln!(
                "intake_sim: {} not found, using defaults",
                args.config.display()
            );
            Ok(IntakeConfig::default())
        }
        Err(e) => Err(e),
    }
}

/// Setup tracing subscriber from CLI arguments and the configured level.
fn setup_tracing(args: &Args, configured: Level) {
    let level = if args.verbose { Level::DEBUG } else { configured };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
