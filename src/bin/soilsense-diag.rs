// soilsense-diag: calibration diagnostics CLI
//
// Operates on a calibration state file the same way the device firmware
// does, so profiles can be inspected, produced, and migrated off-device.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use soilsense::{AppConfig, CalibrationManager, Channel, FileRepository};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let cli = Cli::parse();
    match cli.execute() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("soilsense-diag error: {err:?}");
            ExitCode::from(1)
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "soilsense-diag", about = "Sensor calibration diagnostics CLI")]
struct Cli {
    /// Path of the calibration state file.
    #[arg(long, default_value = "calibration_state.json")]
    state_file: PathBuf,

    /// Optional JSON config file for quality thresholds.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the calibration status report.
    Status,
    /// Run a two-point calibration for one channel.
    Calibrate(CalibrateArgs),
    /// Apply calibration plus environmental compensation to a raw reading.
    Apply(ApplyArgs),
    /// Enable calibration correction globally.
    Enable,
    /// Disable calibration correction globally (profiles are kept).
    Disable,
    /// Return a channel to the uncalibrated identity profile.
    Reset {
        /// Channel name (ec, ph, temperature, humidity, nitrogen, phosphorus, potassium).
        channel: String,
    },
    /// Export the calibration state document to stdout or a file.
    Export {
        /// Destination file; stdout when omitted.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Import a calibration state document, replacing the current state.
    Import {
        /// Source file containing an exported document.
        input: PathBuf,
    },
}

#[derive(Args, Debug)]
struct CalibrateArgs {
    /// Channel name.
    channel: String,
    /// Reference value of the first point.
    expected_1: f64,
    /// Sensor reading at the first point.
    measured_1: f64,
    /// Reference value of the second point.
    expected_2: f64,
    /// Sensor reading at the second point.
    measured_2: f64,
}

#[derive(Args, Debug)]
struct ApplyArgs {
    /// Channel name.
    channel: String,
    /// Raw sensor reading.
    raw: f64,
    /// Ambient temperature in °C.
    #[arg(long, default_value_t = 25.0)]
    temperature: f64,
    /// Soil moisture in %.
    #[arg(long, default_value_t = 30.0)]
    humidity: f64,
}

impl Cli {
    fn execute(self) -> Result<()> {
        let config = match &self.config {
            Some(path) => AppConfig::load_from_file(path),
            None => AppConfig::default(),
        };

        let manager =
            CalibrationManager::new(&config, Box::new(FileRepository::new(&self.state_file)));
        manager.boot();

        match self.command {
            Command::Status => {
                let report = manager.status().to_legacy_json();
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
            Command::Calibrate(args) => {
                let channel = Channel::from_str(&args.channel)?;
                let outcome = manager.calibrate(
                    channel,
                    args.expected_1,
                    args.measured_1,
                    args.expected_2,
                    args.measured_2,
                )?;
                println!(
                    "{} calibrated: scale={:.6} shift={:.6} quality={}",
                    channel,
                    outcome.scale,
                    outcome.shift,
                    outcome.quality.as_str()
                );
            }
            Command::Apply(args) => {
                let channel = Channel::from_str(&args.channel)?;
                let compensated = manager.apply_compensation(
                    channel,
                    args.raw,
                    args.temperature,
                    args.humidity,
                );
                println!("{compensated}");
            }
            Command::Enable => {
                manager.set_enabled(true)?;
                println!("calibration enabled");
            }
            Command::Disable => {
                manager.set_enabled(false)?;
                println!("calibration disabled");
            }
            Command::Reset { channel } => {
                let channel = Channel::from_str(&channel)?;
                manager.reset(channel)?;
                println!("{channel} reset to identity profile");
            }
            Command::Export { output } => {
                let document = manager.export_profile()?;
                match output {
                    Some(path) => {
                        fs::write(&path, document)
                            .context(format!("writing export to {path:?}"))?;
                        println!("exported to {path:?}");
                    }
                    None => println!("{document}"),
                }
            }
            Command::Import { input } => {
                let document = fs::read_to_string(&input)
                    .context(format!("reading import document {input:?}"))?;
                manager.import_profile(&document)?;
                println!("import committed");
            }
        }

        Ok(())
    }
}
