//! CLI module for Lifeline
//!
//! Command-line interface definitions and handlers for the Lifeline monitor.
//!
//! # Commands
//!
//! - `serve` - Start the dashboard server
//! - `predict` - One-shot prediction against the configured service
//! - `simulate` - Print generated samples with their classifications
//! - `config` - Configuration utilities (init, check)
//! - `completions` - Generate shell completions
//!
//! # Example
//!
//! ```bash
//! # Start server and begin streaming simulated readings right away
//! lifeline serve --autostart --kind elevated-heart-rate
//!
//! # Ask the prediction service about a single reading
//! lifeline predict --heart-rate 130 --systolic 150 --diastolic 95 --spo2 91 --temperature 38.2
//!
//! # Generate shell completions
//! lifeline completions bash > ~/.bash_completion.d/lifeline
//! ```

pub mod completions;
pub mod config;
pub mod output;
pub mod predict;
pub mod serve;
pub mod simulate;

pub use completions::handle_completions;
pub use config::{handle_config_check, handle_config_init};

use crate::config::LogFormat;
use crate::controller::Mode;
use crate::source::SimulationKind;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Lifeline - Vital-sign monitor
#[derive(Parser, Debug)]
#[command(
    name = "lifeline",
    version,
    about = "Vital-sign monitoring dashboard with on-demand risk prediction"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the dashboard server
    Serve(ServeArgs),
    /// Request a prediction for one reading
    Predict(PredictArgs),
    /// Print simulated readings
    Simulate(SimulateArgs),
    /// Configuration utilities
    #[command(subcommand)]
    Config(ConfigCommands),
    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "lifeline.toml")]
    pub config: PathBuf,

    /// Override server port
    #[arg(short, long, env = "LIFELINE_PORT")]
    pub port: Option<u16>,

    /// Override server host
    #[arg(short = 'H', long, env = "LIFELINE_HOST")]
    pub host: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "LIFELINE_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Log output format
    #[arg(long, value_enum)]
    pub log_format: Option<LogFormat>,

    /// Source to start with
    #[arg(long, value_enum)]
    pub mode: Option<Mode>,

    /// Simulation scenario
    #[arg(long, value_enum)]
    pub kind: Option<SimulationKind>,

    /// Simulated sample interval in milliseconds
    #[arg(long)]
    pub interval_ms: Option<u64>,

    /// Device feed WebSocket URL
    #[arg(long)]
    pub stream_endpoint: Option<String>,

    /// Prediction service URL
    #[arg(long)]
    pub prediction_endpoint: Option<String>,

    /// Start the configured source as soon as the server is up
    #[arg(long)]
    pub autostart: bool,
}

#[derive(Args, Debug)]
pub struct PredictArgs {
    /// Heart rate (BPM)
    #[arg(long)]
    pub heart_rate: Option<f64>,

    /// Systolic blood pressure (mmHg)
    #[arg(long)]
    pub systolic: Option<f64>,

    /// Diastolic blood pressure (mmHg)
    #[arg(long)]
    pub diastolic: Option<f64>,

    /// Oxygen saturation (%)
    #[arg(long)]
    pub spo2: Option<f64>,

    /// Body temperature (°C)
    #[arg(long)]
    pub temperature: Option<f64>,

    /// Blood glucose (mg/dL)
    #[arg(long)]
    pub glucose: Option<f64>,

    /// Override the prediction service URL
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Path to configuration file
    #[arg(short, long, default_value = "lifeline.toml")]
    pub config: PathBuf,
}

#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Simulation scenario
    #[arg(short, long, value_enum, default_value = "normal")]
    pub kind: SimulationKind,

    /// Number of samples to generate
    #[arg(short = 'n', long, default_value = "5")]
    pub count: usize,

    /// Seed for reproducible output
    #[arg(long)]
    pub seed: Option<u64>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Initialize a new configuration file
    Init(ConfigInitArgs),
    /// Validate a configuration file and show what it will run
    Check(ConfigCheckArgs),
}

#[derive(Args, Debug)]
pub struct ConfigInitArgs {
    /// Output file path
    #[arg(short, long, default_value = "lifeline.toml")]
    pub output: PathBuf,

    /// Overwrite existing file
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct ConfigCheckArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "lifeline.toml")]
    pub config: PathBuf,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_serve_defaults() {
        let cli = Cli::try_parse_from(["lifeline", "serve"]).unwrap();
        match cli.command {
            Commands::Serve(args) => {
                assert_eq!(args.config, PathBuf::from("lifeline.toml"));
                assert!(args.mode.is_none());
                assert!(!args.autostart);
            }
            _ => panic!("Expected Serve command"),
        }
    }

    #[test]
    fn test_cli_parse_serve_source_flags() {
        let cli = Cli::try_parse_from([
            "lifeline",
            "serve",
            "--mode",
            "real-device",
            "--kind",
            "high-glucose",
            "--interval-ms",
            "2000",
            "--autostart",
        ])
        .unwrap();
        match cli.command {
            Commands::Serve(args) => {
                assert_eq!(args.mode, Some(Mode::Streaming));
                assert_eq!(args.kind, Some(SimulationKind::HighGlucose));
                assert_eq!(args.interval_ms, Some(2000));
                assert!(args.autostart);
            }
            _ => panic!("Expected Serve command"),
        }
    }

    #[test]
    fn test_cli_parse_predict() {
        let cli = Cli::try_parse_from([
            "lifeline",
            "predict",
            "--heart-rate",
            "72",
            "--systolic",
            "118",
            "--json",
        ])
        .unwrap();
        match cli.command {
            Commands::Predict(args) => {
                assert_eq!(args.heart_rate, Some(72.0));
                assert_eq!(args.systolic, Some(118.0));
                assert!(args.diastolic.is_none());
                assert!(args.json);
            }
            _ => panic!("Expected Predict command"),
        }
    }

    #[test]
    fn test_cli_parse_simulate() {
        let cli = Cli::try_parse_from(["lifeline", "simulate", "-n", "3", "--seed", "7"]).unwrap();
        match cli.command {
            Commands::Simulate(args) => {
                assert_eq!(args.kind, SimulationKind::Normal);
                assert_eq!(args.count, 3);
                assert_eq!(args.seed, Some(7));
            }
            _ => panic!("Expected Simulate command"),
        }
    }

    #[test]
    fn test_cli_parse_config_init() {
        let cli = Cli::try_parse_from(["lifeline", "config", "init", "-o", "custom.toml"]).unwrap();
        match cli.command {
            Commands::Config(ConfigCommands::Init(args)) => {
                assert_eq!(args.output, PathBuf::from("custom.toml"));
                assert!(!args.force);
            }
            _ => panic!("Expected Config Init command"),
        }
    }

    #[test]
    fn test_cli_parse_config_check_default_path() {
        let cli = Cli::try_parse_from(["lifeline", "config", "check"]).unwrap();
        match cli.command {
            Commands::Config(ConfigCommands::Check(args)) => {
                assert_eq!(args.config, PathBuf::from("lifeline.toml"));
            }
            _ => panic!("Expected Config Check command"),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_kind() {
        assert!(Cli::try_parse_from(["lifeline", "simulate", "--kind", "zombie"]).is_err());
    }
}
