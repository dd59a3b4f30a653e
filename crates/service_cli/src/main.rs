//! Neutryx HW CLI - Hull-White Swaption Calibration
//!
//! This is the operational entry point for the swaption calibration stack.
//!
//! # Commands
//!
//! - `neutryx-hw calibrate --input <request.json> [--output <result.json>]` -
//!   Calibrate Hull-White `(alpha, sigma)` to a volatility surface
//! - `neutryx-hw check` - Print the effective solver settings
//!
//! # Architecture
//!
//! As part of the **S**ervice layer in the A-I-P-S architecture, this crate
//! loads inputs, runs `pricer_optimiser` and owns all file handling.

use clap::{Parser, Subcommand};
use tracing::{debug, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod config;
mod error;
mod request;

pub use error::{CliError, Result};

use config::CliConfig;

/// Neutryx Hull-White calibration CLI
#[derive(Parser)]
#[command(name = "neutryx-hw")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "neutryx-hw.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Calibrate Hull-White parameters to a swaption volatility surface
    Calibrate {
        /// Path to the calibration request (JSON)
        #[arg(short, long)]
        input: String,

        /// Output file for the calibration result (JSON)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Print the effective solver configuration
    Check,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };

    // Initialise tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(default_level.into())
                .from_env_lossy(),
        )
        .init();

    if cli.verbose {
        debug!("Verbose mode enabled");
    }

    let config = CliConfig::load(&cli.config)?;

    match cli.command {
        Commands::Calibrate { input, output } => {
            commands::calibrate::run(&input, output.as_deref(), &config)
        }
        Commands::Check => commands::check::run(&cli.config, &config),
    }
}
