//! meterctl - Meter driver inspection tool for VoltageEMS
//!
//! Lists the registered meter drivers, prints the register plan of a model,
//! decodes captured register bytes and checks device configuration files.
//! No Modbus I/O is performed; `simulate` runs a cycle against an in-memory
//! register bank.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use voltage_meters::logging::init_logging;

#[derive(Parser)]
#[command(name = "meterctl")]
#[command(about = "Meter driver inspection tool for VoltageEMS")]
#[command(long_about = "Meter driver inspection tool for VoltageEMS

Commands:
  drivers     List registered meter drivers
  plan        Show the probe and poll cycle of a driver
  decode      Decode raw register bytes for one measurement
  check       Validate a device configuration file
  simulate    Run one poll cycle against simulated registers

Examples:
  meterctl drivers
  meterctl plan PQPLUS --energy
  meterctl decode PQPLUS VoltageL1 43668000
  meterctl check config/meters.yaml")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered meter drivers
    Drivers,

    /// Show the probe and poll cycle of a driver
    Plan {
        /// Driver model name (case-sensitive)
        model: String,

        /// Multiplier for phase current reads
        #[arg(long)]
        current_scale: Option<f64>,

        /// Include energy counters
        #[arg(long)]
        energy: bool,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Decode raw register bytes for one measurement
    Decode {
        /// Driver model name (case-sensitive)
        model: String,

        /// Measurement name, e.g. VoltageL1
        measurement: String,

        /// Register bytes as hex, in wire order
        hex: String,

        /// Multiplier for phase current reads
        #[arg(long)]
        current_scale: Option<f64>,
    },

    /// Validate a device configuration file
    Check {
        /// Path to YAML, TOML or JSON configuration
        config: PathBuf,
    },

    /// Run one poll cycle against simulated registers
    Simulate {
        /// Driver model name (case-sensitive)
        model: String,

        /// Include energy counters
        #[arg(long)]
        energy: bool,

        /// Register address to fail, may be repeated (e.g. 0x1202)
        #[arg(long = "fail-at", value_parser = parse_address)]
        fail_at: Vec<u16>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

fn parse_address(s: &str) -> std::result::Result<u16, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid register address {}: {}", s, e))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    let level = if cli.verbose { "debug" } else { "warn" };
    init_logging(level, !cli.no_color)?;

    match cli.command {
        Commands::Drivers => commands::list_drivers(),
        Commands::Plan {
            model,
            current_scale,
            energy,
            json,
        } => commands::show_plan(&model, options(current_scale, energy), json),
        Commands::Decode {
            model,
            measurement,
            hex,
            current_scale,
        } => commands::decode(&model, &measurement, &hex, options(current_scale, true)),
        Commands::Check { config } => commands::check_config(&config),
        Commands::Simulate {
            model,
            energy,
            fail_at,
            json,
        } => commands::simulate(&model, options(None, energy), &fail_at, json).await,
    }
}

fn options(current_scale: Option<f64>, energy: bool) -> voltage_meters::DriverOptions {
    voltage_meters::DriverOptions {
        current_scale,
        energy,
    }
}
