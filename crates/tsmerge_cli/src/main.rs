//! tsmerge CLI
//!
//! Command-line tools for inspecting compaction catalogues and dry-running
//! merge file selection.
//!
//! # Commands
//!
//! - `select` - Run the selector over a catalogue snapshot
//! - `inspect` - Validate a catalogue snapshot and show per-file costs

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// tsmerge compaction selection tools.
#[derive(Parser)]
#[command(name = "tsmerge")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the JSON catalogue snapshot
    #[arg(global = true, short, long)]
    catalogue: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Choose the files of one merge cycle
    Select {
        /// Memory budget in bytes (default: 500 MiB)
        #[arg(short, long)]
        budget: Option<u64>,

        /// Maximum number of unsequential files (default: 100)
        #[arg(short, long)]
        max_unseq: Option<usize>,

        /// Ignore files whose data all ends at or before this timestamp
        #[arg(short, long, allow_negative_numbers = true)]
        time_lower_bound: Option<i64>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Validate a catalogue and show per-file cost estimates
    Inspect {
        /// Show per-device ranges
        #[arg(short, long)]
        devices: bool,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Select {
            budget,
            max_unseq,
            time_lower_bound,
            format,
        } => {
            let path = cli.catalogue.ok_or("Catalogue path required for select")?;
            let options = commands::select::SelectOptions {
                budget,
                max_unseq,
                time_lower_bound,
            };
            commands::select::run(&path, &options, &format)?;
        }
        Commands::Inspect { devices, format } => {
            let path = cli.catalogue.ok_or("Catalogue path required for inspect")?;
            commands::inspect::run(&path, devices, &format)?;
        }
        Commands::Version => {
            println!("tsmerge CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("tsmerge Core v{}", tsmerge_core::VERSION);
        }
    }

    Ok(())
}
