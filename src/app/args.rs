//! Command-line argument definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Checkout blocks - render merchant-configured checkout blocks from a scenario file
#[derive(Parser, Debug)]
#[command(name = "checkout-blocks")]
#[command(version)]
#[command(about = "Render merchant-configured checkout blocks from a scenario file", long_about = None)]
pub struct Args {
    /// Set the logging level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", global = true)]
    pub log_level: String,

    /// Enable verbose output (equivalent to --log-level debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render every visible block of a scenario
    Preview(PreviewArgs),
}

/// Arguments of `preview`.
#[derive(clap::Args, Debug, Clone)]
pub struct PreviewArgs {
    /// Scenario file (TOML)
    #[arg(long)]
    pub scenario: PathBuf,

    /// Translation file (YAML/JSON) or directory of `{COUNTRY}.yml` files
    #[arg(long)]
    pub translations: Option<PathBuf>,

    /// Shipping country, overriding the scenario's
    #[arg(long)]
    pub country: Option<String>,

    /// Persist timer values in this JSON file across runs
    #[arg(long)]
    pub state: Option<PathBuf>,

    /// Keep timers running for this many seconds, printing every change
    #[arg(long, default_value_t = 0)]
    pub watch: u64,

    /// Print the block trees as JSON
    #[arg(long)]
    pub json: bool,
}

/// What: Determine the log level from command-line arguments.
///
/// Details:
/// - Verbose flag overrides `--log-level`.
#[must_use]
pub fn determine_log_level(args: &Args) -> String {
    if args.verbose {
        "debug".to_string()
    } else {
        args.log_level.clone()
    }
}
