use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Verity pooling and pairing engine for forecast verification.
#[derive(Parser)]
#[command(
    name = "verity",
    version,
    about = "Pooling and pairing engine for forecast verification"
)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Assemble every pool and write a JSON summary of each.
    Pools(PoolsArgs),
    /// List the time windows of the evaluation.
    Windows(WindowsArgs),
}

/// Arguments for the `pools` subcommand.
#[derive(clap::Args)]
pub struct PoolsArgs {
    /// Path to TOML configuration file.
    #[arg(short, long, default_value = "verity.toml")]
    pub config: PathBuf,

    /// Path for the JSON pool summaries. Defaults to standard output.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Override the worker thread count from config.
    #[arg(short, long)]
    pub threads: Option<usize>,
}

/// Arguments for the `windows` subcommand.
#[derive(clap::Args)]
pub struct WindowsArgs {
    /// Path to TOML configuration file.
    #[arg(short, long, default_value = "verity.toml")]
    pub config: PathBuf,
}
