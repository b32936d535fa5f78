// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `deltascan`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "deltascan",
    version,
    about = "Detect files that changed since the last run and copy them out.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (JSON, or TOML with a `.toml` extension).
    #[arg(value_name = "CONFIG")]
    pub config: String,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `DELTASCAN_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Maximum number of files fingerprinted at once per root.
    ///
    /// Overrides `concurrency` from the config file.
    #[arg(long, value_name = "N")]
    pub concurrency: Option<usize>,

    /// Record changes in the history store but do not copy anything.
    #[arg(long)]
    pub detect_only: bool,

    /// Parse + validate the config, print it, but don't scan.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
