//! Command-line interface definitions.
//!
//! Defines the CLI structure for the exprobe harness using `clap`. The CLI
//! runs the bundled suite, inspects the configuration matrix and registry,
//! and validates configuration files.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Rate-limited endpoint test harness across authentication methods
#[derive(Parser, Debug)]
#[command(name = "exprobe")]
#[command(version)]
pub struct Cli {
    /// Color output mode [auto, always, never]
    #[arg(
        long,
        global = true,
        default_value = "auto",
        hide_possible_values = true
    )]
    pub color: ColorChoice,

    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase output verbosity
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Color output mode for terminal rendering.
#[derive(Clone, Debug, Default, clap::ValueEnum)]
pub enum ColorChoice {
    /// Detect automatically
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Top-level subcommands for the exprobe CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the test suite against every available configuration
    Run(RunArgs),

    /// Show the configurations the current environment yields
    Matrix(MatrixArgs),

    /// List registered test units
    Units(UnitsArgs),

    /// Run diagnostic checks
    #[command(subcommand)]
    Check(CheckCommand),
}

/// Subcommands for `exprobe check`.
#[derive(Subcommand, Debug)]
pub enum CheckCommand {
    /// Validate the configuration file syntax and semantics.
    Config(ConfigPathArg),
}

/// Shared argument struct for commands that only need a configuration path.
#[derive(Parser, Debug)]
pub struct ConfigPathArg {
    /// Path to the configuration file (defaults to ./exprobe.toml when present).
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Unit selection shared by `run` and `units`.
#[derive(Parser, Debug, Default)]
pub struct FilterArgs {
    /// Only units whose name contains this text (case-insensitive).
    #[arg(long)]
    pub filter: Option<String>,

    /// Only units in this category (case-insensitive).
    #[arg(long)]
    pub category: Option<String>,
}

/// Arguments for the `run` subcommand.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Path to the configuration file (defaults to ./exprobe.toml when present).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub filter: FilterArgs,

    /// Run every available authentication method, not just the preferred one.
    #[arg(long)]
    pub all_auth: bool,

    /// Override the number of concurrent workers.
    #[arg(long)]
    pub workers: Option<usize>,

    /// Override the minimum interval between outbound calls (milliseconds).
    #[arg(long)]
    pub min_interval_ms: Option<u64>,

    /// Override the per-unit timeout (seconds).
    #[arg(long)]
    pub unit_timeout_secs: Option<u64>,

    /// Override the target base URL.
    #[arg(long)]
    pub base_url: Option<String>,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Use JSON log format instead of pretty-printed logs.
    #[arg(long)]
    pub json_logs: bool,
}

/// Arguments for the `matrix` subcommand.
#[derive(Parser, Debug)]
pub struct MatrixArgs {
    /// Path to the configuration file (defaults to ./exprobe.toml when present).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Include every available authentication method.
    #[arg(long)]
    pub all_auth: bool,
}

/// Arguments for the `units` subcommand.
#[derive(Parser, Debug)]
pub struct UnitsArgs {
    #[command(flatten)]
    pub filter: FilterArgs,
}
