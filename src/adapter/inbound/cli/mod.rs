//! CLI module graph.

pub mod check;
pub mod command;
pub mod matrix;
pub mod output;
pub mod run;
pub mod units;

use command::{CheckCommand, Cli, Commands};
use output::OutputConfig;

use crate::error::Result;

/// Exit code for harness-level errors (bad config, unreadable files).
pub const EXIT_HARNESS_ERROR: i32 = 2;

/// Run the parsed command and return the process exit code.
///
/// Test failures surface as a non-zero code, not as an error.
pub async fn dispatch(cli: Cli) -> Result<i32> {
    output::configure(
        OutputConfig::new(cli.json, cli.quiet, cli.verbose),
        &cli.color,
    );

    match cli.command {
        Commands::Run(args) => run::execute(&args).await,
        Commands::Matrix(args) => matrix::execute(&args).map(|()| 0),
        Commands::Units(args) => units::execute(&args).map(|()| 0),
        Commands::Check(CheckCommand::Config(arg)) => {
            check::execute_config(arg.config.as_deref()).map(|()| 0)
        }
    }
}
