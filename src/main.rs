use clap::Parser;

use exprobe::adapter::inbound::cli::command::Cli;
use exprobe::adapter::inbound::cli::{dispatch, output, EXIT_HARNESS_ERROR};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    match dispatch(cli).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            output::error(&e.to_string());
            std::process::exit(EXIT_HARNESS_ERROR);
        }
    }
}
