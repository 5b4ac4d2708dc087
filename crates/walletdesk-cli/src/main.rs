mod cli;
mod commands;
mod error;
mod output;

use clap::Parser;
use std::process::ExitCode;

use crate::cli::Cli;
use crate::error::CliError;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    walletdesk_core::telemetry::init_tracing(cli.verbose);

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::from(error.exit_code())
        }
    }
}

async fn run(cli: &Cli) -> Result<(), CliError> {
    // Dropping the command future releases its cache waiters, which aborts
    // the in-flight request.
    let data = tokio::select! {
        result = commands::run(cli) => result?,
        _ = tokio::signal::ctrl_c() => return Err(CliError::Cancelled),
    };

    output::render(&data, cli.pretty)
}
