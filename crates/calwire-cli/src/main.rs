//! calwire CLI entry point.

use std::process::ExitCode;

use clap::Parser;

use calwire_cli::cli::Cli;
use calwire_cli::commands;
use calwire_cli::config::ClientConfig;
use calwire_cli::error::CliResult;
use calwire_cli::tracing::init_tracing;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> CliResult<String> {
    let config = match cli.config {
        Some(ref path) => ClientConfig::load_from(path)?,
        None => ClientConfig::load()?,
    };

    if let Err(e) = init_tracing(config.tracing_config(cli.debug)) {
        eprintln!("warning: {}", e);
    }

    commands::run(cli, &config).await
}
