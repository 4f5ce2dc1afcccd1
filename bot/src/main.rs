//! Downdetector Bot Entry Point

use clap::Parser;
use downdetector_bot::cli::{self, Cli, Commands};
use downdetector_bot::logging;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let _log_guard = match logging::init() {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let config_path = cli.config.as_deref();
    match cli.command {
        Some(Commands::Check(args)) => match cli::check::execute(&args, config_path).await {
            Ok(true) => ExitCode::SUCCESS,
            Ok(false) => ExitCode::FAILURE,
            Err(e) => {
                eprintln!("Error: {}", e);
                ExitCode::FAILURE
            }
        },
        Some(Commands::Serve(args)) => run_serve(&args, config_path).await,
        None => run_serve(&cli::serve::ServeArgs::default(), config_path).await,
    }
}

async fn run_serve(args: &cli::serve::ServeArgs, config_path: Option<&std::path::Path>) -> ExitCode {
    match cli::serve::execute(args, config_path).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Downdetector Bot failed");
            ExitCode::FAILURE
        }
    }
}
