//! Redline - headless photo markup host

use std::process::ExitCode;

use clap::Parser;
use tracing::error;

mod cli;
mod config;

use cli::CliArgs;

fn init_logging() {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}

fn main() -> ExitCode {
    let args = CliArgs::parse();
    init_logging();

    match cli::run(&args) {
        Ok(summary) if summary.errors.is_empty() => ExitCode::SUCCESS,
        Ok(summary) => {
            for (code, message) in &summary.errors {
                error!("{}: {}", code, message);
            }
            ExitCode::FAILURE
        }
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
