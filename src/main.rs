use anyhow::Context;
use clap::Parser;
use std::process::ExitCode;
use tcprecon::cli::Cli;
use tcprecon::error::CliError;
use tcprecon::output;
use tracing_subscriber::EnvFilter;

// One execution context: every probe is multiplexed on the main task.
#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_directive()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let cli_error = err.downcast_ref::<CliError>();
            if matches!(cli_error, Some(CliError::Interrupted)) {
                output::print_warning("interrupted, no results written");
            } else {
                output::print_error(&format!("{:#}", err));
            }
            let code = cli_error.map_or(1, CliError::exit_code);
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}

async fn run(cli: &Cli) -> anyhow::Result<()> {
    cli.execute_until(interrupted()).await.context("scan failed")
}

/// Resolves on Ctrl-C. Never resolves if the handler cannot be installed.
async fn interrupted() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}
