//! Command-line interface definitions for tcprecon.
//!
//! Uses `clap` derive macros for declarative argument parsing.

mod scan;

pub use scan::ScanCommand;

use crate::config::AppSettings;
use crate::error::{CliError, CliResult};
use clap::Parser;
use std::future::Future;
use std::path::PathBuf;

/// tcprecon - a concurrent TCP reconnaissance tool.
///
/// Probes every port of every address in a target for reachability, and can
/// read service banners and try a username/password line exchange on open
/// ports.
#[derive(Parser, Debug)]
#[command(name = "tcprecon")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Concurrent TCP port, banner and credential prober", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub scan: ScanCommand,

    /// Show a progress bar and debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to a JSON settings file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Load settings and run the scan.
    pub async fn execute(&self) -> CliResult<()> {
        let settings = AppSettings::load(self.config.as_deref())?;
        self.scan.execute(&settings, self.verbose, self.quiet).await
    }

    /// Run the scan unless `shutdown` resolves first.
    ///
    /// On shutdown the scan future is dropped, which closes every in-flight
    /// connection, and nothing is written.
    pub async fn execute_until<F>(&self, shutdown: F) -> CliResult<()>
    where
        F: Future<Output = ()>,
    {
        tokio::select! {
            biased;
            () = shutdown => Err(CliError::Interrupted),
            result = self.execute() => result,
        }
    }

    /// Default tracing filter directive for the chosen verbosity.
    pub fn log_directive(&self) -> &'static str {
        if self.verbose {
            "tcprecon=debug"
        } else {
            "warn"
        }
    }
}
