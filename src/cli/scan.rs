//! Scan command implementation.
//!
//! Turns command line flags into a target, a port set and a probe
//! configuration, runs the scan, and hands the report to the presenter.

use crate::config::AppSettings;
use crate::error::{CliResult, ConfigError};
use crate::output;
use crate::scanner::{run_scan, Credentials, ProbeConfig};
use crate::types::{PortSet, TargetSpec};
use chrono::Local;
use clap::{ArgGroup, Args};
use std::path::PathBuf;
use std::time::Instant;

/// Scan a target for open ports.
#[derive(Args, Debug, Default)]
#[command(group(ArgGroup::new("target").args(["ip", "cidr", "range"]).multiple(false)))]
#[command(group(ArgGroup::new("port_source").args(["ports", "portlist"]).multiple(false)))]
pub struct ScanCommand {
    /// Single IPv4 address to scan
    #[arg(short = 'i', long, value_name = "IP")]
    pub ip: Option<String>,

    /// CIDR block to scan (network and broadcast addresses are skipped)
    #[arg(short = 'c', long, value_name = "CIDR")]
    pub cidr: Option<String>,

    /// Inclusive address range to scan, e.g. 10.0.0.1-10.0.0.20
    #[arg(short = 'r', long, value_name = "START-END")]
    pub range: Option<String>,

    /// Comma-separated ports, probed in the given order (e.g. "22,80,443")
    #[arg(short = 'p', long, value_name = "LIST")]
    pub ports: Option<String>,

    /// File with one port per line
    #[arg(short = 'l', long, value_name = "FILE")]
    pub portlist: Option<PathBuf>,

    /// Connection timeout in seconds [default: 1.0]
    #[arg(short = 't', long, value_name = "SECS")]
    pub timeout: Option<f64>,

    /// Read a banner from every open port
    #[arg(short = 'b', long)]
    pub banner: bool,

    /// Username for the credential probe
    #[arg(long, requires = "password")]
    pub username: Option<String>,

    /// Password for the credential probe
    #[arg(long, requires = "username")]
    pub password: Option<String>,

    /// Maximum number of connection attempts in flight [default: 500]
    #[arg(long, value_name = "N")]
    pub concurrency: Option<usize>,

    /// Write a JSON report into this directory instead of printing results
    #[arg(short = 'o', long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Only show open ports on the console
    #[arg(long)]
    pub open_only: bool,
}

impl ScanCommand {
    /// The target selected by `--ip`, `--cidr` or `--range`.
    pub fn target_spec(&self) -> CliResult<TargetSpec> {
        let spec = match (&self.ip, &self.cidr, &self.range) {
            (Some(ip), _, _) => TargetSpec::parse_ip(ip)?,
            (_, Some(cidr), _) => TargetSpec::parse_cidr(cidr)?,
            (_, _, Some(range)) => TargetSpec::parse_range(range)?,
            (None, None, None) => return Err(ConfigError::NoTarget.into()),
        };
        Ok(spec)
    }

    /// The ports from `--ports` or `--portlist`.
    pub fn port_set(&self) -> CliResult<PortSet> {
        let ports = match (&self.ports, &self.portlist) {
            (Some(list), _) => list.parse::<PortSet>()?,
            (_, Some(path)) => PortSet::from_file(path)?,
            (None, None) => return Err(ConfigError::NoPorts.into()),
        };
        Ok(ports)
    }

    /// Credentials, if both halves were given.
    pub fn credentials(&self) -> CliResult<Option<Credentials>> {
        match (&self.username, &self.password) {
            (Some(username), Some(password)) => {
                Ok(Some(Credentials::new(username.clone(), password.clone())))
            }
            (None, None) => Ok(None),
            _ => Err(ConfigError::IncompleteCredentials.into()),
        }
    }

    /// Merge flags over `settings` into a probe configuration.
    pub fn probe_config(&self, settings: &AppSettings, progress: bool) -> CliResult<ProbeConfig> {
        let timeout = ProbeConfig::timeout_from_secs(self.timeout.unwrap_or(settings.timeout_secs))?;
        let concurrency = self.concurrency.unwrap_or(settings.concurrency);

        let mut config = ProbeConfig::new()
            .with_timeout(timeout)
            .with_max_in_flight(concurrency);
        if self.banner || settings.grab_banner {
            config = config.with_banners();
        }
        if let Some(credentials) = self.credentials()? {
            config = config.with_credentials(credentials);
        }
        if progress {
            config = config.with_progress();
        }

        config.validate()?;
        Ok(config)
    }

    /// Execute the scan command.
    pub async fn execute(&self, settings: &AppSettings, verbose: bool, quiet: bool) -> CliResult<()> {
        // Everything is validated before the first connection attempt.
        let target = self.target_spec()?;
        let ports = self.port_set()?;
        let config = self.probe_config(settings, verbose && !quiet)?;
        let output_dir = self.output.as_ref().or(settings.output_dir.as_ref());

        if !quiet {
            output::print_scan_header(&target.to_string(), target.host_count(), ports.len());
        }

        let captured_at = Local::now();
        let started = Instant::now();
        let report = run_scan(&target, &ports, &config).await?;
        let elapsed = started.elapsed();

        match output_dir {
            Some(dir) => {
                let path =
                    output::write_json_report(&report, dir, &target.identifier(), &captured_at)?;
                if !quiet {
                    output::print_success(&format!(
                        "{} results written to {}",
                        report.len(),
                        path.display()
                    ));
                }
            }
            None => output::print_results(&report, self.open_only, elapsed)?,
        }

        Ok(())
    }
}
