//! Plain text output formatting.
//!
//! Produces human-readable output with colors and formatting.

use crate::scanner::{PortResult, PortStatus, ScanReport};
use console::{style, Style};
use std::io::{self, Write};
use std::time::Duration;

/// Longest banner shown on a console line.
const BANNER_DISPLAY_LEN: usize = 60;

/// Print results to stdout.
pub fn print_results(report: &ScanReport, open_only: bool, elapsed: Duration) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_plain(&mut out, report, open_only)?;
    write_summary(&mut out, report, elapsed)
}

/// Write one header per address followed by one line per result.
pub fn write_plain<W: Write>(out: &mut W, report: &ScanReport, open_only: bool) -> io::Result<()> {
    for host in report.hosts() {
        if open_only && host.open_count() == 0 {
            continue;
        }

        writeln!(out)?;
        writeln!(
            out,
            "{} {}",
            style("Host:").bold(),
            style(host.address).cyan().bold()
        )?;

        for result in &host.ports {
            if open_only && !result.is_open() {
                continue;
            }
            write_result_line(out, result)?;
        }
    }
    Ok(())
}

fn write_result_line<W: Write>(out: &mut W, result: &PortResult) -> io::Result<()> {
    let status_style = match result.status {
        PortStatus::Open => Style::new().green().bold(),
        PortStatus::Closed => Style::new().red(),
    };

    write!(
        out,
        "  {:>5}/tcp  {:<6}",
        result.port,
        status_style.apply_to(result.status.to_string())
    )?;

    if let Some(banner) = &result.banner {
        write!(
            out,
            "  {} {}",
            style("banner:").dim(),
            truncate_string(banner, BANNER_DISPLAY_LEN)
        )?;
    }

    match result.auth_outcome {
        Some(true) => write!(out, "  {} {}", style("auth:").dim(), style("success").green())?,
        Some(false) => write!(out, "  {} {}", style("auth:").dim(), style("failed").yellow())?,
        None => {}
    }

    writeln!(out)
}

/// Write the closing summary line.
pub fn write_summary<W: Write>(out: &mut W, report: &ScanReport, elapsed: Duration) -> io::Result<()> {
    writeln!(out)?;
    writeln!(
        out,
        "{} {} hosts, {} ports probed, {} open in {:.2}s",
        style("Summary:").bold(),
        report.hosts().len(),
        report.len(),
        style(report.open_count()).green().bold(),
        elapsed.as_secs_f64()
    )
}

/// Print a scan header before scanning begins.
pub fn print_scan_header(target: &str, hosts: u64, ports: usize) {
    eprintln!(
        "{} {} v{}",
        style("Starting").cyan(),
        style("tcprecon").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    eprintln!(
        "{} Target: {} ({} hosts)",
        style("•").dim(),
        style(target).white().bold(),
        hosts
    );
    eprintln!(
        "{} Probing {} ports per host...",
        style("•").dim(),
        style(ports).white().bold()
    );
}

/// Print an error message.
pub fn print_error(msg: &str) {
    eprintln!("{} {}", style("Error:").red().bold(), msg);
}

/// Print a warning message.
pub fn print_warning(msg: &str) {
    eprintln!("{} {}", style("Warning:").yellow().bold(), msg);
}

/// Print a success message.
pub fn print_success(msg: &str) {
    println!("{} {}", style("✓").green().bold(), msg);
}

/// Truncate a string to a maximum number of characters, adding ellipsis if truncated.
fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
