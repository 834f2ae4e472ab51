//! Scanner module - drives a target/port cross product through the probes.
//!
//! Every (address, port) pair becomes a [`ScanTask`]. Tasks are generated
//! lazily, multiplexed on the calling task with a bounded number in flight,
//! and their results are put back into enumeration order before grouping.

pub mod auth;
pub mod tcp;
pub mod traits;

use crate::error::ScanError;
use crate::types::{PortSet, TargetSpec};
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;
use std::time::Instant;
use tracing::info;

pub use auth::{Authenticator, Credentials, LineAuthenticator, ProbeStream};
pub use tcp::{connect, ConnectOutcome, TcpConnectScanner};
pub use traits::{PortResult, PortStatus, ProbeConfig, ScanTask, Scanner};

/// Results for one address, in port-set order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostReport {
    pub address: Ipv4Addr,
    pub ports: Vec<PortResult>,
}

impl HostReport {
    /// Number of open ports on this host.
    pub fn open_count(&self) -> usize {
        self.ports.iter().filter(|r| r.is_open()).count()
    }
}

/// Complete scan results, grouped by address in enumeration order.
///
/// Serializes as a JSON array of [`HostReport`] objects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScanReport {
    hosts: Vec<HostReport>,
}

impl ScanReport {
    /// Group results that are already in address-major, port-minor order.
    fn from_ordered(results: Vec<PortResult>, ports_per_host: usize) -> Self {
        let mut hosts: Vec<HostReport> = Vec::new();
        let mut results = results.into_iter().peekable();

        while let Some(first) = results.next() {
            let mut ports = Vec::with_capacity(ports_per_host);
            let address = first.address;
            ports.push(first);
            while ports.len() < ports_per_host {
                match results.next() {
                    Some(result) => ports.push(result),
                    None => break,
                }
            }
            hosts.push(HostReport { address, ports });
        }

        Self { hosts }
    }

    pub fn hosts(&self) -> &[HostReport] {
        &self.hosts
    }

    /// Every result in report order.
    pub fn results(&self) -> impl Iterator<Item = &PortResult> {
        self.hosts.iter().flat_map(|h| h.ports.iter())
    }

    /// Total number of results.
    pub fn len(&self) -> usize {
        self.hosts.iter().map(|h| h.ports.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of open results across all hosts.
    pub fn open_count(&self) -> usize {
        self.hosts.iter().map(HostReport::open_count).sum()
    }
}

/// Lazily generate the task cross product: address-major, port-minor.
pub fn scan_tasks<'a>(
    target: &'a TargetSpec,
    ports: &'a PortSet,
) -> impl Iterator<Item = ScanTask> + 'a {
    target
        .addresses()
        .flat_map(move |address| ports.iter().map(move |port| ScanTask::new(address, port)))
}

/// Execute a complete scan with the TCP connect probe stack.
///
/// The only failure is an invalid configuration, reported before any
/// connection is attempted.
pub async fn run_scan(
    target: &TargetSpec,
    ports: &PortSet,
    config: &ProbeConfig,
) -> Result<ScanReport, ScanError> {
    config.validate()?;
    let scanner = TcpConnectScanner::from_config(config);
    Ok(scan_with_scanner(&scanner, target, ports, config).await)
}

/// Generic scan executor with bounded concurrency.
pub async fn scan_with_scanner<S>(
    scanner: &S,
    target: &TargetSpec,
    ports: &PortSet,
    config: &ProbeConfig,
) -> ScanReport
where
    S: Scanner + ?Sized,
{
    let start_time = Instant::now();
    let total = target.host_count() * ports.len() as u64;
    let max_in_flight = config.max_in_flight.max(1);

    info!(
        %target,
        hosts = target.host_count(),
        ports = ports.len(),
        tasks = total,
        max_in_flight,
        "starting scan"
    );

    let progress = if config.progress {
        let pb = ProgressBar::new(total);
        if let Ok(style) = ProgressStyle::default_bar().template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
        ) {
            pb.set_style(style.progress_chars("=>-"));
        }
        pb
    } else {
        ProgressBar::hidden()
    };

    let mut results: Vec<(usize, PortResult)> = stream::iter(scan_tasks(target, ports).enumerate())
        .map(|(index, task)| {
            let progress = &progress;
            async move {
                let result = scanner.scan(task).await;

                progress.inc(1);
                if result.is_open() {
                    progress.set_message(format!("Found open port: {}", task));
                }

                (index, result)
            }
        })
        .buffer_unordered(max_in_flight)
        .collect()
        .await;

    progress.finish_and_clear();

    // Completion order is arbitrary; restore enumeration order.
    results.sort_unstable_by_key(|(index, _)| *index);
    let results: Vec<PortResult> = results.into_iter().map(|(_, result)| result).collect();

    let report = ScanReport::from_ordered(results, ports.len());
    info!(
        results = report.len(),
        open = report.open_count(),
        elapsed_ms = start_time.elapsed().as_millis() as u64,
        "scan complete"
    );

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use crate::types::Port;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Opens only the listed ports, and finishes later tasks first.
    struct ScriptedScanner {
        open: Vec<u16>,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        calls: AtomicUsize,
    }

    impl ScriptedScanner {
        fn new(open: &[u16]) -> Self {
            Self {
                open: open.to_vec(),
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Scanner for ScriptedScanner {
        async fn scan(&self, task: ScanTask) -> PortResult {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);

            let delay = 20u64.saturating_sub(call as u64 % 20);
            tokio::time::sleep(Duration::from_millis(delay)).await;

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            if self.open.contains(&task.port.as_u16()) {
                PortResult::open(task, Some(format!("svc-{}", task.port)), None)
            } else {
                PortResult::closed(task)
            }
        }
    }

    fn ports(list: &str) -> PortSet {
        list.parse().unwrap()
    }

    #[test]
    fn test_scan_tasks_order() {
        let target: TargetSpec = "10.0.0.1-10.0.0.2".parse().unwrap();
        let ports = ports("443,22");
        let tasks: Vec<String> = scan_tasks(&target, &ports).map(|t| t.to_string()).collect();
        assert_eq!(
            tasks,
            vec!["10.0.0.1:443", "10.0.0.1:22", "10.0.0.2:443", "10.0.0.2:22"]
        );
    }

    #[tokio::test]
    async fn test_report_order_ignores_completion_order() {
        let target: TargetSpec = "10.1.0.0/29".parse().unwrap();
        let ports = ports("8080,22,80,22");
        let scanner = ScriptedScanner::new(&[22]);
        let config = ProbeConfig::new().with_max_in_flight(8);

        let report = scan_with_scanner(&scanner, &target, &ports, &config).await;

        assert_eq!(report.len(), 6 * 4);
        assert_eq!(report.hosts().len(), 6);
        let expected: Vec<Ipv4Addr> = target.addresses().collect();
        let actual: Vec<Ipv4Addr> = report.hosts().iter().map(|h| h.address).collect();
        assert_eq!(actual, expected);

        for host in report.hosts() {
            let order: Vec<u16> = host.ports.iter().map(|r| r.port.as_u16()).collect();
            assert_eq!(order, vec![8080, 22, 80, 22]);
            assert!(host.ports.iter().all(|r| r.address == host.address));
            assert_eq!(host.open_count(), 2);
        }
        assert_eq!(report.open_count(), 12);
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let target: TargetSpec = "10.2.0.0/27".parse().unwrap();
        let scanner = ScriptedScanner::new(&[]);
        let config = ProbeConfig::new().with_max_in_flight(4);

        let report = scan_with_scanner(&scanner, &target, &ports("1,2"), &config).await;

        assert_eq!(report.len(), 30 * 2);
        assert_eq!(scanner.calls.load(Ordering::SeqCst), 60);
        assert!(scanner.peak.load(Ordering::SeqCst) <= 4);
        assert!(scanner.peak.load(Ordering::SeqCst) > 1);
    }

    #[tokio::test]
    async fn test_rerun_is_identical() {
        let target: TargetSpec = "10.3.0.10-10.3.0.14".parse().unwrap();
        let ports = ports("21,22,23");
        let config = ProbeConfig::new().with_max_in_flight(3);

        let first = scan_with_scanner(&ScriptedScanner::new(&[22]), &target, &ports, &config).await;
        let second = scan_with_scanner(&ScriptedScanner::new(&[22]), &target, &ports, &config).await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_closed_results_carry_nothing() {
        let target: TargetSpec = "10.4.0.1".parse().unwrap();
        let scanner = ScriptedScanner::new(&[80]);
        let report =
            scan_with_scanner(&scanner, &target, &ports("80,81"), &ProbeConfig::new()).await;

        for result in report.results() {
            if result.status == PortStatus::Closed {
                assert!(result.banner.is_none() && result.auth_outcome.is_none());
            }
        }
        assert_eq!(report.results().filter(|r| r.is_open()).count(), 1);
    }

    #[tokio::test]
    async fn test_run_scan_rejects_bad_config() {
        let target: TargetSpec = "127.0.0.1".parse().unwrap();
        let config = ProbeConfig::new().with_max_in_flight(0);
        let result = run_scan(&target, &ports("80"), &config).await;
        assert!(matches!(
            result,
            Err(ScanError::Config(ConfigError::InvalidConcurrency))
        ));
    }

    #[test]
    fn test_report_serializes_as_array() {
        let task = ScanTask::new(Ipv4Addr::new(10, 0, 0, 1), Port::new(22).unwrap());
        let report = ScanReport::from_ordered(vec![PortResult::closed(task)], 1);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                {"address": "10.0.0.1", "ports": [{"address": "10.0.0.1", "port": 22, "status": "closed"}]}
            ])
        );
    }
}
