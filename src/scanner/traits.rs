//! Scanner trait abstraction and the values flowing through a scan.
//!
//! Defines a common interface for the per-task probe pipeline,
//! enabling polymorphism and easier testing.

use crate::error::ConfigError;
use crate::scanner::auth::Credentials;
use crate::types::Port;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::time::Duration;

/// Reachability of a single (address, port) pair at probe time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortStatus {
    /// The TCP handshake completed before the deadline.
    Open,
    /// Timed out, refused, or failed at the transport level.
    Closed,
}

impl fmt::Display for PortStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

/// One unit of work: a single (address, port) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanTask {
    pub address: Ipv4Addr,
    pub port: Port,
}

impl ScanTask {
    pub fn new(address: Ipv4Addr, port: Port) -> Self {
        Self { address, port }
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::V4(SocketAddrV4::new(self.address, self.port.as_u16()))
    }
}

impl fmt::Display for ScanTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.address, self.port)
    }
}

/// Result of probing a single task.
///
/// Build with [`PortResult::open`] or [`PortResult::closed`]; a closed result
/// never carries a banner or an auth outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortResult {
    /// Address that was probed.
    pub address: Ipv4Addr,
    /// The port number that was probed.
    pub port: Port,
    /// Status determined by the connection attempt.
    pub status: PortStatus,
    /// Banner captured from the service (if requested and sent).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner: Option<String>,
    /// Credential probe verdict (if credentials were supplied).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_outcome: Option<bool>,
}

impl PortResult {
    /// An open port, with whatever the follow-up probes produced.
    pub fn open(task: ScanTask, banner: Option<String>, auth_outcome: Option<bool>) -> Self {
        Self {
            address: task.address,
            port: task.port,
            status: PortStatus::Open,
            banner,
            auth_outcome,
        }
    }

    /// A closed port.
    pub fn closed(task: ScanTask) -> Self {
        Self {
            address: task.address,
            port: task.port,
            status: PortStatus::Closed,
            banner: None,
            auth_outcome: None,
        }
    }

    /// Check if the port is open.
    pub fn is_open(&self) -> bool {
        self.status == PortStatus::Open
    }
}

/// Per-run probe configuration. Immutable once a scan starts.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// Deadline for each connection attempt and each follow-up read.
    pub timeout: Duration,
    /// Read a banner from every open port.
    pub grab_banner: bool,
    /// Run the credential probe on every open port.
    pub credentials: Option<Credentials>,
    /// Maximum number of tasks in flight at once.
    pub max_in_flight: usize,
    /// Draw a progress bar on stderr.
    pub progress: bool,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout: Self::DEFAULT_TIMEOUT,
            grab_banner: false,
            credentials: None,
            max_in_flight: Self::DEFAULT_MAX_IN_FLIGHT,
            progress: false,
        }
    }
}

impl ProbeConfig {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);
    pub const DEFAULT_MAX_IN_FLIGHT: usize = 500;

    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Convert a user supplied number of seconds into a timeout.
    pub fn timeout_from_secs(secs: f64) -> Result<Duration, ConfigError> {
        if !secs.is_finite() || secs <= 0.0 {
            return Err(ConfigError::InvalidTimeout(secs));
        }
        Duration::try_from_secs_f64(secs).map_err(|_| ConfigError::InvalidTimeout(secs))
    }

    /// Set the timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Enable banner grabbing.
    pub fn with_banners(mut self) -> Self {
        self.grab_banner = true;
        self
    }

    /// Enable the credential probe.
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Bound the number of concurrent tasks.
    pub fn with_max_in_flight(mut self, max_in_flight: usize) -> Self {
        self.max_in_flight = max_in_flight;
        self
    }

    /// Show a progress bar.
    pub fn with_progress(mut self) -> Self {
        self.progress = true;
        self
    }

    /// Reject settings no scan can run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout(0.0));
        }
        if self.max_in_flight == 0 {
            return Err(ConfigError::InvalidConcurrency);
        }
        Ok(())
    }
}

/// Trait for the per-task probe pipeline.
///
/// The orchestrator only sees this trait, so alternate probe stacks (or
/// scripted ones in tests) plug in without touching scheduling.
#[async_trait]
pub trait Scanner: Send + Sync {
    /// Probe one task. Must always produce a result; faults become `Closed`
    /// or absent fields.
    async fn scan(&self, task: ScanTask) -> PortResult;
}
