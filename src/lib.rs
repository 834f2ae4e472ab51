//! # tcprecon - Concurrent TCP Reconnaissance
//!
//! Given a target (single IPv4 address, CIDR block or address range) and an
//! ordered list of ports, tcprecon determines which (address, port) pairs
//! accept TCP connections, optionally reads a service banner, and optionally
//! tries a `username:password` line exchange on every open port.
//!
//! ## Features
//!
//! - **Flexible Targeting**: single IPs, CIDR blocks and inclusive ranges,
//!   expanded lazily
//! - **Bounded Concurrency**: every probe runs on one async task with a
//!   configurable cap on connections in flight
//! - **Deterministic Reports**: results come back grouped per address in
//!   enumeration order, whatever order the network answers in
//! - **Banner Grabbing** and a pluggable **Credential Probe**
//! - **Output**: console text or a timestamped JSON report
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use tcprecon::scanner::{run_scan, ProbeConfig};
//! use tcprecon::types::{PortSet, TargetSpec};
//!
//! #[tokio::main]
//! async fn main() {
//!     let target = TargetSpec::parse_cidr("192.168.1.0/30").unwrap();
//!     let ports: PortSet = "22,80".parse().unwrap();
//!     let config = ProbeConfig::new().with_banners();
//!
//!     let report = run_scan(&target, &ports, &config).await.unwrap();
//!     for result in report.results() {
//!         println!("{}:{} is {}", result.address, result.port, result.status);
//!     }
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`types`] - targets, address expansion, ports
//! - [`scanner`] - connection prober, probe pipeline and scan orchestration
//! - [`banner`] - banner reading and decoding
//! - [`output`] - console and JSON presentation
//! - [`config`] - application settings
//! - [`error`] - error types

pub mod banner;
pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod scanner;
pub mod types;

// Re-export commonly used types
pub use error::{CliError, ScanError};
pub use scanner::{run_scan, PortResult, PortStatus, ProbeConfig, ScanReport, Scanner};
pub use types::{Port, PortSet, TargetSpec};
