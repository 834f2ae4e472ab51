//! Error types for tcprecon.
//!
//! Uses `thiserror` for ergonomic error definitions.

use crate::types::{PortError, TargetError};
use std::path::PathBuf;
use thiserror::Error;

/// Why a connection attempt did not produce an open port.
///
/// Never escapes the probe layer; it only feeds `Closed` classification and
/// debug logging.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("connection timed out")]
    Timeout,

    #[error("connection refused")]
    ConnectionRefused,

    #[error("host unreachable")]
    HostUnreachable,

    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("connection failed: {0}")]
    ConnectionFailed(String),
}

/// Invalid or missing scan configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("no target specified (use --ip, --cidr or --range)")]
    NoTarget,

    #[error("no ports specified (use --ports or --portlist)")]
    NoPorts,

    #[error("timeout must be a positive number of seconds, got {0}")]
    InvalidTimeout(f64),

    #[error("concurrency must be at least 1")]
    InvalidConcurrency,

    #[error("--username and --password must be given together")]
    IncompleteCredentials,

    #[error("config directory not found")]
    DirectoryNotFound,

    #[error("failed to read config file {path}: {reason}")]
    ReadFailed { path: PathBuf, reason: String },

    #[error("invalid config format: {0}")]
    InvalidFormat(String),
}

/// Result type alias for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Failure of the scan orchestrator. Only raised before any task starts.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Failure to persist a finished report.
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("failed to write report {path}: {reason}")]
    WriteFailed { path: PathBuf, reason: String },

    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Top-level error for the command line front end.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("invalid target: {0}")]
    Target(#[from] TargetError),

    #[error("invalid ports: {0}")]
    Port(#[from] PortError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error("output error: {0}")]
    Output(#[from] OutputError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("scan interrupted")]
    Interrupted,
}

impl CliError {
    /// Process exit status for this error.
    ///
    /// Usage problems exit with 2, an interrupt with 130, everything else with 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Target(_) | Self::Port(_) | Self::Config(_) | Self::Scan(_) => 2,
            Self::Interrupted => 130,
            Self::Output(_) | Self::Io(_) => 1,
        }
    }
}

/// Result type alias for command line operations.
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(CliError::from(ConfigError::NoTarget).exit_code(), 2);
        assert_eq!(CliError::from(PortError::Empty).exit_code(), 2);
        assert_eq!(CliError::Interrupted.exit_code(), 130);
        let output = OutputError::WriteFailed {
            path: PathBuf::from("/reports/10.0.0.1_07-03-2026-0905.json"),
            reason: "permission denied".into(),
        };
        assert_eq!(CliError::from(output).exit_code(), 1);
        assert_eq!(CliError::from(ScanError::from(ConfigError::NoPorts)).exit_code(), 2);
    }

    #[test]
    fn test_scan_error_is_transparent() {
        let err = ScanError::from(ConfigError::NoPorts);
        assert_eq!(err.to_string(), ConfigError::NoPorts.to_string());
    }
}
