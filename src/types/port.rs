//! Port types with validation and parsing.
//!
//! The `Port` newtype ensures values are always valid port numbers (1-65535).
//! `PortSet` is the ordered port list a scan walks; it keeps input order and
//! duplicates exactly as given.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// A validated network port number (1-65535).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct Port(u16);

impl Port {
    /// Minimum valid port number.
    pub const MIN: u16 = 1;
    /// Maximum valid port number.
    pub const MAX: u16 = 65535;

    /// Create a new Port from a u16, returning None if invalid.
    #[inline]
    pub const fn new(port: u16) -> Option<Self> {
        if port >= Self::MIN {
            Some(Self(port))
        } else {
            None
        }
    }

    /// Get the raw port number.
    #[inline]
    pub const fn as_u16(self) -> u16 {
        self.0
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl TryFrom<u16> for Port {
    type Error = PortError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(PortError::OutOfRange(value.into()))
    }
}

impl From<Port> for u16 {
    fn from(port: Port) -> Self {
        port.0
    }
}

impl FromStr for Port {
    type Err = PortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let value: u32 = s
            .parse()
            .map_err(|_| PortError::InvalidFormat(s.to_string()))?;
        u16::try_from(value)
            .ok()
            .and_then(Port::new)
            .ok_or(PortError::OutOfRange(value))
    }
}

/// Error type for port parsing and validation.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PortError {
    #[error("port {0} is out of valid range (1-65535)")]
    OutOfRange(u32),
    #[error("invalid port number: {0:?}")]
    InvalidFormat(String),
    #[error("invalid port range: start ({0}) > end ({1})")]
    InvalidRange(u16, u16),
    #[error("empty port specification")]
    Empty,
    #[error("failed to read ports file {path}: {reason}")]
    ReadFailed { path: PathBuf, reason: String },
    #[error("{path}:{line}: {source}")]
    InvalidLine {
        path: PathBuf,
        line: usize,
        #[source]
        source: Box<PortError>,
    },
}

/// The ordered sequence of ports probed on every address.
///
/// Order and duplicates are preserved from the input, so `"443,22,443"` probes
/// port 443 twice. A `PortSet` is never empty and is not mutated once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortSet {
    ports: Vec<Port>,
}

impl PortSet {
    /// Build a port set from an already validated list.
    pub fn new(ports: Vec<Port>) -> Result<Self, PortError> {
        if ports.is_empty() {
            return Err(PortError::Empty);
        }
        Ok(Self { ports })
    }

    /// Load a ports file: one port per line, blank lines ignored.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, PortError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| PortError::ReadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::parse_lines(&content, path)
    }

    /// Parse newline separated port numbers read from `path`.
    fn parse_lines(content: &str, path: &Path) -> Result<Self, PortError> {
        let mut ports = Vec::new();
        for (idx, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let port = line.parse::<Port>().map_err(|e| PortError::InvalidLine {
                path: path.to_path_buf(),
                line: idx + 1,
                source: Box::new(e),
            })?;
            ports.push(port);
        }
        Self::new(ports)
    }

    /// The ports in probe order.
    pub fn as_slice(&self) -> &[Port] {
        &self.ports
    }

    /// Iterate over the ports in probe order.
    pub fn iter(&self) -> impl Iterator<Item = Port> + '_ {
        self.ports.iter().copied()
    }

    /// Number of ports, duplicates included.
    pub fn len(&self) -> usize {
        self.ports.len()
    }

    /// Always false for a constructed set.
    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }
}

/// Parses a comma-separated list such as `"22,80,443"`.
///
/// An inclusive range (`"8000-8003"`) expands in ascending order at its
/// position in the list.
impl FromStr for PortSet {
    type Err = PortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(PortError::Empty);
        }

        let mut ports = Vec::new();
        for part in s.split(',') {
            let part = part.trim();
            if let Some((start, end)) = part.split_once('-') {
                let start: Port = start.parse()?;
                let end: Port = end.parse()?;
                if start > end {
                    return Err(PortError::InvalidRange(start.as_u16(), end.as_u16()));
                }
                ports.extend((start.as_u16()..=end.as_u16()).filter_map(Port::new));
            } else {
                ports.push(part.parse()?);
            }
        }

        Self::new(ports)
    }
}

impl fmt::Display for PortSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.ports.iter().map(|p| p.to_string()).collect();
        write!(f, "{}", parts.join(","))
    }
}
