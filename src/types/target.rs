//! Target specification types and address expansion.
//!
//! A target is one of:
//! - A single IPv4 address (`192.168.1.1`)
//! - A CIDR block (`192.168.1.0/24`), expanded to its usable host addresses
//! - An inclusive range (`10.0.0.1-10.0.0.20`)
//!
//! Expansion is lazy and restartable: every call to [`TargetSpec::addresses`]
//! yields a fresh iterator in ascending numeric order.

use ipnetwork::Ipv4Network;
use std::fmt;
use std::net::Ipv4Addr;
use std::ops::RangeInclusive;
use std::str::FromStr;

/// Error type for target parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TargetError {
    #[error("invalid IPv4 address: {0:?}")]
    InvalidAddress(String),
    #[error("invalid CIDR notation: {0:?}")]
    InvalidCidr(String),
    #[error("invalid address range: {0:?} (expected START-END)")]
    InvalidRange(String),
    #[error("address range is reversed: {start} > {end}")]
    ReversedRange { start: Ipv4Addr, end: Ipv4Addr },
}

/// An immutable, parsed scan target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetSpec {
    /// A single IPv4 address.
    Single(Ipv4Addr),
    /// A CIDR network block.
    Cidr(Ipv4Network),
    /// An inclusive address range, `start <= end`.
    Range { start: Ipv4Addr, end: Ipv4Addr },
}

impl TargetSpec {
    /// Parse a single IPv4 literal.
    pub fn parse_ip(s: &str) -> Result<Self, TargetError> {
        let s = s.trim();
        s.parse::<Ipv4Addr>()
            .map(Self::Single)
            .map_err(|_| TargetError::InvalidAddress(s.to_string()))
    }

    /// Parse CIDR notation. Host bits are masked off, so `10.0.0.7/24`
    /// describes the `10.0.0.0/24` block.
    pub fn parse_cidr(s: &str) -> Result<Self, TargetError> {
        let s = s.trim();
        let invalid = || TargetError::InvalidCidr(s.to_string());

        let (addr, prefix) = s.split_once('/').ok_or_else(invalid)?;
        let addr: Ipv4Addr = addr.trim().parse().map_err(|_| invalid())?;
        let prefix: u8 = prefix.trim().parse().map_err(|_| invalid())?;

        let network = Ipv4Network::new(addr, prefix).map_err(|_| invalid())?;
        let network = Ipv4Network::new(network.network(), prefix).map_err(|_| invalid())?;
        Ok(Self::Cidr(network))
    }

    /// Parse an inclusive `start-end` range of IPv4 literals.
    pub fn parse_range(s: &str) -> Result<Self, TargetError> {
        let s = s.trim();
        let (start, end) = s
            .split_once('-')
            .ok_or_else(|| TargetError::InvalidRange(s.to_string()))?;

        let start: Ipv4Addr = start
            .trim()
            .parse()
            .map_err(|_| TargetError::InvalidAddress(start.trim().to_string()))?;
        let end: Ipv4Addr = end
            .trim()
            .parse()
            .map_err(|_| TargetError::InvalidAddress(end.trim().to_string()))?;

        if u32::from(start) > u32::from(end) {
            return Err(TargetError::ReversedRange { start, end });
        }
        Ok(Self::Range { start, end })
    }

    /// First and last address emitted, as integers.
    fn bounds(&self) -> (u32, u32) {
        match *self {
            Self::Single(ip) => (ip.into(), ip.into()),
            Self::Range { start, end } => (start.into(), end.into()),
            Self::Cidr(net) => {
                let network = u32::from(net.network());
                let broadcast = u32::from(net.broadcast());
                // /31 and /32 have no network/broadcast pair to exclude
                if net.prefix() >= 31 {
                    (network, broadcast)
                } else {
                    (network + 1, broadcast - 1)
                }
            }
        }
    }

    /// Lazily enumerate every address of this target in ascending order.
    pub fn addresses(&self) -> Addresses {
        let (start, end) = self.bounds();
        Addresses { inner: start..=end }
    }

    /// Number of addresses [`addresses`](Self::addresses) yields.
    pub fn host_count(&self) -> u64 {
        let (start, end) = self.bounds();
        u64::from(end) - u64::from(start) + 1
    }

    /// Filesystem-safe name of this target, used in report file names.
    pub fn identifier(&self) -> String {
        match self {
            Self::Single(ip) => ip.to_string(),
            Self::Cidr(net) => format!("{}_{}", net.network(), net.prefix()),
            Self::Range { start, end } => format!("{}-{}", start, end),
        }
    }
}

/// Guesses the notation: `/` means CIDR, `-` means range, else a single address.
impl FromStr for TargetSpec {
    type Err = TargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.contains('/') {
            Self::parse_cidr(s)
        } else if s.contains('-') {
            Self::parse_range(s)
        } else {
            Self::parse_ip(s)
        }
    }
}

impl fmt::Display for TargetSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(ip) => write!(f, "{}", ip),
            Self::Cidr(net) => write!(f, "{}", net),
            Self::Range { start, end } => write!(f, "{}-{}", start, end),
        }
    }
}

/// Iterator over the addresses of a [`TargetSpec`].
#[derive(Debug, Clone)]
pub struct Addresses {
    inner: RangeInclusive<u32>,
}

impl Iterator for Addresses {
    type Item = Ipv4Addr;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(Ipv4Addr::from)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}
