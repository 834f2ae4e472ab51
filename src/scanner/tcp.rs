//! TCP Connect Scanner implementation.
//!
//! Performs standard TCP connect scans using the operating system's
//! socket API, then runs the optional banner and credential probes on the
//! same connection before closing it.

use crate::banner::grab_banner;
use crate::error::ProbeError;
use crate::scanner::auth::{Authenticator, LineAuthenticator};
use crate::scanner::traits::{PortResult, ProbeConfig, ScanTask, Scanner};
use async_trait::async_trait;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

/// Outcome of a single connection attempt.
#[derive(Debug)]
pub enum ConnectOutcome {
    /// Handshake completed; the live stream is handed to the caller.
    Open(TcpStream),
    /// No connection, with the transport-level reason.
    Closed(ProbeError),
}

/// Attempt one TCP connection under a deadline.
///
/// Never fails: every fault is folded into [`ConnectOutcome::Closed`].
pub async fn connect(addr: SocketAddr, connect_timeout: Duration) -> ConnectOutcome {
    match timeout(connect_timeout, TcpStream::connect(addr)).await {
        Ok(Ok(stream)) => ConnectOutcome::Open(stream),
        Ok(Err(e)) => ConnectOutcome::Closed(classify_error(e)),
        Err(_) => ConnectOutcome::Closed(ProbeError::Timeout),
    }
}

fn classify_error(e: io::Error) -> ProbeError {
    if e.kind() == io::ErrorKind::ConnectionRefused {
        return ProbeError::ConnectionRefused;
    }

    let error_str = e.to_string().to_lowercase();
    if error_str.contains("unreachable") {
        if error_str.contains("host") {
            ProbeError::HostUnreachable
        } else {
            ProbeError::NetworkUnreachable(e.to_string())
        }
    } else {
        ProbeError::ConnectionFailed(e.to_string())
    }
}

/// TCP Connect Scanner.
///
/// Uses standard socket connect() calls to determine port status.
/// Does not require elevated privileges.
pub struct TcpConnectScanner {
    timeout: Duration,
    grab_banners: bool,
    authenticator: Option<Arc<dyn Authenticator>>,
}

impl TcpConnectScanner {
    /// Create a new TCP connect scanner.
    ///
    /// # Arguments
    /// * `timeout` - Deadline for the connection and for each follow-up read
    /// * `grab_banners` - Whether to read a banner from open ports
    pub fn new(timeout: Duration, grab_banners: bool) -> Self {
        Self {
            timeout,
            grab_banners,
            authenticator: None,
        }
    }

    /// Build the scanner a [`ProbeConfig`] describes.
    pub fn from_config(config: &ProbeConfig) -> Self {
        let scanner = Self::new(config.timeout, config.grab_banner);
        match &config.credentials {
            Some(credentials) => {
                scanner.with_authenticator(Arc::new(LineAuthenticator::new(credentials.clone())))
            }
            None => scanner,
        }
    }

    /// Run `authenticator` on every open connection.
    pub fn with_authenticator(mut self, authenticator: Arc<dyn Authenticator>) -> Self {
        self.authenticator = Some(authenticator);
        self
    }
}

#[async_trait]
impl Scanner for TcpConnectScanner {
    async fn scan(&self, task: ScanTask) -> PortResult {
        let mut stream = match connect(task.socket_addr(), self.timeout).await {
            ConnectOutcome::Open(stream) => stream,
            ConnectOutcome::Closed(reason) => {
                debug!(%task, %reason, "closed");
                return PortResult::closed(task);
            }
        };
        debug!(%task, "open");

        let banner = if self.grab_banners {
            grab_banner(&mut stream, self.timeout).await
        } else {
            None
        };

        let auth_outcome = match &self.authenticator {
            Some(authenticator) => authenticator.authenticate(&mut stream, self.timeout).await,
            None => None,
        };

        // closes the socket
        drop(stream);

        PortResult::open(task, banner, auth_outcome)
    }
}
