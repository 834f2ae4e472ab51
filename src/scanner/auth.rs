//! Credential probing over an open connection.
//!
//! The built-in [`LineAuthenticator`] speaks a minimal line protocol: send
//! `username:password\n`, read one reply, and compare it to a success string.
//! Other challenge/response exchanges plug in through [`Authenticator`].

use crate::banner::read_chunk;
use async_trait::async_trait;
use std::fmt;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tracing::debug;

/// Reply that marks a successful login for [`LineAuthenticator`].
pub const DEFAULT_SUCCESS_REPLY: &str = "Authentication successful";

/// A bidirectional byte stream an authenticator can talk over.
pub trait ProbeStream: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T> ProbeStream for T where T: AsyncRead + AsyncWrite + Unpin + Send + ?Sized {}

/// Username and password presented to every open port.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

// Keep passwords out of logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// A challenge/response exchange run on an open connection.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Run the exchange.
    ///
    /// Returns `Some(true)` on success, `Some(false)` on any other reply, and
    /// `None` when the exchange was interrupted before a reply arrived.
    async fn authenticate(&self, stream: &mut dyn ProbeStream, read_timeout: Duration)
        -> Option<bool>;
}

/// `username:password\n` line protocol with a literal success reply.
#[derive(Debug, Clone)]
pub struct LineAuthenticator {
    credentials: Credentials,
    success_reply: String,
}

impl LineAuthenticator {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            success_reply: DEFAULT_SUCCESS_REPLY.to_string(),
        }
    }

    /// Use a different success reply.
    pub fn with_success_reply(mut self, reply: impl Into<String>) -> Self {
        self.success_reply = reply.into();
        self
    }

    fn login_line(&self) -> String {
        format!("{}:{}\n", self.credentials.username, self.credentials.password)
    }
}

#[async_trait]
impl Authenticator for LineAuthenticator {
    async fn authenticate(
        &self,
        stream: &mut dyn ProbeStream,
        read_timeout: Duration,
    ) -> Option<bool> {
        let line = self.login_line();

        if let Err(e) = stream.write_all(line.as_bytes()).await {
            debug!(error = %e, "credential write failed");
            return None;
        }
        if let Err(e) = stream.flush().await {
            debug!(error = %e, "credential flush failed");
            return None;
        }

        let reply = read_chunk(stream, read_timeout).await?;
        let reply = String::from_utf8_lossy(&reply);
        let accepted = reply.trim() == self.success_reply;

        debug!(username = %self.credentials.username, accepted, "credential probe finished");
        Some(accepted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::io::Builder;

    const TIMEOUT: Duration = Duration::from_millis(200);

    fn admin() -> LineAuthenticator {
        LineAuthenticator::new(Credentials::new("admin", "admin"))
    }

    #[tokio::test]
    async fn test_success_reply() {
        let mut stream = Builder::new()
            .write(b"admin:admin\n")
            .read(b"Authentication successful\r\n")
            .build();
        assert_eq!(admin().authenticate(&mut stream, TIMEOUT).await, Some(true));
    }

    #[tokio::test]
    async fn test_other_reply() {
        let mut stream = Builder::new()
            .write(b"admin:admin\n")
            .read(b"Authentication failed\n")
            .build();
        assert_eq!(admin().authenticate(&mut stream, TIMEOUT).await, Some(false));
    }

    #[tokio::test]
    async fn test_reply_must_match_exactly() {
        let mut stream = Builder::new()
            .write(b"admin:admin\n")
            .read(b"Authentication successful. Welcome!")
            .build();
        assert_eq!(admin().authenticate(&mut stream, TIMEOUT).await, Some(false));
    }

    #[tokio::test]
    async fn test_closed_before_reply() {
        let mut stream = Builder::new().write(b"admin:admin\n").build();
        assert_eq!(admin().authenticate(&mut stream, TIMEOUT).await, None);
    }

    #[tokio::test]
    async fn test_write_failure() {
        let err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "broken pipe");
        let mut stream = Builder::new().write_error(err).build();
        assert_eq!(admin().authenticate(&mut stream, TIMEOUT).await, None);
    }

    #[tokio::test]
    async fn test_custom_success_reply() {
        let auth = LineAuthenticator::new(Credentials::new("root", "toor"))
            .with_success_reply("OK");
        let mut stream = Builder::new().write(b"root:toor\n").read(b"OK\n").build();
        assert_eq!(auth.authenticate(&mut stream, TIMEOUT).await, Some(true));
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let rendered = format!("{:?}", Credentials::new("admin", "hunter2"));
        assert!(rendered.contains("admin"));
        assert!(!rendered.contains("hunter2"));
    }
}
