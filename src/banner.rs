//! Banner grabbing on established TCP connections.
//!
//! Reads whatever a service sends right after the handshake, once, and keeps
//! it only if it is text.

use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::time::timeout;
use tracing::debug;

/// Maximum bytes read from a service in one probe step.
pub const MAX_BANNER_SIZE: usize = 1024;

/// Grab a banner from an open connection.
///
/// Performs a single bounded read. Returns `None` when the service sent
/// nothing, the read timed out or failed, or the payload is not UTF-8 text.
pub async fn grab_banner<S>(stream: &mut S, read_timeout: Duration) -> Option<String>
where
    S: AsyncRead + Unpin + ?Sized,
{
    let chunk = read_chunk(stream, read_timeout).await?;
    decode_banner(&chunk)
}

/// Read one chunk of at most [`MAX_BANNER_SIZE`] bytes.
///
/// `None` covers timeout, transport error and end of stream alike.
pub(crate) async fn read_chunk<S>(stream: &mut S, read_timeout: Duration) -> Option<Vec<u8>>
where
    S: AsyncRead + Unpin + ?Sized,
{
    let mut buffer = vec![0u8; MAX_BANNER_SIZE];

    match timeout(read_timeout, stream.read(&mut buffer)).await {
        Ok(Ok(n)) if n > 0 => {
            buffer.truncate(n);
            Some(buffer)
        }
        Ok(Ok(_)) => {
            debug!("peer closed without sending data");
            None
        }
        Ok(Err(e)) => {
            debug!(error = %e, "read failed");
            None
        }
        Err(_) => {
            debug!(?read_timeout, "read timed out");
            None
        }
    }
}

/// Decode raw banner bytes as trimmed UTF-8 text.
pub fn decode_banner(data: &[u8]) -> Option<String> {
    match std::str::from_utf8(data) {
        Ok(text) => {
            let text = text.trim();
            if text.is_empty() {
                None
            } else {
                Some(text.to_string())
            }
        }
        Err(e) => {
            debug!(error = %e, len = data.len(), "banner is not text");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;
    use tokio_test::io::Builder;

    const TIMEOUT: Duration = Duration::from_millis(200);

    #[test]
    fn test_decode_banner() {
        assert_eq!(
            decode_banner(b"SSH-2.0-OpenSSH_8.9\r\n").as_deref(),
            Some("SSH-2.0-OpenSSH_8.9")
        );
        assert_eq!(decode_banner(b"  \r\n\t"), None);
        assert_eq!(decode_banner(b""), None);
    }

    #[test]
    fn test_decode_binary_data() {
        assert_eq!(decode_banner(b"\xff\xfe\x00binary"), None);
    }

    #[tokio::test]
    async fn test_grab_banner() {
        let mut stream = Builder::new().read(b"220 ftp.example.org FTP ready\r\n").build();
        let banner = grab_banner(&mut stream, TIMEOUT).await;
        assert_eq!(banner.as_deref(), Some("220 ftp.example.org FTP ready"));
    }

    #[tokio::test]
    async fn test_grab_banner_reads_once() {
        let mut stream = Builder::new().read(b"hello").build();
        assert_eq!(grab_banner(&mut stream, TIMEOUT).await.as_deref(), Some("hello"));
        // the stream is exhausted, a second grab sees end of stream
        assert_eq!(grab_banner(&mut stream, TIMEOUT).await, None);
    }

    #[tokio::test]
    async fn test_grab_banner_silent_service() {
        let mut stream = Builder::new().build();
        assert_eq!(grab_banner(&mut stream, TIMEOUT).await, None);
    }

    #[tokio::test]
    async fn test_grab_banner_read_error() {
        let err = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
        let mut stream = Builder::new().read_error(err).build();
        assert_eq!(grab_banner(&mut stream, TIMEOUT).await, None);
    }

    #[tokio::test]
    async fn test_grab_banner_times_out() {
        let mut stream = Builder::new().wait(Duration::from_secs(10)).build();
        let started = std::time::Instant::now();
        assert_eq!(grab_banner(&mut stream, Duration::from_millis(50)).await, None);
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_grab_banner_is_bounded() {
        let (mut client, mut server) = tokio::io::duplex(4096);
        server.write_all(&[b'A'; 3000]).await.unwrap();

        let banner = grab_banner(&mut client, TIMEOUT).await.unwrap();
        assert_eq!(banner.len(), MAX_BANNER_SIZE);
    }
}
