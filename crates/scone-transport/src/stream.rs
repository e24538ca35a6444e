use std::io::{ErrorKind, Read, Write};
use std::net::{Shutdown, TcpStream};
use std::time::Duration;

use crate::error::{Result, TransportError};

/// A connected server stream. Implements `Read` and `Write`.
///
/// This is the fundamental I/O type returned by transport operations.
/// It wraps a TCP stream, or a Unix domain socket stream on Unix.
pub struct SconeStream {
    inner: SconeStreamInner,
}

enum SconeStreamInner {
    Tcp(TcpStream),
    #[cfg(unix)]
    Unix(std::os::unix::net::UnixStream),
}

impl Read for SconeStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match &mut self.inner {
            SconeStreamInner::Tcp(stream) => stream.read(buf),
            #[cfg(unix)]
            SconeStreamInner::Unix(stream) => stream.read(buf),
        }
    }
}

impl Write for SconeStream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match &mut self.inner {
            SconeStreamInner::Tcp(stream) => stream.write(buf),
            #[cfg(unix)]
            SconeStreamInner::Unix(stream) => stream.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match &mut self.inner {
            SconeStreamInner::Tcp(stream) => stream.flush(),
            #[cfg(unix)]
            SconeStreamInner::Unix(stream) => stream.flush(),
        }
    }
}

impl SconeStream {
    /// Wrap an already connected TCP stream.
    pub fn from_tcp(stream: TcpStream) -> Self {
        Self {
            inner: SconeStreamInner::Tcp(stream),
        }
    }

    /// Wrap an already connected Unix domain socket stream.
    #[cfg(unix)]
    pub fn from_unix(stream: std::os::unix::net::UnixStream) -> Self {
        Self {
            inner: SconeStreamInner::Unix(stream),
        }
    }

    /// Set read timeout on the underlying stream.
    pub fn set_read_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        match &self.inner {
            SconeStreamInner::Tcp(stream) => stream.set_read_timeout(timeout).map_err(Into::into),
            #[cfg(unix)]
            SconeStreamInner::Unix(stream) => stream.set_read_timeout(timeout).map_err(Into::into),
        }
    }

    /// Set write timeout on the underlying stream.
    pub fn set_write_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        match &self.inner {
            SconeStreamInner::Tcp(stream) => stream.set_write_timeout(timeout).map_err(Into::into),
            #[cfg(unix)]
            SconeStreamInner::Unix(stream) => stream.set_write_timeout(timeout).map_err(Into::into),
        }
    }

    /// Try to clone this stream (creates a new file descriptor).
    ///
    /// Both handles refer to the same socket, so one can be read while the
    /// other is written.
    pub fn try_clone(&self) -> Result<Self> {
        match &self.inner {
            SconeStreamInner::Tcp(stream) => Ok(Self::from_tcp(stream.try_clone()?)),
            #[cfg(unix)]
            SconeStreamInner::Unix(stream) => Ok(Self::from_unix(stream.try_clone()?)),
        }
    }

    /// Shut down both directions of the connection.
    ///
    /// Every clone of this stream observes the shutdown.
    pub fn shutdown(&self) -> Result<()> {
        let result = match &self.inner {
            SconeStreamInner::Tcp(stream) => stream.shutdown(Shutdown::Both),
            #[cfg(unix)]
            SconeStreamInner::Unix(stream) => stream.shutdown(Shutdown::Both),
        };
        match result {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotConnected => Err(TransportError::Shutdown),
            Err(err) => Err(TransportError::Io(err)),
        }
    }

    /// Human-readable remote endpoint for diagnostics.
    pub fn peer_label(&self) -> String {
        match &self.inner {
            SconeStreamInner::Tcp(stream) => stream
                .peer_addr()
                .map(|addr| addr.to_string())
                .unwrap_or_else(|_| "tcp:<unknown>".to_string()),
            #[cfg(unix)]
            SconeStreamInner::Unix(stream) => stream
                .peer_addr()
                .ok()
                .and_then(|addr| addr.as_pathname().map(|p| p.display().to_string()))
                .unwrap_or_else(|| "unix:<unnamed>".to_string()),
        }
    }

    /// Transport name for diagnostics.
    pub fn transport_name(&self) -> &'static str {
        match &self.inner {
            SconeStreamInner::Tcp(_) => "tcp",
            #[cfg(unix)]
            SconeStreamInner::Unix(_) => "unix-domain-socket",
        }
    }
}

impl std::fmt::Debug for SconeStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SconeStream")
            .field("type", &self.transport_name())
            .field("peer", &self.peer_label())
            .finish()
    }
}
