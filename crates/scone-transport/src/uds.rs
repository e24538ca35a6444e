use std::os::unix::net::UnixStream;
use std::path::Path;

use tracing::debug;

use crate::error::{Result, TransportError};
use crate::stream::SconeStream;

/// Unix domain socket transport.
///
/// The server itself only listens on TCP; this is for local relays that
/// expose it on a filesystem socket.
pub struct UnixTransport;

impl UnixTransport {
    /// Connect to a listening Unix domain socket (blocking).
    pub fn connect(path: impl AsRef<Path>) -> Result<SconeStream> {
        let path = path.as_ref();
        let stream = UnixStream::connect(path).map_err(|e| TransportError::Connect {
            addr: path.display().to_string(),
            source: e,
        })?;
        debug!(?path, "connected to unix domain socket");
        Ok(SconeStream::from_unix(stream))
    }
}
