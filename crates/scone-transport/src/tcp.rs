use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::debug;

use crate::error::{Result, TransportError};
use crate::stream::SconeStream;

/// Host the server listens on when none is configured.
pub const DEFAULT_HOST: &str = "localhost";

/// Port the server listens on when none is configured.
pub const DEFAULT_PORT: u16 = 6517;

/// TCP transport to a Scone server.
pub struct TcpTransport;

impl TcpTransport {
    /// Connect to `host:port` (blocking, no connect deadline).
    pub fn connect(host: &str, port: u16) -> Result<SconeStream> {
        Self::connect_inner(host, port, None)
    }

    /// Connect to `host:port`, giving up on each resolved address after `timeout`.
    pub fn connect_timeout(host: &str, port: u16, timeout: Duration) -> Result<SconeStream> {
        Self::connect_inner(host, port, Some(timeout))
    }

    fn connect_inner(host: &str, port: u16, timeout: Option<Duration>) -> Result<SconeStream> {
        let addr = format!("{host}:{port}");
        let candidates: Vec<SocketAddr> = (host, port)
            .to_socket_addrs()
            .map_err(|source| TransportError::Resolve {
                addr: addr.clone(),
                source,
            })?
            .collect();

        if candidates.is_empty() {
            return Err(TransportError::Resolve {
                addr,
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "no addresses resolved",
                ),
            });
        }

        let mut last_err = None;
        for candidate in candidates {
            let attempt = match timeout {
                Some(timeout) => TcpStream::connect_timeout(&candidate, timeout),
                None => TcpStream::connect(candidate),
            };
            match attempt {
                Ok(stream) => {
                    // Sentences are small and strictly request/response.
                    stream.set_nodelay(true)?;
                    debug!(%candidate, "connected to scone server");
                    return Ok(SconeStream::from_tcp(stream));
                }
                Err(err) => {
                    debug!(%candidate, error = %err, "connect attempt failed");
                    last_err = Some(err);
                }
            }
        }

        Err(TransportError::Connect {
            addr,
            source: last_err.unwrap_or_else(|| {
                std::io::Error::new(std::io::ErrorKind::NotConnected, "no connect attempt made")
            }),
        })
    }
}
