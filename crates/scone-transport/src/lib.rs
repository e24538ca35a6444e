//! Byte-stream connections to a Scone knowledge-base server.
//!
//! The server speaks a line-oriented text protocol over a plain duplex
//! stream. This crate only opens, tunes and closes that stream:
//! - TCP (the server's native listener, default `localhost:6517`)
//! - Unix domain sockets (Linux/macOS, for local relays)
//!
//! Everything else builds on top of the [`SconeStream`] type provided here.

pub mod error;
pub mod stream;
pub mod tcp;

#[cfg(unix)]
pub mod uds;

pub use error::{Result, TransportError};
pub use stream::SconeStream;
pub use tcp::{TcpTransport, DEFAULT_HOST, DEFAULT_PORT};

#[cfg(unix)]
pub use uds::UnixTransport;
