//! Client for the Scone knowledge-base server.
//!
//! Scone answers parenthesized Lisp sentences over a prompt-driven text
//! protocol. This crate bundles the layers needed to talk to it.
//!
//! # Crate Structure
//!
//! - [`transport`]: TCP and Unix socket connections
//! - [`frame`]: newline framing and multi-line reply assembly
//! - [`client`]: exchanges, reply cache, checkpoint batches
//! - [`knowledge`]: loading local knowledge files (behind `knowledge` feature)

/// Re-export transport types.
pub mod transport {
    pub use scone_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use scone_frame::*;
}

/// Re-export client types.
pub mod client {
    pub use scone_client::*;
}

/// Re-export knowledge loading types (requires `knowledge` feature).
#[cfg(feature = "knowledge")]
pub mod knowledge {
    pub use scone_knowledge::*;
}

pub use scone_client::{
    connect, connect_with_config, Client, ClientConfig, ClientError, RemoteError, SconeClient,
    Sentence,
};
