//! Client for the Scone knowledge-base server.
//!
//! A [`SconeClient`] drives the server's prompt-driven text protocol: wait
//! for the prompt, send one parenthesized sentence, read one reply. Remote
//! diagnostics become [`RemoteError`]s, read-only queries are answered from
//! a bounded reply cache, and [`Client::multi_sentence`] runs a batch that
//! is rolled back to a checkpoint when any sentence fails.
//!
//! ```no_run
//! # fn main() -> scone_client::Result<()> {
//! let mut scone = scone_client::connect("localhost", 6517)?;
//! scone.sentence("(new-indv {Marta} {elephant})")?;
//! assert_eq!(scone.predicate("(is-x-a-y? {Marta} {animal})")?, "YES");
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod client;
pub mod config;
pub mod connector;
pub mod error;
pub mod protocol;
pub mod sentence;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod transaction;

pub use cache::ReplyCache;
pub use client::{Client, SconeClient};
pub use config::{ClientConfig, DEFAULT_CACHE_CAPACITY};
#[cfg(unix)]
pub use connector::connect_unix;
pub use connector::{connect, connect_with_config, from_stream};
pub use error::{ClientError, RemoteError, Result};
pub use sentence::Sentence;
pub use transaction::{checkpoint_name, SentenceOutcome, CHECKPOINT_PARENT};
