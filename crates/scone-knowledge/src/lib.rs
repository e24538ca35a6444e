//! Local knowledge files for a Scone server.
//!
//! Finds `.lisp` knowledge files under a directory in a stable order and asks
//! the server to load each one. Snapshot directories are always loaded last.
//!
//! The server reads the files itself, so the paths must be valid on the
//! server's filesystem. This crate only decides which files, and in which
//! order.

pub mod config;
pub mod error;
pub mod loader;
pub mod walker;

pub use config::LoaderConfig;
pub use error::{LoadError, Result};
pub use loader::{load_local_knowledge, SentenceExecutor};
pub use walker::knowledge_files;
