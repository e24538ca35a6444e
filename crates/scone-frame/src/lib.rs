//! Newline framing and reply assembly for the Scone text protocol.
//!
//! The server writes plain text with no length prefix. Message boundaries
//! are recovered from the byte stream in two steps:
//! - lines: everything up to the next `\n`, with blank padding skipped
//! - replies: a single line, or a parenthesized structure that keeps
//!   absorbing lines until the accumulated text ends with `)`
//!
//! No partial reads, no buffer management in user code.

pub mod codec;
pub mod error;
pub mod reader;
pub mod reply;
pub mod writer;

pub use codec::{
    decode_line, encode_sentence, FrameConfig, DEFAULT_MAX_LINE_LENGTH,
};
pub use error::{FrameError, Result};
pub use reader::LineReader;
pub use reply::is_structured;
pub use writer::SentenceWriter;
