//! Fixed tokens of the Scone wire protocol.

use crate::error::RemoteError;

/// Line the server emits when it is ready for the next sentence.
pub const PROMPT: &str = "[PROMPT]";

/// First line of every error reply.
pub const ERROR_SENTINEL: &str = "*****SCONE-ERROR*****";

/// Marker preceding the human-readable part of an error diagnostic.
pub const ERROR_MARKER: &str = "Error:";

/// Token the server appends after every error diagnostic.
pub const ERROR_TERMINATOR: &str = "NIL";

/// Predicate answer: the statement holds.
pub const YES: &str = "YES";
/// Predicate answer: the statement cannot hold.
pub const NO: &str = "NO";
/// Predicate answer: the knowledge base cannot decide.
pub const MAYBE: &str = "MAYBE";

/// Every reply a predicate sentence may produce.
pub const PREDICATE_ANSWERS: [&str; 3] = [YES, NO, MAYBE];

/// Whether a reply is the first line of an error diagnostic.
pub fn is_error_reply(reply: &str) -> bool {
    reply.starts_with(ERROR_SENTINEL)
}

/// Whether a reply is a valid predicate answer.
pub fn is_predicate_answer(reply: &str) -> bool {
    PREDICATE_ANSWERS.contains(&reply)
}

/// Build a [`RemoteError`] from a full error diagnostic.
///
/// `diagnostic` is the sentinel line followed by everything the server sent
/// before the terminating `NIL`. Whitespace runs collapse to one space; the
/// message is the segment after the first `Error:` marker, trimmed of spaces
/// and trailing periods. A diagnostic with no marker keeps whatever follows
/// the sentinel.
pub fn parse_error(diagnostic: &str) -> RemoteError {
    let collapsed = diagnostic.split_whitespace().collect::<Vec<_>>().join(" ");

    let segment = match collapsed.split(ERROR_MARKER).nth(1) {
        Some(segment) => segment,
        None => collapsed
            .strip_prefix(ERROR_SENTINEL)
            .unwrap_or(collapsed.as_str()),
    };
    let message = segment.trim().trim_end_matches('.').trim_end().to_string();

    RemoteError::with_diagnostic(message, collapsed)
}
