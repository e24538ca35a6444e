use std::hash::{Hash, Hasher};

/// A semantic error reported by the server.
///
/// The connection stays usable after one of these: the diagnostic and the
/// trailing `NIL` have already been drained from the stream.
///
/// Two remote errors are equal when their messages are equal, whatever the
/// raw diagnostic text was. This lets batch outcomes be compared directly;
/// it is not a general identity for error occurrences.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct RemoteError {
    message: String,
    diagnostic: String,
}

impl RemoteError {
    /// Create a remote error carrying only a message.
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            diagnostic: message.clone(),
            message,
        }
    }

    pub(crate) fn with_diagnostic(message: String, diagnostic: String) -> Self {
        Self {
            message,
            diagnostic,
        }
    }

    /// The extracted human-readable message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The full diagnostic as received, whitespace collapsed.
    pub fn diagnostic(&self) -> &str {
        &self.diagnostic
    }
}

impl PartialEq for RemoteError {
    fn eq(&self, other: &Self) -> bool {
        self.message == other.message
    }
}

impl Eq for RemoteError {}

impl Hash for RemoteError {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.message.hash(state);
    }
}

/// Errors that can occur in client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] scone_transport::TransportError),

    /// Line framing error, including end of stream before a delimiter.
    #[error("frame error: {0}")]
    Frame(#[from] scone_frame::FrameError),

    /// The outbound sentence is not a parenthesized expression. Nothing was sent.
    #[error("bad input format: '{0}'")]
    BadFormat(String),

    /// The stream is out of step with the request/response cycle.
    #[error("protocol desynchronized: {0}")]
    Protocol(String),

    /// The server rejected the sentence.
    #[error("{0}")]
    Remote(#[from] RemoteError),

    /// A predicate sentence produced something other than YES, NO or MAYBE.
    #[error("sentence '{sentence}' was not a predicate: '{reply}'")]
    NotPredicate { sentence: String, reply: String },

    /// A sentence inside a batch failed; the batch was rolled back.
    #[error("the sentence '{sentence}' raises '{source}'")]
    Transaction {
        sentence: String,
        source: RemoteError,
    },
}

impl ClientError {
    /// Whether the connection must be discarded after this error.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ClientError::Transport(_) | ClientError::Frame(_) | ClientError::Protocol(_)
        )
    }

    /// The server's message, for errors that originate from a remote failure.
    pub fn remote_message(&self) -> Option<&str> {
        match self {
            ClientError::Remote(err) | ClientError::Transaction { source: err, .. } => {
                Some(err.message())
            }
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
