/// Errors that can occur while framing lines and replies.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// A line grew past the configured maximum without a newline.
    #[error("line too long ({size} bytes, max {max})")]
    LineTooLong { size: usize, max: usize },

    /// A line is not valid UTF-8 text.
    #[error("line is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    /// An I/O error occurred while reading or writing lines.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A read or write deadline expired.
    #[error("transport deadline expired")]
    TimedOut,

    /// The connection was closed before a required delimiter was received.
    #[error("connection closed (incomplete line)")]
    ConnectionClosed,
}

pub type Result<T> = std::result::Result<T, FrameError>;
