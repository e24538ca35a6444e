use std::time::Duration;

use scone_frame::FrameConfig;

use crate::protocol::PROMPT;

/// Default number of cached query replies.
pub const DEFAULT_CACHE_CAPACITY: usize = 512;

/// Client behavior configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Readiness line expected before every sentence.
    pub prompt: String,
    /// Maximum number of cached query replies. Zero disables caching.
    pub cache_capacity: usize,
    /// Line framing limits and read/write deadlines.
    pub frame: FrameConfig,
    /// Deadline for establishing a TCP connection.
    pub connect_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            prompt: PROMPT.to_string(),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            frame: FrameConfig::default(),
            connect_timeout: Some(Duration::from_secs(5)),
        }
    }
}
