use std::path::PathBuf;

use scone_client::ClientError;

/// Errors that can occur while loading knowledge files.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// A directory could not be listed.
    #[error("failed to read {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// More files were found than the configured limit.
    #[error("found more than {max} knowledge files")]
    TooManyFiles { max: usize },

    /// The server rejected a file, or the exchange failed. Files after it
    /// were not sent.
    #[error("failed to load {path}: {source}")]
    LoadFailed {
        path: PathBuf,
        #[source]
        source: ClientError,
    },
}

impl LoadError {
    /// The underlying client error, when loading reached the server.
    pub fn client_error(&self) -> Option<&ClientError> {
        match self {
            LoadError::LoadFailed { source, .. } => Some(source),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, LoadError>;
