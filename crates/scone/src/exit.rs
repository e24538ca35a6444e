use std::fmt;
use std::io;

use scone_client::ClientError;
use scone_frame::FrameError;
use scone_knowledge::LoadError;
use scone_transport::TransportError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const REMOTE_ERROR: i32 = 2;
pub const TRANSPORT_ERROR: i32 = 3;
pub const BAD_FORMAT: i32 = 60;
pub const USAGE: i32 = 64;
pub const PROTOCOL_ERROR: i32 = 65;
pub const TIMEOUT: i32 = 124;
#[allow(dead_code)]
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

fn is_timeout(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock
    )
}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = if is_timeout(&err) { TIMEOUT } else { FAILURE };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    let code = match &err {
        TransportError::Connect { source, .. }
        | TransportError::Resolve { source, .. }
        | TransportError::Io(source)
            if is_timeout(source) =>
        {
            TIMEOUT
        }
        _ => TRANSPORT_ERROR,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    let code = match &err {
        FrameError::TimedOut => TIMEOUT,
        FrameError::Io(source) if is_timeout(source) => TIMEOUT,
        FrameError::Io(_) => TRANSPORT_ERROR,
        FrameError::ConnectionClosed
        | FrameError::LineTooLong { .. }
        | FrameError::InvalidUtf8(_) => PROTOCOL_ERROR,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn client_error(context: &str, err: ClientError) -> CliError {
    match err {
        ClientError::Transport(err) => transport_error(context, err),
        ClientError::Frame(err) => frame_error(context, err),
        ClientError::BadFormat(_) => CliError::new(BAD_FORMAT, format!("{context}: {err}")),
        ClientError::Protocol(_) | ClientError::NotPredicate { .. } => {
            CliError::new(PROTOCOL_ERROR, format!("{context}: {err}"))
        }
        ClientError::Remote(_) | ClientError::Transaction { .. } => {
            CliError::new(REMOTE_ERROR, format!("{context}: {err}"))
        }
    }
}

pub fn load_error(context: &str, err: LoadError) -> CliError {
    match err {
        LoadError::LoadFailed { path, source } => {
            client_error(&format!("{context}: {}", path.display()), source)
        }
        LoadError::Walk { .. } => CliError::new(FAILURE, format!("{context}: {err}")),
        LoadError::TooManyFiles { .. } => CliError::new(USAGE, format!("{context}: {err}")),
    }
}
