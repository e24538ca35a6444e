use std::io::{ErrorKind, Read};

use bytes::BytesMut;
use scone_transport::SconeStream;
use tracing::trace;

use crate::codec::{decode_line, FrameConfig};
use crate::error::{FrameError, Result};

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;
const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Reads complete lines from any `Read` stream.
///
/// Handles partial reads internally: bytes that arrive after the line being
/// returned are kept for the next call, so no byte is read twice or lost.
pub struct LineReader<T> {
    inner: T,
    buf: BytesMut,
    config: FrameConfig,
}

impl<T: Read> LineReader<T> {
    /// Create a new line reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new line reader with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Read the next non-blank line, delimiter stripped (blocking).
    ///
    /// Returns `Err(FrameError::ConnectionClosed)` when EOF is reached before
    /// a newline.
    pub fn read_line(&mut self) -> Result<String> {
        loop {
            if let Some(line) = decode_line(&mut self.buf, self.config.max_line_length)? {
                trace!(%line, "line");
                return Ok(line);
            }
            self.fill()?;
        }
    }

    /// Read lines until one equals `terminator`, consuming it (blocking).
    ///
    /// Returns the lines before the terminator. Only a whole line matches:
    /// the terminator text appearing inside another line does not end the
    /// drain.
    pub fn read_until_line(&mut self, terminator: &str) -> Result<Vec<String>> {
        let mut lines = Vec::new();
        loop {
            let line = self.read_line()?;
            if line.trim_end() == terminator {
                return Ok(lines);
            }
            lines.push(line);
        }
    }

    /// Number of received bytes not yet handed out.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    fn fill(&mut self) -> Result<()> {
        let mut chunk = [0u8; READ_CHUNK_SIZE];
        loop {
            let read = match self.inner.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err)
                    if err.kind() == ErrorKind::WouldBlock || err.kind() == ErrorKind::TimedOut =>
                {
                    return Err(FrameError::TimedOut)
                }
                Err(err) => return Err(FrameError::Io(err)),
            };

            if read == 0 {
                return Err(FrameError::ConnectionClosed);
            }

            self.buf.extend_from_slice(&chunk[..read]);
            return Ok(());
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    ///
    /// Any buffered bytes are dropped.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Update maximum line length for subsequent reads.
    pub fn set_max_line_length(&mut self, max_line_length: usize) {
        self.config.max_line_length = max_line_length;
    }

    /// Current line reader configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

impl LineReader<SconeStream> {
    /// Create a line reader for `SconeStream` and apply read timeout from config.
    pub fn with_config_stream(inner: SconeStream, config: FrameConfig) -> Result<Self> {
        inner
            .set_read_timeout(config.read_timeout)
            .map_err(transport_to_frame_error)?;
        Ok(Self::with_config(inner, config))
    }
}

pub(crate) fn transport_to_frame_error(err: scone_transport::TransportError) -> FrameError {
    match err {
        scone_transport::TransportError::Io(io) => FrameError::Io(io),
        scone_transport::TransportError::Resolve { source, .. }
        | scone_transport::TransportError::Connect { source, .. } => FrameError::Io(source),
        scone_transport::TransportError::Shutdown => FrameError::ConnectionClosed,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::io::{Cursor, Write};

    use super::*;

    #[test]
    fn read_single_line() {
        let mut reader = LineReader::new(Cursor::new(b"[PROMPT]\n".to_vec()));
        assert_eq!(reader.read_line().unwrap(), "[PROMPT]");
        assert_eq!(reader.buffered(), 0);
    }

    #[test]
    fn read_multiple_lines_from_one_chunk() {
        let mut reader = LineReader::new(Cursor::new(b"[PROMPT]\nYES\n[PROMPT]\n".to_vec()));

        assert_eq!(reader.read_line().unwrap(), "[PROMPT]");
        assert_eq!(reader.read_line().unwrap(), "YES");
        assert_eq!(reader.read_line().unwrap(), "[PROMPT]");
    }

    #[test]
    fn leftover_bytes_kept_between_calls() {
        let mut reader = LineReader::new(Cursor::new(b"{Marta}\n[PRO".to_vec()));

        assert_eq!(reader.read_line().unwrap(), "{Marta}");
        let err = reader.read_line().unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed));
        assert_eq!(reader.buffered(), 4);
    }

    #[test]
    fn blank_padding_skipped() {
        let mut reader = LineReader::new(Cursor::new(b"\n\n   \n[PROMPT]\n\nNO\n".to_vec()));
        assert_eq!(reader.read_line().unwrap(), "[PROMPT]");
        assert_eq!(reader.read_line().unwrap(), "NO");
    }

    #[test]
    fn partial_read_handling() {
        let byte_reader = ByteByByteReader {
            bytes: b"\n[PROMPT]\nMAYBE\n".to_vec(),
            pos: 0,
        };
        let mut reader = LineReader::new(byte_reader);

        assert_eq!(reader.read_line().unwrap(), "[PROMPT]");
        assert_eq!(reader.read_line().unwrap(), "MAYBE");
    }

    #[test]
    fn connection_closed_cleanly() {
        let mut reader = LineReader::new(Cursor::new(Vec::<u8>::new()));
        let err = reader.read_line().unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed));
    }

    #[test]
    fn connection_closed_mid_line() {
        let mut reader = LineReader::new(Cursor::new(b"(partial reply".to_vec()));
        let err = reader.read_line().unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed));
    }

    #[test]
    fn oversized_line_in_stream() {
        let cfg = FrameConfig {
            max_line_length: 16,
            ..FrameConfig::default()
        };
        let mut reader = LineReader::with_config(Cursor::new(vec![b'x'; 64]), cfg);
        let err = reader.read_line().unwrap_err();
        assert!(matches!(err, FrameError::LineTooLong { .. }));
    }

    #[test]
    fn read_until_line_drains_through_terminator() {
        let mut reader = LineReader::new(Cursor::new(
            b"Error: {Daniel} cannot be a {bird}.\nNIL\n[PROMPT]\n".to_vec(),
        ));

        let lines = reader.read_until_line("NIL").unwrap();
        assert_eq!(lines, vec!["Error: {Daniel} cannot be a {bird}."]);
        assert_eq!(reader.read_line().unwrap(), "[PROMPT]");
    }

    #[test]
    fn terminator_inside_a_line_is_not_the_end() {
        let mut reader = LineReader::new(Cursor::new(
            b"Error: The value NIL is not of type NUMBER.\nNIL\n[PROMPT]\n".to_vec(),
        ));

        let lines = reader.read_until_line("NIL").unwrap();
        assert_eq!(lines, vec!["Error: The value NIL is not of type NUMBER."]);
        assert_eq!(reader.read_line().unwrap(), "[PROMPT]");
        assert_eq!(reader.buffered(), 0);
    }

    #[test]
    fn read_until_line_across_partial_reads() {
        let byte_reader = ByteByByteReader {
            bytes: b"Error: slow.\nstill NIL-ish\nNIL\n".to_vec(),
            pos: 0,
        };
        let mut reader = LineReader::new(byte_reader);
        assert_eq!(
            reader.read_until_line("NIL").unwrap(),
            vec!["Error: slow.", "still NIL-ish"]
        );
    }

    #[test]
    fn read_until_line_eof_before_terminator() {
        let mut reader = LineReader::new(Cursor::new(b"Error: cut off\n".to_vec()));
        let err = reader.read_until_line("NIL").unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed));
    }

    #[derive(Debug)]
    pub(crate) struct ByteByByteReader {
        pub(crate) bytes: Vec<u8>,
        pub(crate) pos: usize,
    }

    impl Read for ByteByByteReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.pos >= self.bytes.len() {
                return Ok(0);
            }
            if buf.is_empty() {
                return Ok(0);
            }

            buf[0] = self.bytes[self.pos];
            self.pos += 1;
            Ok(1)
        }
    }

    #[test]
    fn read_timeout_surfaces_as_timed_out() {
        let reader = FailingReader {
            kind: ErrorKind::WouldBlock,
        };
        let mut lines = LineReader::new(reader);
        let err = lines.read_line().unwrap_err();
        assert!(matches!(err, FrameError::TimedOut));
    }

    #[test]
    fn other_io_errors_propagate() {
        let reader = FailingReader {
            kind: ErrorKind::ConnectionReset,
        };
        let mut lines = LineReader::new(reader);
        let err = lines.read_line().unwrap_err();
        assert!(matches!(err, FrameError::Io(e) if e.kind() == ErrorKind::ConnectionReset));
    }

    struct FailingReader {
        kind: ErrorKind,
    }

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::from(self.kind))
        }
    }

    #[test]
    fn interrupted_read_retries() {
        let reader = InterruptedThenData {
            state: 0,
            bytes: b"[PROMPT]\n".to_vec(),
            pos: 0,
        };
        let mut lines = LineReader::new(reader);
        assert_eq!(lines.read_line().unwrap(), "[PROMPT]");
    }

    struct InterruptedThenData {
        state: u8,
        bytes: Vec<u8>,
        pos: usize,
    }

    impl Read for InterruptedThenData {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.state == 0 {
                self.state = 1;
                return Err(std::io::Error::from(ErrorKind::Interrupted));
            }
            if self.pos >= self.bytes.len() {
                return Ok(0);
            }
            let remaining = self.bytes.len() - self.pos;
            let n = remaining.min(buf.len());
            buf[..n].copy_from_slice(&self.bytes[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }

    #[test]
    #[cfg(unix)]
    fn lines_over_socket_pair() {
        let (mut left, right) = std::os::unix::net::UnixStream::pair().unwrap();
        let mut reader = LineReader::new(right);

        let writer = std::thread::spawn(move || {
            left.write_all(b"[PRO").unwrap();
            left.flush().unwrap();
            std::thread::sleep(std::time::Duration::from_millis(10));
            left.write_all(b"MPT]\n{Marta}\n").unwrap();
        });

        assert_eq!(reader.read_line().unwrap(), "[PROMPT]");
        assert_eq!(reader.read_line().unwrap(), "{Marta}");
        writer.join().unwrap();
    }

    #[test]
    fn applies_read_timeout_for_scone_stream() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let accept = std::thread::spawn(move || listener.accept().unwrap());

        let stream = scone_transport::SconeStream::from_tcp(
            std::net::TcpStream::connect(addr).unwrap(),
        );
        let _server = accept.join().unwrap();

        let cfg = FrameConfig {
            read_timeout: Some(std::time::Duration::from_millis(10)),
            ..FrameConfig::default()
        };
        let mut reader = LineReader::with_config_stream(stream, cfg).unwrap();
        let err = reader.read_line().unwrap_err();
        assert!(matches!(err, FrameError::TimedOut));
    }
}
