use std::io::{ErrorKind, Write};

use bytes::BytesMut;
use scone_transport::SconeStream;

use crate::codec::{encode_sentence, FrameConfig};
use crate::error::{FrameError, Result};
use crate::reader::transport_to_frame_error;

const INITIAL_BUFFER_CAPACITY: usize = 1024;

/// Writes newline-terminated sentences to any `Write` stream.
pub struct SentenceWriter<T> {
    inner: T,
    buf: BytesMut,
    config: FrameConfig,
}

impl<T: Write> SentenceWriter<T> {
    /// Create a new sentence writer with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new sentence writer with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Encode and send one sentence followed by `\n` (blocking).
    pub fn send(&mut self, sentence: &str) -> Result<()> {
        if sentence.len() > self.config.max_line_length {
            return Err(FrameError::LineTooLong {
                size: sentence.len(),
                max: self.config.max_line_length,
            });
        }

        self.buf.clear();
        encode_sentence(sentence, &mut self.buf);

        let mut offset = 0usize;
        while offset < self.buf.len() {
            match self.inner.write(&self.buf[offset..]) {
                Ok(0) => return Err(FrameError::ConnectionClosed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err)
                    if err.kind() == ErrorKind::WouldBlock || err.kind() == ErrorKind::TimedOut =>
                {
                    return Err(FrameError::TimedOut)
                }
                Err(err) => return Err(FrameError::Io(err)),
            }
        }

        self.flush()
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
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

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current sentence writer configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

impl SentenceWriter<SconeStream> {
    /// Create a sentence writer for `SconeStream` and apply write timeout from config.
    pub fn with_config_stream(inner: SconeStream, config: FrameConfig) -> Result<Self> {
        inner
            .set_write_timeout(config.write_timeout)
            .map_err(transport_to_frame_error)?;
        Ok(Self::with_config(inner, config))
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Read};

    use super::*;
    use crate::reader::LineReader;

    #[test]
    fn write_single_sentence() {
        let mut writer = SentenceWriter::new(Cursor::new(Vec::<u8>::new()));
        writer.send("(new-indv {Marta} {elephant})").unwrap();

        let wire = writer.into_inner().into_inner();
        assert_eq!(wire, b"(new-indv {Marta} {elephant})\n");
    }

    #[test]
    fn write_multiple_sentences() {
        let mut writer = SentenceWriter::new(Vec::<u8>::new());
        writer.send("(a)").unwrap();
        writer.send("(b)").unwrap();

        assert_eq!(writer.get_ref().as_slice(), b"(a)\n(b)\n");
    }

    #[test]
    fn oversized_sentence_rejected_before_write() {
        let cfg = FrameConfig {
            max_line_length: 4,
            ..FrameConfig::default()
        };
        let mut writer = SentenceWriter::with_config(Vec::<u8>::new(), cfg);
        let err = writer.send("(too-long)").unwrap_err();

        assert!(matches!(err, FrameError::LineTooLong { .. }));
        assert!(writer.get_ref().is_empty());
    }

    #[test]
    fn zero_length_write_is_connection_closed() {
        let mut writer = SentenceWriter::new(ZeroWriter);
        let err = writer.send("(x)").unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed));
    }

    struct ZeroWriter;

    impl Write for ZeroWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Ok(0)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn short_writes_are_completed() {
        let mut writer = SentenceWriter::new(TwoBytesAtATime(Vec::new()));
        writer.send("(is-x-a-y? {bird} {animal})").unwrap();
        assert_eq!(writer.get_ref().0, b"(is-x-a-y? {bird} {animal})\n");
    }

    struct TwoBytesAtATime(Vec<u8>);

    impl Write for TwoBytesAtATime {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            let n = buf.len().min(2);
            self.0.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_timeout_surfaces_as_timed_out() {
        let mut writer = SentenceWriter::new(TimedOutWriter);
        let err = writer.send("(x)").unwrap_err();
        assert!(matches!(err, FrameError::TimedOut));
    }

    struct TimedOutWriter;

    impl Write for TimedOutWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::from(ErrorKind::TimedOut))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    #[cfg(unix)]
    fn roundtrip_over_socket_pair() {
        let (left, right) = std::os::unix::net::UnixStream::pair().unwrap();
        let mut writer = SentenceWriter::new(left);
        let mut reader = LineReader::new(right);

        writer.send("(is-x-a-y? {bird} {animal})").unwrap();
        assert_eq!(reader.read_line().unwrap(), "(is-x-a-y? {bird} {animal})");
    }

    #[test]
    fn applies_write_timeout_for_scone_stream() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let accept = std::thread::spawn(move || {
            let (mut server, _) = listener.accept().unwrap();
            let mut buf = [0u8; 4];
            server.read_exact(&mut buf).unwrap();
            buf
        });

        let stream = scone_transport::SconeStream::from_tcp(
            std::net::TcpStream::connect(addr).unwrap(),
        );
        let cfg = FrameConfig {
            write_timeout: Some(std::time::Duration::from_millis(500)),
            ..FrameConfig::default()
        };
        let mut writer = SentenceWriter::with_config_stream(stream, cfg).unwrap();
        writer.send("(x)").unwrap();

        assert_eq!(&accept.join().unwrap(), b"(x)\n");
    }
}
