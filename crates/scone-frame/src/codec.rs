use bytes::{Buf, BufMut, BytesMut};

use crate::error::{FrameError, Result};

/// Line delimiter on the wire.
pub const DELIMITER: u8 = b'\n';

/// Default maximum line length: 16 MiB.
pub const DEFAULT_MAX_LINE_LENGTH: usize = 16 * 1024 * 1024;

/// Decode one line from a buffer.
///
/// Leading ASCII whitespace (including blank lines used as padding by the
/// server) is discarded first. Returns `Ok(None)` if the buffer doesn't
/// contain a complete line yet. On success, consumes the line and its
/// delimiter from the buffer; anything after the delimiter stays put.
pub fn decode_line(src: &mut BytesMut, max_line_length: usize) -> Result<Option<String>> {
    let padding = src
        .iter()
        .take_while(|byte| byte.is_ascii_whitespace())
        .count();
    src.advance(padding);

    match src.iter().position(|&byte| byte == DELIMITER) {
        Some(pos) => {
            if pos > max_line_length {
                return Err(FrameError::LineTooLong {
                    size: pos,
                    max: max_line_length,
                });
            }
            let line = src.split_to(pos);
            src.advance(1);
            Ok(Some(String::from_utf8(line.to_vec())?))
        }
        None if src.len() > max_line_length => Err(FrameError::LineTooLong {
            size: src.len(),
            max: max_line_length,
        }),
        None => Ok(None), // Need more data
    }
}

/// Encode a sentence into the wire format: the text followed by `\n`.
pub fn encode_sentence(sentence: &str, dst: &mut BytesMut) {
    dst.reserve(sentence.len() + 1);
    dst.put_slice(sentence.as_bytes());
    dst.put_u8(DELIMITER);
}

/// Configuration for line framing.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Maximum line length in bytes. Default: 16 MiB.
    pub max_line_length: usize,
    /// Read timeout for blocking operations.
    pub read_timeout: Option<std::time::Duration>,
    /// Write timeout for blocking operations.
    pub write_timeout: Option<std::time::Duration>,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
            read_timeout: None,
            write_timeout: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_single_line() {
        let mut buf = BytesMut::from(&b"[PROMPT]\n"[..]);
        let line = decode_line(&mut buf, DEFAULT_MAX_LINE_LENGTH)
            .unwrap()
            .unwrap();
        assert_eq!(line, "[PROMPT]");
        assert!(buf.is_empty());
    }

    #[test]
    fn test_decode_keeps_remainder() {
        let mut buf = BytesMut::from(&b"YES\n[PROMPT]\n(partial"[..]);

        let first = decode_line(&mut buf, DEFAULT_MAX_LINE_LENGTH)
            .unwrap()
            .unwrap();
        assert_eq!(first, "YES");
        assert_eq!(&buf[..], b"[PROMPT]\n(partial");

        let second = decode_line(&mut buf, DEFAULT_MAX_LINE_LENGTH)
            .unwrap()
            .unwrap();
        assert_eq!(second, "[PROMPT]");

        assert!(decode_line(&mut buf, DEFAULT_MAX_LINE_LENGTH)
            .unwrap()
            .is_none());
        assert_eq!(&buf[..], b"(partial");
    }

    #[test]
    fn test_decode_skips_blank_padding() {
        let mut buf = BytesMut::from(&b"\n\n  \r\n\t[PROMPT]\n"[..]);
        let line = decode_line(&mut buf, DEFAULT_MAX_LINE_LENGTH)
            .unwrap()
            .unwrap();
        assert_eq!(line, "[PROMPT]");
    }

    #[test]
    fn test_decode_whitespace_only_is_consumed() {
        let mut buf = BytesMut::from(&b"\n \n"[..]);
        assert!(decode_line(&mut buf, DEFAULT_MAX_LINE_LENGTH)
            .unwrap()
            .is_none());
        assert!(buf.is_empty());
    }

    #[test]
    fn test_decode_line_too_long() {
        let mut buf = BytesMut::from(&b"0123456789"[..]);
        let result = decode_line(&mut buf, 4);
        assert!(matches!(
            result,
            Err(FrameError::LineTooLong { size: 10, max: 4 })
        ));
    }

    #[test]
    fn test_decode_invalid_utf8() {
        let mut buf = BytesMut::from(&[0xFF, 0xFE, b'\n'][..]);
        let result = decode_line(&mut buf, DEFAULT_MAX_LINE_LENGTH);
        assert!(matches!(result, Err(FrameError::InvalidUtf8(_))));
    }

    #[test]
    fn test_decode_multibyte_text() {
        let mut buf = BytesMut::from("{Lucía}\n".as_bytes());
        let line = decode_line(&mut buf, DEFAULT_MAX_LINE_LENGTH)
            .unwrap()
            .unwrap();
        assert_eq!(line, "{Lucía}");
    }

    #[test]
    fn test_encode_sentence() {
        let mut buf = BytesMut::new();
        encode_sentence("(is-x-a-y? {bird} {animal})", &mut buf);
        assert_eq!(&buf[..], b"(is-x-a-y? {bird} {animal})\n");
    }
}
