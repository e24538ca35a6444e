use std::io::Read;

use tracing::trace;

use crate::error::Result;
use crate::reader::LineReader;

const OPEN: char = '(';
const CLOSE: char = ')';

/// Whether a reply line opens a parenthesized structure.
pub fn is_structured(line: &str) -> bool {
    line.starts_with(OPEN)
}

impl<T: Read> LineReader<T> {
    /// Read one complete application-level reply (blocking).
    ///
    /// A line that does not open with `(` is the whole reply. Otherwise the
    /// following lines are appended verbatim, with no separator, until the
    /// accumulated text ends with `)`.
    ///
    /// The balance check is naive: a `)` at the end of a line inside a quoted
    /// string also terminates the reply. The server does not emit such lines
    /// for the sentences this client issues.
    pub fn read_reply(&mut self) -> Result<String> {
        let mut reply = self.read_line()?;
        if !is_structured(&reply) {
            return Ok(reply);
        }

        let mut lines = 1usize;
        while !reply.ends_with(CLOSE) {
            let next = self.read_line()?;
            reply.push_str(&next);
            lines += 1;
        }
        trace!(lines, "assembled structured reply");

        Ok(reply)
    }
}
