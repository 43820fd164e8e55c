//! Incremental decoder for a body of concatenated JSON objects.
//!
//! HTTP chunks do not line up with frame boundaries, so bytes are buffered
//! until a complete JSON value is available. New bytes are scanned once for
//! bracket depth; a parse is only attempted when the outermost value closes
//! or a line ends inside it, so a large frame arriving in many chunks is not
//! re-parsed from its start on every chunk.
//!
//! A syntactically broken frame is reported once and the decoder skips to
//! the next newline (Nomad separates frames with `\n`), keeping whatever
//! follows. A well-formed value with the wrong shape is reported without
//! discarding anything else.

use serde::Deserialize;

use super::dto::StreamFrame;

/// Scan position inside the value at the front of the buffer.
#[derive(Debug, Default)]
struct Scan {
    /// Bytes of the buffer already examined.
    offset: usize,
    depth: usize,
    in_string: bool,
    escaped: bool,
}

impl Scan {
    /// Examine bytes past `offset`. Returns `true` once a parse is worth
    /// attempting.
    fn advance(&mut self, buf: &[u8]) -> bool {
        while let Some(&byte) = buf.get(self.offset) {
            self.offset += 1;

            if byte == b'\n' && self.depth > 0 {
                return true;
            }
            if self.in_string {
                if self.escaped {
                    self.escaped = false;
                } else if byte == b'\\' {
                    self.escaped = true;
                } else if byte == b'"' {
                    self.in_string = false;
                }
                continue;
            }
            match byte {
                b'"' => self.in_string = true,
                b'{' | b'[' => self.depth += 1,
                b'}' | b']' => {
                    self.depth = self.depth.saturating_sub(1);
                    if self.depth == 0 {
                        return true;
                    }
                }
                _ => {}
            }
        }
        false
    }
}

/// Stateful frame decoder for one connection.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buf: Vec<u8>,
    /// Dropping bytes up to the next newline after a syntax error.
    resyncing: bool,
    scan: Scan,
    parse_attempts: usize,
}

impl FrameDecoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append bytes read from the connection.
    pub fn push(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
    }

    /// Bytes received but not yet decoded (excluding whitespace).
    #[must_use]
    pub fn pending(&self) -> usize {
        self.buf.iter().filter(|b| !b.is_ascii_whitespace()).count()
    }

    /// Number of parses attempted so far.
    #[must_use]
    pub fn parse_attempts(&self) -> usize {
        self.parse_attempts
    }

    /// Decode the next complete frame.
    ///
    /// Returns `None` when more input is needed, `Some(Err(_))` for a
    /// malformed frame (decoding can continue), `Some(Ok(_))` otherwise.
    pub fn next_frame(&mut self) -> Option<Result<StreamFrame, serde_json::Error>> {
        if self.resyncing {
            match self.buf.iter().position(|&b| b == b'\n') {
                Some(newline) => {
                    self.buf.drain(..=newline);
                    self.resyncing = false;
                }
                None => {
                    self.buf.clear();
                    return None;
                }
            }
        }

        let start = self
            .buf
            .iter()
            .position(|b| !b.is_ascii_whitespace())
            .unwrap_or(self.buf.len());
        if start > 0 {
            self.buf.drain(..start);
            self.scan = Scan::default();
        }
        if self.buf.is_empty() {
            return None;
        }

        // Scalars and stray closers have no depth to track; let the parser
        // judge them directly.
        let nested = matches!(self.buf[0], b'{' | b'[');
        loop {
            if nested && !self.scan.advance(&self.buf) {
                return None;
            }

            self.parse_attempts += 1;
            let mut values =
                serde_json::Deserializer::from_slice(&self.buf).into_iter::<serde_json::Value>();
            return match values.next() {
                None => {
                    self.buf.clear();
                    self.scan = Scan::default();
                    None
                }
                Some(Ok(value)) => {
                    let consumed = values.byte_offset();
                    self.buf.drain(..consumed);
                    self.scan = Scan::default();
                    Some(StreamFrame::deserialize(value))
                }
                // A line ended inside the value; keep scanning.
                Some(Err(e)) if e.is_eof() && nested => continue,
                Some(Err(e)) if e.is_eof() => None,
                Some(Err(e)) => {
                    self.resyncing = true;
                    self.scan = Scan::default();
                    Some(Err(e))
                }
            };
        }
    }
}
