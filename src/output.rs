use std::io::{self, Write};

use crate::io_traits::OutputSink;

/// Batches one full screen refresh into a single write.
///
/// Per-byte writes with intervening cursor moves flicker visibly on slow
/// UARTs; appending every ANSI fragment here and flushing once at the end of
/// a refresh makes the write effectively atomic from the terminal's point of
/// view.
#[derive(Default)]
pub struct OutputAssembler {
    buf: Vec<u8>,
}

impl OutputAssembler {
    pub fn new() -> Self {
        OutputAssembler { buf: Vec::new() }
    }

    pub fn append(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub fn append_str(&mut self, s: &str) {
        self.buf.extend_from_slice(s.as_bytes());
    }

    pub fn append_byte(&mut self, b: u8) {
        self.buf.push(b);
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// The bytes assembled so far, without consuming them.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Write the whole batch to `sink` in one call, flush it, and drain it.
    ///
    /// The trailing `drain()` is load-bearing on hosts whose `flush()` alone
    /// doesn't push bytes out of an internal hardware buffer (spec.md §4.1's
    /// "fsync-like drain" for UART/USB-CDC channels); without it a refresh
    /// can sit unflushed until the next write.
    pub fn flush_to(&mut self, sink: &mut dyn OutputSink) -> io::Result<()> {
        if !self.buf.is_empty() {
            sink.write_all(&self.buf)?;
            self.buf.clear();
        }
        sink.flush()?;
        sink.drain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io_traits::PlainSink;

    #[test]
    fn batches_appends_into_one_write() {
        let mut assembler = OutputAssembler::new();
        assembler.append_str("\r");
        assembler.append_str("hello");
        assembler.append(&[0x1b, b'[', b'0', b'K']);
        assert_eq!(assembler.len(), 1 + 5 + 4);

        let mut sink = PlainSink(Vec::new());
        assembler.flush_to(&mut sink).unwrap();
        assert_eq!(sink.0, b"\rhello\x1b[0K");
        assert!(assembler.is_empty());
    }
}
