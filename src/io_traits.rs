use std::io::{self, Write};
use std::time::Duration;

/// Byte-oriented input channel, supplied by the host (spec.md §6).
///
/// A UART, a pty, a mocked `Vec<u8>` in tests — anything that can hand back
/// one byte at a time, signal EOF with `Ok(None)`, and optionally support a
/// bounded wait for [`Self::read_byte_timeout`] (used only by the 500 ms
/// terminal probe and the 30 ms paste-burst heuristic).
pub trait InputSource {
    /// Block until one byte is available, or return `Ok(None)` at EOF.
    fn read_byte(&mut self) -> io::Result<Option<u8>>;

    /// Wait up to `timeout` for one byte. `Ok(None)` on timeout or EOF.
    ///
    /// Channels that cannot support non-blocking or timed reads may fall
    /// back to `read_byte` and ignore `timeout`; callers that rely on the
    /// distinction (the probe) treat a channel that never returns in time
    /// the same as one that has nothing to say.
    fn read_byte_timeout(&mut self, timeout: Duration) -> io::Result<Option<u8>>;
}

/// Byte-oriented output channel, supplied by the host (spec.md §6).
///
/// `drain` stands in for the "fsync-like drain" spec.md calls for: some
/// UART/USB-CDC channels buffer internally even after `flush()` returns, so
/// the host gets one more explicit hook to force bytes out before the editor
/// considers a refresh complete.
pub trait OutputSink: Write {
    fn drain(&mut self) -> io::Result<()>;
}

/// Blanket [`OutputSink`] for any plain `Write` the host hands us (e.g. a
/// `File`, a `TcpStream`, or a mock `Vec<u8>`) where `flush` already does
/// everything `drain` would.
pub struct PlainSink<W: Write>(pub W);

impl<W: Write> Write for PlainSink<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.flush()
    }
}

impl<W: Write> OutputSink for PlainSink<W> {
    fn drain(&mut self) -> io::Result<()> {
        self.0.flush()
    }
}
