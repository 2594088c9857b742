//! Terminal geometry and capability probing (spec.md §4.1/§4.2).
//!
//! Width is read straight from the [`InputSource`]/[`OutputSink`] pair the
//! host gives us: send a cursor-position query, move the cursor to the
//! window's far edge, query again, then restore. This mirrors the
//! `ESC[6n`/`ESC[999C` dance real terminal line editors fall back to when
//! there's no ioctl to ask the kernel directly — here it's the *only* way,
//! since the core crate never touches a file descriptor.

use std::time::Duration;

use crate::io_traits::{InputSource, OutputSink};

/// Terminal width used when a query can't be completed (spec.md §4.2).
pub const FALLBACK_COLS: usize = 80;

fn read_byte_blocking(input: &mut dyn InputSource, deadline: Duration) -> Option<u8> {
    input.read_byte_timeout(deadline).ok().flatten()
}

/// Parses a `ESC[row;colR` cursor-position report starting right after the
/// `ESC[` has already been consumed. Returns the column.
fn parse_cursor_report(input: &mut dyn InputSource, deadline: Duration) -> Option<usize> {
    let mut digits = String::new();
    let mut seen_semicolon = false;
    loop {
        let b = read_byte_blocking(input, deadline)?;
        match b {
            b';' => seen_semicolon = true,
            b'R' => break,
            b'0'..=b'9' if seen_semicolon => digits.push(b as char),
            b'0'..=b'9' => {} // row digits, discarded
            _ => return None,
        }
    }
    digits.parse().ok()
}

/// Queries the terminal for its current cursor column via `ESC[6n`.
fn query_cursor_column(
    input: &mut dyn InputSource,
    output: &mut dyn OutputSink,
    deadline: Duration,
) -> Option<usize> {
    output.write_all(b"\x1b[6n").ok()?;
    output.flush().ok()?;
    if read_byte_blocking(input, deadline)? != 0x1b {
        return None;
    }
    if read_byte_blocking(input, deadline)? != b'[' {
        return None;
    }
    parse_cursor_report(input, deadline)
}

/// Measures the terminal's column count by pushing the cursor to the far
/// right edge and reading back where it landed (spec.md §4.2). Falls back
/// to [`FALLBACK_COLS`] if the host doesn't answer within `timeout`.
pub fn measure_width(
    input: &mut dyn InputSource,
    output: &mut dyn OutputSink,
    timeout: Duration,
) -> usize {
    let start_col = match query_cursor_column(input, output, timeout) {
        Some(c) => c,
        None => return FALLBACK_COLS,
    };

    if output.write_all(b"\x1b[999C").is_err() || output.flush().is_err() {
        return FALLBACK_COLS;
    }
    let far_col = match query_cursor_column(input, output, timeout) {
        Some(c) => c,
        None => return FALLBACK_COLS,
    };

    // Restore the cursor to where it started.
    if far_col > start_col {
        let _ = output.write_all(format!("\x1b[{}D", far_col - start_col).as_bytes());
        let _ = output.flush();
    }

    if far_col == 0 { FALLBACK_COLS } else { far_col }
}

/// How long [`probe`] waits for the terminal to answer before giving up
/// (spec.md §4.1).
pub const PROBE_TIMEOUT: Duration = Duration::from_millis(500);

/// Sends a device-status-report query (`ESC[5n`) and waits for either an
/// "OK" (`ESC[0n`) or "malfunction" (`ESC[3n`) reply, to detect a host that
/// isn't actually a terminal (e.g. output piped to a file) before a session
/// commits to raw-mode editing.
///
/// Either reply counts as success (spec.md §4.1): both mean a real terminal
/// answered the query at all, which is all `probe` is checking for. Only a
/// timeout or an I/O failure means "not a terminal".
pub fn probe(input: &mut dyn InputSource, output: &mut dyn OutputSink) -> bool {
    if output.write_all(b"\x1b[5n").is_err() || output.flush().is_err() {
        return false;
    }
    if read_byte_blocking(input, PROBE_TIMEOUT) != Some(0x1b) {
        return false;
    }
    if read_byte_blocking(input, PROBE_TIMEOUT) != Some(b'[') {
        return false;
    }
    let status = match read_byte_blocking(input, PROBE_TIMEOUT) {
        Some(b) => b,
        None => return false,
    };
    if read_byte_blocking(input, PROBE_TIMEOUT) != Some(b'n') {
        return false;
    }
    status == b'0' || status == b'3'
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::io::{self, Write};

    struct ScriptedInput {
        bytes: VecDeque<u8>,
    }

    impl ScriptedInput {
        fn new(bytes: &[u8]) -> Self {
            ScriptedInput {
                bytes: bytes.iter().copied().collect(),
            }
        }
    }

    impl InputSource for ScriptedInput {
        fn read_byte(&mut self) -> io::Result<Option<u8>> {
            Ok(self.bytes.pop_front())
        }

        fn read_byte_timeout(&mut self, _timeout: Duration) -> io::Result<Option<u8>> {
            Ok(self.bytes.pop_front())
        }
    }

    #[derive(Default)]
    struct RecordingOutput {
        written: Vec<u8>,
    }

    impl Write for RecordingOutput {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl crate::io_traits::OutputSink for RecordingOutput {
        fn drain(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn measure_width_parses_two_cursor_reports() {
        // first query answers column 1, second (after ESC[999C) answers 80.
        let mut input = ScriptedInput::new(b"\x1b[1;1R\x1b[1;80R");
        let mut output = RecordingOutput::default();
        let cols = measure_width(&mut input, &mut output, Duration::from_millis(50));
        assert_eq!(cols, 80);
        assert!(output.written.windows(4).any(|w| w == b"\x1b[6n"));
        assert!(
            output
                .written
                .windows(6)
                .any(|w| w == b"\x1b[999C")
        );
    }

    #[test]
    fn measure_width_falls_back_on_silence() {
        let mut input = ScriptedInput::new(b"");
        let mut output = RecordingOutput::default();
        let cols = measure_width(&mut input, &mut output, Duration::from_millis(10));
        assert_eq!(cols, FALLBACK_COLS);
    }

    #[test]
    fn probe_accepts_ok_status() {
        let mut input = ScriptedInput::new(b"\x1b[0n");
        let mut output = RecordingOutput::default();
        assert!(probe(&mut input, &mut output));
    }

    #[test]
    fn probe_accepts_malfunction_status_as_a_terminal_present() {
        // ESC[3n still means a real terminal answered the DSR query; only
        // silence/timeout should be treated as "not a terminal".
        let mut input = ScriptedInput::new(b"\x1b[3n");
        let mut output = RecordingOutput::default();
        assert!(probe(&mut input, &mut output));
    }

    #[test]
    fn probe_rejects_silence() {
        let mut input = ScriptedInput::new(b"");
        let mut output = RecordingOutput::default();
        assert!(!probe(&mut input, &mut output));
    }
}
