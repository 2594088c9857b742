//! Ephemeral, callback-supplied advisory text (spec.md §4.5).
//!
//! Hints are never part of the returned line — they're drawn to the right
//! of the cursor during a WRITE refresh and re-requested on every redraw.
//! Rust ownership retires the C source's matching "free callback": the
//! `String` the host returns is simply dropped once the refresh is done.

/// One hint: text plus the SGR parameters it should be wrapped in.
pub struct Hint {
    pub text: String,
    /// SGR "bold" parameter (0 or 1, matching `ESC[b;c m`).
    pub bold: u8,
    /// SGR color parameter.
    pub color: u8,
}

/// Supplies hint text for the line currently being edited.
pub trait Hinter {
    fn hint(&self, buf: &[u8], pos: usize) -> Option<Hint>;
}
