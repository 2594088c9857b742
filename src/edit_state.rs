/// The single value threaded through every editing operation and refresh.
///
/// Mirrors spec.md §3's `EditState`, adapted to Rust ownership: the fixed
/// `buf`/`buf_cap`/null-terminator trio from the C original becomes a
/// growable `Vec<u8>` with an enforced capacity cap (`buf_cap`), per the
/// "Manual buffer management" design note. `len` isn't a separate field —
/// it's always `buf.len()`.
pub struct EditState {
    pub prompt: String,
    pub prompt_width: usize,

    pub buf: Vec<u8>,
    pub buf_cap: usize,

    /// Cursor offset in bytes, `0 <= pos <= buf.len()`.
    pub pos: usize,

    /// Terminal width in columns at session start.
    pub cols: usize,

    /// Last-rendered cursor position and row count (multi-line mode only).
    pub old_pos: usize,
    pub old_rows: usize,

    pub in_completion: bool,
    /// Index into the current candidate list; may equal the list length,
    /// meaning "show the original buffer".
    pub completion_idx: usize,

    /// 0 = current working line; k = k-th history entry back.
    pub history_index: usize,
}

impl EditState {
    pub fn new(prompt: impl Into<String>, cols: usize, buf_cap: usize) -> Self {
        let prompt = prompt.into();
        let prompt_width = prompt.chars().count();
        EditState {
            prompt,
            prompt_width,
            buf: Vec::new(),
            buf_cap,
            pos: 0,
            cols,
            old_pos: 0,
            old_rows: 1,
            in_completion: false,
            completion_idx: 0,
            history_index: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn line(&self) -> String {
        String::from_utf8_lossy(&self.buf).into_owned()
    }

    pub fn set_line(&mut self, line: &str) {
        let bytes = line.as_bytes();
        let cap = self.buf_cap.saturating_sub(1).max(0);
        let n = bytes.len().min(cap);
        self.buf.clear();
        self.buf.extend_from_slice(&bytes[..n]);
        self.pos = self.buf.len();
    }

    /// Debug-only invariant check exercised by property tests (spec.md §8):
    /// `0 <= pos <= len < buf_cap`.
    pub fn check_invariants(&self) {
        debug_assert!(self.pos <= self.len());
        debug_assert!(self.len() < self.buf_cap);
    }
}
