//! Screen-refresh algorithm, single-line and multi-line strategies
//! (spec.md §4.3). Both strategies draw into one [`OutputAssembler`] so a
//! full redraw is one write to the terminal.

use crate::edit_state::EditState;
use crate::hints::Hinter;
use crate::output::OutputAssembler;

/// CLEAN erases what was previously on screen; WRITE draws what should be
/// there now. An edit op typically requests both in one call.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct RefreshMode {
    pub clean: bool,
    pub write: bool,
}

impl RefreshMode {
    pub const CLEAN: Self = RefreshMode {
        clean: true,
        write: false,
    };
    pub const WRITE: Self = RefreshMode {
        clean: false,
        write: true,
    };
    pub const BOTH: Self = RefreshMode {
        clean: true,
        write: true,
    };
}

/// What to draw, and how. `view_buf`/`view_pos` stand in for the real
/// buffer/cursor so the completion engine can show a candidate without
/// mutating [`EditState`] (spec.md §4.6).
pub struct RefreshInput<'a> {
    pub mode: RefreshMode,
    pub mask_mode: bool,
    pub view_buf: &'a [u8],
    pub view_pos: usize,
    pub hinter: Option<&'a dyn Hinter>,
    /// Suppressed on the final Enter-refresh so the accepted line is left
    /// in its natural appearance.
    pub suppress_hint: bool,
}

fn push_visible(out: &mut OutputAssembler, buf: &[u8], mask_mode: bool) {
    if mask_mode {
        for _ in 0..buf.len() {
            out.append_byte(b'*');
        }
    } else {
        out.append(buf);
    }
}

/// Single-line refresh (spec.md §4.3). Horizontal-scrolls the visible
/// window so the cursor is always on screen, then draws `\r` + prompt +
/// (masked or real) buffer + hint + erase-to-end, repositioning the cursor
/// on WRITE.
pub fn refresh_single_line(state: &mut EditState, input: &RefreshInput, out: &mut OutputAssembler) {
    let p = state.prompt_width;
    let cols = state.cols.max(1);
    let buf = input.view_buf;
    let pos = input.view_pos;

    // Horizontal scroll: slide the visible window right until the cursor
    // fits, then clip the trailing end until the whole window fits.
    let mut start = 0usize;
    let mut vlen = buf.len();
    let mut vpos = pos;
    while p + vpos >= cols && vpos > 0 {
        start += 1;
        vlen -= 1;
        vpos -= 1;
    }
    while p + vlen > cols && vlen > 0 {
        vlen -= 1;
    }
    let visible = &buf[start..start + vlen];

    out.append_str("\r");
    if input.mode.write {
        out.append_str(&state.prompt);
        push_visible(out, visible, input.mask_mode);
        write_hint(out, input, cols, p + vlen);
    }
    out.append_str("\x1b[0K");
    if input.mode.write {
        out.append_str("\r");
        let col = vpos + p;
        if col > 0 {
            out.append_str(&format!("\x1b[{col}C"));
        }
        state.old_pos = pos;
        state.old_rows = 1;
    }
}

/// Multi-line refresh (spec.md §4.3). Tracks how many terminal rows the
/// previous render occupied (`old_rows`/`old_pos`) so CLEAN can erase
/// exactly that many rows before WRITE draws the new ones.
pub fn refresh_multi_line(state: &mut EditState, input: &RefreshInput, out: &mut OutputAssembler) {
    let p = state.prompt_width;
    let cols = state.cols.max(1);
    let buf = input.view_buf;
    let pos = input.view_pos;
    let len = buf.len();

    let rows = (p + len + cols - 1) / cols;
    let rows = rows.max(1);

    if input.mode.clean {
        let rpos = (p + state.old_pos + cols) / cols;
        if state.old_rows > rpos {
            out.append_str(&format!("\x1b[{}B", state.old_rows - rpos));
        }
        for _ in 0..state.old_rows.saturating_sub(1) {
            out.append_str("\r\x1b[0K\x1b[1A");
        }
        out.append_str("\r\x1b[0K");
    }

    if input.mode.write {
        let mut rows = rows;
        out.append_str(&state.prompt);
        push_visible(out, buf, input.mask_mode);
        write_hint(out, input, cols, p + len);

        // Wrap fix-up: a cursor left exactly at the right margin after the
        // last column is invisibly past it until the terminal gets one more
        // byte, so force the wrap now.
        if pos == len && (pos + p) % cols == 0 {
            out.append_str("\n\r");
            rows += 1;
        }

        let rpos2 = (p + pos + cols) / cols;
        if rows > rpos2 {
            out.append_str(&format!("\x1b[{}A", rows - rpos2));
        }
        let col = (p + pos) % cols;
        out.append_str("\r");
        if col > 0 {
            out.append_str(&format!("\x1b[{col}C"));
        }

        state.old_rows = rows;
        state.old_pos = pos;
    }
}

/// Draws a hint, clipped to whatever columns remain in the current row
/// after `cols_used` (prompt + drawn buffer). `cols` is the terminal width;
/// multi-line callers pass the full width since a hint is allowed to wrap
/// onto further rows there, single-line callers pass what's left on the one
/// row so a hint never forces an unwanted scroll.
fn write_hint(out: &mut OutputAssembler, input: &RefreshInput, cols: usize, cols_used: usize) {
    if input.suppress_hint {
        return;
    }
    let Some(hinter) = input.hinter else {
        return;
    };
    let Some(hint) = hinter.hint(input.view_buf, input.view_pos) else {
        return;
    };
    let budget = cols.saturating_sub(cols_used);
    if budget == 0 {
        return;
    }
    let clipped: String = hint.text.chars().take(budget).collect();
    if clipped.is_empty() {
        return;
    }
    out.append_str(&format!("\x1b[{};{}m", hint.bold, hint.color));
    out.append_str(&clipped);
    out.append_str("\x1b[0m");
}

/// Entry point used by the dispatcher/session layer: picks the strategy by
/// `multi_line` and runs it.
pub fn refresh(
    state: &mut EditState,
    multi_line: bool,
    input: &RefreshInput,
    out: &mut OutputAssembler,
) {
    if multi_line {
        refresh_multi_line(state, input, out);
    } else {
        refresh_single_line(state, input, out);
    }
}

/// Fast path for the common case — inserting one byte at the end of the
/// buffer in single-line mode with no hint callback and room left on the
/// line — skips the full refresh and writes the one character (or `*` in
/// mask mode) directly (spec.md §4.3). Returns `true` if it handled the
/// draw; `false` means the caller must fall back to a full refresh.
///
/// Per spec.md §9's redesign flag, this predicate (no hint callback) is the
/// *only* gate that matters; multi-line mode never calls this function at
/// all, so the asymmetry the source had between the two modes can't recur.
pub fn try_fast_path_insert(
    state: &EditState,
    mask_mode: bool,
    hinter_present: bool,
    inserted_at_end: bool,
    out: &mut OutputAssembler,
    byte: u8,
) -> bool {
    if hinter_present || !inserted_at_end {
        return false;
    }
    let p = state.prompt_width;
    let cols = state.cols.max(1);
    if p + state.len() >= cols {
        return false;
    }
    if mask_mode {
        out.append_byte(b'*');
    } else {
        out.append_byte(byte);
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input<'a>(buf: &'a [u8], pos: usize) -> RefreshInput<'a> {
        RefreshInput {
            mode: RefreshMode::BOTH,
            mask_mode: false,
            view_buf: buf,
            view_pos: pos,
            hinter: None,
            suppress_hint: false,
        }
    }

    #[test]
    fn single_line_draws_prompt_and_buffer() {
        let mut state = EditState::new("> ", 80, 128);
        let mut out = OutputAssembler::new();
        refresh_single_line(&mut state, &input(b"hello", 5), &mut out);
        let s = String::from_utf8(out.as_bytes().to_vec()).unwrap();
        assert!(s.starts_with('\r'));
        assert!(s.contains("> hello"));
        assert!(s.contains("\x1b[0K"));
        assert_eq!(state.old_rows, 1);
        assert_eq!(state.old_pos, 5);
    }

    #[test]
    fn single_line_masks_buffer_with_asterisks() {
        let mut state = EditState::new("> ", 80, 128);
        let mut out = OutputAssembler::new();
        let mut masked = input(b"secret", 6);
        masked.mask_mode = true;
        refresh_single_line(&mut state, &masked, &mut out);
        let s = String::from_utf8(out.as_bytes().to_vec()).unwrap();
        assert!(s.contains("******"));
        assert!(!s.contains("secret"));
    }

    #[test]
    fn single_line_scrolls_when_cursor_exceeds_width() {
        // prompt width 2, cols 10: cursor at end of a 20-byte buffer must
        // scroll the window so prompt + cursor column stays under cols.
        let mut state = EditState::new("> ", 10, 128);
        let mut out = OutputAssembler::new();
        let buf = b"abcdefghijklmnopqrst";
        refresh_single_line(&mut state, &input(buf, buf.len()), &mut out);
        let s = String::from_utf8(out.as_bytes().to_vec()).unwrap();
        // the earliest characters must have scrolled off.
        assert!(!s.contains('a'));
        assert!(s.contains('t'));
    }

    #[test]
    fn multi_line_wrap_fixup_adds_newline_at_boundary() {
        let mut state = EditState::new("", 10, 128);
        let mut out = OutputAssembler::new();
        let buf = b"0123456789"; // exactly fills one row, cursor at end
        refresh_multi_line(&mut state, &input(buf, buf.len()), &mut out);
        let s = String::from_utf8(out.as_bytes().to_vec()).unwrap();
        assert!(s.contains("\n\r"));
        assert_eq!(state.old_rows, 2);
    }

    #[test]
    fn multi_line_clean_erases_tracked_old_rows() {
        let mut state = EditState::new("", 10, 128);
        state.old_rows = 3;
        state.old_pos = 25;
        let mut out = OutputAssembler::new();
        let clean_only = RefreshInput {
            mode: RefreshMode::CLEAN,
            ..input(b"", 0)
        };
        refresh_multi_line(&mut state, &clean_only, &mut out);
        let s = String::from_utf8(out.as_bytes().to_vec()).unwrap();
        assert!(s.contains("\x1b[1A"));
        assert!(s.contains("\x1b[0K"));
        // CLEAN-only must not touch old_rows/old_pos: the caller may still
        // be about to interleave other output before a WRITE.
        assert_eq!(state.old_rows, 3);
        assert_eq!(state.old_pos, 25);
    }

    #[test]
    fn fast_path_insert_rejected_when_hinter_present() {
        let state = EditState::new("> ", 80, 128);
        let mut out = OutputAssembler::new();
        assert!(!try_fast_path_insert(&state, false, true, true, &mut out, b'x'));
        assert!(out.is_empty());
    }

    #[test]
    fn fast_path_insert_rejected_at_line_width() {
        let mut state = EditState::new("", 5, 128);
        state.set_line("abcde");
        let mut out = OutputAssembler::new();
        assert!(!try_fast_path_insert(&state, false, false, true, &mut out, b'f'));
    }

    #[test]
    fn fast_path_insert_writes_masked_byte() {
        let state = EditState::new("> ", 80, 128);
        let mut out = OutputAssembler::new();
        assert!(try_fast_path_insert(&state, true, false, true, &mut out, b'x'));
        assert_eq!(out.as_bytes().to_vec(), b"*");
    }
}
