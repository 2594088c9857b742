//! Byte-at-a-time input state machine (spec.md §4.7).
//!
//! [`Dispatcher::feed`] is the single entry point a session drives one byte
//! at a time. It layers three things over the plain key table: an escape
//! sequence sub-parser that spans several calls (arrow keys, Home/End,
//! Delete), the completion engine (which can fully absorb a byte or commit
//! and hand it back for ordinary dispatch), and a paste-burst heuristic that
//! lets the caller skip per-byte redraws while input is arriving faster than
//! a human could type it.

use crate::completion::{Completer, CompletionEngine, Dispatch as CompletionDispatch};
use crate::edit_state::EditState;
use crate::history::History;
use crate::ops;

/// Consecutive bytes arriving within this many milliseconds of each other
/// are treated as one paste burst rather than individual keystrokes
/// (spec.md §4.7).
pub const PASTE_BURST_MS: u64 = 30;

/// What happened to the line as a result of one [`Dispatcher::feed`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The line isn't finished; redraw if `redraw` is set. `appended_byte`
    /// is set when this was exactly one byte inserted at the end of the
    /// buffer — the caller may try the single-line fast-insert path instead
    /// of a full refresh (spec.md §4.3).
    Continue {
        redraw: bool,
        appended_byte: Option<u8>,
    },
    /// A byte was absorbed by the paste-burst heuristic (spec.md §4.7 step
    /// 1): already appended to the buffer, and echoed raw rather than
    /// through a full refresh. Escape-sequence parsing and completion were
    /// bypassed entirely for this byte.
    PasteByte(u8),
    /// Enter was pressed: the line is ready to be returned to the caller.
    Submit,
    /// Ctrl-C: abandon the line without adding it to history.
    Interrupted,
    /// Ctrl-D pressed on an empty buffer.
    Eof,
}

impl Outcome {
    fn cont(redraw: bool) -> Self {
        Outcome::Continue {
            redraw,
            appended_byte: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EscState {
    None,
    Esc,
    Bracket,
    BracketDigit(u8),
    O,
}

/// Owns everything needed to turn a stream of bytes into edits: the escape
/// sequence sub-parser's state, the completion cycle, and the clock
/// readings used for paste detection.
pub struct Dispatcher {
    completion: CompletionEngine,
    esc_state: EscState,
    last_byte_ms: Option<u64>,
    pasting: bool,
}

impl Dispatcher {
    pub fn new() -> Self {
        Dispatcher {
            completion: CompletionEngine::new(),
            esc_state: EscState::None,
            last_byte_ms: None,
            pasting: false,
        }
    }

    pub fn completion_active(&self) -> bool {
        self.completion.is_active()
    }

    /// The completion engine's current candidate, for the refresh layer to
    /// draw instead of the real buffer. `None` means "draw the real buffer".
    pub fn completion_view<'a>(&'a self, original: &'a [u8]) -> Option<&'a [u8]> {
        self.completion.displayed_view(original)
    }

    /// Whether the last [`Self::feed`] call landed inside a detected paste
    /// burst, so the caller can defer a full redraw until the burst quiets.
    pub fn is_pasting(&self) -> bool {
        self.pasting
    }

    /// Feed one byte through the dispatcher.
    #[allow(clippy::too_many_arguments)]
    pub fn feed(
        &mut self,
        byte: u8,
        now_ms: u64,
        edit: &mut EditState,
        history: &mut History,
        completer: &dyn Completer,
        multi_line: bool,
        beep: &mut dyn FnMut(),
    ) -> Outcome {
        self.pasting = match self.last_byte_ms {
            Some(prev) => now_ms.saturating_sub(prev) < PASTE_BURST_MS,
            None => false,
        };
        self.last_byte_ms = Some(now_ms);

        // spec.md §4.7 step 1: a byte arriving within a paste burst, with
        // the cursor at the end of the buffer, is appended raw and echoed
        // without a full refresh -- bypassing escape-sequence parsing and
        // completion entirely, same as the rest of step 1 requires.
        if self.pasting && byte != b'\r' && byte != b'\n' && edit.pos == edit.len() {
            return if ops::insert(edit, byte) {
                Outcome::PasteByte(byte)
            } else {
                Outcome::cont(false)
            };
        }

        if self.completion.is_active() || byte == 0x09 {
            match self.completion.feed(byte, edit, completer, beep) {
                Some(CompletionDispatch::Consumed) => return Outcome::cont(true),
                Some(CompletionDispatch::Passthrough(b)) => {
                    return self.dispatch_plain(b, edit, history, multi_line, beep);
                }
                None => {} // byte wasn't completion-related; fall through
            }
        }

        self.dispatch_plain(byte, edit, history, multi_line, beep)
    }

    fn dispatch_plain(
        &mut self,
        byte: u8,
        edit: &mut EditState,
        history: &mut History,
        multi_line: bool,
        beep: &mut dyn FnMut(),
    ) -> Outcome {
        if self.esc_state != EscState::None {
            return self.dispatch_escape(byte, edit, history);
        }

        match byte {
            b'\r' | b'\n' => Outcome::Submit,
            0x03 => Outcome::Interrupted,
            0x04 => {
                if edit.is_empty() {
                    Outcome::Eof
                } else {
                    Outcome::cont(ops::delete_forward(edit))
                }
            }
            0x7f | 0x08 => Outcome::cont(ops::backspace(edit)),
            0x14 => Outcome::cont(ops::transpose(edit)),
            0x02 => Outcome::cont(ops::move_left(edit)),
            0x06 => Outcome::cont(ops::move_right(edit)),
            0x10 => Outcome::cont(history_prev(edit, history)),
            0x0e => Outcome::cont(history_next(edit, history)),
            0x01 => Outcome::cont(ops::home(edit)),
            0x05 => Outcome::cont(ops::end(edit)),
            0x0b => Outcome::cont(ops::kill_to_end(edit)),
            0x15 => Outcome::cont(ops::kill_line(edit)),
            0x17 => Outcome::cont(ops::kill_prev_word(edit)),
            0x0c => {
                edit.old_pos = 0;
                edit.old_rows = 1;
                Outcome::cont(true)
            }
            0x1b => {
                self.esc_state = EscState::Esc;
                Outcome::cont(false)
            }
            _ if multi_line || byte >= 0x20 => {
                let was_at_end = edit.pos == edit.len();
                let changed = ops::insert(edit, byte);
                let appended_byte = if changed && was_at_end {
                    Some(byte)
                } else {
                    None
                };
                Outcome::Continue {
                    redraw: changed,
                    appended_byte,
                }
            }
            _ => {
                beep();
                Outcome::cont(false)
            }
        }
    }

    fn dispatch_escape(
        &mut self,
        byte: u8,
        edit: &mut EditState,
        history: &mut History,
    ) -> Outcome {
        match self.esc_state {
            EscState::Esc => match byte {
                b'[' => {
                    self.esc_state = EscState::Bracket;
                    Outcome::cont(false)
                }
                b'O' => {
                    self.esc_state = EscState::O;
                    Outcome::cont(false)
                }
                _ => {
                    self.esc_state = EscState::None;
                    Outcome::cont(false)
                }
            },
            EscState::Bracket => match byte {
                b'0'..=b'9' => {
                    self.esc_state = EscState::BracketDigit(byte);
                    Outcome::cont(false)
                }
                b'A' => self.finish_escape(Outcome::cont(history_prev(edit, history))),
                b'B' => self.finish_escape(Outcome::cont(history_next(edit, history))),
                b'C' => self.finish_escape(Outcome::cont(ops::move_right(edit))),
                b'D' => self.finish_escape(Outcome::cont(ops::move_left(edit))),
                b'H' => self.finish_escape(Outcome::cont(ops::home(edit))),
                b'F' => self.finish_escape(Outcome::cont(ops::end(edit))),
                _ => self.finish_escape(Outcome::cont(false)),
            },
            EscState::BracketDigit(digit) => {
                let outcome = if byte == b'~' && digit == b'3' {
                    Outcome::cont(ops::delete_forward(edit))
                } else {
                    Outcome::cont(false)
                };
                self.finish_escape(outcome)
            }
            EscState::O => match byte {
                b'H' => self.finish_escape(Outcome::cont(ops::home(edit))),
                b'F' => self.finish_escape(Outcome::cont(ops::end(edit))),
                _ => self.finish_escape(Outcome::cont(false)),
            },
            EscState::None => unreachable!("dispatch_escape called outside an escape sequence"),
        }
    }

    fn finish_escape(&mut self, outcome: Outcome) -> Outcome {
        self.esc_state = EscState::None;
        outcome
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Step the working line back one entry, stashing the in-progress buffer
/// into the (now second-from-top) working slot first (spec.md §4.8).
fn history_prev(edit: &mut EditState, history: &mut History) -> bool {
    if edit.history_index + 1 >= history.len() {
        return false;
    }
    history.set_slot(edit.history_index, edit.line());
    edit.history_index += 1;
    let line = history
        .slot(edit.history_index)
        .unwrap_or_default()
        .to_string();
    edit.set_line(&line);
    true
}

/// Step the working line forward one entry toward the in-progress buffer.
fn history_next(edit: &mut EditState, history: &mut History) -> bool {
    if edit.history_index == 0 {
        return false;
    }
    history.set_slot(edit.history_index, edit.line());
    edit.history_index -= 1;
    let line = history
        .slot(edit.history_index)
        .unwrap_or_default()
        .to_string();
    edit.set_line(&line);
    true
}
