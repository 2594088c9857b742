//! Tab-completion state machine (spec.md §4.6).
//!
//! The completion callback is invoked exactly once per TAB cycle start — the
//! resulting [`CompletionState`] caches the candidate list for the cycle's
//! whole lifetime, fixing the "callback invoked twice per cycle" bug spec.md
//! §9 calls out in the source it was distilled from. The return-byte
//! protocol is modeled as an explicit [`Dispatch`] variant rather than a
//! sentinel integer, per the same section's other callout.

use crate::edit_state::EditState;

/// Supplies completion candidates for the text currently in the buffer.
///
/// Given the whole buffer and the cursor position within it, return zero or
/// more full-line replacement candidates (spec.md doesn't define word-level
/// completion — candidates replace the entire line, same as the C source's
/// `linenoiseCompletions` callback).
pub trait Completer {
    fn complete(&self, buf: &[u8], pos: usize) -> Vec<String>;
}

/// The result of handing one byte to the completion engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// The byte was fully handled here; the dispatcher should read the next one.
    Consumed,
    /// The byte should be processed as if the completion cycle had never
    /// started (e.g. typing a space right after accepting a completion).
    Passthrough(u8),
}

/// Candidates materialized for one TAB cycle, plus the cycle's cursor.
pub struct CompletionState {
    candidates: Vec<String>,
    /// May equal `candidates.len()`, meaning "show the original buffer".
    idx: usize,
}

impl CompletionState {
    fn new(candidates: Vec<String>) -> Self {
        CompletionState { candidates, idx: 0 }
    }

    fn len(&self) -> usize {
        self.candidates.len()
    }

    /// The text that should currently be displayed: the candidate at `idx`,
    /// or `None` when `idx` has cycled onto the "original buffer" slot.
    pub fn displayed<'a>(&'a self, original: &'a [u8]) -> &'a [u8] {
        if self.idx == self.len() {
            original
        } else {
            self.candidates[self.idx].as_bytes()
        }
    }

    pub fn is_on_original(&self) -> bool {
        self.idx == self.len()
    }
}

/// Bookkeeping the dispatcher threads alongside [`EditState`] while a TAB
/// cycle is active. Lives for exactly one cycle; dropped on commit/cancel.
pub struct CompletionEngine {
    state: Option<CompletionState>,
}

impl CompletionEngine {
    pub fn new() -> Self {
        CompletionEngine { state: None }
    }

    pub fn is_active(&self) -> bool {
        self.state.is_some()
    }

    /// Handle one input byte while a completion callback is registered.
    /// Returns `None` if the byte wasn't completion-related in this call
    /// (i.e. the cycle wasn't active and the byte wasn't TAB) — the caller
    /// should fall through to ordinary dispatch in that case.
    pub fn feed(
        &mut self,
        byte: u8,
        edit: &mut EditState,
        completer: &dyn Completer,
        beep: &mut dyn FnMut(),
    ) -> Option<Dispatch> {
        const TAB: u8 = 0x09;
        const ESC: u8 = 0x1B;

        if self.state.is_none() {
            if byte != TAB {
                return None;
            }
            let candidates = completer.complete(&edit.buf, edit.pos);
            if candidates.is_empty() {
                beep();
                return Some(Dispatch::Consumed);
            }
            edit.in_completion = true;
            edit.completion_idx = 0;
            self.state = Some(CompletionState::new(candidates));
            return Some(Dispatch::Consumed);
        }

        // A cycle is active.
        let cycle = self.state.as_mut().expect("checked above");

        if byte == TAB {
            cycle.idx = (cycle.idx + 1) % (cycle.len() + 1);
            edit.completion_idx = cycle.idx;
            if cycle.is_on_original() {
                beep();
            }
            return Some(Dispatch::Consumed);
        }

        if byte == ESC {
            self.cancel(edit);
            return Some(Dispatch::Consumed);
        }

        // Any other byte commits.
        if !cycle.is_on_original() {
            let text = cycle.candidates[cycle.idx].clone();
            edit.set_line(&text);
        }
        self.cancel(edit);
        Some(Dispatch::Passthrough(byte))
    }

    /// Cancel the active cycle (if any), leaving the real buffer untouched
    /// unless the caller already applied a commit.
    pub fn cancel(&mut self, edit: &mut EditState) {
        self.state = None;
        edit.in_completion = false;
        edit.completion_idx = 0;
    }

    /// The buffer view the refresh engine should draw: `None` means "draw
    /// the real buffer", `Some(bytes)` means "draw this candidate instead,
    /// without mutating the real edit state".
    pub fn displayed_view<'a>(&'a self, original: &'a [u8]) -> Option<&'a [u8]> {
        self.state.as_ref().map(|c| c.displayed(original))
    }
}

impl Default for CompletionEngine {
    fn default() -> Self {
        Self::new()
    }
}
