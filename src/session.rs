//! The session facade (spec.md §4.9/§5): a blocking [`Context::read_line`]
//! for hosts that can afford to block on one call, and an event-driven
//! `start`/`feed`/`stop`/`hide`/`show` counterpart for hosts that drive
//! editing from inside their own event loop.
//!
//! [`Context`] is the one long-lived object a host keeps around: it owns
//! the [`Config`], the [`History`], the [`Clock`], and the optional
//! completion/hint callbacks. Everything else (the edit buffer, the
//! dispatcher) is scoped to a single line.

use std::path::Path;
use std::time::Duration;

use log::debug;

use crate::clock::{Clock, SystemClock};
use crate::completion::Completer;
use crate::config::Config;
use crate::dispatch::{Dispatcher, Outcome};
use crate::edit_state::EditState;
use crate::error::{ReadlineError, Result};
use crate::hints::Hinter;
use crate::history::History;
use crate::io_traits::{InputSource, OutputSink};
use crate::output::OutputAssembler;
use crate::refresh::{self, RefreshInput, RefreshMode};
use crate::terminal;

struct NullCompleter;
impl Completer for NullCompleter {
    fn complete(&self, _buf: &[u8], _pos: usize) -> Vec<String> {
        Vec::new()
    }
}

/// How long [`Context::read_line`] waits for a width probe reply before
/// falling back to [`terminal::FALLBACK_COLS`] (spec.md §4.2).
const WIDTH_PROBE_TIMEOUT: Duration = Duration::from_millis(200);

/// Long-lived per-host state: configuration, history, and callbacks.
pub struct Context {
    config: Config,
    history: History,
    clock: Box<dyn Clock>,
    completer: Option<Box<dyn Completer>>,
    hinter: Option<Box<dyn Hinter>>,
}

impl Context {
    pub fn new(config: Config) -> Self {
        let history = History::new(config.history_max_len());
        Context {
            config,
            history,
            clock: Box::new(SystemClock::new()),
            completer: None,
            hinter: None,
        }
    }

    /// Like [`Self::new`], but with an injected [`Clock`] — tests use this
    /// to drive the paste-burst heuristic deterministically.
    pub fn with_clock(config: Config, clock: Box<dyn Clock>) -> Self {
        let history = History::new(config.history_max_len());
        Context {
            config,
            history,
            clock,
            completer: None,
            hinter: None,
        }
    }

    pub fn set_completer(&mut self, completer: Box<dyn Completer>) {
        self.completer = Some(completer);
    }

    pub fn set_hinter(&mut self, hinter: Box<dyn Hinter>) {
        self.hinter = Some(hinter);
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut History {
        &mut self.history
    }

    pub fn load_history(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.history.load(path)
    }

    pub fn save_history(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.history.save(path)
    }

    /// Block until a full line is entered, interrupted, or the input
    /// channel hits EOF (spec.md §4.9).
    pub fn read_line(
        &mut self,
        prompt: &str,
        input: &mut dyn InputSource,
        output: &mut dyn OutputSink,
    ) -> Result<String> {
        if self.config.dumb_mode() {
            return self.read_line_dumb(prompt, input, output);
        }

        let cols = terminal::measure_width(input, output, WIDTH_PROBE_TIMEOUT);
        debug!("measured terminal width: {cols} cols");

        let mut edit = EditState::new(prompt, cols, self.config.max_line_len());
        self.history.begin_session();
        let mut dispatcher = Dispatcher::new();
        let mut out = OutputAssembler::new();
        let null_completer = NullCompleter;

        self.draw(&mut edit, &dispatcher, RefreshMode::WRITE, false, &mut out);
        out.flush_to(output)?;

        loop {
            let Some(byte) = input.read_byte()? else {
                self.history.end_session_discard();
                return Err(ReadlineError::Eof);
            };
            let now = self.clock.now_ms();
            let completer: &dyn Completer = self
                .completer
                .as_deref()
                .unwrap_or(&null_completer);
            let mut beeped = false;
            let outcome = dispatcher.feed(
                byte,
                now,
                &mut edit,
                &mut self.history,
                completer,
                self.config.multi_line(),
                &mut || beeped = true,
            );
            if beeped {
                out.append_byte(0x07);
            }

            match outcome {
                Outcome::Submit => {
                    self.draw(&mut edit, &dispatcher, RefreshMode::WRITE, true, &mut out);
                    out.append_str("\r\n");
                    out.flush_to(output)?;
                    let line = edit.line();
                    self.history.end_session_commit(&line);
                    return Ok(line);
                }
                Outcome::Interrupted => {
                    out.append_str("\r\n");
                    out.flush_to(output)?;
                    self.history.end_session_discard();
                    return Err(ReadlineError::Interrupted);
                }
                Outcome::Eof => {
                    out.append_str("\r\n");
                    out.flush_to(output)?;
                    self.history.end_session_discard();
                    return Err(ReadlineError::Eof);
                }
                Outcome::PasteByte(b) => {
                    out.append_byte(b);
                    out.flush_to(output)?;
                }
                Outcome::Continue {
                    redraw,
                    appended_byte,
                } => {
                    let drew_fast = appended_byte.is_some_and(|b| {
                        !self.config.multi_line()
                            && !dispatcher.completion_active()
                            && refresh::try_fast_path_insert(
                                &edit,
                                self.config.mask_mode(),
                                self.hinter.is_some(),
                                true,
                                &mut out,
                                b,
                            )
                    });
                    if drew_fast {
                        out.flush_to(output)?;
                        continue;
                    }
                    if redraw {
                        self.draw(&mut edit, &dispatcher, RefreshMode::BOTH, false, &mut out);
                        out.flush_to(output)?;
                    }
                }
            }
        }
    }

    /// Degraded mode for a channel that isn't a real terminal (spec.md
    /// §4.7): no cursor movement, no history navigation, no escape parsing,
    /// no completion — just echo-and-collect with a single-character
    /// backspace, up to the first newline. 0x08/0x7F erase the last
    /// collected byte with a `\x08 \x08` erase-and-space; bytes 0x1C-0x1F
    /// are dropped silently.
    fn read_line_dumb(
        &mut self,
        prompt: &str,
        input: &mut dyn InputSource,
        output: &mut dyn OutputSink,
    ) -> Result<String> {
        output.write_all(prompt.as_bytes())?;
        output.flush()?;
        output.drain()?;
        let mut buf = Vec::new();
        loop {
            match input.read_byte()? {
                None if buf.is_empty() => return Err(ReadlineError::Eof),
                None => break,
                Some(b'\n') => break,
                Some(b'\r') => {}
                Some(0x08) | Some(0x7f) => {
                    if buf.pop().is_some() {
                        output.write_all(b"\x08 \x08")?;
                        output.flush()?;
                        output.drain()?;
                    }
                }
                Some(0x1c..=0x1f) => {}
                Some(b) => {
                    buf.push(b);
                    output.write_all(&[b])?;
                    output.flush()?;
                    output.drain()?;
                }
            }
        }
        let line = String::from_utf8_lossy(&buf).into_owned();
        self.history.add(line.clone());
        Ok(line)
    }

    fn draw(
        &self,
        edit: &mut EditState,
        dispatcher: &Dispatcher,
        mode: RefreshMode,
        suppress_hint: bool,
        out: &mut OutputAssembler,
    ) {
        let view_buf: Vec<u8> = dispatcher
            .completion_view(&edit.buf)
            .map(<[u8]>::to_vec)
            .unwrap_or_else(|| edit.buf.clone());
        let view_pos = if dispatcher.completion_active() {
            view_buf.len()
        } else {
            edit.pos
        };
        let input = RefreshInput {
            mode,
            mask_mode: self.config.mask_mode(),
            view_buf: &view_buf,
            view_pos,
            hinter: self.hinter.as_deref(),
            suppress_hint,
        };
        refresh::refresh(edit, self.config.multi_line(), &input, out);
    }
}

/// A line in progress, driven one byte at a time by the event-driven
/// counterpart to [`Context::read_line`] (spec.md §5). Unlike the blocking
/// facade, the host owns all I/O: [`Context::feed`] only appends to the
/// [`OutputAssembler`] the host passes in.
pub struct LiveLine {
    edit: EditState,
    dispatcher: Dispatcher,
}

impl Context {
    /// Arm a new event-driven line. `cols` is supplied by the host (no
    /// blocking width probe is attempted here, since the host may not want
    /// to block waiting for a DSR reply inside an event loop).
    pub fn start(&mut self, prompt: &str, cols: usize) -> LiveLine {
        self.history.begin_session();
        LiveLine {
            edit: EditState::new(prompt, cols, self.config.max_line_len()),
            dispatcher: Dispatcher::new(),
        }
    }

    /// Feed one byte into a live session, appending any screen updates to
    /// `out`. Returns `Some` once the line is finished (submitted,
    /// interrupted, or EOF); `None` means keep feeding.
    pub fn feed(
        &mut self,
        live: &mut LiveLine,
        byte: u8,
        now_ms: u64,
        out: &mut OutputAssembler,
    ) -> Option<Result<String>> {
        let null_completer = NullCompleter;
        let completer: &dyn Completer = self.completer.as_deref().unwrap_or(&null_completer);
        let mut beeped = false;
        let outcome = live.dispatcher.feed(
            byte,
            now_ms,
            &mut live.edit,
            &mut self.history,
            completer,
            self.config.multi_line(),
            &mut || beeped = true,
        );
        if beeped {
            out.append_byte(0x07);
        }

        match outcome {
            Outcome::Submit => {
                self.draw(&mut live.edit, &live.dispatcher, RefreshMode::WRITE, true, out);
                out.append_str("\r\n");
                let line = live.edit.line();
                self.history.end_session_commit(&line);
                Some(Ok(line))
            }
            Outcome::Interrupted => {
                out.append_str("\r\n");
                self.history.end_session_discard();
                Some(Err(ReadlineError::Interrupted))
            }
            Outcome::Eof => {
                out.append_str("\r\n");
                self.history.end_session_discard();
                Some(Err(ReadlineError::Eof))
            }
            Outcome::PasteByte(b) => {
                out.append_byte(b);
                None
            }
            Outcome::Continue { redraw, .. } => {
                if redraw {
                    self.draw(&mut live.edit, &live.dispatcher, RefreshMode::BOTH, false, out);
                }
                None
            }
        }
    }

    /// Abandon a live session early (e.g. the host is shutting down)
    /// without adding it to history.
    pub fn stop(&mut self, _live: LiveLine) {
        self.history.end_session_discard();
    }

    /// Erase the in-progress line from the screen so the host can
    /// interleave other output (e.g. an async log line), without losing
    /// the line's contents. Pair with [`Self::show`].
    pub fn hide(&self, live: &mut LiveLine, out: &mut OutputAssembler) {
        self.draw(&mut live.edit, &live.dispatcher, RefreshMode::CLEAN, true, out);
    }

    /// Redraw a line previously erased with [`Self::hide`].
    pub fn show(&self, live: &mut LiveLine, out: &mut OutputAssembler) {
        self.draw(&mut live.edit, &live.dispatcher, RefreshMode::WRITE, false, out);
    }
}
