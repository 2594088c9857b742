//! An embeddable single-line terminal editor.
//!
//! This crate owns the editing algorithm — the buffer, the cursor, the
//! ANSI refresh strategies, history, completion, and hints — but never
//! touches a file descriptor or a termios struct itself. The host hands it
//! bytes through [`InputSource`]/[`OutputSink`] and gets a line back; this
//! is what lets the same editor run over a real tty, a pty, a serial port,
//! or a mock in a test, with identical behavior.
//!
//! ```no_run
//! use vtline::{Config, Context, PlainSink};
//! use std::io::{self, Read};
//!
//! struct Stdin;
//! impl vtline::InputSource for Stdin {
//!     fn read_byte(&mut self) -> io::Result<Option<u8>> {
//!         let mut b = [0u8; 1];
//!         match io::stdin().read(&mut b)? {
//!             0 => Ok(None),
//!             _ => Ok(Some(b[0])),
//!         }
//!     }
//!     fn read_byte_timeout(&mut self, _timeout: std::time::Duration) -> io::Result<Option<u8>> {
//!         self.read_byte()
//!     }
//! }
//!
//! let mut ctx = Context::new(Config::default());
//! let mut input = Stdin;
//! let mut output = PlainSink(io::stdout());
//! let line = ctx.read_line("> ", &mut input, &mut output);
//! ```

mod clock;
mod completion;
mod config;
mod dispatch;
mod edit_state;
mod error;
mod hints;
mod history;
mod io_traits;
mod ops;
mod output;
mod refresh;
mod session;
mod terminal;

pub use clock::{Clock, SystemClock};
pub use completion::{Completer, Dispatch};
pub use config::{Config, ConfigBuilder, DEFAULT_HISTORY_MAX_LEN, MIN_LINE_LEN};
pub use error::{ReadlineError, Result};
pub use hints::{Hint, Hinter};
pub use history::History;
pub use io_traits::{InputSource, OutputSink, PlainSink};
pub use session::{Context, LiveLine};
pub use terminal::{probe, FALLBACK_COLS, PROBE_TIMEOUT};
