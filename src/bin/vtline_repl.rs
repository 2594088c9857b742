//! Demo host: wires real stdin/stdout into [`vtline`]'s byte-oriented
//! traits, enables raw mode for the duration of the process, and runs a
//! tiny read-eval-print loop.
//!
//! This is the crate's only consumer of `crossterm` — the library itself
//! never sets up raw mode or reads a termios struct.

use std::io::{self, Read, Write};
use std::time::Duration;

use crossterm::terminal::{disable_raw_mode, enable_raw_mode};

use vtline::{Config, Context, InputSource, OutputSink, ReadlineError};

/// Reads stdin byte-at-a-time. Raw mode (enabled by `main`) means no line
/// buffering or local echo gets in the way.
struct Stdin;

impl InputSource for Stdin {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let mut b = [0u8; 1];
        match io::stdin().lock().read(&mut b)? {
            0 => Ok(None),
            _ => Ok(Some(b[0])),
        }
    }

    fn read_byte_timeout(&mut self, timeout: Duration) -> io::Result<Option<u8>> {
        if poll_stdin(timeout)? {
            self.read_byte()
        } else {
            Ok(None)
        }
    }
}

#[cfg(unix)]
fn poll_stdin(timeout: Duration) -> io::Result<bool> {
    let mut fds = libc::pollfd {
        fd: 0,
        events: libc::POLLIN,
        revents: 0,
    };
    let millis = timeout.as_millis().min(i32::MAX as u128) as i32;
    let ready = unsafe { libc::poll(&mut fds, 1, millis) };
    if ready < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(ready > 0 && fds.revents & libc::POLLIN != 0)
}

#[cfg(not(unix))]
fn poll_stdin(_timeout: Duration) -> io::Result<bool> {
    // No portable non-blocking poll without an extra crate; treat every
    // wait as "something is there" so the probe/width-query paths degrade
    // to their blocking form instead of hanging.
    Ok(true)
}

/// Writes stdout directly, with an explicit `drain` via `flush` (stdout has
/// no separate hardware buffer to force out beyond that).
struct Stdout;

impl Write for Stdout {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stdout().lock().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stdout().lock().flush()
    }
}

impl OutputSink for Stdout {
    fn drain(&mut self) -> io::Result<()> {
        self.flush()
    }
}

fn main() -> io::Result<()> {
    env_logger::init();
    enable_raw_mode()?;
    let result = run();
    disable_raw_mode()?;
    result
}

fn run() -> io::Result<()> {
    let config = Config::builder()
        .history_max_len(200)
        .build();
    let mut ctx = Context::new(config);
    let history_path = std::env::temp_dir().join("vtline-repl-history");
    let _ = ctx.load_history(&history_path);

    let mut input = Stdin;
    let mut output = Stdout;

    loop {
        match ctx.read_line("vtline> ", &mut input, &mut output) {
            Ok(line) => {
                if line == "exit" || line == "quit" {
                    break;
                }
                output.write_all(format!("you said: {line}\r\n").as_bytes())?;
                output.flush()?;
            }
            Err(ReadlineError::Interrupted) => {
                output.write_all(b"^C\r\n")?;
                output.flush()?;
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                output.write_all(format!("error: {err}\r\n").as_bytes())?;
                output.flush()?;
                break;
            }
        }
    }

    let _ = ctx.save_history(&history_path);
    Ok(())
}
