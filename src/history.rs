use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::{ReadlineError, Result};

/// A bounded, ordered sequence of prior lines, oldest first.
///
/// While a session is active, index 0 (the most recent slot, counted from
/// the end) is a mutable scratch slot mirroring the in-progress edit buffer —
/// see [`History::begin_session`]. Adjacent duplicates are suppressed on
/// [`History::add`]; capacity overflow drops the oldest entry.
pub struct History {
    entries: Vec<String>,
    max_len: usize,
}

impl History {
    /// `max_len` of 0 disables history entirely: `add` becomes a no-op.
    pub fn new(max_len: usize) -> Self {
        History {
            entries: Vec::new(),
            max_len,
        }
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Number of entries, including an active working slot if any.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append an empty working slot for a newly started session. Call
    /// [`Self::end_session_commit`] or [`Self::end_session_discard`] when
    /// the session ends.
    pub fn begin_session(&mut self) {
        self.entries.push(String::new());
    }

    /// Discard the working slot without adding it to history — used on
    /// Ctrl-C, and on Ctrl-D over an empty buffer.
    pub fn end_session_discard(&mut self) {
        self.entries.pop();
    }

    /// Pop the working slot and try to commit `line` as a real entry,
    /// subject to adjacent-dup suppression and the capacity cap.
    pub fn end_session_commit(&mut self, line: &str) {
        self.entries.pop();
        self.add(line);
    }

    /// Add a line directly (used by hosts that want to seed history, and by
    /// [`Self::end_session_commit`]). Returns `false` if the add was
    /// suppressed (history disabled, or a duplicate of the last entry).
    pub fn add(&mut self, line: impl Into<String>) -> bool {
        if self.max_len == 0 {
            return false;
        }
        let line = line.into();
        if self.entries.last().map(String::as_str) == Some(line.as_str()) {
            return false;
        }
        self.entries.push(line);
        if self.entries.len() > self.max_len {
            self.entries.remove(0);
        }
        true
    }

    /// Resize capacity, keeping the most recent `min(len, n)` entries.
    /// A no-op for `n == 0` (use [`Self::free_all`] to actually clear).
    pub fn set_max_len(&mut self, n: usize) {
        if n == 0 {
            self.max_len = 0;
            return;
        }
        self.max_len = n;
        if self.entries.len() > n {
            let excess = self.entries.len() - n;
            self.entries.drain(0..excess);
        }
    }

    pub fn free_all(&mut self) {
        self.entries.clear();
    }

    /// Fetch a slot counted from the most recent end: 0 is the newest
    /// (the working slot during an active session), k is k entries back.
    pub fn slot(&self, index_from_end: usize) -> Option<&str> {
        let len = self.entries.len();
        if index_from_end >= len {
            return None;
        }
        Some(&self.entries[len - 1 - index_from_end])
    }

    /// Overwrite a slot in place (used to stash the in-progress buffer into
    /// the working slot before stepping to a different history entry).
    pub fn set_slot(&mut self, index_from_end: usize, value: impl Into<String>) {
        let len = self.entries.len();
        if index_from_end < len {
            self.entries[len - 1 - index_from_end] = value.into();
        }
    }

    /// Write one entry per line (LF-terminated), truncating any existing
    /// file. Does not include an active working slot — callers should not
    /// save mid-session.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = File::create(path)?;
        let mut out = BufWriter::new(file);
        for entry in &self.entries {
            out.write_all(entry.as_bytes())?;
            out.write_all(b"\n")?;
        }
        out.flush()?;
        Ok(())
    }

    /// Load entries from `path`, one per line, appending each via
    /// [`Self::add`] (so duplicate suppression and the capacity cap still
    /// apply). A trailing CR before the LF is stripped. Missing file is an
    /// I/O error; an empty file succeeds with no entries added.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let file = File::open(path).map_err(ReadlineError::Io)?;
        let reader = BufReader::new(file);
        for line in reader.lines() {
            let line = line?;
            let trimmed = line.strip_suffix('\r').unwrap_or(&line);
            if !trimmed.is_empty() {
                self.add(trimmed.to_string());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile_stub::NamedTempFile;

    /// Minimal temp-file helper so history persistence tests don't need an
    /// external crate: a unique path under `std::env::temp_dir()`, removed
    /// on drop.
    mod tempfile_stub {
        use std::path::PathBuf;

        pub struct NamedTempFile(PathBuf);

        impl NamedTempFile {
            pub fn new(tag: &str) -> Self {
                let mut p = std::env::temp_dir();
                p.push(format!(
                    "vtline-history-test-{tag}-{:?}",
                    std::thread::current().id()
                ));
                NamedTempFile(p)
            }

            pub fn path(&self) -> &std::path::Path {
                &self.0
            }
        }

        impl Drop for NamedTempFile {
            fn drop(&mut self) {
                let _ = std::fs::remove_file(&self.0);
            }
        }
    }

    #[test]
    fn add_suppresses_adjacent_duplicates() {
        let mut h = History::new(100);
        assert!(h.add("ls"));
        assert!(!h.add("ls"));
        assert!(h.add("pwd"));
        assert!(h.add("ls"));
        assert_eq!(h.len(), 3);
    }

    #[test]
    fn zero_max_len_disables_history() {
        let mut h = History::new(0);
        assert!(!h.add("ls"));
        assert_eq!(h.len(), 0);
    }

    #[test]
    fn overflow_drops_oldest() {
        let mut h = History::new(3);
        for i in 0..5 {
            h.add(format!("cmd{i}"));
        }
        assert_eq!(h.len(), 3);
        assert_eq!(h.slot(0), Some("cmd4"));
        assert_eq!(h.slot(2), Some("cmd2"));
        assert_eq!(h.slot(3), None);
    }

    #[test]
    fn set_max_len_trims_to_newest() {
        let mut h = History::new(100);
        for i in 0..10 {
            h.add(format!("cmd{i}"));
        }
        h.set_max_len(4);
        assert_eq!(h.len(), 4);
        assert_eq!(h.slot(0), Some("cmd9"));
        assert_eq!(h.slot(3), Some("cmd6"));
    }

    #[test]
    fn empty_session_does_not_grow_history() {
        let mut h = History::new(100);
        h.begin_session();
        assert_eq!(h.len(), 1);
        h.end_session_commit("");
        assert_eq!(h.len(), 0);
    }

    #[test]
    fn navigation_stashes_working_slot() {
        let mut h = History::new(100);
        h.add("echo hello");
        h.add("ls -la");
        h.begin_session();
        // User typed "pwd" before pressing Up.
        h.set_slot(0, "pwd");
        assert_eq!(h.slot(0), Some("pwd"));
        assert_eq!(h.slot(1), Some("ls -la"));
        assert_eq!(h.slot(2), Some("echo hello"));
    }

    #[test]
    fn save_then_load_round_trips() {
        let tmp = NamedTempFile::new("roundtrip");
        let mut h = History::new(100);
        h.add("alpha");
        h.add("beta");
        h.add("gamma");
        h.save(tmp.path()).unwrap();

        let mut h2 = History::new(100);
        h2.load(tmp.path()).unwrap();
        assert_eq!(h2.slot(0), Some("gamma"));
        assert_eq!(h2.slot(1), Some("beta"));
        assert_eq!(h2.slot(2), Some("alpha"));
    }

    #[test]
    fn load_strips_trailing_cr() {
        let tmp = NamedTempFile::new("crlf");
        std::fs::write(tmp.path(), "one\r\ntwo\r\n").unwrap();
        let mut h = History::new(100);
        h.load(tmp.path()).unwrap();
        assert_eq!(h.slot(1), Some("one"));
        assert_eq!(h.slot(0), Some("two"));
    }

    #[test]
    fn load_missing_file_is_an_error() {
        let mut h = History::new(100);
        assert!(h.load("/nonexistent/path/for/vtline-tests").is_err());
    }

    #[test]
    fn load_empty_file_succeeds_with_no_entries() {
        let tmp = NamedTempFile::new("empty");
        std::fs::write(tmp.path(), b"").unwrap();
        let mut h = History::new(100);
        h.load(tmp.path()).unwrap();
        assert_eq!(h.len(), 0);
    }
}
