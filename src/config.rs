use crate::error::{ReadlineError, Result};

/// Floor enforced on `max_line_len` (spec.md §6: "reject if < 64").
pub const MIN_LINE_LEN: usize = 64;

/// Default bounded history length.
pub const DEFAULT_HISTORY_MAX_LEN: usize = 100;

/// User-facing preferences, set globally before or between sessions.
///
/// Modeled on the builder used by `rustyline::Config` in the wider
/// ecosystem: an immutable value built once via [`Config::builder`] and
/// cloned into each session. Completion/hint callbacks are not part of this
/// struct — they're registered directly on [`crate::session::Context`],
/// since trait objects don't implement `Clone`/`PartialEq` the way this
/// plain-data struct does.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    mask_mode: bool,
    multi_line: bool,
    dumb_mode: bool,
    history_max_len: usize,
    max_line_len: usize,
}

impl Config {
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    pub fn mask_mode(&self) -> bool {
        self.mask_mode
    }

    pub fn multi_line(&self) -> bool {
        self.multi_line
    }

    pub fn dumb_mode(&self) -> bool {
        self.dumb_mode
    }

    pub fn history_max_len(&self) -> usize {
        self.history_max_len
    }

    pub fn max_line_len(&self) -> usize {
        self.max_line_len
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            mask_mode: false,
            multi_line: false,
            dumb_mode: false,
            history_max_len: DEFAULT_HISTORY_MAX_LEN,
            max_line_len: 4096,
        }
    }
}

#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        ConfigBuilder {
            config: Config::default(),
        }
    }

    #[must_use]
    pub fn mask_mode(mut self, on: bool) -> Self {
        self.config.mask_mode = on;
        self
    }

    #[must_use]
    pub fn multi_line(mut self, on: bool) -> Self {
        self.config.multi_line = on;
        self
    }

    #[must_use]
    pub fn dumb_mode(mut self, on: bool) -> Self {
        self.config.dumb_mode = on;
        self
    }

    #[must_use]
    pub fn history_max_len(mut self, n: usize) -> Self {
        self.config.history_max_len = n;
        self
    }

    /// Set the buffer capacity for new sessions. Rejects `n < 64` per
    /// spec.md §6, matching the `too_short` error taxonomy entry.
    pub fn max_line_len(mut self, n: usize) -> Result<Self> {
        if n < MIN_LINE_LEN {
            return Err(ReadlineError::TooShort);
        }
        self.config.max_line_len = n;
        Ok(self)
    }

    pub fn build(self) -> Config {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let cfg = Config::default();
        assert!(!cfg.mask_mode());
        assert!(!cfg.multi_line());
        assert!(!cfg.dumb_mode());
        assert_eq!(cfg.history_max_len(), DEFAULT_HISTORY_MAX_LEN);
    }

    #[test]
    fn max_line_len_floor_is_enforced() {
        let err = Config::builder().max_line_len(10).unwrap_err();
        assert!(matches!(err, ReadlineError::TooShort));
    }

    #[test]
    fn builder_composes() {
        let cfg = Config::builder()
            .mask_mode(true)
            .multi_line(true)
            .history_max_len(10)
            .max_line_len(128)
            .unwrap()
            .build();
        assert!(cfg.mask_mode());
        assert!(cfg.multi_line());
        assert_eq!(cfg.history_max_len(), 10);
        assert_eq!(cfg.max_line_len(), 128);
    }
}
