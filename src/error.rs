use thiserror::Error;

/// Errors returned to the host across the session facade.
///
/// Mirrors the taxonomy spec'd for the editor: user-intent terminators
/// (`Interrupted`, `Eof`), transient output failures (`Io`), and the two
/// argument-validation cases the host can trigger before a session is even
/// armed (`InvalidArgument`, `TooShort`).
#[derive(Debug, Error)]
pub enum ReadlineError {
    /// The user pressed Ctrl-C.
    #[error("interrupted")]
    Interrupted,

    /// The user pressed Ctrl-D on an empty buffer, or the input channel hit EOF.
    #[error("end of file")]
    Eof,

    /// A read or write against the host's byte channel failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A null/empty buffer or similar invalid argument was passed to the API.
    #[error("invalid argument")]
    InvalidArgument,

    /// `max_line_len` was set below the floor of 64 bytes.
    #[error("max_line_len below the 64-byte floor")]
    TooShort,
}

pub type Result<T> = std::result::Result<T, ReadlineError>;
