//! Error taxonomy and the three-way error policy.

use thiserror::Error;

pub use crate::dialect::DialectError;

/// Errors detected while tokenizing a single line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SplitError {
    #[error("empty delimiter")]
    EmptyDelimiter,
    /// A closing quote was followed by ordinary text instead of a delimiter
    /// or end of line. The position is a byte index into the line.
    #[error("mismatched quote at position: {0}")]
    MismatchedQuote(usize),
    #[error("unterminated quote")]
    UnterminatedQuote,
    #[error("unterminated escape at the end of the line")]
    UnterminatedEscape,
    /// `resplit` was invoked without a resumable unterminated-quote state or
    /// with a shrunken buffer.
    #[error("invalid resplit")]
    InvalidResplit,
    #[error("multiline limit reached")]
    MultilineLimitReached,
}

/// Errors detected while converting split fields into typed values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConvertError {
    #[error("invalid number of columns, expected: {expected}, got: {actual}")]
    ColumnCount { expected: usize, actual: usize },
    #[error("number of arguments does not match mapping, expected: {expected}, got: {actual}")]
    MappingArity { expected: usize, actual: usize },
    #[error("received empty mapping")]
    EmptyMapping,
    #[error("mapping contains an out of range index, maximum index: {index}, number of columns: {columns}")]
    MappingOutOfRange { index: usize, columns: usize },
    /// A field's text could not be parsed as the requested type. The column
    /// is 1-based and the text is a lossy rendering of the raw bytes.
    #[error("invalid conversion for column {column}: '{text}'")]
    InvalidConversion { column: usize, text: String },
    /// A field parsed but was rejected by its validator.
    #[error("{message} for column {column}: '{text}'")]
    FailedValidation {
        message: &'static str,
        column: usize,
        text: String,
    },
}

/// Any failure the crate can report.
#[derive(Debug, Error)]
pub enum Error {
    /// Marker returned under [`ErrorMode::Silent`]; the caller polls
    /// `valid()` instead of inspecting the error.
    #[error("operation failed")]
    Failed,
    #[error(transparent)]
    Dialect(#[from] DialectError),
    #[error(transparent)]
    Split(#[from] SplitError),
    #[error(transparent)]
    Convert(#[from] ConvertError),
    #[error("{name}: {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },
    /// A record was demanded after the input was exhausted.
    #[error("reached end of input")]
    EofReached,
    #[error("the header row is ignored by the dialect")]
    HeaderIgnored,
    #[error("header does not contain field: {0}")]
    UnknownField(String),
    #[error("field used multiple times: {0}")]
    DuplicateField(String),
    /// An inner error annotated with its source name and line number, as
    /// produced under [`ErrorMode::Raise`].
    #[error("{name} line {line}: {source}")]
    Context {
        name: String,
        line: u64,
        #[source]
        source: Box<Error>,
    },
}

/// How failures are surfaced to the caller.
///
/// Every fallible operation returns `Result` in all modes; the mode governs
/// what the `Err` carries and what is retained for polling afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Cheapest: a failure flips `valid()` to false and the returned error is
    /// the bare [`Error::Failed`] marker. No message is ever formatted.
    #[default]
    Silent,
    /// A failure additionally formats a contextual message, retrievable via
    /// `error_msg()` until the next operation.
    Message,
    /// The structured error is returned with source name and line context
    /// attached; nothing is retained for polling.
    Raise,
}

/// Per-component failure state driven by an [`ErrorMode`].
///
/// State never accumulates: [`clear`](Self::clear) runs at the start of every
/// operation, so `valid()` and `message()` always describe the most recent
/// one.
#[derive(Debug, Clone)]
pub(crate) struct ErrorState {
    mode: ErrorMode,
    invalid: bool,
    message: Option<String>,
}

impl ErrorState {
    pub(crate) fn new(mode: ErrorMode) -> Self {
        Self {
            mode,
            invalid: false,
            message: None,
        }
    }

    pub(crate) fn mode(&self) -> ErrorMode {
        self.mode
    }

    pub(crate) fn clear(&mut self) {
        self.invalid = false;
        self.message = None;
    }

    pub(crate) fn valid(&self) -> bool {
        !self.invalid
    }

    pub(crate) fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Records a failure according to the mode and returns the error to
    /// propagate.
    pub(crate) fn fail(&mut self, err: impl Into<Error>) -> Error {
        match self.mode {
            ErrorMode::Silent => {
                self.invalid = true;
                Error::Failed
            }
            ErrorMode::Message => {
                let err = err.into();
                self.invalid = true;
                self.message = Some(err.to_string());
                err
            }
            ErrorMode::Raise => err.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silent_mode_sets_flag_without_message() {
        let mut state = ErrorState::new(ErrorMode::Silent);
        let err = state.fail(SplitError::UnterminatedQuote);
        assert!(matches!(err, Error::Failed));
        assert!(!state.valid());
        assert_eq!(state.message(), None);
    }

    #[test]
    fn message_mode_formats_and_retains() {
        let mut state = ErrorState::new(ErrorMode::Message);
        let err = state.fail(SplitError::MismatchedQuote(7));
        assert!(matches!(err, Error::Split(SplitError::MismatchedQuote(7))));
        assert!(!state.valid());
        assert_eq!(state.message(), Some("mismatched quote at position: 7"));

        state.clear();
        assert!(state.valid());
        assert_eq!(state.message(), None);
    }

    #[test]
    fn raise_mode_retains_nothing() {
        let mut state = ErrorState::new(ErrorMode::Raise);
        let err = state.fail(SplitError::UnterminatedQuote);
        assert!(matches!(err, Error::Split(SplitError::UnterminatedQuote)));
        assert!(state.valid());
        assert_eq!(state.message(), None);
    }

    #[test]
    fn context_display_prefixes_name_and_line() {
        let err = Error::Context {
            name: "data.csv".to_string(),
            line: 3,
            source: Box::new(Error::Split(SplitError::UnterminatedQuote)),
        };
        assert_eq!(err.to_string(), "data.csv line 3: unterminated quote");
    }
}
