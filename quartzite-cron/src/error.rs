//! Error types for cron operations.

use thiserror::Error;

/// Result type for cron operations.
pub type CronResult<T> = Result<T, CronError>;

/// Category of a parse failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseErrorKind {
    /// Not 6 or 7 whitespace-separated fields
    FieldCount,
    /// A value outside the field's domain
    OutOfRange,
    /// Step missing, zero or too large
    InvalidStep,
    /// A character or name that has no meaning at this position
    IllegalCharacter,
    /// `L`, `W`, `#` or `?` used on a field that does not accept it
    MisplacedOption,
    /// `L`, `W`, `#` or `?` combined with a list or range
    UnsupportedList,
    /// More than one `#` expression
    MultipleNth,
    /// Day-of-month and day-of-week not specified exactly one at a time
    DayFieldConflict,
}

/// A rejected cron expression.
///
/// `offset` is the character position of the offending token in the expression, when one
/// can be pinned down.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}{}", describe_offset(.offset))]
pub struct ParseError {
    kind: ParseErrorKind,
    message: String,
    offset: Option<usize>,
}

fn describe_offset(offset: &Option<usize>) -> String {
    match offset {
        Some(at) => format!(" (at offset {})", at),
        None => String::new(),
    }
}

impl ParseError {
    pub(crate) fn new(kind: ParseErrorKind, message: impl Into<String>, offset: Option<usize>) -> Self {
        Self {
            kind,
            message: message.into(),
            offset,
        }
    }

    pub(crate) fn at(kind: ParseErrorKind, message: impl Into<String>, offset: usize) -> Self {
        Self::new(kind, message, Some(offset))
    }

    pub fn kind(&self) -> ParseErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn offset(&self) -> Option<usize> {
        self.offset
    }
}

/// Cron-specific errors.
#[derive(Debug, Error)]
pub enum CronError {
    /// Invalid cron expression
    #[error("Invalid cron expression: {0}")]
    InvalidExpression(#[from] ParseError),

    /// Unknown time zone name or malformed offset
    #[error("Invalid time zone: {0}")]
    InvalidTimeZone(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Failed to read a configuration file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
