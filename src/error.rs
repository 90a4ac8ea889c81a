//! Error types.
//!
//! Mirrors the error taxonomy of the format specification: one variant per
//! distinct failure mode, so callers can match on the kind of failure rather
//! than parsing message text.

use std::fmt;

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, QwkError>;

/// A location hint attached to a [`QwkError::Format`] or a validation issue.
///
/// Kept deliberately loose (file + optional line/offset) because the three
/// source formats (CONTROL.DAT text, MESSAGES.DAT binary, .NDX binary) don't
/// share a notion of "line".
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Location {
    pub file: &'static str,
    pub line: Option<usize>,
    pub offset: Option<usize>,
}

impl Location {
    pub fn file(file: &'static str) -> Self {
        Self {
            file,
            line: None,
            offset: None,
        }
    }

    pub fn line(file: &'static str, line: usize) -> Self {
        Self {
            file,
            line: Some(line),
            offset: None,
        }
    }

    pub fn offset(file: &'static str, offset: usize) -> Self {
        Self {
            file,
            line: None,
            offset: Some(offset),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.file)?;
        if let Some(line) = self.line {
            write!(f, ":{line}")?;
        }
        if let Some(offset) = self.offset {
            write!(f, "@{offset}")?;
        }
        Ok(())
    }
}

/// Top-level error type returned by fallible codec entry points.
#[derive(Debug, Error)]
pub enum QwkError {
    /// A structural violation of the format specification, raised in
    /// [`crate::validation::ParseMode::Strict`]. In Lenient/Salvage modes the
    /// same condition is recorded as an error in the [`crate::validation::ValidationReport`]
    /// instead of being returned here.
    #[error("format error{}: {message}", location.as_ref().map(|l| format!(" at {l}")).unwrap_or_default())]
    Format {
        message: String,
        location: Option<Location>,
    },

    /// The underlying archive or byte stream failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A required archive member was absent.
    #[error("missing required file: {0}")]
    MissingFile(String),

    /// An archive entry exceeded the configured decompression guard.
    #[error("entry {entry} ({size} bytes) exceeds the {limit}-byte limit")]
    LimitExceeded {
        entry: String,
        size: u64,
        limit: u64,
    },

    /// A builder (e.g. [`crate::rep::RepWriter`]) was used after it had
    /// already finalised, or otherwise misused.
    #[error("invalid usage: {0}")]
    InvalidUsage(String),
}

impl QwkError {
    pub fn format(message: impl Into<String>) -> Self {
        QwkError::Format {
            message: message.into(),
            location: None,
        }
    }

    pub fn format_at(message: impl Into<String>, location: Location) -> Self {
        QwkError::Format {
            message: message.into(),
            location: Some(location),
        }
    }
}
