//! Shared validation context threaded through every parser.
//!
//! Parsers never abort on a recoverable issue. Instead they push an [`Issue`]
//! onto a [`ValidationContext`] and substitute a documented default, letting
//! the rest of a packet parse even when one record is damaged. Whether an
//! unrecoverable issue becomes a thrown error is decided once, at the
//! packet-open boundary, based on [`ParseMode`] — parsers themselves stay
//! mode-agnostic beyond the few places (§4.2, §4.4) where they must choose
//! to resynchronise rather than continue reading a clearly-wrong stream.

use std::fmt;

use crate::error::Location;

/// Controls how aggressively a parser tolerates format violations.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Default)]
pub enum ParseMode {
    /// Any [`Severity::Error`] raises a [`crate::error::QwkError`] at the
    /// packet-open boundary; fields that fail to parse raise immediately
    /// rather than substituting a default.
    Strict,
    /// Format violations are recorded, defaults are substituted, and the
    /// packet opens successfully with a non-empty [`ValidationReport`].
    #[default]
    Lenient,
    /// As Lenient, but parsers additionally attempt best-effort recovery of
    /// data a Lenient parse would otherwise drop (e.g. resynchronising past
    /// a corrupt block-count rather than stopping at the first one).
    Salvage,
}

impl ParseMode {
    /// Whether this mode substitutes defaults and records diagnostics
    /// instead of raising, for the field currently being parsed.
    pub fn tolerant(self) -> bool {
        !matches!(self, ParseMode::Strict)
    }
}

/// Severity of a single diagnostic.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// One diagnostic raised during parsing.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Issue {
    pub severity: Severity,
    pub message: String,
    pub location: Option<Location>,
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(loc) => write!(f, "[{:?}] {} ({loc})", self.severity, self.message),
            None => write!(f, "[{:?}] {}", self.severity, self.message),
        }
    }
}

/// Accumulator of diagnostics shared across every parser invoked while
/// opening a single packet (or building a single REP packet).
///
/// Issues are appended in discovery order, which tracks source order within
/// a subsystem but is not guaranteed to be strictly monotone *across*
/// subsystems (CONTROL.DAT, MESSAGES.DAT, and DOOR.ID are parsed in sequence,
/// but nothing orders their diagnostics relative to each other beyond that).
#[derive(Clone, Debug, Default)]
pub struct ValidationContext {
    mode: ParseMode,
    issues: Vec<Issue>,
}

impl ValidationContext {
    pub fn new(mode: ParseMode) -> Self {
        Self {
            mode,
            issues: Vec::new(),
        }
    }

    pub fn mode(&self) -> ParseMode {
        self.mode
    }

    pub fn push(&mut self, severity: Severity, message: impl Into<String>) {
        self.push_at(severity, message, None)
    }

    pub fn push_at(
        &mut self,
        severity: Severity,
        message: impl Into<String>,
        location: Option<Location>,
    ) {
        let message = message.into();
        match severity {
            Severity::Error => log::error!("{message}"),
            Severity::Warning => log::warn!("{message}"),
            Severity::Info => log::debug!("{message}"),
        }
        self.issues.push(Issue {
            severity,
            message,
            location,
        });
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(Severity::Error, message)
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(Severity::Warning, message)
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(Severity::Info, message)
    }

    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::Error)
    }

    /// The first recorded error, if any — used at the packet-open boundary
    /// to translate a Strict-mode context error into a thrown
    /// [`crate::error::QwkError::Format`].
    pub fn first_error(&self) -> Option<&Issue> {
        self.issues
            .iter()
            .find(|i| i.severity == Severity::Error)
    }

    pub fn into_report(self) -> ValidationReport {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();
        let mut infos = Vec::new();
        for issue in self.issues {
            match issue.severity {
                Severity::Error => errors.push(issue),
                Severity::Warning => warnings.push(issue),
                Severity::Info => infos.push(issue),
            }
        }
        ValidationReport {
            errors,
            warnings,
            infos,
        }
    }
}

/// The frozen, partitioned result of a parse: three lists of [`Issue`] split
/// by severity. `is_valid` is true iff both `errors` and `warnings` are
/// empty — informational issues don't affect validity.
#[derive(Clone, Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<Issue>,
    pub warnings: Vec<Issue>,
    pub infos: Vec<Issue>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }
}
