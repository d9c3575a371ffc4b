//! Diagnostic collection.
//!
//! The translator never stops at the first problem: recoverable issues
//! (an unknown construct, a DATA count mismatch, an unresolvable FORMAT
//! label) are recorded here and translation continues with a local
//! fallback. The driver prints the collected list on stderr and derives
//! its exit code from it.

use std::fmt;

use crate::Position;

/// Diagnostic severity.
///
/// # Examples
///
/// ```
/// use f77go_util::Level;
///
/// assert_eq!(format!("{}", Level::Error), "error");
/// assert_eq!(format!("{}", Level::Warning), "warning");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    /// The construct could not be translated faithfully.
    Error,
    /// The construct was translated, but something had to be fabricated.
    Warning,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Error => write!(f, "error"),
            Level::Warning => write!(f, "warning"),
        }
    }
}

/// A single-line diagnostic message with an optional source position.
///
/// # Examples
///
/// ```
/// use f77go_util::{Diagnostic, Position};
///
/// let diag = Diagnostic::error("cannot parse value in DATA", Position::new(3, 12));
/// assert_eq!(format!("{}", diag), "error: cannot parse value in DATA at 3:12");
///
/// let diag = Diagnostic::warning("Add fake PROGRAM MAIN", Position::DUMMY);
/// assert_eq!(format!("{}", diag), "warning: Add fake PROGRAM MAIN");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    /// Severity of the diagnostic.
    pub level: Level,
    /// Human-readable message, one line.
    pub message: String,
    /// Source position, or [`Position::DUMMY`] when none applies.
    pub pos: Position,
}

impl Diagnostic {
    /// Creates an error-level diagnostic.
    pub fn error(message: impl Into<String>, pos: Position) -> Self {
        Self {
            level: Level::Error,
            message: message.into(),
            pos,
        }
    }

    /// Creates a warning-level diagnostic.
    pub fn warning(message: impl Into<String>, pos: Position) -> Self {
        Self {
            level: Level::Warning,
            message: message.into(),
            pos,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.pos.is_dummy() {
            write!(f, "{}: {}", self.level, self.message)
        } else {
            write!(f, "{}: {} at {}", self.level, self.message, self.pos)
        }
    }
}

/// Accumulator for diagnostics produced during one translation.
///
/// One handler lives for the duration of one invocation; it is part of the
/// per-invocation parser state and is never shared between translations.
///
/// # Examples
///
/// ```
/// use f77go_util::{Handler, Position};
///
/// let mut handler = Handler::new();
/// handler.error("unknown construct", Position::new(1, 7));
/// assert!(handler.has_errors());
/// assert_eq!(handler.error_count(), 1);
/// ```
#[derive(Debug, Default)]
pub struct Handler {
    diags: Vec<Diagnostic>,
}

impl Handler {
    /// Creates an empty handler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an error-level diagnostic.
    pub fn error(&mut self, message: impl Into<String>, pos: Position) {
        self.diags.push(Diagnostic::error(message, pos));
    }

    /// Records a warning-level diagnostic.
    pub fn warning(&mut self, message: impl Into<String>, pos: Position) {
        self.diags.push(Diagnostic::warning(message, pos));
    }

    /// Returns true if any error-level diagnostic was recorded.
    pub fn has_errors(&self) -> bool {
        self.diags.iter().any(|d| d.level == Level::Error)
    }

    /// Number of error-level diagnostics recorded so far.
    pub fn error_count(&self) -> usize {
        self.diags.iter().filter(|d| d.level == Level::Error).count()
    }

    /// Returns true if no diagnostic of any level was recorded.
    pub fn is_empty(&self) -> bool {
        self.diags.is_empty()
    }

    /// All diagnostics recorded so far, in emission order.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diags
    }

    /// Consumes the handler, yielding the collected diagnostics.
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diags
    }
}
