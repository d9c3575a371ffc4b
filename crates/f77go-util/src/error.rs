//! Fatal translation errors.
//!
//! A [`Fatal`] means a structural invariant of the token stream was
//! violated: either the scanner produced something the parser cannot be
//! expected to recover from, or the source uses syntax outside the
//! supported fixed-form subset. Unlike diagnostics, a fatal error unwinds
//! the whole invocation; the accumulated diagnostic list travels with it.

use thiserror::Error;

use crate::Position;

/// A structural error that aborts the translation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Fatal {
    /// An `expect(tok)` check failed: the stream does not have the shape
    /// the grammar requires at this point.
    #[error("expected {expected}, found {found} `{text}` at {pos}")]
    Expected {
        /// Token kind the grammar required.
        expected: String,
        /// Token kind actually present.
        found: String,
        /// Source text of the offending element.
        text: String,
        /// Where it happened.
        pos: Position,
    },

    /// The parser position moved outside the element stream.
    #[error("element position {index} outside stream of length {len}")]
    OutOfBounds {
        /// Offending index.
        index: usize,
        /// Stream length.
        len: usize,
    },

    /// A counted parenthesis scan ran off the end of the stream without
    /// finding the matching closer.
    #[error("unbalanced parentheses in expression starting at {pos}")]
    UnbalancedParens {
        /// Position of the opening parenthesis.
        pos: Position,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_carries_position() {
        let err = Fatal::Expected {
            expected: "NEW_LINE".into(),
            found: "IDENT".into(),
            text: "FOO".into(),
            pos: Position::new(4, 7),
        };
        assert_eq!(
            err.to_string(),
            "expected NEW_LINE, found IDENT `FOO` at 4:7"
        );
    }

    #[test]
    fn display_out_of_bounds() {
        let err = Fatal::OutOfBounds { index: 9, len: 4 };
        assert_eq!(
            err.to_string(),
            "element position 9 outside stream of length 4"
        );
    }
}
