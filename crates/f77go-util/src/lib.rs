//! f77go-util - Foundation types shared by the translator pipeline.
//!
//! This crate holds the small set of types every phase needs:
//! source positions, the diagnostic collector, and the fatal error type
//! that unwinds a translation when a structural invariant is violated.

pub mod diagnostic;
pub mod error;
mod position;

pub use diagnostic::{Diagnostic, Handler, Level};
pub use error::Fatal;
pub use position::Position;

// Re-export commonly used hash collections
pub use rustc_hash::{FxHashMap, FxHashSet};
