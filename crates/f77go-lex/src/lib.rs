//! f77go-lex - Fixed-form Fortran scanner.
//!
//! Turns a raw byte buffer into a classified, position-tagged element
//! list suitable for straight-line parsing. The scanner is internally
//! multi-pass (see [`scan`]); the parser only ever sees the final,
//! normalized stream.
//!
//! # Example
//!
//! ```
//! use f77go_lex::{scan, Tok};
//!
//! let eles = scan(b"      IF ( X .LE. 0 ) GO TO 99\n");
//! assert!(eles.iter().any(|e| e.tok == Tok::Leq));
//! assert!(eles.iter().any(|e| e.tok == Tok::Goto));
//! ```

mod elem;
mod scan;
mod token;

#[cfg(test)]
mod edge_cases;

pub use elem::Elem;
pub use scan::scan;
pub use token::Tok;
