//! f77go-par - Parser and AST transforms.
//!
//! Consumes the scanner's element stream and produces the target-language
//! file, inferring types for implicitly declared variables along the way.
//! All mutable translation state — cursor, diagnostics, symbol table,
//! external-function set, DO-label map, label sets, import set — lives in
//! one per-invocation [`Parser`] value; nothing is shared between
//! translations, and the emitted tree is deterministic for a given input.
//!
//! # Example
//!
//! ```
//! let src = b"      SUBROUTINE F ( N )\n      INTEGER N\n      N = N + 1\n      RETURN\n      END\n";
//! let result = f77go_par::parse(src).expect("translates");
//! assert_eq!(result.file.decls.len(), 1);
//! assert_eq!(result.file.decls[0].name, "F");
//! assert!(result.diags.is_empty());
//! ```

mod expr;
mod format;
mod stmt;
mod types;
mod unit;

#[cfg(test)]
mod edge_cases;

use f77go_ast::{walk_idents_file, File, FuncDecl};
use f77go_lex::{Elem, Tok};
use f77go_util::{Diagnostic, Fatal, FxHashMap, FxHashSet, Handler, Position};
use indexmap::IndexSet;
use thiserror::Error;

pub use types::{parse_type, BaseType, VarType};

/// The result of a successful translation: the emitted file plus every
/// diagnostic collected on the way. Diagnostics do not prevent emission.
#[derive(Debug)]
pub struct Translation {
    /// The translated file, ready for the emitter.
    pub file: File,
    /// Recoverable problems encountered during translation.
    pub diags: Vec<Diagnostic>,
}

/// A translation that hit a structural error. The diagnostics collected
/// before the failure travel with it.
#[derive(Debug, Error)]
#[error("{fatal}")]
pub struct TranslateError {
    /// The structural violation that unwound the translation.
    pub fatal: Fatal,
    /// Diagnostics collected before the failure.
    pub diags: Vec<Diagnostic>,
}

/// Translates a fixed-form Fortran buffer into a target-language file.
///
/// This is the whole pipeline: scan, prescan for unit names, parse each
/// unit, and comment out labels that are declared but never branched to.
pub fn parse(src: &[u8]) -> Result<Translation, TranslateError> {
    let ns = f77go_lex::scan(src);
    let mut p = Parser::new(ns);
    match p.run() {
        Ok(file) => {
            tracing::debug!(units = file.decls.len(), "translation complete");
            Ok(Translation {
                file,
                diags: p.handler.into_diagnostics(),
            })
        }
        Err(fatal) => Err(TranslateError {
            fatal,
            diags: p.handler.into_diagnostics(),
        }),
    }
}

/// A name bound to its inferred type; the per-unit symbol table is a
/// list of these, mutated by declaration parsing and the correction
/// passes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct InitialVar {
    pub(crate) name: String,
    pub(crate) typ: VarType,
}

/// All state for one translation.
pub(crate) struct Parser {
    /// The element stream. Parsing occasionally splices synthetic
    /// elements into it (DO-closing `END` lines, the fake PROGRAM MAIN).
    pub(crate) ns: Vec<Elem>,
    /// Cursor into `ns`.
    pub(crate) pos: usize,
    /// Diagnostic accumulator.
    pub(crate) handler: Handler,

    /// Names of every user-defined unit, collected by the prescan; seeds
    /// the per-unit external set for call-vs-index disambiguation.
    pub(crate) internal: Vec<String>,
    /// External/intrinsic function names for the current unit.
    pub(crate) externals: Vec<String>,
    /// Per-unit symbol table.
    pub(crate) init_vars: Vec<InitialVar>,

    /// Import paths referenced by emitted code, insertion-ordered and
    /// sorted before emission.
    pub(crate) imports: IndexSet<String>,
    /// Open DO labels: label text to number of loops awaiting it.
    pub(crate) end_label_do: FxHashMap<String, usize>,
    /// Every label declared as a statement.
    pub(crate) all_labels: FxHashSet<String>,
    /// Every label named as a branch target.
    pub(crate) found_labels: FxHashSet<String>,
}

impl Parser {
    pub(crate) fn new(ns: Vec<Elem>) -> Self {
        Self {
            ns,
            pos: 0,
            handler: Handler::new(),
            internal: Vec::new(),
            externals: Vec::new(),
            init_vars: Vec::new(),
            imports: IndexSet::new(),
            end_label_do: FxHashMap::default(),
            all_labels: FxHashSet::default(),
            found_labels: FxHashSet::default(),
        }
    }

    /// Runs the full parse and the whole-program label pass.
    pub(crate) fn run(&mut self) -> Result<File, Fatal> {
        let decls = self.parse_units()?;

        let mut imports: Vec<String> = self.imports.iter().cloned().collect();
        imports.sort();
        let mut file = File {
            package: "main".to_string(),
            imports,
            decls,
        };

        // comment out labels that are declared but never branched to
        let unused: FxHashSet<String> = self
            .all_labels
            .difference(&self.found_labels)
            .cloned()
            .collect();
        if !unused.is_empty() {
            walk_idents_file(&mut file, &mut |name: &mut String| {
                if unused.contains(name.as_str()) {
                    *name = format!("//{name}");
                }
            });
        }

        Ok(file)
    }

    /// Collects the names of all PROGRAM/SUBROUTINE/FUNCTION units and
    /// drops `RECURSIVE` qualifiers.
    fn prescan(&mut self) {
        let mut internal = Vec::new();
        let mut i = 0;
        while i < self.ns.len() {
            match self.ns[i].tok {
                Tok::Subroutine | Tok::Program | Tok::Function => {
                    if let Some(next) = self.ns.get(i + 1) {
                        if next.tok == Tok::Ident {
                            internal.push(next.text.clone());
                        }
                    }
                    i += 2;
                    continue;
                }
                Tok::Ident if self.ns[i].text.eq_ignore_ascii_case("RECURSIVE") => {
                    self.ns[i] = Elem::newline();
                }
                _ => {}
            }
            i += 1;
        }
        tracing::debug!(units = internal.len(), "prescan complete");
        self.internal = internal;
    }

    /// Parses every unit in the stream. Top-level statements outside any
    /// unit are wrapped in a synthetic `PROGRAM MAIN`, with a diagnostic.
    fn parse_units(&mut self) -> Result<Vec<FuncDecl>, Fatal> {
        self.prescan();

        let mut decls = Vec::new();
        while self.pos < self.ns.len() {
            self.reset_unit_state();
            match self.tok() {
                Tok::NewLine | Tok::Comment => {
                    self.advance();
                    continue;
                }
                Tok::Eof => break,
                Tok::Subroutine => {
                    decls.push(self.parse_subroutine()?);
                    continue;
                }
                Tok::Program => {
                    decls.push(self.parse_program()?);
                    continue;
                }
                _ => {}
            }

            if self.line_has_function() {
                decls.push(self.parse_function()?);
                continue;
            }

            self.handler.warning("Add fake PROGRAM MAIN", self.cur_pos());
            let at = self.pos;
            self.ns.splice(
                at..at,
                [
                    Elem::newline(),
                    Elem::new(Tok::Program, "PROGRAM", Position::DUMMY),
                    Elem::new(Tok::Ident, "MAIN", Position::DUMMY),
                    Elem::newline(),
                ],
            );
        }
        Ok(decls)
    }

    /// True if the current logical line contains a FUNCTION keyword
    /// (covers type-prefixed forms like `COMPLEX*16 FUNCTION ZDOTC`).
    fn line_has_function(&self) -> bool {
        let mut i = self.pos;
        while i < self.ns.len() && self.ns[i].tok != Tok::NewLine {
            if self.ns[i].tok == Tok::Function {
                return true;
            }
            i += 1;
        }
        false
    }

    /// Resets the per-unit state: symbol table, DO-label map, and the
    /// external set (re-seeded with every unit name from the prescan).
    fn reset_unit_state(&mut self) {
        self.externals = self.internal.clone();
        self.init_vars.clear();
        self.end_label_do.clear();
    }

    // ------------------------------------------------------------------
    // cursor helpers
    // ------------------------------------------------------------------

    /// Token kind at the cursor; `Eof` past the end.
    pub(crate) fn tok(&self) -> Tok {
        self.ns.get(self.pos).map(|e| e.tok).unwrap_or(Tok::Eof)
    }

    /// Element text at the cursor; empty past the end.
    pub(crate) fn text(&self) -> &str {
        self.ns.get(self.pos).map(|e| e.text.as_str()).unwrap_or("")
    }

    /// Clone of the element at the cursor.
    pub(crate) fn cur_cloned(&self) -> Elem {
        self.ns
            .get(self.pos)
            .cloned()
            .unwrap_or_else(|| Elem::new(Tok::Eof, "", Position::DUMMY))
    }

    /// Position of the element at the cursor.
    pub(crate) fn cur_pos(&self) -> Position {
        self.pos_at(self.pos)
    }

    /// Position of the element at `i`, or the dummy position.
    pub(crate) fn pos_at(&self, i: usize) -> Position {
        self.ns.get(i).map(|e| e.pos).unwrap_or(Position::DUMMY)
    }

    pub(crate) fn advance(&mut self) {
        self.pos += 1;
    }

    /// Checks that the cursor sits on `t`; anything else is structural.
    pub(crate) fn expect(&self, t: Tok) -> Result<(), Fatal> {
        let e = self.ns.get(self.pos).ok_or(Fatal::OutOfBounds {
            index: self.pos,
            len: self.ns.len(),
        })?;
        if e.tok != t {
            return Err(Fatal::Expected {
                expected: t.to_string(),
                found: e.tok.to_string(),
                text: e.text.clone(),
                pos: e.pos,
            });
        }
        Ok(())
    }

    /// Local recovery: skip ahead to the next logical line.
    pub(crate) fn skip_to_newline(&mut self) {
        while !matches!(self.tok(), Tok::NewLine | Tok::Eof) {
            self.advance();
        }
    }

    pub(crate) fn add_error(&mut self, msg: impl Into<String>, pos: Position) {
        self.handler.error(msg, pos);
    }
}
