//! Program-unit parsing: SUBROUTINE, FUNCTION, PROGRAM.
//!
//! Parameters enter with the provisional type `int`; once the body has
//! been parsed (and with it the declaration lines), the
//! argument-correction pass replaces every provisional type with the
//! declared one and deletes the matching symbol-table entry. What remains
//! in the table are genuine locals, prepended as declarations.
//!
//! Fortran passes everything by reference, so after correction every
//! scalar subroutine argument becomes a pointer: its type gains a
//! leading `*` and every use in the body is rewritten to `*name`. Array
//! arguments are already reference-like slices and stay untouched.

use f77go_ast::{walk_idents_block, Block, Expr, FuncDecl, Param, Stmt};
use f77go_lex::{Elem, Tok};
use f77go_util::Fatal;

use crate::types::parse_type;
use crate::Parser;

impl Parser {
    /// `SUBROUTINE CHBMV ( UPLO , N , K , ... )` and its body.
    pub(crate) fn parse_subroutine(&mut self) -> Result<FuncDecl, Fatal> {
        self.expect(Tok::Subroutine)?;
        self.advance();
        self.expect(Tok::Ident)?;
        let name = self.text().to_string();

        self.advance();
        let params = self.parse_param_decl()?;

        self.advance();
        let body = Block {
            stmts: self.parse_stmt_list()?,
        };

        let mut fd = FuncDecl {
            name,
            params,
            result: None,
            body,
        };

        self.remove_external_functions();
        self.argument_correction(&mut fd);

        // pointer semantics for scalar arguments
        let scalars: Vec<String> = fd
            .params
            .iter()
            .filter(|p| !p.typ.starts_with('['))
            .map(|p| p.name.clone())
            .collect();
        for arg in &scalars {
            walk_idents_block(&mut fd.body, &mut |name: &mut String| {
                if *name == *arg {
                    *name = format!("*{name}");
                }
            });
        }
        for param in &mut fd.params {
            if !param.typ.starts_with('[') {
                param.typ = format!("*{}", param.typ);
            }
        }

        let mut stmts = self.initialize_vars();
        stmts.extend(fd.body.stmts);
        fd.body.stmts = stmts;

        Ok(fd)
    }

    /// `COMPLEX*16 FUNCTION ZDOTC ( N , ZX , ... )`: the tokens before
    /// `FUNCTION` give the result type, and a synthetic `NAME_RES` local
    /// becomes the result, with every use of the function name in the
    /// body renamed to it.
    pub(crate) fn parse_function(&mut self) -> Result<FuncDecl, Fatal> {
        let mut return_type: Vec<Elem> = Vec::new();
        while !matches!(self.tok(), Tok::Function | Tok::NewLine | Tok::Eof) {
            return_type.push(self.cur_cloned());
            self.advance();
        }
        self.expect(Tok::Function)?;

        self.advance();
        self.expect(Tok::Ident)?;
        let name = self.text().to_string();
        let result_name = format!("{name}_RES");

        self.advance();
        let params = self.parse_param_decl()?;

        self.advance();
        let body = Block {
            stmts: self.parse_stmt_list()?,
        };

        let mut fd = FuncDecl {
            name: name.clone(),
            params,
            result: Some(Param {
                name: result_name.clone(),
                typ: parse_type(&return_type).render(),
            }),
            body,
        };

        self.remove_external_functions();
        self.argument_correction(&mut fd);

        let mut stmts = self.initialize_vars();
        stmts.extend(fd.body.stmts);
        fd.body.stmts = stmts;

        // the function name acts as the result variable inside the body
        walk_idents_block(&mut fd.body, &mut |n: &mut String| {
            if *n == name {
                *n = result_name.clone();
            }
        });

        Ok(fd)
    }

    /// `PROGRAM P` is rewritten to `SUBROUTINE MAIN` before parsing.
    pub(crate) fn parse_program(&mut self) -> Result<FuncDecl, Fatal> {
        self.expect(Tok::Program)?;
        self.ns[self.pos] = Elem::new(Tok::Subroutine, "SUBROUTINE", self.cur_pos());
        if let Some(next) = self.ns.get_mut(self.pos + 1) {
            if next.tok == Tok::Ident {
                next.text = "MAIN".to_string();
            }
        }
        self.parse_subroutine()
    }

    /// Parses `( A , B , C )` into provisionally-typed parameters. A unit
    /// without a parameter list yields none.
    pub(crate) fn parse_param_decl(&mut self) -> Result<Vec<Param>, Fatal> {
        if self.tok() != Tok::LParen {
            // Example: SUBROUTINE CLS
            return Ok(Vec::new());
        }
        self.advance();

        let mut fields = Vec::new();
        while self.tok() != Tok::Eof {
            match self.tok() {
                Tok::Comma => {}
                Tok::Ident => fields.push(Param {
                    name: self.text().to_string(),
                    typ: "int".to_string(),
                }),
                Tok::RParen => break,
                _ => {
                    let msg = format!("cannot parse parameter declaration `{}`", self.text());
                    self.add_error(msg, self.cur_pos());
                    return Ok(fields);
                }
            }
            self.advance();
        }

        self.expect(Tok::RParen)?;
        self.advance();
        self.expect(Tok::NewLine)?;
        Ok(fields)
    }

    /// Drops symbol-table entries that name external functions: those
    /// declarations described return types, not locals.
    pub(crate) fn remove_external_functions(&mut self) {
        let Self {
            init_vars,
            externals,
            ..
        } = self;
        init_vars.retain(|v| !externals.iter().any(|f| *f == v.name));
    }

    /// Replaces each parameter's provisional type with the declared one
    /// and removes the matching symbol-table entry.
    pub(crate) fn argument_correction(&mut self, fd: &mut FuncDecl) {
        loop {
            let mut hit = None;
            'search: for (i, param) in fd.params.iter().enumerate() {
                for (j, var) in self.init_vars.iter().enumerate() {
                    if param.name == var.name {
                        hit = Some((i, j));
                        break 'search;
                    }
                }
            }
            let Some((i, j)) = hit else { break };
            fd.params[i].typ = self.init_vars[j].typ.render();
            self.init_vars.remove(j);
        }
    }

    /// Turns the remaining symbol-table entries into declarations:
    /// scalars as `var`, arrays as allocations of their outer dimension.
    pub(crate) fn initialize_vars(&self) -> Vec<Stmt> {
        self.init_vars
            .iter()
            .map(|v| {
                if v.typ.is_array() {
                    Stmt::Define {
                        name: v.name.clone(),
                        value: Expr::call(
                            "make",
                            vec![
                                Expr::ident(v.typ.render()),
                                Expr::IntLit(v.typ.dims[0].to_string()),
                            ],
                        ),
                    }
                } else {
                    Stmt::Var {
                        name: v.name.clone(),
                        typ: v.typ.render(),
                    }
                }
            })
            .collect()
    }
}
