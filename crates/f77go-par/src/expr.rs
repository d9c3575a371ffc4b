//! Expression parsing over a half-open element range.
//!
//! The grammar is classic operator precedence with the Fortran levels,
//! lowest to highest:
//!
//! | Level | Operators |
//! |-------|-----------|
//! | 1 | `.OR.` |
//! | 2 | `.AND.` |
//! | 3 | `.NOT.` (prefix) |
//! | 4 | `.LT.` `.GT.` `.LE.` `.GE.` `.EQ.` `.NE.` |
//! | 5 | `+` `-` (string concatenation arrives as `+` from the scanner) |
//! | 6 | `*` `/` |
//! | 7 | `**` (right-associative, lowered to a `POW` call) |
//! | 8 | unary `+` `-` |
//! | 9 | primary |
//!
//! A primary `NAME(args)` is indexing when `NAME` is a known array
//! variable and a call otherwise; indexing subtracts 1 at every subscript
//! site to bridge Fortran's 1-based world.

use f77go_ast::{BinOp, Expr, UnOp};
use f77go_lex::Tok;
use f77go_util::Fatal;

use crate::Parser;

impl Parser {
    /// Parses the element range `[start, end)` as one expression.
    ///
    /// Recoverable trouble (an unexpected token with an obvious local
    /// reading) is reported through the handler and parsing continues;
    /// structurally broken input (unbalanced parentheses) is fatal.
    pub(crate) fn parse_expr(&mut self, start: usize, end: usize) -> Result<Expr, Fatal> {
        let end = end.min(self.ns.len());
        if start >= end {
            self.add_error("empty expression", self.pos_at(start));
            return Ok(Expr::Ident(String::new()));
        }
        let mut c = start;
        let expr = self.expr_or(&mut c, end)?;
        if c < end {
            self.add_error(
                format!("unexpected `{}` in expression", self.ns[c].text),
                self.ns[c].pos,
            );
        }
        Ok(expr)
    }

    fn expr_or(&mut self, c: &mut usize, end: usize) -> Result<Expr, Fatal> {
        let mut lhs = self.expr_and(c, end)?;
        while *c < end && self.ns[*c].tok == Tok::LOr {
            *c += 1;
            let rhs = self.expr_and(c, end)?;
            lhs = binary(BinOp::Or, lhs, rhs);
        }
        Ok(lhs)
    }

    fn expr_and(&mut self, c: &mut usize, end: usize) -> Result<Expr, Fatal> {
        let mut lhs = self.expr_not(c, end)?;
        while *c < end && self.ns[*c].tok == Tok::LAnd {
            *c += 1;
            let rhs = self.expr_not(c, end)?;
            lhs = binary(BinOp::And, lhs, rhs);
        }
        Ok(lhs)
    }

    fn expr_not(&mut self, c: &mut usize, end: usize) -> Result<Expr, Fatal> {
        if *c < end && self.ns[*c].tok == Tok::Not {
            *c += 1;
            let inner = self.expr_not(c, end)?;
            return Ok(Expr::Unary {
                op: UnOp::Not,
                expr: Box::new(inner),
            });
        }
        self.expr_rel(c, end)
    }

    fn expr_rel(&mut self, c: &mut usize, end: usize) -> Result<Expr, Fatal> {
        let mut lhs = self.expr_add(c, end)?;
        while *c < end {
            let op = match self.ns[*c].tok {
                Tok::Lss => BinOp::Lss,
                Tok::Gtr => BinOp::Gtr,
                Tok::Leq => BinOp::Leq,
                Tok::Geq => BinOp::Geq,
                Tok::Eql => BinOp::Eql,
                Tok::Neq => BinOp::Neq,
                _ => break,
            };
            *c += 1;
            let rhs = self.expr_add(c, end)?;
            lhs = binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn expr_add(&mut self, c: &mut usize, end: usize) -> Result<Expr, Fatal> {
        let mut lhs = self.expr_mul(c, end)?;
        while *c < end {
            let op = match self.ns[*c].tok {
                Tok::Add => BinOp::Add,
                Tok::Sub => BinOp::Sub,
                _ => break,
            };
            *c += 1;
            let rhs = self.expr_mul(c, end)?;
            lhs = binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn expr_mul(&mut self, c: &mut usize, end: usize) -> Result<Expr, Fatal> {
        let mut lhs = self.expr_pow(c, end)?;
        while *c < end {
            let op = match self.ns[*c].tok {
                Tok::Mul => BinOp::Mul,
                Tok::Quo => BinOp::Div,
                _ => break,
            };
            *c += 1;
            let rhs = self.expr_pow(c, end)?;
            lhs = binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    /// Exponentiation is right-associative and has no Go operator; it
    /// lowers to the runtime's `POW` helper.
    fn expr_pow(&mut self, c: &mut usize, end: usize) -> Result<Expr, Fatal> {
        let base = self.expr_unary(c, end)?;
        if *c < end && self.ns[*c].tok == Tok::DoubleStar {
            *c += 1;
            let exponent = self.expr_pow(c, end)?;
            return Ok(Expr::call("POW", vec![base, exponent]));
        }
        Ok(base)
    }

    fn expr_unary(&mut self, c: &mut usize, end: usize) -> Result<Expr, Fatal> {
        if *c < end {
            let op = match self.ns[*c].tok {
                Tok::Add => Some(UnOp::Plus),
                Tok::Sub => Some(UnOp::Minus),
                _ => None,
            };
            if let Some(op) = op {
                *c += 1;
                let inner = self.expr_unary(c, end)?;
                return Ok(Expr::Unary {
                    op,
                    expr: Box::new(inner),
                });
            }
        }
        self.expr_primary(c, end)
    }

    fn expr_primary(&mut self, c: &mut usize, end: usize) -> Result<Expr, Fatal> {
        if *c >= end {
            self.add_error("expression ends unexpectedly", self.pos_at(end));
            return Ok(Expr::Ident(String::new()));
        }
        let elem = self.ns[*c].clone();
        match elem.tok {
            Tok::Int => {
                *c += 1;
                Ok(Expr::IntLit(elem.text))
            }
            Tok::Float => {
                *c += 1;
                Ok(Expr::FloatLit(elem.text))
            }
            Tok::Str => {
                *c += 1;
                Ok(Expr::StrLit(strip_quotes(&elem.text)))
            }
            Tok::LParen => {
                *c += 1;
                let first = self.expr_or(c, end)?;
                if *c < end && self.ns[*c].tok == Tok::Comma {
                    // `( re , im )` — a complex constant
                    *c += 1;
                    let second = self.expr_or(c, end)?;
                    self.close_paren(c, end, elem.pos)?;
                    return Ok(Expr::call("complex", vec![first, second]));
                }
                self.close_paren(c, end, elem.pos)?;
                Ok(Expr::Paren(Box::new(first)))
            }
            Tok::Ident => {
                *c += 1;
                if *c < end && self.ns[*c].tok == Tok::LParen {
                    let open = self.ns[*c].pos;
                    *c += 1;
                    let args = self.expr_args(c, end, open)?;
                    if self.is_known_array(&elem.text) {
                        // 1-based Fortran subscripts become 0-based chained
                        // indexing, one level per subscript.
                        let mut out = Expr::Ident(elem.text);
                        for arg in args {
                            out = Expr::Index {
                                arr: Box::new(out),
                                index: Box::new(binary(
                                    BinOp::Sub,
                                    arg,
                                    Expr::IntLit("1".into()),
                                )),
                            };
                        }
                        return Ok(out);
                    }
                    return Ok(Expr::Call {
                        fun: Box::new(Expr::Ident(elem.text)),
                        args,
                    });
                }
                Ok(Expr::Ident(elem.text))
            }
            _ => {
                self.add_error(
                    format!("cannot parse expression at `{}`", elem.text),
                    elem.pos,
                );
                *c += 1;
                Ok(Expr::Ident(elem.text))
            }
        }
    }

    /// Parses a comma-separated argument list, consuming the closing
    /// parenthesis. `FOO()` yields an empty list.
    fn expr_args(
        &mut self,
        c: &mut usize,
        end: usize,
        open: f77go_util::Position,
    ) -> Result<Vec<Expr>, Fatal> {
        let mut args = Vec::new();
        if *c < end && self.ns[*c].tok == Tok::RParen {
            *c += 1;
            return Ok(args);
        }
        loop {
            args.push(self.expr_or(c, end)?);
            if *c >= end {
                return Err(Fatal::UnbalancedParens { pos: open });
            }
            match self.ns[*c].tok {
                Tok::Comma => *c += 1,
                Tok::RParen => {
                    *c += 1;
                    return Ok(args);
                }
                _ => {
                    self.add_error(
                        format!("unexpected `{}` in argument list", self.ns[*c].text),
                        self.ns[*c].pos,
                    );
                    *c += 1;
                }
            }
        }
    }

    fn close_paren(
        &mut self,
        c: &mut usize,
        end: usize,
        open: f77go_util::Position,
    ) -> Result<(), Fatal> {
        if *c >= end || self.ns[*c].tok != Tok::RParen {
            return Err(Fatal::UnbalancedParens { pos: open });
        }
        *c += 1;
        Ok(())
    }

    fn is_known_array(&self, name: &str) -> bool {
        self.init_vars
            .iter()
            .any(|v| v.name == name && v.typ.is_array())
    }
}

fn binary(op: BinOp, lhs: Expr, rhs: Expr) -> Expr {
    Expr::Binary {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    }
}

fn strip_quotes(text: &str) -> String {
    let bytes = text.as_bytes();
    if bytes.len() >= 2 {
        let first = bytes[0];
        if (first == b'\'' || first == b'"') && bytes[bytes.len() - 1] == first {
            return text[1..text.len() - 1].to_string();
        }
    }
    text.to_string()
}
