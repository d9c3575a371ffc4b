//! Statement parsing.
//!
//! One logical line is one statement, dispatched on its leading token.
//! A few statements reshape the element stream while parsing: a labeled
//! line that closes open DO loops splices `END` lines in front of itself,
//! and a `WRITE` erases the `FORMAT` line it consumed so the label pass
//! never sees it.

use f77go_ast::{Block, Else, Expr, Stmt, SwitchCase, UnOp};
use f77go_lex::{Elem, Tok};
use f77go_util::Fatal;

use crate::types::parse_type;
use crate::{InitialVar, Parser};

impl Parser {
    /// Parses statements until `END` (consumed), `ELSE` (left in place),
    /// or the end of the stream.
    pub(crate) fn parse_stmt_list(&mut self) -> Result<Vec<Stmt>, Fatal> {
        let mut stmts = Vec::new();
        while self.pos < self.ns.len() {
            match self.tok() {
                Tok::Comment | Tok::NewLine => {
                    self.advance();
                    continue;
                }
                Tok::End => {
                    self.advance();
                    break;
                }
                Tok::Else => break,
                Tok::Eof => break,
                _ => {}
            }
            stmts.extend(self.parse_stmt()?);
        }
        Ok(stmts)
    }

    /// Parses one statement. May return several target statements (DATA),
    /// or none (declarations, spliced labels).
    pub(crate) fn parse_stmt(&mut self) -> Result<Vec<Stmt>, Fatal> {
        match self.tok() {
            t if t.is_type_keyword() => {
                self.parse_decl()?;
                Ok(Vec::new())
            }

            Tok::Return => {
                self.advance();
                self.expect(Tok::NewLine)?;
                Ok(vec![Stmt::Return])
            }

            Tok::Stop => {
                self.advance();
                self.expect(Tok::NewLine)?;
                Ok(vec![Stmt::Return])
            }

            Tok::External => {
                self.parse_external()?;
                Ok(Vec::new())
            }

            Tok::Intrinsic => {
                self.parse_intrinsic()?;
                Ok(Vec::new())
            }

            Tok::NewLine => {
                self.advance();
                Ok(Vec::new())
            }

            Tok::If => Ok(vec![self.parse_if()?]),

            Tok::Do => Ok(vec![self.parse_do()?]),

            Tok::Call => self.parse_call(),

            Tok::Data => self.parse_data(),

            Tok::Write => self.parse_write(),

            Tok::Goto => {
                let stmts = self.parse_goto()?;
                self.expect(Tok::NewLine)?;
                Ok(stmts)
            }

            Tok::Implicit => {
                // No automatic typing is performed; undeclared names
                // default to int.
                self.skip_to_newline();
                Ok(Vec::new())
            }

            Tok::Format => {
                // A FORMAT the WRITE handler did not consume.
                self.add_error("FORMAT without a matching WRITE", self.cur_pos());
                self.skip_to_newline();
                Ok(Vec::new())
            }

            Tok::Int => self.parse_label_line(),

            Tok::Eof => Ok(Vec::new()),

            _ => self.parse_assign_or_expr(),
        }
    }

    /// Declaration line: `INTEGER INCX , INCY` / `COMPLEX*16 A(LDA,*)` /
    /// `CHARACTER*32 SRNAME`. Feeds the symbol table, emits nothing.
    fn parse_decl(&mut self) -> Result<(), Fatal> {
        let mut base: Vec<Elem> = Vec::new();
        while self.tok() != Tok::Ident {
            if matches!(self.tok(), Tok::NewLine | Tok::Eof) {
                self.add_error("cannot parse declaration: no name", self.cur_pos());
                return Ok(());
            }
            base.push(self.cur_cloned());
            self.advance();
        }

        while !matches!(self.tok(), Tok::NewLine | Tok::Eof) {
            self.expect(Tok::Ident)?;
            let name = self.text().to_string();
            self.advance();

            let mut addition: Vec<Elem> = Vec::new();
            while !matches!(self.tok(), Tok::NewLine | Tok::Eof | Tok::Comma) {
                if self.tok() == Tok::LParen {
                    let mut counter = 0usize;
                    loop {
                        match self.tok() {
                            Tok::LParen => counter += 1,
                            Tok::RParen => counter -= 1,
                            Tok::NewLine | Tok::Eof => {
                                self.add_error(
                                    "cannot parse declared type: unexpected end of line",
                                    self.cur_pos(),
                                );
                                return Ok(());
                            }
                            _ => {}
                        }
                        if counter == 0 {
                            break;
                        }
                        addition.push(self.cur_cloned());
                        self.advance();
                    }
                }
                addition.push(self.cur_cloned());
                self.advance();
            }

            let mut full = base.clone();
            full.extend(addition);
            self.init_vars.push(InitialVar {
                name,
                typ: parse_type(&full),
            });

            if self.tok() == Tok::Comma {
                self.advance();
            }
        }
        Ok(())
    }

    /// `EXTERNAL LSAME , XERBLA` — the names go to the external set so
    /// declarations of their return types are dropped later.
    fn parse_external(&mut self) -> Result<(), Fatal> {
        self.expect(Tok::External)?;
        self.advance();
        while !matches!(self.tok(), Tok::NewLine | Tok::Eof) {
            match self.tok() {
                Tok::Ident => {
                    let name = self.text().to_string();
                    self.externals.push(name);
                }
                Tok::Comma => {}
                _ => {
                    let msg = format!("cannot parse EXTERNAL `{}`", self.text());
                    self.add_error(msg, self.cur_pos());
                }
            }
            self.advance();
        }
        Ok(())
    }

    /// `INTRINSIC CONJG , MAX` — same treatment as EXTERNAL; the support
    /// library resolves the names.
    fn parse_intrinsic(&mut self) -> Result<(), Fatal> {
        self.expect(Tok::Intrinsic)?;
        self.advance();
        while !matches!(self.tok(), Tok::NewLine | Tok::Eof) {
            match self.tok() {
                Tok::Ident => {
                    let name = self.text().to_string();
                    self.externals.push(name);
                }
                Tok::Comma => {}
                // type-conversion intrinsics: INT, REAL, ...
                t if t.is_type_keyword() => {}
                _ => {
                    let msg = format!("cannot parse name in INTRINSIC `{}`", self.text());
                    self.add_error(msg, self.cur_pos());
                }
            }
            self.advance();
        }
        Ok(())
    }

    /// `IF(cond) stmt` or the block form with THEN / ELSE IF / ELSE / END.
    fn parse_if(&mut self) -> Result<Stmt, Fatal> {
        self.advance();
        self.expect(Tok::LParen)?;
        let open = self.cur_pos();
        self.advance();

        let start = self.pos;
        let mut counter = 1usize;
        while self.tok() != Tok::Eof {
            match self.tok() {
                Tok::LParen => counter += 1,
                Tok::RParen => {
                    counter -= 1;
                    if counter == 0 {
                        break;
                    }
                }
                _ => {}
            }
            self.advance();
        }
        if self.tok() == Tok::Eof {
            return Err(Fatal::UnbalancedParens { pos: open });
        }
        let cond = self.parse_expr(start, self.pos)?;
        self.expect(Tok::RParen)?;
        self.advance();

        if self.tok() != Tok::Then {
            // single-statement IF
            let stmts = self.parse_stmt()?;
            return Ok(Stmt::If {
                cond,
                body: Block { stmts },
                els: None,
            });
        }
        self.advance();

        let body = Block {
            stmts: self.parse_stmt_list()?,
        };

        let els = if self.tok() == Tok::Else {
            self.advance();
            if self.tok() == Tok::If {
                Some(Box::new(Else::If(self.parse_if()?)))
            } else {
                Some(Box::new(Else::Block(Block {
                    stmts: self.parse_stmt_list()?,
                })))
            }
        } else {
            None
        };

        Ok(Stmt::If { cond, body, els })
    }

    /// `DO [label][,] var = init, limit [, step]` and `DO WHILE(cond)`.
    fn parse_do(&mut self) -> Result<Stmt, Fatal> {
        self.expect(Tok::Do)?;
        self.advance();

        if self.tok() == Tok::While {
            return self.parse_do_while();
        }

        // `DO 40 ...`: the labeled CONTINUE closes this loop later
        if self.tok() == Tok::Int {
            let label = self.text().to_string();
            *self.end_label_do.entry(label).or_insert(0) += 1;
            self.advance();
        }
        // `DO 40, J = 1, N`
        if self.tok() == Tok::Comma {
            self.advance();
        }

        self.expect(Tok::Ident)?;
        let name = self.text().to_string();
        self.advance();
        self.expect(Tok::Assign)?;
        self.advance();

        // init expression runs to the first top-level comma
        let start = self.pos;
        let mut counter = 0i32;
        while self.pos < self.ns.len() {
            match self.tok() {
                Tok::LParen => counter += 1,
                Tok::RParen => counter -= 1,
                Tok::Comma if counter == 0 => break,
                Tok::NewLine | Tok::Eof => break,
                _ => {}
            }
            self.advance();
        }
        let init = Stmt::Assign {
            lhs: Expr::ident(name.clone()),
            rhs: self.parse_expr(start, self.pos)?,
        };

        self.expect(Tok::Comma)?;
        self.advance();

        // limit expression: next top-level comma or end of line
        let start = self.pos;
        let mut counter = 0i32;
        while self.pos < self.ns.len() {
            match self.tok() {
                Tok::LParen => counter += 1,
                Tok::RParen => counter -= 1,
                Tok::Comma if counter == 0 => break,
                Tok::NewLine | Tok::Eof => break,
                _ => {}
            }
            self.advance();
        }
        let cond = Expr::Binary {
            op: f77go_ast::BinOp::Leq,
            lhs: Box::new(Expr::ident(name.clone())),
            rhs: Box::new(self.parse_expr(start, self.pos)?),
        };

        let post = if self.tok() == Tok::NewLine {
            Stmt::Inc { name }
        } else {
            self.expect(Tok::Comma)?;
            self.advance();
            let start = self.pos;
            while !matches!(self.tok(), Tok::NewLine | Tok::Eof) {
                self.advance();
            }
            Stmt::AddAssign {
                name,
                value: self.parse_expr(start, self.pos)?,
            }
        };

        self.expect(Tok::NewLine)?;
        let body = Block {
            stmts: self.parse_stmt_list()?,
        };

        Ok(Stmt::For {
            init: Some(Box::new(init)),
            cond: Some(cond),
            post: Some(Box::new(post)),
            body,
        })
    }

    /// `DO WHILE(cond)` — a condition-only loop.
    fn parse_do_while(&mut self) -> Result<Stmt, Fatal> {
        self.expect(Tok::While)?;
        self.advance();
        let start = self.pos;
        while !matches!(self.tok(), Tok::NewLine | Tok::Eof) {
            self.advance();
        }
        let cond = match self.parse_expr(start, self.pos)? {
            // the condition arrives wrapped in the WHILE parentheses
            Expr::Paren(inner) => *inner,
            other => other,
        };
        self.expect(Tok::NewLine)?;
        self.advance();
        let body = Block {
            stmts: self.parse_stmt_list()?,
        };
        Ok(Stmt::For {
            init: None,
            cond: Some(cond),
            post: None,
            body,
        })
    }

    /// `CALL XERBLA ( 'CGEMM ' , INFO )` — the callee expects pointers,
    /// so scalar identifier arguments become address-of expressions and
    /// string literals become byte slices.
    fn parse_call(&mut self) -> Result<Vec<Stmt>, Fatal> {
        self.expect(Tok::Call)?;
        self.advance();
        let start = self.pos;
        while !matches!(self.tok(), Tok::NewLine | Tok::Eof) {
            self.advance();
        }
        let callee = self.parse_expr(start, self.pos)?;
        let call = match callee {
            Expr::Call { fun, args } => {
                let args = args
                    .into_iter()
                    .map(|arg| match arg {
                        Expr::Ident(name) => Expr::Unary {
                            op: UnOp::Addr,
                            expr: Box::new(Expr::Ident(name)),
                        },
                        Expr::StrLit(text) => Expr::call("[]byte", vec![Expr::StrLit(text)]),
                        other => other,
                    })
                    .collect();
                Expr::Call { fun, args }
            }
            // `CALL CLS` — a subroutine without arguments
            Expr::Ident(name) => Expr::call(name, Vec::new()),
            other => {
                let msg = format!("cannot translate CALL of {other:?}");
                self.add_error(msg, self.pos_at(start));
                self.skip_to_newline();
                return Ok(Vec::new());
            }
        };
        self.expect(Tok::NewLine)?;
        Ok(vec![Stmt::Expr(call)])
    }

    /// `DATA A , B / 1.0 , 2.0 /` — one assignment per name-value pair.
    fn parse_data(&mut self) -> Result<Vec<Stmt>, Fatal> {
        self.expect(Tok::Data)?;
        let data_pos = self.cur_pos();
        self.advance();

        let mut names: Vec<String> = Vec::new();
        loop {
            match self.tok() {
                Tok::Ident => names.push(self.text().to_string()),
                Tok::Comma => {}
                Tok::Quo => break,
                Tok::NewLine | Tok::Eof => {
                    self.add_error("cannot parse DATA: missing value group", data_pos);
                    return Ok(Vec::new());
                }
                _ => {
                    let msg = format!("cannot parse name in DATA `{}`", self.text());
                    self.add_error(msg, self.cur_pos());
                }
            }
            self.advance();
        }
        self.expect(Tok::Quo)?;
        self.advance();

        // values may carry a sign: `DATA X / -1.0 /`
        let mut values: Vec<(usize, usize)> = Vec::new();
        let mut sign_start: Option<usize> = None;
        loop {
            match self.tok() {
                Tok::Int | Tok::Float | Tok::Str | Tok::Ident => {
                    let st = sign_start.take().unwrap_or(self.pos);
                    values.push((st, self.pos + 1));
                }
                Tok::Sub | Tok::Add => {
                    sign_start.get_or_insert(self.pos);
                }
                Tok::Comma => sign_start = None,
                Tok::Quo => break,
                Tok::NewLine | Tok::Eof => {
                    self.add_error("cannot parse DATA: unterminated value group", data_pos);
                    return Ok(Vec::new());
                }
                _ => {
                    let msg = format!("cannot parse value in DATA `{}`", self.text());
                    self.add_error(msg, self.cur_pos());
                }
            }
            self.advance();
        }
        self.expect(Tok::Quo)?;
        self.advance();

        if names.len() != values.len() {
            self.add_error(
                format!(
                    "cannot translate DATA: {} names but {} values",
                    names.len(),
                    values.len()
                ),
                data_pos,
            );
            return Ok(Vec::new());
        }

        let mut stmts = Vec::new();
        for (name, (st, en)) in names.into_iter().zip(values) {
            stmts.push(Stmt::Assign {
                lhs: Expr::ident(name),
                rhs: self.parse_expr(st, en)?,
            });
        }
        Ok(stmts)
    }

    /// `GOTO 30` or the computed form `GO TO ( 40, 80 ) IEXC`, which
    /// becomes a switch over the 1-based index expression.
    fn parse_goto(&mut self) -> Result<Vec<Stmt>, Fatal> {
        self.expect(Tok::Goto)?;
        self.advance();

        if self.tok() != Tok::LParen {
            let label = format!("Label{}", self.text());
            self.found_labels.insert(label.clone());
            self.advance();
            return Ok(vec![Stmt::Goto { label }]);
        }

        // computed GOTO: collect the label list
        let mut label_names: Vec<String> = Vec::new();
        loop {
            match self.tok() {
                Tok::LParen | Tok::Comma => {}
                Tok::RParen => break,
                Tok::NewLine | Tok::Eof => {
                    self.add_error("cannot parse computed GOTO label list", self.cur_pos());
                    return Ok(Vec::new());
                }
                _ => {
                    let label = format!("Label{}", self.text());
                    self.found_labels.insert(label.clone());
                    label_names.push(label);
                }
            }
            self.advance();
        }
        if label_names.is_empty() {
            self.add_error("computed GOTO with no labels", self.cur_pos());
            self.skip_to_newline();
            return Ok(Vec::new());
        }

        self.advance();
        let start = self.pos;
        while !matches!(self.tok(), Tok::NewLine | Tok::Eof) {
            self.advance();
        }
        let tag = self.parse_expr(start, self.pos)?;

        let cases = label_names
            .into_iter()
            .enumerate()
            .map(|(i, label)| SwitchCase {
                value: Expr::IntLit((i + 1).to_string()),
                body: Block {
                    stmts: vec![Stmt::Goto { label }],
                },
            })
            .collect();

        Ok(vec![Stmt::Switch { tag, cases }])
    }

    /// `WRITE(*, FMT=<label>) args` or `WRITE(*,*) args`, lowered to a
    /// `fmt.Printf` call. Other unit/format combinations are diagnosed
    /// and skipped.
    fn parse_write(&mut self) -> Result<Vec<Stmt>, Fatal> {
        self.expect(Tok::Write)?;
        let write_pos = self.cur_pos();
        self.advance();
        self.expect(Tok::LParen)?;
        self.advance();
        if self.tok() != Tok::Mul {
            self.add_error("unsupported WRITE unit (only `*` is translated)", write_pos);
            self.skip_to_newline();
            return Ok(Vec::new());
        }
        self.advance();
        self.expect(Tok::Comma)?;
        self.advance();

        let format;
        if self.tok() == Tok::Ident && self.text().eq_ignore_ascii_case("FMT") {
            self.advance();
            self.expect(Tok::Assign)?;
            self.advance();
            self.expect(Tok::Int)?;
            let label = self.text().to_string();
            let line = self.take_line_by_label(&label);
            // skip the leading `<label> FORMAT` elements
            let body: &[Elem] = if line.len() > 2 { &line[2..] } else { &[] };
            format = self.convert_format(body);
            self.advance();
            self.expect(Tok::RParen)?;
            self.advance();
        } else if self.tok() == Tok::Mul {
            self.advance();
            self.expect(Tok::RParen)?;
            self.advance();
            format = String::new(); // synthesized below, one %v per arg
        } else {
            self.add_error("unsupported WRITE format specifier", write_pos);
            self.skip_to_newline();
            return Ok(Vec::new());
        }

        let args = self.scan_write_exprs()?;
        self.expect(Tok::NewLine)?;

        let format = if format.is_empty() {
            let mut f = String::new();
            for _ in &args {
                f.push_str(" %v");
            }
            f.push('\n');
            f
        } else {
            format
        };

        self.imports.insert("fmt".to_string());
        let mut call_args = vec![Expr::StrLit(format)];
        call_args.extend(args);
        Ok(vec![Stmt::Expr(Expr::Call {
            fun: Box::new(Expr::Selector {
                recv: Box::new(Expr::ident("fmt")),
                field: "Printf".to_string(),
            }),
            args: call_args,
        })])
    }

    /// Splits the remaining WRITE arguments on top-level commas.
    fn scan_write_exprs(&mut self) -> Result<Vec<Expr>, Fatal> {
        let mut exprs = Vec::new();
        let mut start = self.pos;
        let mut depth = 0i32;
        loop {
            match self.tok() {
                Tok::LParen => depth += 1,
                Tok::RParen => depth -= 1,
                Tok::Comma if depth == 0 => {
                    exprs.push(self.parse_expr(start, self.pos)?);
                    start = self.pos + 1;
                }
                Tok::NewLine | Tok::Eof => {
                    if self.pos > start {
                        exprs.push(self.parse_expr(start, self.pos)?);
                    }
                    break;
                }
                _ => {}
            }
            self.advance();
        }
        Ok(exprs)
    }

    /// Finds the labeled FORMAT line ahead of the cursor, returns a copy
    /// of its elements, and erases it from the stream so it is not
    /// re-parsed as a labeled statement.
    fn take_line_by_label(&mut self, label: &str) -> Vec<Elem> {
        let mut st = self.pos;
        let mut found = false;
        while st < self.ns.len() {
            if st > 0 && self.ns[st - 1].tok == Tok::NewLine && self.ns[st].text == label {
                found = true;
                break;
            }
            st += 1;
        }
        if !found {
            self.add_error(format!("cannot find FORMAT label {label}"), self.cur_pos());
            return Vec::new();
        }

        let mut line = Vec::new();
        let mut i = st;
        while i < self.ns.len() && self.ns[i].tok != Tok::NewLine {
            line.push(self.ns[i].clone());
            self.ns[i] = Elem::newline();
            i += 1;
        }
        line
    }

    /// A line starting with an integer label. Closes any DO loops that
    /// end here by splicing `END` lines in front, then emits a labeled
    /// empty statement.
    fn parse_label_line(&mut self) -> Result<Vec<Stmt>, Fatal> {
        let label = self.text().to_string();

        let open = self.end_label_do.get(&label).copied().unwrap_or(0);
        if open > 0 {
            let mut add: Vec<Elem> = vec![Elem::newline(), Elem::newline()];
            for _ in 0..open {
                add.push(Elem::newline());
                add.push(Elem::new(Tok::End, "END", f77go_util::Position::DUMMY));
                add.push(Elem::newline());
            }
            add.push(Elem::newline());
            let at = self.pos - 1;
            self.ns.splice(at..at, add);
            self.end_label_do.insert(label, 0);
            return Ok(Vec::new());
        }

        if self.ns.get(self.pos + 1).map(|e| e.tok) == Some(Tok::Continue) {
            let stmt = self.add_label(&label);
            self.advance();
            self.ns[self.pos] = Elem::newline();
            return Ok(vec![stmt]);
        }

        let stmt = self.add_label(&label);
        self.advance();
        Ok(vec![stmt])
    }

    /// Declares a label and returns the labeled empty statement for it.
    fn add_label(&mut self, label: &str) -> Stmt {
        let name = format!("Label{label}");
        self.all_labels.insert(name.clone());
        Stmt::Labeled {
            label: name,
            stmt: Box::new(Stmt::Empty),
        }
    }

    /// Fallback: an assignment if a top-level `=` follows the leading
    /// identifier (and its optional subscript), otherwise an expression
    /// statement.
    fn parse_assign_or_expr(&mut self) -> Result<Vec<Stmt>, Fatal> {
        let start = self.pos;
        while !matches!(self.tok(), Tok::NewLine | Tok::Eof) {
            self.advance();
        }
        let line_end = self.pos;

        let mut split = None;
        if self.ns[start].tok == Tok::Ident {
            let mut pos = start + 1;
            if pos < line_end && self.ns[pos].tok == Tok::LParen {
                let mut counter = 0i32;
                while pos < line_end {
                    match self.ns[pos].tok {
                        Tok::LParen => counter += 1,
                        Tok::RParen => counter -= 1,
                        _ => {}
                    }
                    if counter == 0 {
                        break;
                    }
                    pos += 1;
                }
                pos += 1;
            }
            if pos < line_end && self.ns[pos].tok == Tok::Assign {
                split = Some(pos);
            }
        }

        let stmt = match split {
            Some(eq) => Stmt::Assign {
                lhs: self.parse_expr(start, eq)?,
                rhs: self.parse_expr(eq + 1, line_end)?,
            },
            None => Stmt::Expr(self.parse_expr(start, line_end)?),
        };
        self.advance();
        Ok(vec![stmt])
    }
}
