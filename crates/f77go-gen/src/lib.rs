//! f77go-gen - Go source emitter.
//!
//! Pretty-prints the translated AST as deterministic, tab-indented Go
//! source. The emitter is intentionally dumb: everything clever (type
//! inference, pointer rewriting, label commenting) happened earlier, so
//! the same AST always prints to the same bytes.
//!
//! Two bits of lowering do live here because they are purely textual:
//! Fortran float exponent markers (`D`, `Q`) renormalize to `e`, and
//! string literals gain Go quoting.

use std::fmt::{self, Write};

use f77go_ast::{Block, Else, Expr, File, FuncDecl, Stmt, UnOp};

/// Renders the file to a `String`.
///
/// # Examples
///
/// ```
/// use f77go_ast::{Block, File, FuncDecl, Param, Stmt};
///
/// let file = File {
///     package: "main".into(),
///     imports: vec![],
///     decls: vec![FuncDecl {
///         name: "F".into(),
///         params: vec![Param { name: "N".into(), typ: "*int".into() }],
///         result: None,
///         body: Block { stmts: vec![Stmt::Return] },
///     }],
/// };
/// let src = f77go_gen::emit(&file);
/// assert!(src.starts_with("package main\n"));
/// assert!(src.contains("func F(N *int) {"));
/// ```
pub fn emit(file: &File) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    emit_to(file, &mut out).expect("infallible write to String");
    out
}

/// Renders the file into any [`fmt::Write`] sink.
pub fn emit_to<W: Write>(file: &File, out: &mut W) -> fmt::Result {
    let mut p = Printer { out, indent: 0 };
    p.file(file)
}

struct Printer<'a, W: Write> {
    out: &'a mut W,
    indent: usize,
}

impl<W: Write> Printer<'_, W> {
    fn file(&mut self, file: &File) -> fmt::Result {
        writeln!(self.out, "package {}", file.package)?;
        if !file.imports.is_empty() {
            writeln!(self.out)?;
            let mut imports = file.imports.clone();
            imports.sort();
            imports.dedup();
            for import in &imports {
                writeln!(self.out, "import \"{import}\"")?;
            }
        }
        for decl in &file.decls {
            writeln!(self.out)?;
            self.func(decl)?;
        }
        Ok(())
    }

    fn func(&mut self, decl: &FuncDecl) -> fmt::Result {
        write!(self.out, "func {}(", decl.name)?;
        for (i, param) in decl.params.iter().enumerate() {
            if i > 0 {
                write!(self.out, ", ")?;
            }
            write!(self.out, "{} {}", param.name, param.typ)?;
        }
        write!(self.out, ")")?;
        if let Some(res) = &decl.result {
            write!(self.out, " ({} {})", res.name, res.typ)?;
        }
        writeln!(self.out, " {{")?;
        self.indent += 1;
        self.block_stmts(&decl.body)?;
        self.indent -= 1;
        writeln!(self.out, "}}")
    }

    fn block_stmts(&mut self, block: &Block) -> fmt::Result {
        for stmt in &block.stmts {
            self.stmt(stmt)?;
        }
        Ok(())
    }

    fn pad(&mut self) -> fmt::Result {
        for _ in 0..self.indent {
            self.out.write_char('\t')?;
        }
        Ok(())
    }

    fn stmt(&mut self, stmt: &Stmt) -> fmt::Result {
        match stmt {
            Stmt::Var { name, typ } => {
                self.pad()?;
                writeln!(self.out, "var {name} {typ}")
            }
            Stmt::Define { name, value } => {
                self.pad()?;
                writeln!(self.out, "{name} := {}", render(value))
            }
            Stmt::Assign { lhs, rhs } => {
                self.pad()?;
                writeln!(self.out, "{} = {}", render(lhs), render(rhs))
            }
            Stmt::Inc { name } => {
                self.pad()?;
                writeln!(self.out, "{name}++")
            }
            Stmt::AddAssign { name, value } => {
                self.pad()?;
                writeln!(self.out, "{name} += {}", render(value))
            }
            Stmt::If { cond, body, els } => {
                self.pad()?;
                write!(self.out, "if {} {{", render(cond))?;
                self.if_tail(body, els.as_deref())
            }
            Stmt::For {
                init,
                cond,
                post,
                body,
            } => {
                self.pad()?;
                match (init, cond, post) {
                    (None, Some(cond), None) => {
                        writeln!(self.out, "for {} {{", render(cond))?;
                    }
                    (init, cond, post) => {
                        write!(self.out, "for ")?;
                        if let Some(init) = init {
                            write!(self.out, "{}", render_simple_stmt(init))?;
                        }
                        write!(self.out, "; ")?;
                        if let Some(cond) = cond {
                            write!(self.out, "{}", render(cond))?;
                        }
                        write!(self.out, "; ")?;
                        if let Some(post) = post {
                            write!(self.out, "{}", render_simple_stmt(post))?;
                        }
                        writeln!(self.out, " {{")?;
                    }
                }
                self.indent += 1;
                self.block_stmts(body)?;
                self.indent -= 1;
                self.pad()?;
                writeln!(self.out, "}}")
            }
            Stmt::Switch { tag, cases } => {
                self.pad()?;
                writeln!(self.out, "switch {} {{", render(tag))?;
                for case in cases {
                    self.pad()?;
                    writeln!(self.out, "case {}:", render(&case.value))?;
                    self.indent += 1;
                    self.block_stmts(&case.body)?;
                    self.indent -= 1;
                }
                self.pad()?;
                writeln!(self.out, "}}")
            }
            Stmt::Expr(expr) => {
                self.pad()?;
                writeln!(self.out, "{}", render(expr))
            }
            Stmt::Return => {
                self.pad()?;
                writeln!(self.out, "return")
            }
            Stmt::Goto { label } => {
                self.pad()?;
                writeln!(self.out, "goto {label}")
            }
            Stmt::Labeled { label, stmt } => {
                self.pad()?;
                writeln!(self.out, "{label}:")?;
                match stmt.as_ref() {
                    Stmt::Empty => Ok(()),
                    inner => self.stmt(inner),
                }
            }
            Stmt::Empty => Ok(()),
        }
    }

    fn if_tail(&mut self, body: &Block, els: Option<&Else>) -> fmt::Result {
        writeln!(self.out)?;
        self.indent += 1;
        self.block_stmts(body)?;
        self.indent -= 1;
        self.pad()?;
        match els {
            None => writeln!(self.out, "}}"),
            Some(Else::Block(block)) => {
                writeln!(self.out, "}} else {{")?;
                self.indent += 1;
                self.block_stmts(block)?;
                self.indent -= 1;
                self.pad()?;
                writeln!(self.out, "}}")
            }
            Some(Else::If(stmt)) => match stmt {
                Stmt::If { cond, body, els } => {
                    write!(self.out, "}} else if {} {{", render(cond))?;
                    self.if_tail(body, els.as_deref())
                }
                other => {
                    // A malformed else-if arm still prints something sane.
                    writeln!(self.out, "}} else {{")?;
                    self.indent += 1;
                    self.stmt(other)?;
                    self.indent -= 1;
                    self.pad()?;
                    writeln!(self.out, "}}")
                }
            },
        }
    }
}

/// Renders a statement usable in a `for` clause (init/post position).
fn render_simple_stmt(stmt: &Stmt) -> String {
    match stmt {
        Stmt::Assign { lhs, rhs } => format!("{} = {}", render(lhs), render(rhs)),
        Stmt::Define { name, value } => format!("{name} := {}", render(value)),
        Stmt::Inc { name } => format!("{name}++"),
        Stmt::AddAssign { name, value } => format!("{name} += {}", render(value)),
        other => format!("/* unsupported clause {other:?} */"),
    }
}

/// Renders an expression to Go source.
pub fn render(expr: &Expr) -> String {
    match expr {
        Expr::Ident(name) => name.clone(),
        Expr::IntLit(text) => text.clone(),
        Expr::FloatLit(text) => renormalize_float(text),
        Expr::StrLit(text) => quote(text),
        Expr::Unary { op, expr } => match op {
            UnOp::Addr => format!("&({})", render(expr)),
            _ => {
                if matches!(expr.as_ref(), Expr::Binary { .. }) {
                    format!("{}({})", op.symbol(), render(expr))
                } else {
                    format!("{}{}", op.symbol(), render(expr))
                }
            }
        },
        Expr::Binary { op, lhs, rhs } => {
            format!("{} {} {}", render(lhs), op.symbol(), render(rhs))
        }
        Expr::Call { fun, args } => {
            let args: Vec<String> = args.iter().map(render).collect();
            format!("{}({})", render(fun), args.join(", "))
        }
        Expr::Index { arr, index } => format!("{}[{}]", render(arr), render(index)),
        Expr::Selector { recv, field } => format!("{}.{field}", render(recv)),
        Expr::Paren(inner) => format!("({})", render(inner)),
    }
}

/// Rewrites Fortran exponent markers `D`/`d`/`Q`/`q` to `e`, leaving
/// `E`/`e` floats untouched: `5.9604645D-8` → `5.9604645e-8`.
fn renormalize_float(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            'D' | 'd' | 'Q' | 'q' => 'e',
            other => other,
        })
        .collect()
}

/// Quotes a logical string value as a Go string literal.
fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}
