//! f77go-ast - Target-language AST node definitions.
//!
//! The translator emits a small Go subset: one file of plain functions,
//! with statements and expressions limited to what numerical Fortran
//! kernels lower to. Types are carried as already-rendered strings
//! (`"int"`, `"*float64"`, `"[][]complex128"`); the type inference that
//! produces them lives in the parser crate.
//!
//! Identifier nodes are deliberately mutable in place: two passes — the
//! function-result rename and the unused-label commenting — work by
//! rewriting name strings through [`walk_idents_block`] /
//! [`walk_idents_file`].

mod visit;

pub use visit::{walk_idents_block, walk_idents_expr, walk_idents_file, walk_idents_stmt};

/// A whole emitted file: one package, sorted imports, one function per
/// translated program unit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct File {
    /// Package name, always `main` for translated kernels.
    pub package: String,
    /// Import paths, sorted before emission for byte-reproducible output.
    pub imports: Vec<String>,
    /// One function declaration per PROGRAM/SUBROUTINE/FUNCTION.
    pub decls: Vec<FuncDecl>,
}

/// A translated program unit.
#[derive(Debug, Clone, PartialEq)]
pub struct FuncDecl {
    pub name: String,
    pub params: Vec<Param>,
    /// Function result, if the unit was a FUNCTION.
    pub result: Option<Param>,
    pub body: Block,
}

/// A named, typed parameter (or result) slot.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    /// Rendered target type, e.g. `"*float64"` or `"[][]complex128"`.
    pub typ: String,
}

/// A statement list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Block {
    pub stmts: Vec<Stmt>,
}

impl Block {
    /// An empty block.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Statement shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `var name typ` — scalar declaration.
    Var { name: String, typ: String },
    /// `name := value` — used for array allocations.
    Define { name: String, value: Expr },
    /// `lhs = rhs`
    Assign { lhs: Expr, rhs: Expr },
    /// `name++` — the default DO-loop post clause.
    Inc { name: String },
    /// `name += value` — DO-loop post clause with an explicit step.
    AddAssign { name: String, value: Expr },
    /// `if cond { body } [else ...]`
    If {
        cond: Expr,
        body: Block,
        els: Option<Box<Else>>,
    },
    /// `for [init]; [cond]; [post] { body }`
    For {
        init: Option<Box<Stmt>>,
        cond: Option<Expr>,
        post: Option<Box<Stmt>>,
        body: Block,
    },
    /// `switch tag { case v: body ... }`
    Switch { tag: Expr, cases: Vec<SwitchCase> },
    /// An expression in statement position (always a call).
    Expr(Expr),
    /// `return`
    Return,
    /// `goto label`
    Goto { label: String },
    /// `label: stmt`
    Labeled { label: String, stmt: Box<Stmt> },
    /// The empty statement, the usual payload of a label.
    Empty,
}

/// The else arm of an if statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Else {
    /// `else if ...` — a nested if statement.
    If(Stmt),
    /// `else { ... }`
    Block(Block),
}

/// One arm of a computed-GOTO switch.
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchCase {
    pub value: Expr,
    pub body: Block,
}

/// Expression shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A name. Mutated in place by the rename and label-commenting passes.
    Ident(String),
    /// Integer literal, original spelling preserved.
    IntLit(String),
    /// Float literal, original spelling preserved; the emitter
    /// renormalizes `D`/`Q` exponent markers.
    FloatLit(String),
    /// String literal, logical contents (no surrounding quotes).
    StrLit(String),
    /// Unary operation.
    Unary { op: UnOp, expr: Box<Expr> },
    /// Binary operation.
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// Function call.
    Call { fun: Box<Expr>, args: Vec<Expr> },
    /// Single-dimension index; multi-dimensional access nests these.
    Index { arr: Box<Expr>, index: Box<Expr> },
    /// Field selection, e.g. `fmt.Printf`.
    Selector { recv: Box<Expr>, field: String },
    /// Parenthesized expression.
    Paren(Box<Expr>),
}

impl Expr {
    /// Shorthand for an identifier expression.
    pub fn ident(name: impl Into<String>) -> Self {
        Expr::Ident(name.into())
    }

    /// Shorthand for a call with an identifier callee.
    pub fn call(name: impl Into<String>, args: Vec<Expr>) -> Self {
        Expr::Call {
            fun: Box::new(Expr::ident(name)),
            args,
        }
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `!`
    Not,
    /// `&` — address-of, rendered `&(x)`.
    Addr,
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Lss,
    Gtr,
    Leq,
    Geq,
    Eql,
    Neq,
    And,
    Or,
}

impl BinOp {
    /// The Go spelling of the operator.
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Lss => "<",
            BinOp::Gtr => ">",
            BinOp::Leq => "<=",
            BinOp::Geq => ">=",
            BinOp::Eql => "==",
            BinOp::Neq => "!=",
            BinOp::And => "&&",
            BinOp::Or => "||",
        }
    }
}

impl UnOp {
    /// The Go spelling of the operator.
    pub fn symbol(self) -> &'static str {
        match self {
            UnOp::Plus => "+",
            UnOp::Minus => "-",
            UnOp::Not => "!",
            UnOp::Addr => "&",
        }
    }
}
