//! In-place identifier visitors.
//!
//! Both AST rewrites the translator performs — renaming the
//! function-result pseudo-variable and commenting out unused labels —
//! reduce to "apply a substitution to every identifier". The walkers here
//! hand every name slot in the tree to a closure, which may rewrite the
//! string in place.

use crate::{Block, Else, Expr, File, Stmt};

/// Applies `f` to every identifier name in the file, declarations
/// included (function names, parameter names, labels, bodies).
pub fn walk_idents_file<F: FnMut(&mut String)>(file: &mut File, f: &mut F) {
    for decl in &mut file.decls {
        f(&mut decl.name);
        for p in &mut decl.params {
            f(&mut p.name);
        }
        if let Some(res) = &mut decl.result {
            f(&mut res.name);
        }
        walk_idents_block(&mut decl.body, f);
    }
}

/// Applies `f` to every identifier name inside a block.
pub fn walk_idents_block<F: FnMut(&mut String)>(block: &mut Block, f: &mut F) {
    for stmt in &mut block.stmts {
        walk_idents_stmt(stmt, f);
    }
}

/// Applies `f` to every identifier name inside a statement.
pub fn walk_idents_stmt<F: FnMut(&mut String)>(stmt: &mut Stmt, f: &mut F) {
    match stmt {
        Stmt::Var { name, .. } => f(name),
        Stmt::Define { name, value } => {
            f(name);
            walk_idents_expr(value, f);
        }
        Stmt::Assign { lhs, rhs } => {
            walk_idents_expr(lhs, f);
            walk_idents_expr(rhs, f);
        }
        Stmt::Inc { name } => f(name),
        Stmt::AddAssign { name, value } => {
            f(name);
            walk_idents_expr(value, f);
        }
        Stmt::If { cond, body, els } => {
            walk_idents_expr(cond, f);
            walk_idents_block(body, f);
            if let Some(els) = els {
                match els.as_mut() {
                    Else::If(stmt) => walk_idents_stmt(stmt, f),
                    Else::Block(block) => walk_idents_block(block, f),
                }
            }
        }
        Stmt::For {
            init,
            cond,
            post,
            body,
        } => {
            if let Some(init) = init {
                walk_idents_stmt(init, f);
            }
            if let Some(cond) = cond {
                walk_idents_expr(cond, f);
            }
            if let Some(post) = post {
                walk_idents_stmt(post, f);
            }
            walk_idents_block(body, f);
        }
        Stmt::Switch { tag, cases } => {
            walk_idents_expr(tag, f);
            for case in cases {
                walk_idents_expr(&mut case.value, f);
                walk_idents_block(&mut case.body, f);
            }
        }
        Stmt::Expr(expr) => walk_idents_expr(expr, f),
        Stmt::Goto { label } => f(label),
        Stmt::Labeled { label, stmt } => {
            f(label);
            walk_idents_stmt(stmt, f);
        }
        Stmt::Return | Stmt::Empty => {}
    }
}

/// Applies `f` to every identifier name inside an expression.
pub fn walk_idents_expr<F: FnMut(&mut String)>(expr: &mut Expr, f: &mut F) {
    match expr {
        Expr::Ident(name) => f(name),
        Expr::IntLit(_) | Expr::FloatLit(_) | Expr::StrLit(_) => {}
        Expr::Unary { expr, .. } => walk_idents_expr(expr, f),
        Expr::Binary { lhs, rhs, .. } => {
            walk_idents_expr(lhs, f);
            walk_idents_expr(rhs, f);
        }
        Expr::Call { fun, args } => {
            walk_idents_expr(fun, f);
            for arg in args {
                walk_idents_expr(arg, f);
            }
        }
        Expr::Index { arr, index } => {
            walk_idents_expr(arr, f);
            walk_idents_expr(index, f);
        }
        Expr::Selector { recv, .. } => walk_idents_expr(recv, f),
        Expr::Paren(inner) => walk_idents_expr(inner, f),
    }
}
