//! Fortran type descriptors and their target-language rendering.
//!
//! A declaration line like `COMPLEX*16 A(LDA,*)` carries two independent
//! pieces of information: the base type (with an optional `*N` width
//! modifier) and the dimension list. Both are folded into a [`VarType`],
//! which renders to the Go spelling used in parameter lists and variable
//! declarations.

use f77go_lex::{Elem, Tok};

/// The assumed-size marker `*` is encoded as dimension 0.
pub const ASSUMED_SIZE: usize = 0;

/// Scalar base types the translator can express.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BaseType {
    /// `INTEGER`
    Int,
    /// `REAL`
    Float32,
    /// `DOUBLE PRECISION`, `REAL*8`
    Float64,
    /// `COMPLEX`
    Complex64,
    /// `COMPLEX*16`
    Complex128,
    /// `LOGICAL`
    Bool,
    /// `CHARACTER`
    Byte,
    /// `CHARACTER*N`, N > 1
    Bytes,
}

impl BaseType {
    /// Go spelling of the base type.
    pub fn render(self) -> &'static str {
        match self {
            BaseType::Int => "int",
            BaseType::Float32 => "float32",
            BaseType::Float64 => "float64",
            BaseType::Complex64 => "complex64",
            BaseType::Complex128 => "complex128",
            BaseType::Bool => "bool",
            BaseType::Byte => "byte",
            BaseType::Bytes => "[]byte",
        }
    }
}

/// A declared type: base type plus ordered dimension list.
///
/// An empty dimension list means scalar. Dimension order is kept as
/// written in the source; see DESIGN.md for the column-major note.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VarType {
    pub base: BaseType,
    pub dims: Vec<usize>,
}

impl VarType {
    /// A scalar of the given base type.
    pub fn scalar(base: BaseType) -> Self {
        Self { base, dims: Vec::new() }
    }

    /// True if the declaration carried a dimension list.
    pub fn is_array(&self) -> bool {
        !self.dims.is_empty()
    }

    /// Renders the Go type: one `[]` per dimension, then the base type.
    ///
    /// # Examples
    ///
    /// ```
    /// use f77go_par::{BaseType, VarType};
    ///
    /// assert_eq!(VarType::scalar(BaseType::Float64).render(), "float64");
    /// assert_eq!(
    ///     VarType { base: BaseType::Complex128, dims: vec![0, 0] }.render(),
    ///     "[][]complex128"
    /// );
    /// ```
    pub fn render(&self) -> String {
        let mut out = String::new();
        for _ in &self.dims {
            out.push_str("[]");
        }
        out.push_str(self.base.render());
        out
    }
}

/// Parses a declaration's type elements into a descriptor.
///
/// The slice holds everything except the declared name: the base keywords,
/// an optional `* N` width, and an optional parenthesized dimension list.
/// Unparseable dimension expressions (named bounds, arithmetic) record as
/// [`ASSUMED_SIZE`]; their count still shapes the rendered type.
pub fn parse_type(elems: &[Elem]) -> VarType {
    let mut base: Option<Tok> = None;
    let mut double_seen = false;
    let mut width: Option<usize> = None;
    let mut dims: Vec<usize> = Vec::new();

    let mut i = 0;
    while i < elems.len() {
        match elems[i].tok {
            Tok::Integer | Tok::Real | Tok::Complex | Tok::Logical | Tok::Character => {
                base = Some(elems[i].tok);
            }
            Tok::Double => double_seen = true,
            Tok::Precision => {}
            // `*N` width modifier: only outside a dimension list.
            Tok::Mul if dims.is_empty() => {
                if let Some(next) = elems.get(i + 1) {
                    if next.tok == Tok::Int {
                        width = next.text.parse().ok();
                        i += 1;
                    }
                }
            }
            Tok::LParen => {
                dims = parse_dims(&elems[i..]);
                // the dimension list runs to the end of the declarator
                break;
            }
            _ => {}
        }
        i += 1;
    }

    let base = match (base, double_seen, width) {
        (Some(Tok::Integer), _, _) => BaseType::Int,
        (Some(Tok::Real), _, Some(8)) => BaseType::Float64,
        (Some(Tok::Real), _, _) => BaseType::Float32,
        (Some(Tok::Complex), _, Some(16)) => BaseType::Complex128,
        (Some(Tok::Complex), _, _) => BaseType::Complex64,
        (Some(Tok::Logical), _, _) => BaseType::Bool,
        (Some(Tok::Character), _, None | Some(1)) => BaseType::Byte,
        (Some(Tok::Character), _, Some(_)) => BaseType::Bytes,
        (None, true, _) => BaseType::Float64,
        // No recognizable base: the undeclared-name default.
        _ => BaseType::Int,
    };

    VarType { base, dims }
}

/// Parses the dimension list starting at an `LPAREN` element.
fn parse_dims(elems: &[Elem]) -> Vec<usize> {
    let mut dims = Vec::new();
    let mut depth = 0usize;
    let mut current: Option<usize> = None;
    let mut simple = true;

    for e in elems {
        match e.tok {
            Tok::LParen => {
                depth += 1;
                if depth > 1 {
                    simple = false;
                }
            }
            Tok::RParen => {
                if depth == 1 {
                    dims.push(if simple { current.unwrap_or(ASSUMED_SIZE) } else { ASSUMED_SIZE });
                    break;
                }
                depth = depth.saturating_sub(1);
            }
            Tok::Comma if depth == 1 => {
                dims.push(if simple { current.unwrap_or(ASSUMED_SIZE) } else { ASSUMED_SIZE });
                current = None;
                simple = true;
            }
            Tok::Int if depth == 1 && current.is_none() && simple => {
                current = e.text.parse().ok();
            }
            Tok::Mul if depth == 1 => {
                current = Some(ASSUMED_SIZE);
            }
            _ => {
                // named bound or arithmetic: dimension value is unknowable here
                simple = false;
            }
        }
    }
    dims
}

#[cfg(test)]
mod tests {
    use super::*;
    use f77go_util::Position;

    fn elems(spec: &[(Tok, &str)]) -> Vec<Elem> {
        spec.iter()
            .map(|&(tok, text)| Elem::new(tok, text, Position::DUMMY))
            .collect()
    }

    #[test]
    fn plain_scalars() {
        assert_eq!(
            parse_type(&elems(&[(Tok::Integer, "INTEGER")])),
            VarType::scalar(BaseType::Int)
        );
        assert_eq!(
            parse_type(&elems(&[(Tok::Real, "REAL")])),
            VarType::scalar(BaseType::Float32)
        );
        assert_eq!(
            parse_type(&elems(&[(Tok::Logical, "LOGICAL")])),
            VarType::scalar(BaseType::Bool)
        );
    }

    #[test]
    fn double_precision() {
        let t = parse_type(&elems(&[(Tok::Double, "DOUBLE"), (Tok::Precision, "PRECISION")]));
        assert_eq!(t, VarType::scalar(BaseType::Float64));
    }

    #[test]
    fn star_widths() {
        let t = parse_type(&elems(&[
            (Tok::Complex, "COMPLEX"),
            (Tok::Mul, "*"),
            (Tok::Int, "16"),
        ]));
        assert_eq!(t.base, BaseType::Complex128);

        let t = parse_type(&elems(&[
            (Tok::Real, "REAL"),
            (Tok::Mul, "*"),
            (Tok::Int, "8"),
        ]));
        assert_eq!(t.base, BaseType::Float64);
    }

    #[test]
    fn character_widths() {
        let t = parse_type(&elems(&[(Tok::Character, "CHARACTER")]));
        assert_eq!(t.base, BaseType::Byte);

        let t = parse_type(&elems(&[
            (Tok::Character, "CHARACTER"),
            (Tok::Mul, "*"),
            (Tok::Int, "32"),
        ]));
        assert_eq!(t.base, BaseType::Bytes);
        assert_eq!(t.render(), "[]byte");
    }

    #[test]
    fn literal_dimensions() {
        let t = parse_type(&elems(&[
            (Tok::Integer, "INTEGER"),
            (Tok::LParen, "("),
            (Tok::Int, "10"),
            (Tok::RParen, ")"),
        ]));
        assert_eq!(t.dims, vec![10]);
        assert_eq!(t.render(), "[]int");
    }

    #[test]
    fn assumed_size_and_named_dimensions() {
        // A(LDA,*) — named bound and assumed size both record as 0
        let t = parse_type(&elems(&[
            (Tok::Complex, "COMPLEX"),
            (Tok::Mul, "*"),
            (Tok::Int, "16"),
            (Tok::LParen, "("),
            (Tok::Ident, "LDA"),
            (Tok::Comma, ","),
            (Tok::Mul, "*"),
            (Tok::RParen, ")"),
        ]));
        assert_eq!(t.base, BaseType::Complex128);
        assert_eq!(t.dims, vec![ASSUMED_SIZE, ASSUMED_SIZE]);
        assert_eq!(t.render(), "[][]complex128");
    }

    #[test]
    fn two_literal_dimensions() {
        let t = parse_type(&elems(&[
            (Tok::Integer, "INTEGER"),
            (Tok::LParen, "("),
            (Tok::Int, "4"),
            (Tok::Comma, ","),
            (Tok::Int, "4"),
            (Tok::RParen, ")"),
        ]));
        assert_eq!(t.dims, vec![4, 4]);
        assert_eq!(t.render(), "[][]int");
    }

    #[test]
    fn empty_prefix_defaults_to_int() {
        assert_eq!(parse_type(&[]), VarType::scalar(BaseType::Int));
    }
}
