//! FORMAT statement conversion.
//!
//! A `FORMAT` line referenced from a `WRITE` is lowered to a printf-style
//! format string for the runtime's `fmt.Printf`. The recognized edit
//! descriptors are the ones BLAS/LAPACK error reporting actually uses:
//! `Iw`, `Fw.d`, `Aw` (and bare `A`), plus literal strings. Anything else
//! lowers to `%v`.

use f77go_lex::{Elem, Tok};

use crate::Parser;

impl Parser {
    /// Converts the elements of a FORMAT body (everything after the
    /// `FORMAT` keyword) into a format string. A trailing newline is
    /// always appended.
    pub(crate) fn convert_format(&mut self, elems: &[Elem]) -> String {
        let mut out = String::new();
        let mut i = 0;
        while i < elems.len() {
            let e = &elems[i];
            match e.tok {
                Tok::Ident => {
                    let text = e.text.as_str();
                    let head = text.as_bytes().first().map(u8::to_ascii_uppercase);
                    match head {
                        Some(b'I') => {
                            out.push('%');
                            out.push_str(&text[1..]);
                            out.push('d');
                        }
                        Some(b'F') => {
                            // `F6.2` reaches us as IDENT(F6) PERIOD INT(2)
                            out.push('%');
                            out.push_str(&text[1..]);
                            if i + 1 < elems.len() && elems[i + 1].tok == Tok::Period {
                                i += 1;
                                out.push('.');
                                if i + 1 < elems.len() && elems[i + 1].tok == Tok::Int {
                                    out.push_str(&elems[i + 1].text);
                                    i += 1;
                                }
                            }
                            out.push('f');
                        }
                        Some(b'A') => {
                            if text.len() > 1 {
                                out.push('%');
                                out.push_str(&text[1..]);
                                out.push('s');
                            } else {
                                out.push_str("%s");
                            }
                        }
                        _ => {
                            self.add_error(
                                format!("unsupported format descriptor `{text}`"),
                                e.pos,
                            );
                        }
                    }
                }
                Tok::Str => out.push_str(&strip_format_quotes(&e.text)),
                Tok::Comma | Tok::LParen | Tok::RParen => {}
                _ => out.push_str("%v"),
            }
            i += 1;
        }
        out.push('\n');
        out
    }
}

fn strip_format_quotes(text: &str) -> String {
    let bytes = text.as_bytes();
    if bytes.len() >= 2 {
        let first = bytes[0];
        if (first == b'\'' || first == b'"') && bytes[bytes.len() - 1] == first {
            return text[1..text.len() - 1].to_string();
        }
    }
    text.to_string()
}

#[cfg(test)]
mod tests {
    use crate::Parser;
    use f77go_lex::{scan, Tok};

    /// Lexes a FORMAT line and returns the elements after the keyword.
    fn format_body(line: &str) -> (Parser, Vec<f77go_lex::Elem>) {
        let src = format!(" 9999 FORMAT {line}\n");
        let eles = scan(src.as_bytes());
        let start = eles
            .iter()
            .position(|e| e.tok == Tok::Format)
            .expect("FORMAT keyword")
            + 1;
        let end = eles[start..]
            .iter()
            .position(|e| e.tok == Tok::NewLine)
            .map(|off| start + off)
            .unwrap_or(eles.len());
        let body = eles[start..end].to_vec();
        (Parser::new(eles), body)
    }

    fn convert(line: &str) -> String {
        let (mut p, body) = format_body(line);
        let out = p.convert_format(&body);
        assert!(
            p.handler.is_empty(),
            "diagnostics: {:?}",
            p.handler.diagnostics()
        );
        out
    }

    #[test]
    fn integer_descriptor() {
        assert_eq!(convert("( 'N=' , I3 )"), "N=%3d\n");
    }

    #[test]
    fn string_and_integer() {
        assert_eq!(
            convert("( ' parameter number ' , I2 )"),
            " parameter number %2d\n"
        );
    }

    #[test]
    fn fixed_point_descriptor() {
        assert_eq!(convert("( F6.2 )"), "%6.2f\n");
        assert_eq!(convert("( F12 )"), "%12f\n");
    }

    #[test]
    fn string_edit_descriptor() {
        assert_eq!(convert("( A )"), "%s\n");
        assert_eq!(convert("( A10 )"), "%10s\n");
    }

    #[test]
    fn xerbla_style_line() {
        assert_eq!(
            convert("( ' ** On entry to ' , A , ' parameter number ' , I2 , ' had ' , 'an illegal value' )"),
            " ** On entry to %s parameter number %2d had an illegal value\n"
        );
    }

    #[test]
    fn unknown_descriptor_is_diagnosed() {
        let (mut p, body) = format_body("( E12 )");
        let _ = p.convert_format(&body);
        assert!(!p.handler.is_empty());
    }

    #[test]
    fn unrecognized_token_becomes_verb_v() {
        // a stray integer (e.g. a repeat count) lowers to %v
        let (mut p, body) = format_body("( 3 )");
        assert_eq!(p.convert_format(&body), "%v\n");
    }
}
