//! Edge-case tests for the scanner: inputs at the boundary of what
//! fixed-form sources actually contain.

use crate::{scan, Tok};

#[test]
fn comment_only_source() {
    let src = b"C only comments here\nC and here\n\n";
    let eles = scan(src);
    assert!(eles
        .iter()
        .all(|e| matches!(e.tok, Tok::Comment | Tok::NewLine | Tok::Eof)));
}

#[test]
fn blank_lines_between_statements() {
    let src = b"      X = 1\n\n\n      Y = 2\n";
    let eles = scan(src);
    let assigns = eles.iter().filter(|e| e.tok == Tok::Assign).count();
    assert_eq!(assigns, 2);
}

#[test]
fn lowercase_comment_markers() {
    for src in [&b"c lower\n"[..], &b"d debug\n"[..], &b"D debug\n"[..]] {
        let eles = scan(src);
        assert!(
            eles.iter().any(|e| e.tok == Tok::Comment),
            "{:?}",
            String::from_utf8_lossy(src)
        );
    }
}

#[test]
fn unterminated_string_swallows_line() {
    let eles = scan(b"      S = 'oops\n");
    let s = eles.iter().find(|e| e.tok == Tok::Str).expect("a string");
    assert_eq!(s.text, "'oops");
}

#[test]
fn double_quoted_string() {
    let eles = scan(b"      S = \"hi\"\n");
    assert!(eles.iter().any(|e| e.tok == Tok::Str && e.text == "\"hi\""));
}

#[test]
fn adjacent_dotted_operators() {
    let eles = scan(b"      L = A .AND. .NOT. B\n");
    assert!(eles.iter().any(|e| e.tok == Tok::LAnd));
    assert!(eles.iter().any(|e| e.tok == Tok::Not));
}

#[test]
fn label_and_continue() {
    let eles = scan(b"   10 CONTINUE\n");
    let kinds: Vec<Tok> = eles.iter().map(|e| e.tok).collect();
    assert_eq!(
        kinds,
        [Tok::NewLine, Tok::Int, Tok::Continue, Tok::NewLine, Tok::Eof]
    );
}

#[test]
fn do_with_label_and_comma() {
    let eles = scan(b"      DO 40, J = 1, N\n");
    let kinds: Vec<Tok> = eles.iter().map(|e| e.tok).collect();
    assert_eq!(kinds[1], Tok::Do);
    assert_eq!(kinds[2], Tok::Int);
    assert_eq!(kinds[3], Tok::Comma);
}

#[test]
fn write_with_format_reference() {
    let src = b"      WRITE ( * , FMT = 9999 ) INFO\n";
    let eles = scan(src);
    let kinds: Vec<Tok> = eles.iter().map(|e| e.tok).collect();
    assert_eq!(
        &kinds[1..8],
        [Tok::Write, Tok::LParen, Tok::Mul, Tok::Comma, Tok::Ident, Tok::Assign, Tok::Int]
    );
}

#[test]
fn format_line_tokens() {
    let src = b" 9999 FORMAT ( ' value ' , I2 )\n";
    let eles = scan(src);
    assert!(eles.iter().any(|e| e.tok == Tok::Format));
    assert!(eles.iter().any(|e| e.tok == Tok::Str));
    assert!(eles.iter().any(|e| e.tok == Tok::Ident && e.text == "I2"));
}

#[test]
fn format_descriptor_with_width_and_precision() {
    // F6.2 splits into IDENT(F6) PERIOD INT(2) by design: the format
    // converter reassembles it.
    let eles = scan(b" 9 FORMAT ( F6.2 )\n");
    let texts: Vec<&str> = eles.iter().map(|e| e.text.as_str()).collect();
    assert!(texts.contains(&"F6"));
    assert!(texts.contains(&"."));
    assert!(texts.contains(&"2"));
}

#[test]
fn data_statement_with_slashes() {
    let eles = scan(b"      DATA A , B / 1.0 , 2.0 /\n");
    let quos = eles.iter().filter(|e| e.tok == Tok::Quo).count();
    assert_eq!(quos, 2);
    let floats = eles.iter().filter(|e| e.tok == Tok::Float).count();
    assert_eq!(floats, 2);
}

#[test]
fn computed_goto_shape() {
    let eles = scan(b"      GO TO ( 40, 80 ) IEXC\n");
    let kinds: Vec<Tok> = eles.iter().map(|e| e.tok).collect();
    assert_eq!(
        kinds,
        [
            Tok::NewLine,
            Tok::Goto,
            Tok::LParen,
            Tok::Int,
            Tok::Comma,
            Tok::Int,
            Tok::RParen,
            Tok::Ident,
            Tok::NewLine,
            Tok::Eof
        ]
    );
}

#[test]
fn recursive_qualifier_survives_as_ident() {
    let eles = scan(b"      RECURSIVE SUBROUTINE CGELQT3 ( M )\n");
    assert!(eles
        .iter()
        .any(|e| e.tok == Tok::Ident && e.text == "RECURSIVE"));
    assert!(eles.iter().any(|e| e.tok == Tok::Subroutine));
}

#[test]
fn columns_beyond_72_are_kept() {
    // deviation from strict F77: no truncation at column 72
    let mut line = b"      X = ".to_vec();
    line.extend(std::iter::repeat(b' ').take(70));
    line.extend_from_slice(b"42\n");
    let eles = scan(&line);
    assert!(eles.iter().any(|e| e.tok == Tok::Int && e.text == "42"));
}

#[test]
fn relex_is_stable() {
    // Re-lexing the concatenation of all element texts yields the same
    // token/text sequence (positions are recomputed).
    let src = b"      SUBROUTINE F ( N )\n      INTEGER N\n      N = N + 1\n      RETURN\n      END\n";
    let first = scan(src);
    let joined = first
        .iter()
        .map(|e| e.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    let second = scan(joined.as_bytes());

    let strip = |eles: &[crate::Elem]| -> Vec<(Tok, String)> {
        eles.iter()
            .filter(|e| e.tok != Tok::NewLine && e.tok != Tok::Eof)
            .map(|e| (e.tok, e.text.clone()))
            .collect()
    };
    assert_eq!(strip(&first), strip(&second));
}

mod properties {
    use proptest::prelude::*;

    use crate::{scan, Tok};

    proptest! {
        /// Every post-lexer element has a non-empty text (EOF excepted)
        /// and a 1-based position.
        #[test]
        fn elements_are_well_formed(src in "[ -~\n]{0,200}") {
            let eles = scan(src.as_bytes());
            for e in &eles {
                if e.tok == Tok::Eof {
                    continue;
                }
                prop_assert!(!e.text.is_empty(), "empty element {:?}", e);
                prop_assert!(e.pos.line >= 1);
                prop_assert!(e.pos.col >= 1);
            }
        }

        /// The stream is always delimited by NEW_LINE / EOF.
        #[test]
        fn stream_is_delimited(src in "[ -~\n]{0,200}") {
            let eles = scan(src.as_bytes());
            prop_assert!(matches!(eles.first().map(|e| e.tok), Some(Tok::NewLine)));
            prop_assert!(matches!(eles.last().map(|e| e.tok), Some(Tok::Eof)));
        }

        /// No UNDEFINED element survives the pipeline.
        #[test]
        fn no_undefined_survives(src in "[ -~\n]{0,200}") {
            prop_assert!(scan(src.as_bytes()).iter().all(|e| e.tok != Tok::Undefined));
        }
    }
}
