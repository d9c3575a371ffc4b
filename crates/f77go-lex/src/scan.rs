//! The fixed-form scanner.
//!
//! Fixed-form Fortran cannot be tokenized left-to-right in one pass:
//! spaces are insignificant inside statements, keywords are only
//! recognizable once dotted operators have been carved out (`2.LE.1` must
//! not read as the float `2.`), and several idioms (`ELSEIF`, `GO TO`,
//! `PARAMETER(...)`) have to be normalized before the parser sees them.
//!
//! The scanner therefore works by progressive refinement over a growable
//! vector of elements. The whole buffer starts as a single
//! [`Tok::Undefined`] element; each pass claims recognized pieces and
//! leaves the remainder undefined. Pass order is load-bearing and fixed:
//!
//! 1. line splitting
//! 2. column-1 comment lines (`C`, `c`, `*`, `D`, `d`)
//! 3. inline `!` comments (quote-aware)
//! 4. string literals
//! 5. symbolic operators, dotted operators first
//! 6. keywords, case-insensitive, at identifier boundaries only
//! 7. whitespace collapsing
//! 8. numeric literals
//! 9. residual `.` `+` `-`
//! 10. post-processing (END collapse, ELSEIF split, continuation merge,
//!     PARAMETER flattening, `GO TO` fusion, `.TRUE.`/`.FALSE.` lowering)

use f77go_util::Position;

use crate::{Elem, Tok};

/// Scans a raw fixed-form source buffer into a classified element list.
///
/// The returned list starts with a `NEW_LINE` element, ends with an `EOF`
/// element, and contains no [`Tok::Undefined`] elements.
///
/// # Examples
///
/// ```
/// use f77go_lex::{scan, Tok};
///
/// let eles = scan(b"      N = N + 1\n");
/// let kinds: Vec<Tok> = eles.iter().map(|e| e.tok).collect();
/// assert_eq!(
///     kinds,
///     [Tok::NewLine, Tok::Ident, Tok::Assign, Tok::Ident, Tok::Add,
///      Tok::Int, Tok::NewLine, Tok::Eof]
/// );
/// ```
pub fn scan(src: &[u8]) -> Vec<Elem> {
    let text = String::from_utf8_lossy(src).into_owned();
    let mut s = Scanner {
        eles: vec![Elem::new(Tok::Undefined, text, Position::new(1, 1))],
    };

    s.break_lines();
    s.mark_comment_lines();
    s.extract_inline_comments();
    s.extract_strings();
    s.extract_operators();
    s.extract_keywords();
    s.collapse_whitespace();
    s.extract_numbers();
    s.collapse_whitespace();
    s.extract_residual_punct();
    s.collapse_whitespace();
    s.promote_idents();
    s.postprocess();
    s.seal();

    tracing::debug!(elements = s.eles.len(), "scan complete");
    s.eles
}

/// Exponent markers accepted inside numeric literals.
fn is_exp_marker(b: u8) -> bool {
    matches!(b, b'E' | b'e' | b'D' | b'd' | b'Q' | b'q')
}

struct Scanner {
    eles: Vec<Elem>,
}

impl Scanner {
    /// Splits `eles[i]` so that `text[start..end]` becomes its own element
    /// with kind `tok`. The pieces before and after (if any) stay
    /// [`Tok::Undefined`] and are inserted next to the original slot.
    /// Column numbers of the new pieces follow their byte offsets.
    fn extract(&mut self, i: usize, start: usize, end: usize, tok: Tok) {
        let len = self.eles[i].text.len();
        assert!(start < end, "empty extraction {{{start},{end}}}");
        assert!(end <= len, "extraction outside of element {{{end},{len}}}");

        if start == 0 && end == len {
            self.eles[i].tok = tok;
            return;
        }

        let text = std::mem::take(&mut self.eles[i].text);
        let pos = self.eles[i].pos;

        if start == 0 {
            self.eles[i] = Elem::new(tok, &text[..end], pos);
            self.eles
                .insert(i + 1, Elem::new(Tok::Undefined, &text[end..], pos.shifted(end)));
            return;
        }

        if end == len {
            self.eles[i] = Elem::new(Tok::Undefined, &text[..start], pos);
            self.eles
                .insert(i + 1, Elem::new(tok, &text[start..], pos.shifted(start)));
            return;
        }

        self.eles[i] = Elem::new(Tok::Undefined, &text[..start], pos);
        self.eles
            .insert(i + 1, Elem::new(tok, &text[start..end], pos.shifted(start)));
        self.eles
            .insert(i + 2, Elem::new(Tok::Undefined, &text[end..], pos.shifted(end)));
    }

    /// Pass 1: split the buffer into one element per physical line, with a
    /// `NEW_LINE` element between consecutive lines.
    fn break_lines(&mut self) {
        let mut out = Vec::new();
        for e in &self.eles {
            let lines: Vec<&str> = e.text.split('\n').collect();
            let last = lines.len() - 1;
            for (idx, line) in lines.iter().enumerate() {
                let lineno = idx as u32 + 1;
                if !line.is_empty() {
                    out.push(Elem::new(e.tok, *line, Position::new(lineno, 1)));
                }
                if idx != last {
                    out.push(Elem::new(Tok::NewLine, "\n", Position::new(lineno, 1)));
                }
            }
        }
        self.eles = out;
    }

    /// Pass 2: a line whose first column holds `C`, `c`, `*`, `D` or `d`
    /// is a comment line under the fixed-form convention.
    fn mark_comment_lines(&mut self) {
        for e in &mut self.eles {
            if e.tok != Tok::Undefined {
                continue;
            }
            match e.text.bytes().next() {
                Some(b'C' | b'c' | b'*' | b'D' | b'd') => e.tok = Tok::Comment,
                _ => {}
            }
        }
    }

    /// Pass 3: a `!` outside a string literal starts a comment running to
    /// the end of the line.
    fn extract_inline_comments(&mut self) {
        let mut i = 0;
        while i < self.eles.len() {
            if self.eles[i].tok == Tok::Undefined {
                let bytes = self.eles[i].text.as_bytes();
                let mut quote: Option<u8> = None;
                let mut bang = None;
                for (j, &b) in bytes.iter().enumerate() {
                    match quote {
                        Some(q) if b == q => quote = None,
                        Some(_) => {}
                        None if b == b'\'' || b == b'"' => quote = Some(b),
                        None if b == b'!' => {
                            bang = Some(j);
                            break;
                        }
                        None => {}
                    }
                }
                if let Some(j) = bang {
                    let len = self.eles[i].text.len();
                    self.extract(i, j, len, Tok::Comment);
                }
            }
            i += 1;
        }
    }

    /// Pass 4: string literals bounded by `'...'` or `"..."`, verbatim,
    /// no escape processing. An unterminated string swallows the rest of
    /// its line.
    fn extract_strings(&mut self) {
        let mut i = 0;
        while i < self.eles.len() {
            if self.eles[i].tok == Tok::Undefined {
                let bytes = self.eles[i].text.as_bytes();
                if let Some(j) = bytes.iter().position(|&b| b == b'\'' || b == b'"') {
                    let quote = bytes[j];
                    let mut end = j + 1;
                    while end < bytes.len() && bytes[end] != quote {
                        end += 1;
                    }
                    let end = (end + 1).min(bytes.len());
                    self.extract(i, j, end, Tok::Str);
                }
            }
            i += 1;
        }
    }

    /// Pass 5: symbolic operators, longest and dotted first.
    ///
    /// Dotted operators must be claimed before numeric literals: in
    /// `2.LE.1` the `.LE.` wins over the float `2.`. `.TRUE.`/`.FALSE.`
    /// are claimed as identifiers here for the same reason.
    fn extract_operators(&mut self) {
        const TABLE: &[(Tok, &str)] = &[
            (Tok::Lss, ".LT."),
            (Tok::Gtr, ".GT."),
            (Tok::Leq, ".LE."),
            (Tok::Geq, ".GE."),
            (Tok::Not, ".NOT."),
            (Tok::Neq, ".NE."),
            (Tok::Eql, ".EQ."),
            (Tok::LAnd, ".AND."),
            (Tok::LOr, ".OR."),
            (Tok::Ident, ".TRUE."),
            (Tok::Ident, ".FALSE."),
            (Tok::Neq, "/="),
            (Tok::DoubleColon, "::"),
            (Tok::Colon, ":"),
            (Tok::Comma, ","),
            (Tok::LParen, "("),
            (Tok::RParen, ")"),
            (Tok::Assign, "="),
            (Tok::Gtr, ">"),
            (Tok::Lss, "<"),
            (Tok::Dollar, "$"),
            (Tok::DoubleStar, "**"),
            (Tok::Mul, "*"),
            (Tok::StringConcat, "//"),
            (Tok::Quo, "/"),
        ];

        loop {
            let mut changed = false;
            let mut i = 0;
            while i < self.eles.len() {
                if self.eles[i].tok == Tok::Undefined {
                    let upper = self.eles[i].text.to_ascii_uppercase();
                    for &(tok, pattern) in TABLE {
                        if let Some(ind) = upper.find(pattern) {
                            self.extract(i, ind, ind + pattern.len(), tok);
                            changed = true;
                            break;
                        }
                    }
                }
                i += 1;
            }
            if !changed {
                break;
            }
        }
    }

    /// Pass 6: keywords, case-insensitive, recognized only at identifier
    /// boundaries: the byte before a match must be a space (or the element
    /// start) and the byte after must not be a letter or digit.
    fn extract_keywords(&mut self) {
        const TABLE: &[(Tok, &str)] = &[
            (Tok::Subroutine, "SUBROUTINE"),
            (Tok::Implicit, "IMPLICIT"),
            (Tok::Integer, "INTEGER"),
            (Tok::Character, "CHARACTER"),
            (Tok::Logical, "LOGICAL"),
            (Tok::Complex, "COMPLEX"),
            (Tok::Real, "REAL"),
            (Tok::Data, "DATA"),
            (Tok::External, "EXTERNAL"),
            (Tok::End, "END"),
            (Tok::EndDo, "ENDDO"),
            (Tok::Do, "DO"),
            (Tok::Double, "DOUBLE"),
            (Tok::Function, "FUNCTION"),
            (Tok::If, "IF"),
            (Tok::Else, "ELSE"),
            (Tok::Continue, "CONTINUE"),
            (Tok::Call, "CALL"),
            (Tok::Then, "THEN"),
            (Tok::Return, "RETURN"),
            (Tok::Write, "WRITE"),
            (Tok::While, "WHILE"),
            (Tok::Parameter, "PARAMETER"),
            (Tok::Program, "PROGRAM"),
            (Tok::Precision, "PRECISION"),
            (Tok::Intrinsic, "INTRINSIC"),
            (Tok::Format, "FORMAT"),
            (Tok::Stop, "STOP"),
            (Tok::Goto, "GOTO"),
            (Tok::ElseIf, "ELSEIF"),
        ];

        loop {
            let mut changed = false;
            let mut i = 0;
            while i < self.eles.len() {
                if self.eles[i].tok == Tok::Undefined {
                    let upper = self.eles[i].text.to_ascii_uppercase();
                    let bytes = upper.as_bytes();
                    'table: for &(tok, pattern) in TABLE {
                        let mut from = 0;
                        while let Some(off) = upper[from..].find(pattern) {
                            let ind = from + off;
                            let end = ind + pattern.len();
                            let before_ok = ind == 0 || bytes[ind - 1] == b' ';
                            let after_ok =
                                end == bytes.len() || !bytes[end].is_ascii_alphanumeric();
                            if before_ok && after_ok {
                                self.extract(i, ind, end, tok);
                                changed = true;
                                break 'table;
                            }
                            from = ind + 1;
                        }
                    }
                }
                i += 1;
            }
            if !changed {
                break;
            }
        }
    }

    /// Pass 7: drop empty and all-space undefined elements, split the
    /// remaining undefined runs on interior spaces.
    fn collapse_whitespace(&mut self) {
        let mut i = 0;
        while i < self.eles.len() {
            if self.eles[i].tok != Tok::Undefined {
                i += 1;
                continue;
            }
            if self.eles[i].text.bytes().all(|b| b == b' ') {
                self.eles.remove(i);
                continue;
            }
            let pieces = self.eles[i].split_on_spaces();
            if pieces.len() == 1 && pieces[0].text == self.eles[i].text {
                i += 1;
                continue;
            }
            self.eles.splice(i..=i, pieces);
            i += 1;
        }
    }

    /// Pass 8: numeric literals.
    ///
    /// Accepted shape: digits [ `.` digits ] [ exp-marker [sign] digits ]
    /// where the exponent marker is one of `E` `e` `D` `d` `Q` `q`. A
    /// fractional point or exponent makes it a `FLOAT`, otherwise `INT`.
    /// Digits embedded in an identifier-like run are left alone.
    fn extract_numbers(&mut self) {
        let mut i = 0;
        'outer: while i < self.eles.len() {
            if self.eles[i].tok != Tok::Undefined {
                i += 1;
                continue;
            }
            let bytes = self.eles[i].text.clone().into_bytes();
            let mut st = 0;
            loop {
                if st >= bytes.len() {
                    break;
                }
                if bytes[st].is_ascii_digit() {
                    let mut en = st;
                    while en < bytes.len() && bytes[en].is_ascii_digit() {
                        en += 1;
                    }
                    if en < bytes.len() && (bytes[en] == b'.' || is_exp_marker(bytes[en])) {
                        if bytes[en] == b'.' {
                            en += 1;
                            while en < bytes.len() && bytes[en].is_ascii_digit() {
                                en += 1;
                            }
                        }
                        if en < bytes.len() && is_exp_marker(bytes[en]) {
                            if en + 1 < bytes.len()
                                && (bytes[en + 1] == b'+' || bytes[en + 1] == b'-')
                            {
                                en += 1;
                            }
                            en += 1;
                            while en < bytes.len() && bytes[en].is_ascii_digit() {
                                en += 1;
                            }
                        }
                        self.extract(i, st, en, Tok::Float);
                    } else {
                        self.extract(i, st, en, Tok::Int);
                    }
                    continue 'outer;
                }
                // Skip identifier-like runs so that digits inside names
                // (X12, LDA1) are not claimed as literals.
                while st < bytes.len()
                    && (bytes[st] == b'_' || bytes[st].is_ascii_alphanumeric())
                {
                    st += 1;
                }
                if st >= bytes.len() {
                    break;
                }
                st += 1;
            }
            i += 1;
        }
    }

    /// Pass 9: leftover `.` `+` `-` — claimed last, after numeric
    /// scanning had the chance to absorb them into literals.
    fn extract_residual_punct(&mut self) {
        const TABLE: &[(Tok, &str)] = &[
            (Tok::Period, "."),
            (Tok::Add, "+"),
            (Tok::Sub, "-"),
        ];
        loop {
            let mut changed = false;
            let mut i = 0;
            while i < self.eles.len() {
                if self.eles[i].tok == Tok::Undefined {
                    for &(tok, pattern) in TABLE {
                        if let Some(ind) = self.eles[i].text.find(pattern) {
                            self.extract(i, ind, ind + pattern.len(), tok);
                            changed = true;
                            break;
                        }
                    }
                }
                i += 1;
            }
            if !changed {
                break;
            }
        }
    }

    /// Whatever survived every classification pass is an identifier.
    fn promote_idents(&mut self) {
        for e in &mut self.eles {
            if e.tok == Tok::Undefined {
                e.tok = Tok::Ident;
            }
        }
    }

    /// Pass 10: normalize Fortran idioms into the token shapes the parser
    /// expects.
    fn postprocess(&mut self) {
        self.fuse_goto();
        self.collapse_end();
        self.expand_elseif();

        // `.NE.` and `/=` both read as `!=` downstream.
        for e in &mut self.eles {
            if e.tok == Tok::Neq {
                e.text = "!=".into();
            }
        }

        // String concatenation maps onto the target's `+`.
        for e in &mut self.eles {
            if e.tok == Tok::StringConcat {
                e.tok = Tok::Add;
                e.text = "+".into();
            }
        }

        self.merge_continuations();
        self.drop_newline_after_comma();
        self.flatten_parameter();

        // `.TRUE.` / `.FALSE.` lower to the target literals.
        for e in &mut self.eles {
            if e.tok == Tok::Ident {
                match e.text.to_ascii_uppercase().as_str() {
                    ".TRUE." => e.text = "true".into(),
                    ".FALSE." => e.text = "false".into(),
                    _ => {}
                }
            }
        }
    }

    /// `GO` `TO` → single `GOTO` element.
    fn fuse_goto(&mut self) {
        let mut i = 0;
        while i + 1 < self.eles.len() {
            let is_go = self.eles[i].tok == Tok::Ident
                && self.eles[i].text.eq_ignore_ascii_case("GO");
            let is_to = self.eles[i + 1].tok == Tok::Ident
                && self.eles[i + 1].text.eq_ignore_ascii_case("TO");
            if is_go && is_to {
                self.eles[i].tok = Tok::Goto;
                self.eles[i].text = "goto".into();
                self.eles.remove(i + 1);
                continue;
            }
            i += 1;
        }
    }

    /// `END SUBROUTINE` / `END IF` / `END DO` / `ENDDO` → bare `END`.
    fn collapse_end(&mut self) {
        for e in &mut self.eles {
            if e.tok == Tok::EndDo {
                e.tok = Tok::End;
                e.text = "END".into();
            }
        }
        let mut i = 0;
        while i < self.eles.len() {
            if self.eles[i].tok == Tok::End {
                while i + 1 < self.eles.len() && self.eles[i + 1].tok != Tok::NewLine {
                    self.eles.remove(i + 1);
                }
            }
            i += 1;
        }
    }

    /// `ELSEIF` → `ELSE` `IF`.
    fn expand_elseif(&mut self) {
        let mut i = 0;
        while i < self.eles.len() {
            if self.eles[i].tok == Tok::ElseIf {
                let pos = self.eles[i].pos;
                self.eles[i] = Elem::new(Tok::Else, "ELSE", pos);
                self.eles.insert(i + 1, Elem::new(Tok::If, "IF", pos));
            }
            i += 1;
        }
    }

    /// A line whose first element starts in column 6 continues the
    /// previous line: both the separating newline and the continuation
    /// marker element are removed.
    fn merge_continuations(&mut self) {
        let mut i = 0;
        while i < self.eles.len() {
            if self.eles[i].tok == Tok::NewLine
                && i + 1 < self.eles.len()
                && self.eles[i + 1].pos.col == 6
            {
                self.eles.drain(i..=i + 1);
                continue;
            }
            i += 1;
        }
    }

    /// A newline directly after a comma continues an argument list.
    fn drop_newline_after_comma(&mut self) {
        let mut i = 0;
        while i < self.eles.len() {
            if self.eles[i].tok == Tok::Comma
                && i + 1 < self.eles.len()
                && self.eles[i + 1].tok == Tok::NewLine
            {
                self.eles.remove(i + 1);
                continue;
            }
            i += 1;
        }
    }

    /// `PARAMETER ( A = ..., B = ... )` → one assignment line per
    /// constant. The keyword, outer parentheses and top-level commas all
    /// become newlines, which the statement parser reads as plain
    /// assignments.
    fn flatten_parameter(&mut self) {
        let mut i = 0;
        while i < self.eles.len() {
            let at_line_start = i == 0 || self.eles[i - 1].tok == Tok::NewLine;
            if self.eles[i].tok != Tok::Parameter || !at_line_start {
                i += 1;
                continue;
            }
            if i + 1 >= self.eles.len() || self.eles[i + 1].tok != Tok::LParen {
                // Not the form this pass flattens; the parser will report it.
                i += 1;
                continue;
            }
            let pos = self.eles[i].pos;
            self.eles[i] = Elem::new(Tok::NewLine, "\n", pos);
            self.eles[i + 1] = Elem::new(Tok::NewLine, "\n", pos);
            let mut counter = 1usize;
            let mut j = i + 2;
            while j < self.eles.len() {
                match self.eles[j].tok {
                    Tok::NewLine => break,
                    Tok::LParen => counter += 1,
                    Tok::RParen => {
                        counter -= 1;
                        if counter == 0 {
                            self.eles[j] = Elem::new(Tok::NewLine, "\n", pos);
                            break;
                        }
                    }
                    Tok::Comma if counter == 1 => {
                        self.eles[j] = Elem::new(Tok::NewLine, "\n", pos);
                    }
                    _ => {}
                }
                j += 1;
            }
            i += 1;
        }
    }

    /// Delimit the stream: a leading `NEW_LINE` and a trailing `EOF`, so
    /// every logical line sits between two separators.
    fn seal(&mut self) {
        if self.eles.first().map(|e| e.tok) != Some(Tok::NewLine) {
            self.eles
                .insert(0, Elem::new(Tok::NewLine, "\n", Position::new(1, 1)));
        }
        self.eles.push(Elem::new(Tok::Eof, "", Position::DUMMY));
    }
}
