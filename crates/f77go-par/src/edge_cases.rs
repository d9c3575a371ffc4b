//! End-to-end translation tests: Fortran source in, emitted Go out.
//!
//! Sources are built line by line with `concat!` because fixed form is
//! column-sensitive: labels live in columns 1-5 and column 6 marks a
//! continuation.

use f77go_gen::emit;

use crate::parse;

fn translate(src: &str) -> (String, Vec<String>) {
    let result = parse(src.as_bytes()).expect("translation succeeds");
    let diags = result.diags.iter().map(|d| d.to_string()).collect();
    (emit(&result.file), diags)
}

fn translate_clean(src: &str) -> String {
    let (out, diags) = translate(src);
    assert!(diags.is_empty(), "unexpected diagnostics: {diags:?}");
    out
}

#[test]
fn scalar_argument_becomes_pointer() {
    let out = translate_clean(concat!(
        "      SUBROUTINE F ( N )\n",
        "      INTEGER N\n",
        "      N = N + 1\n",
        "      RETURN\n",
        "      END\n",
    ));
    assert!(out.contains("func F(N *int) {"), "{out}");
    assert!(out.contains("\t*N = *N + 1\n"), "{out}");
    assert!(out.contains("\treturn\n"), "{out}");
}

#[test]
fn program_becomes_main_with_commented_label() {
    let out = translate_clean(concat!(
        "      PROGRAM P\n",
        "      INTEGER I\n",
        "      DO 10 I = 1, 3\n",
        "   10 CONTINUE\n",
        "      END\n",
    ));
    assert!(out.contains("func MAIN() {"), "{out}");
    assert!(out.contains("var I int"), "{out}");
    assert!(out.contains("for I = 1; I <= 3; I++ {"), "{out}");
    // declared, but the loop close already consumed its purpose
    assert!(out.contains("//Label10:"), "{out}");
}

#[test]
fn goto_preserves_used_label() {
    let out = translate_clean(concat!(
        "      SUBROUTINE G ( X )\n",
        "      INTEGER X\n",
        "      IF ( X .LE. 0 ) GO TO 99\n",
        "      X = 1\n",
        "   99 CONTINUE\n",
        "      END\n",
    ));
    assert!(out.contains("if *X <= 0 {"), "{out}");
    assert!(out.contains("goto Label99"), "{out}");
    assert!(out.contains("Label99:"), "{out}");
    assert!(!out.contains("//Label99:"), "{out}");
}

#[test]
fn write_with_format_label() {
    let out = translate_clean(concat!(
        "      SUBROUTINE W ( N )\n",
        "      INTEGER N\n",
        "      WRITE ( * , FMT = 9 ) N\n",
        "    9 FORMAT ( 'N=' , I3 )\n",
        "      END\n",
    ));
    assert!(out.contains("import \"fmt\""), "{out}");
    assert!(out.contains("fmt.Printf(\"N=%3d\\n\", *N)"), "{out}");
    // the FORMAT line disappears: no label statement for it
    assert!(!out.contains("Label9"), "{out}");
}

#[test]
fn write_list_directed() {
    let out = translate_clean(concat!(
        "      SUBROUTINE W ( A , B )\n",
        "      INTEGER A , B\n",
        "      WRITE ( * , * ) A , B\n",
        "      END\n",
    ));
    assert!(out.contains("fmt.Printf(\" %v %v\\n\", *A, *B)"), "{out}");
}

#[test]
fn data_statement_expands_to_assignments() {
    let out = translate_clean(concat!(
        "      SUBROUTINE D\n",
        "      REAL A , B\n",
        "      DATA A , B / 1.0 , 2.0 /\n",
        "      END\n",
    ));
    assert!(out.contains("var A float32"), "{out}");
    assert!(out.contains("A = 1.0"), "{out}");
    assert!(out.contains("B = 2.0"), "{out}");
}

#[test]
fn data_count_mismatch_is_diagnosed() {
    let (_, diags) = translate(concat!(
        "      SUBROUTINE D\n",
        "      REAL A , B\n",
        "      DATA A , B / 1.0 /\n",
        "      END\n",
    ));
    assert!(
        diags.iter().any(|d| d.contains("DATA")),
        "missing DATA diagnostic: {diags:?}"
    );
}

#[test]
fn computed_goto_becomes_switch() {
    let out = translate_clean(concat!(
        "      SUBROUTINE C ( K )\n",
        "      INTEGER K\n",
        "      GO TO ( 10 , 20 , 30 ) K\n",
        "   10 CONTINUE\n",
        "   20 CONTINUE\n",
        "   30 CONTINUE\n",
        "      END\n",
    ));
    assert!(out.contains("switch *K {"), "{out}");
    assert!(out.contains("case 1:\n\t\tgoto Label10"), "{out}");
    assert!(out.contains("case 2:\n\t\tgoto Label20"), "{out}");
    assert!(out.contains("case 3:\n\t\tgoto Label30"), "{out}");
    assert!(!out.contains("//Label10"), "{out}");
}

#[test]
fn comments_and_blank_lines_only() {
    let result = parse(b"C nothing here\n\nC more nothing\n").expect("translates");
    assert!(result.file.decls.is_empty());
    assert!(result.diags.is_empty());
}

#[test]
fn missing_unit_wraps_in_fake_main() {
    let (out, diags) = translate("      X = 1\n");
    assert!(out.contains("func MAIN() {"), "{out}");
    assert!(
        diags.iter().any(|d| d.contains("Add fake PROGRAM MAIN")),
        "{diags:?}"
    );
}

#[test]
fn function_result_renaming() {
    let out = translate_clean(concat!(
        "      DOUBLE PRECISION FUNCTION DSUM ( N )\n",
        "      INTEGER N\n",
        "      DSUM = N + 1\n",
        "      RETURN\n",
        "      END\n",
    ));
    assert!(
        out.contains("func DSUM(N int) (DSUM_RES float64) {"),
        "{out}"
    );
    assert!(out.contains("DSUM_RES = N + 1"), "{out}");
    assert!(!out.contains("\tDSUM = "), "{out}");
}

#[test]
fn external_declaration_drops_type_entry() {
    let out = translate_clean(concat!(
        "      SUBROUTINE S ( N )\n",
        "      INTEGER N\n",
        "      LOGICAL LSAME\n",
        "      EXTERNAL LSAME\n",
        "      N = 1\n",
        "      END\n",
    ));
    // LSAME described a function's return type, not a local
    assert!(!out.contains("var LSAME"), "{out}");
}

#[test]
fn intrinsic_names_are_calls_not_indexing() {
    let out = translate_clean(concat!(
        "      SUBROUTINE S ( A , B , C )\n",
        "      INTEGER A , B , C\n",
        "      INTRINSIC MAX\n",
        "      C = MAX ( A , B )\n",
        "      END\n",
    ));
    assert!(out.contains("*C = MAX(*A, *B)"), "{out}");
}

#[test]
fn array_parameter_stays_slice() {
    let out = translate_clean(concat!(
        "      SUBROUTINE AXPY ( N , X , Y )\n",
        "      INTEGER N , I\n",
        "      REAL X ( * ) , Y ( * )\n",
        "      DO 10 I = 1 , N\n",
        "      Y ( I ) = Y ( I ) + X ( I )\n",
        "   10 CONTINUE\n",
        "      END\n",
    ));
    assert!(
        out.contains("func AXPY(N *int, X []float32, Y []float32) {"),
        "{out}"
    );
    assert!(out.contains("for I = 1; I <= *N; I++ {"), "{out}");
    assert!(out.contains("Y[I - 1] = Y[I - 1] + X[I - 1]"), "{out}");
    assert!(out.contains("var I int"), "{out}");
}

#[test]
fn local_array_allocation() {
    let out = translate_clean(concat!(
        "      SUBROUTINE S\n",
        "      REAL WORK ( 10 )\n",
        "      WORK ( 1 ) = 0.0\n",
        "      END\n",
    ));
    assert!(out.contains("WORK := make([]float32, 10)"), "{out}");
    assert!(out.contains("WORK[1 - 1] = 0.0"), "{out}");
}

#[test]
fn call_rewrites_arguments() {
    let out = translate_clean(concat!(
        "      SUBROUTINE S ( INFO )\n",
        "      INTEGER INFO\n",
        "      CALL XERBLA ( 'CGEMM ' , INFO )\n",
        "      END\n",
    ));
    assert!(out.contains("XERBLA([]byte(\"CGEMM \"), &(*INFO))"), "{out}");
}

#[test]
fn block_if_with_else_chain() {
    let out = translate_clean(concat!(
        "      SUBROUTINE S ( K , R )\n",
        "      INTEGER K , R\n",
        "      IF ( K .EQ. 1 ) THEN\n",
        "      R = 1\n",
        "      ELSEIF ( K .EQ. 2 ) THEN\n",
        "      R = 2\n",
        "      ELSE\n",
        "      R = 3\n",
        "      END IF\n",
        "      END\n",
    ));
    assert!(out.contains("if *K == 1 {"), "{out}");
    assert!(out.contains("} else if *K == 2 {"), "{out}");
    assert!(out.contains("} else {"), "{out}");
}

#[test]
fn do_while_loop() {
    let out = translate_clean(concat!(
        "      SUBROUTINE S ( N )\n",
        "      INTEGER N\n",
        "      DO WHILE ( N .GT. 0 )\n",
        "      N = N - 1\n",
        "      END DO\n",
        "      END\n",
    ));
    assert!(out.contains("for *N > 0 {"), "{out}");
    assert!(out.contains("*N = *N - 1"), "{out}");
}

#[test]
fn do_with_explicit_step() {
    let out = translate_clean(concat!(
        "      SUBROUTINE S ( N )\n",
        "      INTEGER N , I\n",
        "      DO 10 I = N , 1 , -1\n",
        "   10 CONTINUE\n",
        "      END\n",
    ));
    assert!(out.contains("for I = *N; I <= 1; I += -1 {"), "{out}");
}

#[test]
fn parameter_constants_become_assignments() {
    let out = translate_clean(concat!(
        "      SUBROUTINE S ( X )\n",
        "      REAL X , ONE\n",
        "      PARAMETER ( ONE = 1.0E+0 )\n",
        "      X = ONE\n",
        "      END\n",
    ));
    assert!(out.contains("ONE = 1.0E+0"), "{out}");
    assert!(out.contains("*X = ONE"), "{out}");
}

#[test]
fn continuation_line_in_call() {
    let out = translate_clean(concat!(
        "      SUBROUTINE S ( A , B )\n",
        "      INTEGER A , B\n",
        "      CALL FOO ( A ,\n",
        "     $ B )\n",
        "      END\n",
    ));
    assert!(out.contains("FOO(&(*A), &(*B))"), "{out}");
}

#[test]
fn stop_translates_to_return() {
    let out = translate_clean(concat!("      PROGRAM P\n", "      STOP\n", "      END\n"));
    assert!(out.contains("\treturn\n"), "{out}");
}

#[test]
fn unsupported_write_unit_is_diagnosed() {
    let result = parse(concat!(
        "      SUBROUTINE S\n",
        "      WRITE ( 6 , * ) X\n",
        "      END\n",
    ).as_bytes())
    .expect("recoverable");
    assert!(result
        .diags
        .iter()
        .any(|d| d.to_string().contains("WRITE")));
}

#[test]
fn deterministic_output() {
    let src = concat!(
        "      SUBROUTINE W ( N )\n",
        "      INTEGER N\n",
        "      WRITE ( * , FMT = 9 ) N\n",
        "    9 FORMAT ( 'N=' , I3 )\n",
        "      END\n",
    );
    let (first, _) = translate(src);
    let (second, _) = translate(src);
    assert_eq!(first, second);
}

#[test]
fn every_parameter_gets_a_concrete_type() {
    let result = parse(concat!(
        "      SUBROUTINE S ( A , B , C )\n",
        "      REAL A ( * ) , B\n",
        "      INTEGER C\n",
        "      END\n",
    ).as_bytes())
    .expect("translates");
    let params = &result.file.decls[0].params;
    for p in params {
        assert!(!p.typ.is_empty());
    }
    assert_eq!(params[0].typ, "[]float32");
    assert_eq!(params[1].typ, "*float32");
    assert_eq!(params[2].typ, "*int");
}
