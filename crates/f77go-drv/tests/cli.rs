//! Integration tests for the `f77go` binary.

use assert_cmd::Command;
use predicates::prelude::*;

const DAXPY_STYLE: &str = concat!(
    "      SUBROUTINE SCALE ( N , ALPHA , X )\n",
    "      INTEGER N , I\n",
    "      REAL ALPHA , X ( * )\n",
    "      DO 10 I = 1 , N\n",
    "      X ( I ) = ALPHA * X ( I )\n",
    "   10 CONTINUE\n",
    "      RETURN\n",
    "      END\n",
);

#[test]
fn translates_a_kernel_to_go() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("scale.f");
    std::fs::write(&input, DAXPY_STYLE).expect("write input");

    Command::cargo_bin("f77go")
        .expect("binary")
        .arg(&input)
        .assert()
        .success();

    let output = dir.path().join("scale.go");
    let go = std::fs::read_to_string(&output).expect("output written");
    assert!(go.starts_with("package main\n"), "{go}");
    assert!(go.contains("func SCALE(N *int, ALPHA *float32, X []float32) {"), "{go}");
    assert!(go.contains("X[I - 1] = *ALPHA * X[I - 1]"), "{go}");
}

#[test]
fn respects_output_flag() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("scale.f");
    let output = dir.path().join("out/translated.go");
    std::fs::create_dir(dir.path().join("out")).expect("mkdir");
    std::fs::write(&input, DAXPY_STYLE).expect("write input");

    Command::cargo_bin("f77go")
        .expect("binary")
        .arg(&input)
        .arg("--output")
        .arg(&output)
        .assert()
        .success();

    assert!(output.exists());
}

#[test]
fn diagnostics_set_exit_code() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("loose.f");
    // top-level statement: translated, but only by fabricating a main
    std::fs::write(&input, "      X = 1\n").expect("write input");

    Command::cargo_bin("f77go")
        .expect("binary")
        .arg(&input)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Add fake PROGRAM MAIN"));

    // the translation is still emitted
    let go = std::fs::read_to_string(dir.path().join("loose.go")).expect("output");
    assert!(go.contains("func MAIN() {"), "{go}");
}

#[test]
fn missing_input_is_an_error() {
    Command::cargo_bin("f77go")
        .expect("binary")
        .arg("no-such-file.f")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("cannot read"));
}

#[test]
fn comment_only_source_is_clean() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("comments.f");
    std::fs::write(&input, "C nothing but commentary\n").expect("write input");

    Command::cargo_bin("f77go")
        .expect("binary")
        .arg(&input)
        .assert()
        .success()
        .stderr(predicate::str::is_empty());
}
