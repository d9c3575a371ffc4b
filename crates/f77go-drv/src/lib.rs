//! f77go-drv - Command-line driver.
//!
//! Maps input files to output files around the translation core: read
//! the source once, hand the byte buffer to the parser, pretty-print the
//! resulting tree, and report every diagnostic on stderr. The exit code
//! is 0 for a clean translation, 1 when diagnostics were produced, and
//! 2 for a fatal error (structural violation or I/O failure).

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

/// Translate fixed-form Fortran 77 into Go source.
#[derive(Parser, Debug)]
#[command(name = "f77go")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Translate fixed-form Fortran 77 into Go source", long_about = None)]
pub struct Cli {
    /// Input Fortran source file
    pub input: PathBuf,

    /// Output file (defaults to the input path with a .go extension)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true, env = "F77GO_VERBOSE")]
    pub verbose: bool,
}

/// Runs one translation. Returns the process exit code.
pub fn run(cli: &Cli) -> Result<i32> {
    let src = fs::read(&cli.input)
        .with_context(|| format!("cannot read {}", cli.input.display()))?;
    tracing::info!(file = %cli.input.display(), bytes = src.len(), "translating");

    match f77go_par::parse(&src) {
        Ok(result) => {
            for diag in &result.diags {
                eprintln!("{diag}");
            }
            let output = cli
                .output
                .clone()
                .unwrap_or_else(|| cli.input.with_extension("go"));
            let go = f77go_gen::emit(&result.file);
            fs::write(&output, go)
                .with_context(|| format!("cannot write {}", output.display()))?;
            tracing::info!(file = %output.display(), "wrote translation");
            Ok(if result.diags.is_empty() { 0 } else { 1 })
        }
        Err(err) => {
            let f77go_par::TranslateError { fatal, diags } = err;
            for diag in &diags {
                eprintln!("{diag}");
            }
            Err(anyhow::Error::new(fatal).context("translation aborted"))
        }
    }
}
