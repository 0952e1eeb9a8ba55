//! wpc: a verifying compiler for a small imperative language
//!
//! Programs are a single block of assignments, `if`/`else`, `check(...)`
//! assertions, `print(x)` and `<< x` input. Before anything runs, every
//! `check` is proven to hold on all paths by weakest-precondition calculus
//! and a satisfiability query.
//!
//! ## Architecture
//!
//! - **parser**: prefix-trie scanner and recursive-descent parser
//! - **ast**: immutable syntax tree and the visitor protocol
//! - **review**: definite-assignment analysis
//! - **verify**: backward WP engine, solver backends, verdicts
//! - **rt**: interpreter for verified programs
//! - **suite**: directory-driven pass/fail program suite
//!
//! ## Pipeline
//!
//! ```text
//! Source → Scanner → Parser → AST → Review → WP engine → Solver → Verdict
//!                                                          ↓
//!                                                     Interpreter
//! ```

pub mod ast;
pub mod common;
pub mod diagnostics;
pub mod parser;
pub mod review;
pub mod rt;
pub mod suite;
pub mod verify;

pub use common::{config, consts, error};
pub use common::{Config, Error, Result};
pub use diagnostics::{Diagnostic, Diagnostics, Phase, Severity};
pub use verify::{Verdict, WpEngine};

use std::io::Write;
use std::path::Path;

use ast::Block;
use parser::TokenTrie;
use rt::{InputSource, Interpreter, StdinInput};

/// Scan and parse `source`; any lexical or syntax error fails the parse
pub fn parse_source(source: &str, config: &Config, diagnostics: &mut Diagnostics) -> Result<Block> {
    let trie = TokenTrie::standard()?;
    log::info!("Phase 1: parsing");
    let program = parser::parse_strict(source, &trie, config.max_parse_errors, diagnostics)?;
    log::debug!("parsed {} top-level statement(s)", program.statements.len());
    Ok(program)
}

/// Parse, review and verify `source`
///
/// Parse and definite-assignment failures are errors; a program that simply
/// fails to verify comes back as `Verdict::NotVerified`.
pub fn check_source(source: &str, config: &Config, diagnostics: &mut Diagnostics) -> Result<(Block, Verdict)> {
    let program = parse_source(source, config, diagnostics)?;

    log::info!("Phase 2: definite assignment");
    if let Err(err) = review::review(&program, diagnostics) {
        log::debug!("review failed: {}", err);
        let errors = diagnostics.severe_count_in(Phase::Review);
        return Err(Error::DefiniteAssignment { errors });
    }

    log::info!("Phase 3: verification (deadline {:?})", config.solver_timeout);
    let verdict = verify::verify_program(&program, config, diagnostics)?;
    Ok((program, verdict))
}

/// Verify `source`, then execute it
pub fn run_source(
    source: &str,
    config: &Config,
    input: &mut dyn InputSource,
    output: &mut dyn Write,
    diagnostics: &mut Diagnostics,
) -> Result<Verdict> {
    let (program, verdict) = check_source(source, config, diagnostics)?;
    if !verdict.is_verified() {
        return Err(Error::verification_error("program could not be verified"));
    }

    log::info!("Phase 4: execution");
    let mut interpreter = Interpreter::new(input, output).with_runtime_checks(config.runtime_checks);
    if let Err(err) = interpreter.run(&program) {
        diagnostics.severe(Phase::Runtime, err.to_string(), Some(err.location()));
        return Err(err.into());
    }
    Ok(verdict)
}

/// Run the program in `path` against stdin and stdout
pub fn run_file(path: impl AsRef<Path>, config: &Config, diagnostics: &mut Diagnostics) -> Result<Verdict> {
    let path = path.as_ref();
    log::debug!("reading {}", path.display());
    let source = std::fs::read_to_string(path)?;
    let mut input = StdinInput::new();
    let stdout = std::io::stdout();
    let mut output = stdout.lock();
    run_source(&source, config, &mut input, &mut output, diagnostics)
}
