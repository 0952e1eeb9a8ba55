//! Parser module
//!
//! This module handles lexical analysis and parsing of source text into the
//! AST. The fixed-lexeme trie is built by the caller and shared by every
//! scanner; diagnostics go to the caller's sink.

pub mod error;
pub mod lexer;
pub mod parser;
pub mod span;
pub mod trie;

pub use error::ParseError;
pub use lexer::{tokenize, LexicalToken, Scanner, Symbol, TokenKind};
pub use parser::Parser;
pub use span::{HasLocation, LocatedChar, LocatedText, Location};
pub use trie::{TokenTrie, TrieError};

use crate::ast::Block;
use crate::diagnostics::{Diagnostics, Phase};
use crate::error::{Error, Result};

/// Parse a program, reporting every syntax problem into `diagnostics`.
///
/// The tree is returned whenever the top-level block could be built, even if
/// it contains error nodes; check `diagnostics.has_severe()` before using it.
pub fn parse_program(source: &str, trie: &TokenTrie, max_errors: usize, diagnostics: &mut Diagnostics) -> Option<Block> {
    Parser::new(source, trie, diagnostics).with_max_errors(max_errors).parse_program()
}

/// Parse a program that must be free of lexical and syntax errors
pub fn parse_strict(source: &str, trie: &TokenTrie, max_errors: usize, diagnostics: &mut Diagnostics) -> Result<Block> {
    let block = parse_program(source, trie, max_errors, diagnostics);
    let errors = diagnostics.severe_count_in(Phase::Scanner) + diagnostics.severe_count_in(Phase::Parser);
    match block {
        Some(block) if errors == 0 => Ok(block),
        _ => Err(Error::Parse { errors: errors.max(1) }),
    }
}
