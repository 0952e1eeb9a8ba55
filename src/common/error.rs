use thiserror::Error;

use crate::parser::span::Location;
use crate::parser::trie::TrieError;
use crate::rt::RuntimeError;
use crate::verify::solver::SolverError;

/// Result type for wpc operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the wpc pipeline
///
/// Phases that report user-facing problems write them to a
/// [`Diagnostics`](crate::diagnostics::Diagnostics) sink first; the variant
/// returned here only summarises why the pipeline stopped.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Lexicon error: {0}")]
    Lexicon(#[from] TrieError),

    #[error("Parse failed with {errors} error(s)")]
    Parse { errors: usize },

    #[error("Definite assignment failed with {errors} error(s)")]
    DefiniteAssignment { errors: usize },

    #[error("Verification error: {message}")]
    Verification { message: String },

    #[error("Runtime error: {0}")]
    Runtime(#[from] RuntimeError),

    #[error("Solver error: {0}")]
    Solver(#[from] SolverError),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl Error {
    /// Create a verification error
    pub fn verification_error(message: impl Into<String>) -> Self {
        Self::Verification { message: message.into() }
    }

    /// Create a configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::Config { message: message.into() }
    }

    /// Create an internal error
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into() }
    }

    /// Source location attached to the error, if any
    pub fn location(&self) -> Option<Location> {
        match self {
            Error::Runtime(err) => Some(err.location()),
            _ => None,
        }
    }
}
