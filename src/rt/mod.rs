//! Concrete execution of verified programs

pub mod input;
pub mod interpreter;

pub use input::{InputSource, ScriptedInput, StdinInput};
pub use interpreter::Interpreter;

use thiserror::Error;

use crate::parser::span::Location;

#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("variable '{name}' read before assignment at {location}")]
    Unassigned { name: String, location: Location },

    #[error("check failed at {location}")]
    CheckFailed { location: Location },

    #[error("no input left for '{name}' at {location}")]
    EndOfInput { name: String, location: Location },

    #[error("I/O failed at {location}: {source}")]
    Io {
        location: Location,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid integer literal `{text}` at {location}")]
    InvalidLiteral { text: String, location: Location },

    #[error("cannot execute unparsed fragment `{text}` at {location}")]
    Unparsed { text: String, location: Location },

    #[error("evaluation stack underflow at {location}")]
    StackUnderflow { location: Location },
}

impl RuntimeError {
    pub fn location(&self) -> Location {
        match self {
            RuntimeError::Unassigned { location, .. }
            | RuntimeError::CheckFailed { location }
            | RuntimeError::EndOfInput { location, .. }
            | RuntimeError::Io { location, .. }
            | RuntimeError::InvalidLiteral { location, .. }
            | RuntimeError::Unparsed { location, .. }
            | RuntimeError::StackUnderflow { location } => *location,
        }
    }
}
