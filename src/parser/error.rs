use crate::parser::span::Location;
use std::fmt;

/// Syntax problems found while parsing
///
/// These are never returned through `Result`: the parser renders them into
/// the diagnostics sink and keeps going where it can.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Unexpected token encountered
    UnexpectedToken {
        expected: String,
        found: String,
        location: Location,
    },

    /// Unexpected end of input
    UnexpectedEndOfInput {
        expected: String,
        location: Location,
    },

    /// Input left over after the program block
    TrailingInput {
        found: String,
        location: Location,
    },

    /// Recovery budget exhausted
    TooManyErrors {
        limit: usize,
        location: Location,
    },

    /// Blocks or expressions nested past the parser's limit
    TooDeep {
        limit: usize,
        location: Location,
    },
}

impl ParseError {
    /// Create a new unexpected token error
    pub fn unexpected_token(expected: &str, found: &str, location: Location) -> Self {
        ParseError::UnexpectedToken {
            expected: expected.to_string(),
            found: found.to_string(),
            location,
        }
    }

    /// Create a new unexpected end of input error
    pub fn unexpected_end_of_input(expected: &str, location: Location) -> Self {
        ParseError::UnexpectedEndOfInput {
            expected: expected.to_string(),
            location,
        }
    }

    pub fn location(&self) -> Location {
        match self {
            ParseError::UnexpectedToken { location, .. }
            | ParseError::UnexpectedEndOfInput { location, .. }
            | ParseError::TrailingInput { location, .. }
            | ParseError::TooManyErrors { location, .. }
            | ParseError::TooDeep { location, .. } => *location,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::UnexpectedToken { expected, found, location } => {
                write!(f, "Expected {}, got `{}` at {}", expected, found, location)
            }
            ParseError::UnexpectedEndOfInput { expected, .. } => {
                write!(f, "Expected {}, reached end of file", expected)
            }
            ParseError::TrailingInput { found, location } => {
                write!(f, "Expected end of file, got `{}` at {}", found, location)
            }
            ParseError::TooManyErrors { limit, .. } => {
                write!(f, "Too many syntax errors ({}), giving up", limit)
            }
            ParseError::TooDeep { limit, location } => {
                write!(f, "Nesting deeper than {} levels at {}", limit, location)
            }
        }
    }
}

impl std::error::Error for ParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_what_was_expected() {
        let err = ParseError::unexpected_token("`}`", "x", Location::new(4, 2, 30));
        assert_eq!(err.to_string(), "Expected `}`, got `x` at line 4, column 2");

        let err = ParseError::unexpected_end_of_input("identifier", Location::new(9, 1, 80));
        assert_eq!(err.to_string(), "Expected identifier, reached end of file");
        assert_eq!(err.location(), Location::new(9, 1, 80));
    }
}
