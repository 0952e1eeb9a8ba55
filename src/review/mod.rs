//! Static review of a parsed program before verification
//!
//! Currently a single pass: definite assignment. Every problem is written to
//! the diagnostics sink; the returned error only says how many there were.

use crate::ast::{Block, Location};
use crate::diagnostics::{Diagnostics, Phase};

mod assignment;

pub use assignment::AssignmentChecker;

pub type ReviewResult<T> = Result<T, ReviewError>;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ReviewError {
    #[error("use of variable '{name}' before definite assignment at {location}")]
    UseBeforeAssignment { name: String, location: Location },
    #[error("{0} variable(s) used before definite assignment")]
    Unassigned(usize),
}

/// Review the program, reporting each violation as a severe diagnostic
pub fn review(program: &Block, diagnostics: &mut Diagnostics) -> ReviewResult<()> {
    log::debug!("review start: statements={}", program.statements.len());
    let mut checker = AssignmentChecker::new();
    let violations = checker.check(program);
    for violation in &violations {
        let location = match violation {
            ReviewError::UseBeforeAssignment { location, .. } => Some(*location),
            ReviewError::Unassigned(_) => None,
        };
        diagnostics.severe(Phase::Review, violation.to_string(), location);
    }
    if violations.is_empty() {
        log::debug!("review end: ok");
        Ok(())
    } else {
        Err(ReviewError::Unassigned(violations.len()))
    }
}

/// True if every variable read is definitely assigned on all paths to it
pub fn check_definite_assignment(program: &Block, diagnostics: &mut Diagnostics) -> bool {
    review(program, diagnostics).is_ok()
}
