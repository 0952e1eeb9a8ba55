//! Static verification of `check` statements
//!
//! The backward [`WpEngine`] turns a program into one obligation; a
//! [`Solver`](solver::Solver) decides whether its negation is satisfiable.
//! Counterexamples are replayed concretely to point at the failing check.

pub mod engine;
pub mod formula;
pub mod replay;
pub mod solver;
mod verifier;

pub use engine::WpEngine;
pub use formula::{Formula, Rel, Term};
pub use verifier::{verify_program, Failure, FailureReason, Verdict, Verifier};
