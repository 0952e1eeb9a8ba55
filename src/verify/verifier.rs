use std::fmt;

use crate::ast::{Block, Location};
use crate::common::config::Config;
use crate::diagnostics::{Diagnostics, Phase};
use crate::error::Result;
use crate::verify::engine::{is_version, WpEngine};
use crate::verify::formula::Formula;
use crate::verify::replay::locate_failure;
use crate::verify::solver::{self, Model, SatResult, Solver};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// The solver found an assignment violating some check
    Counterexample,
    /// The solver could not decide (timeout, incompleteness)
    Unknown(String),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::Counterexample => f.write_str("counterexample found"),
            FailureReason::Unknown(reason) => write!(f, "could not prove ({})", reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub reason: FailureReason,
    pub model: Option<Model>,
    /// First `check` the model makes fail, when replay found one
    pub failed_check: Option<Location>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Verified,
    NotVerified(Failure),
}

impl Verdict {
    pub fn is_verified(&self) -> bool {
        matches!(self, Verdict::Verified)
    }

    pub fn failure(&self) -> Option<&Failure> {
        match self {
            Verdict::Verified => None,
            Verdict::NotVerified(failure) => Some(failure),
        }
    }
}

/// Decides validity of program obligations with one solver backend
pub struct Verifier {
    solver: Box<dyn Solver>,
}

impl Verifier {
    pub fn new(solver: Box<dyn Solver>) -> Self {
        Self { solver }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(solver::from_config(config))
    }

    pub fn verify(&mut self, program: &Block, diagnostics: &mut Diagnostics) -> Result<Verdict> {
        let obligation = WpEngine::obligation(program)?;
        self.decide(program, &obligation, diagnostics)
    }

    /// Validity of `obligation`, reported against `program`
    pub fn decide(&mut self, program: &Block, obligation: &Formula, diagnostics: &mut Diagnostics) -> Result<Verdict> {
        if obligation.is_true() {
            diagnostics.info(Phase::Verifier, "all checks hold by simplification", None);
            return Ok(Verdict::Verified);
        }

        let query = Formula::not(obligation.clone());
        log::debug!("asking {} for a model of the negated obligation", self.solver.name());
        let verdict = match self.solver.check_sat(&query)? {
            SatResult::Unsat => {
                diagnostics.info(Phase::Verifier, "all checks verified", None);
                Verdict::Verified
            }
            SatResult::Sat(mut model) => {
                if let Some(found) = model.as_mut() {
                    found.retain(|name| !is_version(name));
                }
                let failed_check = model.as_ref().and_then(|m| locate_failure(program, m));
                let message = match (&model, failed_check) {
                    (Some(m), Some(at)) => format!("check at {} can fail, e.g. with {}", at, describe(m)),
                    (Some(m), None) => format!("program could not be verified, e.g. with {}", describe(m)),
                    (None, _) => "program could not be verified".to_string(),
                };
                diagnostics.severe(Phase::Verifier, message, failed_check);
                Verdict::NotVerified(Failure { reason: FailureReason::Counterexample, model, failed_check })
            }
            SatResult::Unknown(reason) => {
                diagnostics.severe(
                    Phase::Verifier,
                    format!("could not prove program correct: {}", reason),
                    None,
                );
                Verdict::NotVerified(Failure { reason: FailureReason::Unknown(reason), model: None, failed_check: None })
            }
        };
        Ok(verdict)
    }
}

fn describe(model: &Model) -> String {
    if model.is_empty() {
        "any input".to_string()
    } else {
        model.to_string()
    }
}

/// Verify `program` with the backend chosen by `config`
pub fn verify_program(program: &Block, config: &Config, diagnostics: &mut Diagnostics) -> Result<Verdict> {
    Verifier::from_config(config).verify(program, diagnostics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse_strict, TokenTrie};
    use crate::verify::solver::SolverError;
    use num_bigint::BigInt;

    struct Scripted(Option<SatResult>);

    impl Solver for Scripted {
        fn name(&self) -> &str {
            "scripted"
        }

        fn check_sat(&mut self, _formula: &Formula) -> std::result::Result<SatResult, SolverError> {
            self.0.take().ok_or_else(|| SolverError::Protocol("asked twice".to_string()))
        }
    }

    fn program(source: &str) -> Block {
        let trie = TokenTrie::standard().unwrap();
        parse_strict(source, &trie, 10, &mut Diagnostics::new()).unwrap()
    }

    #[test]
    fn unknown_is_not_verified() {
        let mut verifier = Verifier::new(Box::new(Scripted(Some(SatResult::Unknown("timeout".into())))));
        let mut diag = Diagnostics::new();
        let verdict = verifier.verify(&program("{ check(x * x > y) }"), &mut diag).unwrap();
        assert!(!verdict.is_verified());
        assert!(diag.mentions("timeout"));
    }

    #[test]
    fn trivial_obligation_skips_solver() {
        let mut verifier = Verifier::new(Box::new(Scripted(None)));
        let verdict = verifier.verify(&program("{ x := 3 check(x > 2) }"), &mut Diagnostics::new()).unwrap();
        assert_eq!(verdict, Verdict::Verified);
    }

    #[test]
    fn counterexample_is_located() {
        let source = "{\n  x := 1\n  check(x > 0)\n  check(y > x)\n}";
        let model: Model = [("y".to_string(), BigInt::from(0))].into_iter().collect();
        let mut verifier = Verifier::new(Box::new(Scripted(Some(SatResult::Sat(Some(model))))));
        let mut diag = Diagnostics::new();
        let verdict = verifier.verify(&program(source), &mut diag).unwrap();
        let failure = verdict.failure().unwrap();
        assert_eq!(failure.reason, FailureReason::Counterexample);
        assert_eq!(failure.failed_check.map(|l| l.line), Some(4));
        assert!(diag.has_severe());
    }
}
