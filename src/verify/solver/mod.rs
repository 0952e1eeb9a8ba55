//! Satisfiability backends
//!
//! The verifier only ever asks one question: is this formula satisfiable?
//! Backends answer through the [`Solver`] trait; z3 is linked in and is the
//! one the pipeline uses.

pub mod z3_prover;

use std::collections::BTreeMap;
use std::fmt;

use num_bigint::BigInt;
use num_traits::Zero;
use thiserror::Error;

use crate::common::config::Config;
use crate::verify::formula::Formula;

pub use z3_prover::Z3Prover;

/// Integer assignment to the free symbols of a formula
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Model {
    values: BTreeMap<String, BigInt>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: BigInt) {
        self.values.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&BigInt> {
        self.values.get(name)
    }

    /// Value of `name`; symbols the model leaves open are zero
    pub fn value(&self, name: &str) -> BigInt {
        self.values.get(name).cloned().unwrap_or_else(BigInt::zero)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &BigInt)> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Keep only the symbols `keep` accepts
    pub fn retain<F: FnMut(&str) -> bool>(&mut self, mut keep: F) {
        self.values.retain(|name, _| keep(name));
    }
}

impl FromIterator<(String, BigInt)> for Model {
    fn from_iter<I: IntoIterator<Item = (String, BigInt)>>(iter: I) -> Self {
        Self { values: iter.into_iter().collect() }
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.values.iter().map(|(k, v)| format!("{} = {}", k, v)).collect();
        f.write_str(&parts.join(", "))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SatResult {
    Unsat,
    /// Satisfiable, with a model when the backend produced one
    Sat(Option<Model>),
    /// Undecided (timeout, incompleteness, solver said `unknown`)
    Unknown(String),
}

#[derive(Error, Debug)]
pub enum SolverError {
    #[error("cannot encode query: {0}")]
    Encoding(String),

    #[error("unexpected solver answer: {0}")]
    Protocol(String),
}

pub trait Solver {
    /// Short name for logs
    fn name(&self) -> &str;

    fn check_sat(&mut self, formula: &Formula) -> Result<SatResult, SolverError>;
}

/// Backend selected by the configuration
pub fn from_config(config: &Config) -> Box<dyn Solver> {
    Box::new(Z3Prover::new(config.solver_timeout))
}
