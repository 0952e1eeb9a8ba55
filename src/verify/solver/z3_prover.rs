//! Z3 backend
//!
//! Each query runs in its own context, so nothing carries over between
//! obligations. Shared formula nodes are translated once.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use num_bigint::BigInt;
use z3::ast::{Ast, Bool, Int};
use z3::{Context, Params};

use super::{Model, SatResult, Solver, SolverError};
use crate::verify::formula::{Formula, FormulaKind, Rel, Term, TermKind};

#[derive(Debug, Clone)]
pub struct Z3Prover {
    timeout: Duration,
}

impl Z3Prover {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Deadline in z3's unit; zero would mean "no deadline" to z3
    fn timeout_ms(&self) -> u32 {
        u32::try_from(self.timeout.as_millis()).unwrap_or(u32::MAX).max(1)
    }
}

impl Solver for Z3Prover {
    fn name(&self) -> &str {
        "z3"
    }

    fn check_sat(&mut self, formula: &Formula) -> Result<SatResult, SolverError> {
        let cfg = z3::Config::new();
        let ctx = Context::new(&cfg);
        let solver = z3::Solver::new(&ctx);

        let mut params = Params::new(&ctx);
        params.set_u32("timeout", self.timeout_ms());
        // same answer and model on every run
        params.set_u32("smt.random_seed", 0);
        params.set_u32("sat.random_seed", 0);
        solver.set_params(&params);

        let mut translator = Translator::new(&ctx);
        let query = translator.formula(formula)?;
        solver.assert(&query);
        log::trace!("z3 query over {} constant(s)", translator.constants.len());

        match solver.check() {
            z3::SatResult::Unsat => Ok(SatResult::Unsat),
            z3::SatResult::Sat => {
                let model = match solver.get_model() {
                    Some(found) => Some(translator.read_model(&found)?),
                    None => None,
                };
                Ok(SatResult::Sat(model))
            }
            z3::SatResult::Unknown => {
                let reason = solver.get_reason_unknown().unwrap_or_else(|| "unknown".to_string());
                log::debug!("z3 gave up: {}", reason);
                Ok(SatResult::Unknown(reason))
            }
        }
    }
}

struct Translator<'ctx> {
    ctx: &'ctx Context,
    constants: BTreeMap<String, Int<'ctx>>,
    terms: HashMap<*const TermKind, Int<'ctx>>,
    formulas: HashMap<*const FormulaKind, Bool<'ctx>>,
}

impl<'ctx> Translator<'ctx> {
    fn new(ctx: &'ctx Context) -> Self {
        Self { ctx, constants: BTreeMap::new(), terms: HashMap::new(), formulas: HashMap::new() }
    }

    fn constant(&mut self, name: &str) -> Int<'ctx> {
        let ctx = self.ctx;
        self.constants.entry(name.to_string()).or_insert_with(|| Int::new_const(ctx, name)).clone()
    }

    fn term(&mut self, term: &Term) -> Result<Int<'ctx>, SolverError> {
        let key: *const TermKind = term.kind();
        if let Some(done) = self.terms.get(&key) {
            return Ok(done.clone());
        }
        let result = match term.kind() {
            TermKind::Const(value) => match i64::try_from(value) {
                Ok(small) => Int::from_i64(self.ctx, small),
                Err(_) => Int::from_str(self.ctx, &value.to_string())
                    .ok_or_else(|| SolverError::Encoding(format!("integer literal {} rejected", value)))?,
            },
            TermKind::Var(name) => self.constant(name),
            TermKind::Add(a, b) => {
                let (a, b) = (self.term(a)?, self.term(b)?);
                Int::add(self.ctx, &[&a, &b])
            }
            TermKind::Sub(a, b) => {
                let (a, b) = (self.term(a)?, self.term(b)?);
                Int::sub(self.ctx, &[&a, &b])
            }
            TermKind::Mul(a, b) => {
                let (a, b) = (self.term(a)?, self.term(b)?);
                Int::mul(self.ctx, &[&a, &b])
            }
            TermKind::Neg(a) => self.term(a)?.unary_minus(),
        };
        self.terms.insert(key, result.clone());
        Ok(result)
    }

    fn formula(&mut self, formula: &Formula) -> Result<Bool<'ctx>, SolverError> {
        let key: *const FormulaKind = formula.kind();
        if let Some(done) = self.formulas.get(&key) {
            return Ok(done.clone());
        }
        let result = match formula.kind() {
            FormulaKind::True => Bool::from_bool(self.ctx, true),
            FormulaKind::False => Bool::from_bool(self.ctx, false),
            FormulaKind::Cmp(rel, a, b) => {
                let (a, b) = (self.term(a)?, self.term(b)?);
                match rel {
                    Rel::Gt => a.gt(&b),
                    Rel::Eq => a._eq(&b),
                    Rel::Lt => a.lt(&b),
                }
            }
            FormulaKind::Not(a) => self.formula(a)?.not(),
            FormulaKind::And(a, b) => {
                let (a, b) = (self.formula(a)?, self.formula(b)?);
                Bool::and(self.ctx, &[&a, &b])
            }
            FormulaKind::Or(a, b) => {
                let (a, b) = (self.formula(a)?, self.formula(b)?);
                Bool::or(self.ctx, &[&a, &b])
            }
            FormulaKind::Implies(a, b) => {
                let (a, b) = (self.formula(a)?, self.formula(b)?);
                a.implies(&b)
            }
        };
        self.formulas.insert(key, result.clone());
        Ok(result)
    }

    fn read_model(&self, found: &z3::Model<'ctx>) -> Result<Model, SolverError> {
        let mut model = Model::new();
        for (name, constant) in &self.constants {
            let value = found
                .eval(constant, true)
                .ok_or_else(|| SolverError::Encoding(format!("no value for '{}' in the model", name)))?;
            model.insert(name.clone(), int_value(&value)?);
        }
        Ok(model)
    }
}

/// Value of a numeral, which z3 prints as `42` or `(- 42)` once it outgrows i64
fn int_value(numeral: &Int<'_>) -> Result<BigInt, SolverError> {
    if let Some(small) = numeral.as_i64() {
        return Ok(BigInt::from(small));
    }
    let text = numeral.to_string();
    let parsed = match text.strip_prefix("(-").and_then(|rest| rest.strip_suffix(')')) {
        Some(magnitude) => magnitude.trim().parse::<BigInt>().map(|m| -m),
        None => text.trim().parse::<BigInt>(),
    };
    parsed.map_err(|_| SolverError::Encoding(format!("'{}' is not an integer numeral", text)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_timeout_still_gives_z3_a_deadline() {
        assert_eq!(Z3Prover::new(Duration::ZERO).timeout_ms(), 1);
        assert_eq!(Z3Prover::new(Duration::from_secs(2)).timeout_ms(), 2_000);
    }

    #[test]
    fn large_literals_survive_translation() {
        let big: BigInt = "123456789012345678901234567890".parse().unwrap();
        let x = Term::var("x");
        let query = Formula::cmp(Rel::Eq, x, Term::constant(-big.clone()));
        match Z3Prover::new(Duration::from_secs(10)).check_sat(&query).unwrap() {
            SatResult::Sat(Some(model)) => assert_eq!(model.value("x"), -big),
            other => panic!("expected a model, got {:?}", other),
        }
    }
}
