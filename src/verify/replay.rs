//! Locate the failing `check` for a counterexample by running the program
//!
//! Free variables start at their model values; each `<< x` is answered with
//! the model's value for the fresh constant the engine introduced there.

use std::collections::HashMap;
use std::io;

use num_bigint::BigInt;
use num_traits::Zero;

use crate::ast::{Block, Location};
use crate::rt::{InputSource, Interpreter, RuntimeError};
use crate::verify::engine::input_symbol;
use crate::verify::solver::Model;

struct ModelInput<'m> {
    model: &'m Model,
}

impl InputSource for ModelInput<'_> {
    fn read_line(&mut self, variable: &str, location: Location) -> io::Result<Option<String>> {
        Ok(Some(self.model.value(&input_symbol(variable, location)).to_string()))
    }
}

/// Location of the first `check` that fails under `model`, if any does
pub fn locate_failure(program: &Block, model: &Model) -> Option<Location> {
    let env: HashMap<String, BigInt> = model
        .iter()
        .filter(|(name, _)| !name.contains('@'))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect();
    let mut input = ModelInput { model };
    let mut sink = io::sink();
    let mut interpreter = Interpreter::new(&mut input, &mut sink)
        .with_runtime_checks(true)
        .with_env(env)
        .with_unassigned_default(BigInt::zero());

    match interpreter.run(program) {
        Err(RuntimeError::CheckFailed { location }) => Some(location),
        Err(other) => {
            log::debug!("replay stopped without reaching a failing check: {}", other);
            None
        }
        Ok(()) => {
            log::debug!("replay completed; model does not violate any check");
            None
        }
    }
}
