use std::collections::HashMap;
use std::io::Write;

use num_bigint::BigInt;

use crate::ast::*;

use super::input::InputSource;
use super::RuntimeError;

#[derive(Debug, Clone, Copy)]
struct BranchFrame {
    /// Enclosing code was executing when the `if` was reached
    live: bool,
    condition: bool,
    /// Branch blocks entered so far (0, 1 or 2)
    entered: u8,
}

/// Forward visitor that executes the program
///
/// Every node is still visited; nodes in the branch not taken (or after the
/// first failure) are skipped by the handlers themselves.
pub struct Interpreter<'io> {
    env: HashMap<String, BigInt>,
    input: &'io mut dyn InputSource,
    output: &'io mut dyn Write,
    runtime_checks: bool,
    unassigned_default: Option<BigInt>,
    ints: Vec<BigInt>,
    bools: Vec<bool>,
    active: Vec<bool>,
    branches: Vec<BranchFrame>,
    failure: Option<RuntimeError>,
}

impl<'io> Interpreter<'io> {
    pub fn new(input: &'io mut dyn InputSource, output: &'io mut dyn Write) -> Self {
        Self {
            env: HashMap::new(),
            input,
            output,
            runtime_checks: true,
            unassigned_default: None,
            ints: Vec::new(),
            bools: Vec::new(),
            active: Vec::new(),
            branches: Vec::new(),
            failure: None,
        }
    }

    pub fn with_runtime_checks(mut self, enabled: bool) -> Self {
        self.runtime_checks = enabled;
        self
    }

    /// Start from these variable values instead of an empty store
    pub fn with_env(mut self, env: HashMap<String, BigInt>) -> Self {
        self.env = env;
        self
    }

    /// Read never-assigned variables as `value` instead of failing
    pub fn with_unassigned_default(mut self, value: BigInt) -> Self {
        self.unassigned_default = Some(value);
        self
    }

    pub fn env(&self) -> &HashMap<String, BigInt> {
        &self.env
    }

    pub fn run(&mut self, program: &Block) -> Result<(), RuntimeError> {
        self.ints.clear();
        self.bools.clear();
        self.active.clear();
        self.branches.clear();
        self.failure = None;

        program.accept(self);
        match self.failure.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn live(&self) -> bool {
        self.failure.is_none() && self.active.last().copied().unwrap_or(true)
    }

    fn fail(&mut self, err: RuntimeError) {
        log::debug!("runtime failure: {}", err);
        if self.failure.is_none() {
            self.failure = Some(err);
        }
    }

    fn lookup(&mut self, name: &Ident) -> Option<BigInt> {
        if let Some(value) = self.env.get(name.text()) {
            return Some(value.clone());
        }
        if let Some(value) = &self.unassigned_default {
            return Some(value.clone());
        }
        self.fail(RuntimeError::Unassigned { name: name.text().to_string(), location: name.location() });
        None
    }

    fn pop_int(&mut self, location: Location) -> Option<BigInt> {
        let value = self.ints.pop();
        if value.is_none() {
            self.fail(RuntimeError::StackUnderflow { location });
        }
        value
    }

    fn pop_bool(&mut self, location: Location) -> Option<bool> {
        let value = self.bools.pop();
        if value.is_none() {
            self.fail(RuntimeError::StackUnderflow { location });
        }
        value
    }

    fn read_input(&mut self, input: &InputStmt) {
        let name = input.variable.text();
        loop {
            match self.input.read_line(name, input.location) {
                Ok(Some(line)) => match line.trim().parse::<BigInt>() {
                    Ok(value) => {
                        self.env.insert(name.to_string(), value);
                        return;
                    }
                    Err(_) => log::warn!("`{}` is not an integer; enter a value for {} again", line.trim(), name),
                },
                Ok(None) => {
                    self.fail(RuntimeError::EndOfInput { name: name.to_string(), location: input.location });
                    return;
                }
                Err(source) => {
                    self.fail(RuntimeError::Io { location: input.location, source });
                    return;
                }
            }
        }
    }
}

impl AstVisitor for Interpreter<'_> {
    fn enter_block(&mut self, block: &Block) {
        let failed = self.failure.is_some();
        let mut underflow = false;
        let active = match self.branches.last_mut() {
            Some(frame) if frame.entered < 2 => {
                frame.entered += 1;
                let first = frame.entered == 1;
                let live = frame.live && !failed;
                if first && live {
                    match self.bools.pop() {
                        Some(condition) => frame.condition = condition,
                        None => underflow = true,
                    }
                }
                // then runs on a true condition, else on a false one
                live && !underflow && frame.condition == first
            }
            _ => self.live(),
        };
        if underflow {
            self.fail(RuntimeError::StackUnderflow { location: block.location });
        }
        self.active.push(active);
    }

    fn exit_block(&mut self, _block: &Block) {
        self.active.pop();
    }

    fn enter_if(&mut self, _stmt: &IfStmt) {
        self.branches.push(BranchFrame { live: self.live(), condition: false, entered: 0 });
    }

    fn exit_if(&mut self, _stmt: &IfStmt) {
        self.branches.pop();
    }

    fn exit_assignment(&mut self, assignment: &Assignment) {
        if !self.live() {
            return;
        }
        if let Some(value) = self.pop_int(assignment.location) {
            self.env.insert(assignment.target.text().to_string(), value);
        }
    }

    fn exit_check(&mut self, check: &CheckStmt) {
        if !self.live() {
            return;
        }
        if let Some(holds) = self.pop_bool(check.location) {
            if self.runtime_checks && !holds {
                self.fail(RuntimeError::CheckFailed { location: check.location });
            }
        }
    }

    fn visit_print(&mut self, print: &PrintStmt) {
        if !self.live() {
            return;
        }
        if let Some(value) = self.lookup(&print.variable) {
            if let Err(source) = writeln!(self.output, "{}: {}", print.variable.text(), value) {
                self.fail(RuntimeError::Io { location: print.location, source });
            }
        }
    }

    fn visit_input(&mut self, input: &InputStmt) {
        if self.live() {
            self.read_input(input);
        }
    }

    fn visit_error(&mut self, error: &ErrorNode) {
        if self.live() {
            self.fail(RuntimeError::Unparsed {
                text: error.text.text().to_string(),
                location: error.text.location(),
            });
        }
    }

    fn exit_int_operator(&mut self, operator: &IntOperator) {
        if !self.live() {
            return;
        }
        let location = operator.location;
        let value = if operator.op.is_unary() {
            self.pop_int(location).map(|v| -v)
        } else {
            let right = self.pop_int(location);
            let left = self.pop_int(location);
            match (left, right) {
                (Some(l), Some(r)) => Some(match operator.op {
                    IntOp::Add => l + r,
                    IntOp::Sub => l - r,
                    IntOp::Mul => l * r,
                    IntOp::Negate => -r,
                }),
                _ => None,
            }
        };
        if let Some(value) = value {
            self.ints.push(value);
        }
    }

    fn exit_bool_operator(&mut self, operator: &BoolOperator) {
        if !self.live() {
            return;
        }
        let location = operator.location;
        let value = if operator.op.is_unary() {
            self.pop_bool(location).map(|b| !b)
        } else {
            let right = self.pop_bool(location);
            let left = self.pop_bool(location);
            match (left, right) {
                (Some(l), Some(r)) => Some(match operator.op {
                    BoolOp::And => l && r,
                    BoolOp::Or => l || r,
                    BoolOp::Not => !r,
                }),
                _ => None,
            }
        };
        if let Some(value) = value {
            self.bools.push(value);
        }
    }

    fn exit_bool_compare(&mut self, compare: &BoolCompare) {
        if !self.live() {
            return;
        }
        let right = self.pop_int(compare.location);
        let left = self.pop_int(compare.location);
        if let (Some(l), Some(r)) = (left, right) {
            self.bools.push(match compare.op {
                CompareOp::Greater => l > r,
                CompareOp::Equal => l == r,
                CompareOp::Lesser => l < r,
            });
        }
    }

    fn visit_label(&mut self, label: &Label) {
        if !self.live() {
            return;
        }
        if let Some(value) = self.lookup(&label.name) {
            self.ints.push(value);
        }
    }

    fn visit_int_constant(&mut self, constant: &IntConstant) {
        if !self.live() {
            return;
        }
        match constant.literal.text().parse::<BigInt>() {
            Ok(value) => self.ints.push(value),
            Err(_) => self.fail(RuntimeError::InvalidLiteral {
                text: constant.literal.text().to_string(),
                location: constant.literal.location(),
            }),
        }
    }
}
