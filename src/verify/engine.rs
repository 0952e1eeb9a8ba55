//! Backward weakest-precondition visitor
//!
//! Blocks are walked back to front. `wp` holds the running precondition of
//! the innermost open block; `block_posts` holds the postconditions that
//! blocks about to be entered start from (the program's is `true`, each `if`
//! hands one shared formula to both of its branches). Expressions are folded
//! bottom-up on `ints` and `bools` over plain variable names and are resolved
//! to versions by the statement that uses them. The tree is never modified.
//!
//! Each program variable is tracked by the version its value has at the
//! current point. Outside of any `if`, an assignment substitutes its value
//! for the version the postcondition reads. Inside a branch it guards the
//! branch's precondition with the equation `v == e` instead, so the
//! postcondition shared by both branches is never copied. Where the branches
//! leave a variable at different versions, the `if` continues with the
//! then-branch's version and equates the else-branch's to it. Obligations
//! grow linearly with the program.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use num_bigint::BigInt;

use crate::ast::*;
use crate::error::{Error, Result};
use crate::verify::formula::{Formula, Rel, Term};

/// Separates a variable name from its version number
pub const VERSION_MARK: char = '#';

/// Whether `name` is a version constant rather than a program variable or input
pub fn is_version(name: &str) -> bool {
    name.contains(VERSION_MARK)
}

/// Name of the fresh constant standing for the value read by `<< x` at `location`
pub fn input_symbol(name: &str, location: Location) -> String {
    format!("{}@{}:{}", name, location.line, location.column)
}

type Versions = BTreeMap<String, String>;

#[derive(Debug)]
struct OpenIf {
    /// Versions right after the `if`; both branches end there
    after: Versions,
    /// Versions at the start of the then-branch, once it has been walked
    then_versions: Option<Versions>,
}

#[derive(Debug)]
pub struct WpEngine {
    variables: BTreeSet<String>,
    versions: Versions,
    next_version: usize,
    open_ifs: Vec<OpenIf>,
    wp: Vec<Formula>,
    block_posts: Vec<Formula>,
    ints: Vec<Term>,
    /// Conditions of open `if`s stay on `bools` until the `if` exits
    bools: Vec<Formula>,
    errors: Vec<Location>,
}

impl Default for WpEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl WpEngine {
    pub fn new() -> Self {
        Self {
            variables: BTreeSet::new(),
            versions: Versions::new(),
            next_version: 0,
            open_ifs: Vec::new(),
            wp: Vec::new(),
            block_posts: Vec::new(),
            ints: Vec::new(),
            bools: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Correctness obligation of `program` with a fresh engine
    pub fn obligation(program: &Block) -> Result<Formula> {
        Self::new().compute(program)
    }

    /// Compute the weakest precondition of `program` for postcondition `true`
    ///
    /// State left over from an earlier run is discarded first, so repeated
    /// calls on the same tree agree. Values a program starts with appear
    /// under the variables' own names; versions remain only where a branch
    /// defines them.
    pub fn compute(&mut self, program: &Block) -> Result<Formula> {
        *self = Self::new();
        self.block_posts.push(Formula::bool(true));
        program.accept(self);

        if !self.errors.is_empty() {
            let at: Vec<String> = self.errors.iter().map(Location::to_string).collect();
            return Err(Error::verification_error(format!(
                "cannot verify a program with syntax errors ({})",
                at.join("; ")
            )));
        }
        if self.wp.len() != 1
            || !self.open_ifs.is_empty()
            || !self.block_posts.is_empty()
            || !self.ints.is_empty()
            || !self.bools.is_empty()
        {
            panic!(
                "wp engine finished with {} accumulator(s), {} open if(s), {} pending block(s), {} int(s), {} bool(s)",
                self.wp.len(),
                self.open_ifs.len(),
                self.block_posts.len(),
                self.ints.len(),
                self.bools.len()
            );
        }
        let body = self.wp.pop().unwrap_or_else(|| Formula::bool(true));
        let entry: HashMap<String, Term> = std::mem::take(&mut self.versions)
            .into_iter()
            .map(|(name, version)| (version, Term::var(name)))
            .collect();
        let obligation = body.substitute_all(&entry);
        log::debug!(
            "obligation over {} variable(s), {} version(s), {} node(s)",
            self.variables.len(),
            self.next_version,
            obligation.size()
        );
        Ok(obligation)
    }

    /// Program variables seen during the last run
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.variables.iter().map(String::as_str)
    }

    fn fresh_version(&mut self, name: &str) -> String {
        self.next_version += 1;
        format!("{}{}{}", name, VERSION_MARK, self.next_version)
    }

    /// Current version of `name`, starting a new one on first sight
    fn version(&mut self, name: &str) -> String {
        if let Some(version) = self.versions.get(name) {
            return version.clone();
        }
        let version = self.fresh_version(name);
        self.versions.insert(name.to_string(), version.clone());
        version
    }

    fn version_map(&mut self, names: BTreeSet<String>) -> HashMap<String, Term> {
        names
            .into_iter()
            .map(|name| {
                let version = self.version(&name);
                (name, Term::var(version))
            })
            .collect()
    }

    fn resolve_term(&mut self, raw: &Term) -> Term {
        let mut names = BTreeSet::new();
        raw.collect_vars(&mut names);
        let map = self.version_map(names);
        raw.substitute_all(&map)
    }

    fn resolve_formula(&mut self, raw: &Formula) -> Formula {
        let map = self.version_map(raw.free_vars());
        raw.substitute_all(&map)
    }

    /// Give `name` the value `value` at this point of the program
    fn define(&mut self, name: &str, value: Term, location: Location) {
        let read = self.versions.remove(name);
        let value = self.resolve_term(&value);
        // a branch must leave every variable it writes at a version of its own
        self.version(name);
        let Some(read) = read else {
            return;
        };
        let q = self.pop_wp(location);
        let q = if self.open_ifs.is_empty() {
            q.substitute(&read, &value)
        } else {
            Formula::implies(Formula::cmp(Rel::Eq, Term::var(read), value), q)
        };
        self.wp.push(q);
    }

    fn pop_wp(&mut self, location: Location) -> Formula {
        match self.wp.pop() {
            Some(q) => q,
            None => panic!("wp engine: no accumulated precondition at {}", location),
        }
    }

    fn pop_int(&mut self, location: Location) -> Term {
        match self.ints.pop() {
            Some(t) => t,
            None => panic!("wp engine: integer stack underflow at {}", location),
        }
    }

    fn pop_bool(&mut self, location: Location) -> Formula {
        match self.bools.pop() {
            Some(f) => f,
            None => panic!("wp engine: boolean stack underflow at {}", location),
        }
    }
}

impl AstVisitor for WpEngine {
    fn traversal_order(&self) -> TraversalOrder {
        TraversalOrder::Backward
    }

    fn enter_block(&mut self, block: &Block) {
        match self.block_posts.pop() {
            Some(post) => self.wp.push(post),
            None => panic!("wp engine: no postcondition for block at {}", block.location),
        }
    }

    fn exit_block(&mut self, _block: &Block) {
        // branch blocks only; the else-branch's versions stay current until `exit_if`
        if let Some(open) = self.open_ifs.last_mut() {
            if open.then_versions.is_none() {
                let then_versions = std::mem::replace(&mut self.versions, open.after.clone());
                open.then_versions = Some(then_versions);
            }
        }
    }

    fn exit_assignment(&mut self, assignment: &Assignment) {
        if self.ints.len() != 1 {
            panic!(
                "wp engine: assignment at {} expects one value, found {}",
                assignment.location,
                self.ints.len()
            );
        }
        let value = self.pop_int(assignment.location);
        let name = assignment.target.text();
        self.variables.insert(name.to_string());
        self.define(name, value, assignment.location);
    }

    fn enter_if(&mut self, stmt: &IfStmt) {
        let post = self.pop_wp(stmt.location);
        self.block_posts.push(post.clone());
        self.block_posts.push(post);
        self.open_ifs.push(OpenIf { after: self.versions.clone(), then_versions: None });
    }

    fn exit_if(&mut self, stmt: &IfStmt) {
        if self.bools.len() != self.open_ifs.len() {
            panic!(
                "wp engine: if at {} expects {} pending condition(s), found {}",
                stmt.location,
                self.open_ifs.len(),
                self.bools.len()
            );
        }
        let then_versions = match self.open_ifs.pop().and_then(|open| open.then_versions) {
            Some(versions) => versions,
            None => panic!("wp engine: if at {} exited before its then-branch", stmt.location),
        };
        let else_versions = std::mem::take(&mut self.versions);

        let mut joined = else_versions.clone();
        let mut aligned = Formula::bool(true);
        for (name, then_version) in then_versions {
            if let Some(else_version) = else_versions.get(&name) {
                if *else_version != then_version {
                    let same = Formula::cmp(Rel::Eq, Term::var(else_version.clone()), Term::var(then_version.clone()));
                    aligned = Formula::and(aligned, same);
                }
            }
            joined.insert(name, then_version);
        }
        self.versions = joined;

        let we = self.pop_wp(stmt.location);
        let wt = self.pop_wp(stmt.location);
        let raw = self.pop_bool(stmt.location);
        let c = self.resolve_formula(&raw);
        self.wp.push(Formula::and(
            Formula::implies(c.clone(), wt),
            Formula::implies(Formula::not(c), Formula::implies(aligned, we)),
        ));
    }

    fn exit_check(&mut self, check: &CheckStmt) {
        if self.bools.len() != self.open_ifs.len() + 1 {
            panic!(
                "wp engine: check at {} expects one condition, found {}",
                check.location,
                self.bools.len() - self.open_ifs.len().min(self.bools.len())
            );
        }
        let raw = self.pop_bool(check.location);
        let e = self.resolve_formula(&raw);
        let q = self.pop_wp(check.location);
        self.wp.push(Formula::and(e, q));
    }

    fn visit_input(&mut self, input: &InputStmt) {
        let name = input.variable.text();
        self.variables.insert(name.to_string());
        let fresh = Term::var(input_symbol(name, input.location));
        self.define(name, fresh, input.location);
    }

    fn visit_error(&mut self, error: &ErrorNode) {
        self.errors.push(error.text.location());
    }

    fn exit_int_operator(&mut self, operator: &IntOperator) {
        let location = operator.location;
        let result = if operator.op.is_unary() {
            Term::neg(self.pop_int(location))
        } else {
            let right = self.pop_int(location);
            let left = self.pop_int(location);
            match operator.op {
                IntOp::Add => Term::add(left, right),
                IntOp::Sub => Term::sub(left, right),
                IntOp::Mul => Term::mul(left, right),
                IntOp::Negate => unreachable!("negation is unary"),
            }
        };
        self.ints.push(result);
    }

    fn exit_bool_operator(&mut self, operator: &BoolOperator) {
        let location = operator.location;
        let result = if operator.op.is_unary() {
            Formula::not(self.pop_bool(location))
        } else {
            let right = self.pop_bool(location);
            let left = self.pop_bool(location);
            match operator.op {
                BoolOp::And => Formula::and(left, right),
                BoolOp::Or => Formula::or(left, right),
                BoolOp::Not => unreachable!("not is unary"),
            }
        };
        self.bools.push(result);
    }

    fn exit_bool_compare(&mut self, compare: &BoolCompare) {
        let right = self.pop_int(compare.location);
        let left = self.pop_int(compare.location);
        let rel = match compare.op {
            CompareOp::Greater => Rel::Gt,
            CompareOp::Equal => Rel::Eq,
            CompareOp::Lesser => Rel::Lt,
        };
        self.bools.push(Formula::cmp(rel, left, right));
    }

    fn visit_label(&mut self, label: &Label) {
        let name = label.name.text();
        self.variables.insert(name.to_string());
        self.ints.push(Term::var(name));
    }

    fn visit_int_constant(&mut self, constant: &IntConstant) {
        match constant.literal.text().parse::<BigInt>() {
            Ok(value) => self.ints.push(Term::constant(value)),
            Err(_) => panic!(
                "wp engine: scanner produced non-numeric literal `{}` at {}",
                constant.literal.text(),
                constant.literal.location()
            ),
        }
    }
}
