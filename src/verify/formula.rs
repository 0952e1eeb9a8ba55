//! Solver-native terms and formulas
//!
//! Nodes are reference counted and never mutated, so the same subformula can
//! sit under both arms of an `if` without being copied. Every traversal that
//! rebuilds or inspects a formula memoizes on node identity; work is linear in
//! the number of distinct nodes, not in the size of the unfolded tree.
//!
//! Constructors fold constants and trivial identities as they build, so an
//! obligation whose checks are decided by constant propagation collapses to
//! `true` before any solver is involved.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::rc::Rc;

use num_bigint::BigInt;
use num_traits::{One, Zero};

#[derive(Debug, PartialEq, Eq, Hash)]
pub enum TermKind {
    Const(BigInt),
    Var(String),
    Add(Term, Term),
    Sub(Term, Term),
    Mul(Term, Term),
    Neg(Term),
}

/// Integer-valued term over symbolic constants
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Term(Rc<TermKind>);

impl Term {
    fn new(kind: TermKind) -> Term {
        Term(Rc::new(kind))
    }

    pub fn kind(&self) -> &TermKind {
        &self.0
    }

    fn id(&self) -> usize {
        Rc::as_ptr(&self.0) as usize
    }

    pub fn constant(value: impl Into<BigInt>) -> Term {
        Term::new(TermKind::Const(value.into()))
    }

    pub fn var(name: impl Into<String>) -> Term {
        Term::new(TermKind::Var(name.into()))
    }

    pub fn as_const(&self) -> Option<&BigInt> {
        match self.kind() {
            TermKind::Const(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_var(&self) -> Option<&str> {
        match self.kind() {
            TermKind::Var(v) => Some(v),
            _ => None,
        }
    }

    pub fn add(left: Term, right: Term) -> Term {
        match (left.as_const(), right.as_const()) {
            (Some(a), Some(b)) => Term::constant(a + b),
            (Some(a), _) if a.is_zero() => right,
            (_, Some(b)) if b.is_zero() => left,
            _ => Term::new(TermKind::Add(left, right)),
        }
    }

    pub fn sub(left: Term, right: Term) -> Term {
        match (left.as_const(), right.as_const()) {
            (Some(a), Some(b)) => Term::constant(a - b),
            (Some(a), _) if a.is_zero() => Term::neg(right),
            (_, Some(b)) if b.is_zero() => left,
            _ if left == right => Term::constant(0),
            _ => Term::new(TermKind::Sub(left, right)),
        }
    }

    pub fn mul(left: Term, right: Term) -> Term {
        match (left.as_const(), right.as_const()) {
            (Some(a), Some(b)) => Term::constant(a * b),
            (Some(a), _) | (_, Some(a)) if a.is_zero() => Term::constant(0),
            (Some(a), _) if a.is_one() => right,
            (_, Some(b)) if b.is_one() => left,
            _ => Term::new(TermKind::Mul(left, right)),
        }
    }

    pub fn neg(operand: Term) -> Term {
        match operand.kind() {
            TermKind::Const(c) => Term::constant(-c),
            TermKind::Neg(inner) => inner.clone(),
            _ => Term::new(TermKind::Neg(operand)),
        }
    }

    /// Replace every occurrence of `name` by `replacement`
    pub fn substitute(&self, name: &str, replacement: &Term) -> Term {
        let map = HashMap::from([(name.to_string(), replacement.clone())]);
        self.substitute_all(&map)
    }

    pub fn substitute_all(&self, map: &HashMap<String, Term>) -> Term {
        if map.is_empty() {
            return self.clone();
        }
        Substitution::new(map).term(self)
    }

    pub fn collect_vars(&self, out: &mut BTreeSet<String>) {
        let mut seen = HashSet::new();
        collect_term_vars(self, &mut seen, out);
    }

    /// Evaluate with `lookup` supplying every variable's value
    pub fn eval<F: Fn(&str) -> BigInt>(&self, lookup: &F) -> BigInt {
        match self.kind() {
            TermKind::Const(c) => c.clone(),
            TermKind::Var(v) => lookup(v),
            TermKind::Add(a, b) => a.eval(lookup) + b.eval(lookup),
            TermKind::Sub(a, b) => a.eval(lookup) - b.eval(lookup),
            TermKind::Mul(a, b) => a.eval(lookup) * b.eval(lookup),
            TermKind::Neg(a) => -a.eval(lookup),
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            TermKind::Const(c) => write!(f, "{}", c),
            TermKind::Var(v) => f.write_str(v),
            TermKind::Add(a, b) => write!(f, "({} + {})", a, b),
            TermKind::Sub(a, b) => write!(f, "({} - {})", a, b),
            TermKind::Mul(a, b) => write!(f, "({} * {})", a, b),
            TermKind::Neg(a) => write!(f, "-{}", a),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Rel {
    Gt,
    Eq,
    Lt,
}

impl Rel {
    pub fn holds(self, left: &BigInt, right: &BigInt) -> bool {
        match self {
            Rel::Gt => left > right,
            Rel::Eq => left == right,
            Rel::Lt => left < right,
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            Rel::Gt => ">",
            Rel::Eq => "==",
            Rel::Lt => "<",
        }
    }
}

#[derive(Debug, PartialEq, Eq, Hash)]
pub enum FormulaKind {
    True,
    False,
    Cmp(Rel, Term, Term),
    Not(Formula),
    And(Formula, Formula),
    Or(Formula, Formula),
    Implies(Formula, Formula),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Formula(Rc<FormulaKind>);

impl Formula {
    fn new(kind: FormulaKind) -> Formula {
        Formula(Rc::new(kind))
    }

    pub fn kind(&self) -> &FormulaKind {
        &self.0
    }

    fn id(&self) -> usize {
        Rc::as_ptr(&self.0) as usize
    }

    pub fn bool(value: bool) -> Formula {
        Formula::new(if value { FormulaKind::True } else { FormulaKind::False })
    }

    pub fn cmp(rel: Rel, left: Term, right: Term) -> Formula {
        if let (Some(a), Some(b)) = (left.as_const(), right.as_const()) {
            return Formula::bool(rel.holds(a, b));
        }
        if left == right {
            return Formula::bool(rel == Rel::Eq);
        }
        Formula::new(FormulaKind::Cmp(rel, left, right))
    }

    pub fn not(operand: Formula) -> Formula {
        match operand.kind() {
            FormulaKind::True => Formula::bool(false),
            FormulaKind::False => Formula::bool(true),
            FormulaKind::Not(inner) => inner.clone(),
            _ => Formula::new(FormulaKind::Not(operand)),
        }
    }

    pub fn and(left: Formula, right: Formula) -> Formula {
        match (left.kind(), right.kind()) {
            (FormulaKind::False, _) | (_, FormulaKind::False) => Formula::bool(false),
            (FormulaKind::True, _) => right,
            (_, FormulaKind::True) => left,
            _ if left == right => left,
            _ => Formula::new(FormulaKind::And(left, right)),
        }
    }

    pub fn or(left: Formula, right: Formula) -> Formula {
        match (left.kind(), right.kind()) {
            (FormulaKind::True, _) | (_, FormulaKind::True) => Formula::bool(true),
            (FormulaKind::False, _) => right,
            (_, FormulaKind::False) => left,
            _ if left == right => left,
            _ => Formula::new(FormulaKind::Or(left, right)),
        }
    }

    pub fn implies(premise: Formula, conclusion: Formula) -> Formula {
        match (premise.kind(), conclusion.kind()) {
            (FormulaKind::False, _) | (_, FormulaKind::True) => Formula::bool(true),
            (FormulaKind::True, _) => conclusion,
            (_, FormulaKind::False) => Formula::not(premise),
            _ if premise == conclusion => Formula::bool(true),
            _ => Formula::new(FormulaKind::Implies(premise, conclusion)),
        }
    }

    pub fn is_true(&self) -> bool {
        matches!(self.kind(), FormulaKind::True)
    }

    pub fn is_false(&self) -> bool {
        matches!(self.kind(), FormulaKind::False)
    }

    /// `self[name := replacement]`
    pub fn substitute(&self, name: &str, replacement: &Term) -> Formula {
        let map = HashMap::from([(name.to_string(), replacement.clone())]);
        self.substitute_all(&map)
    }

    /// Simultaneous substitution of every name in `map`
    pub fn substitute_all(&self, map: &HashMap<String, Term>) -> Formula {
        if map.is_empty() {
            return self.clone();
        }
        Substitution::new(map).formula(self)
    }

    pub fn collect_vars(&self, out: &mut BTreeSet<String>) {
        let mut seen = HashSet::new();
        collect_formula_vars(self, &mut seen, out);
    }

    /// Symbolic constants occurring in the formula, sorted by name
    pub fn free_vars(&self) -> BTreeSet<String> {
        let mut vars = BTreeSet::new();
        self.collect_vars(&mut vars);
        vars
    }

    pub fn eval<F: Fn(&str) -> BigInt>(&self, lookup: &F) -> bool {
        match self.kind() {
            FormulaKind::True => true,
            FormulaKind::False => false,
            FormulaKind::Cmp(rel, a, b) => rel.holds(&a.eval(lookup), &b.eval(lookup)),
            FormulaKind::Not(a) => !a.eval(lookup),
            FormulaKind::And(a, b) => a.eval(lookup) && b.eval(lookup),
            FormulaKind::Or(a, b) => a.eval(lookup) || b.eval(lookup),
            FormulaKind::Implies(a, b) => !a.eval(lookup) || b.eval(lookup),
        }
    }

    /// Distinct nodes, terms included
    pub fn size(&self) -> usize {
        let mut seen = HashSet::new();
        count_formula(self, &mut seen)
    }

    /// `Display` text cut off after `limit` bytes
    ///
    /// Printing unfolds shared nodes, so the full text can be far larger
    /// than the formula; rendering stops as soon as the limit is reached.
    pub fn abbreviated(&self, limit: usize) -> String {
        let mut out = Bounded { text: String::new(), limit };
        if fmt::write(&mut out, format_args!("{}", self)).is_err() {
            out.text.push_str(" ...");
        }
        out.text
    }
}

struct Bounded {
    text: String,
    limit: usize,
}

impl fmt::Write for Bounded {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let room = self.limit.saturating_sub(self.text.len());
        if s.len() <= room {
            self.text.push_str(s);
            return Ok(());
        }
        let mut cut = room;
        while !s.is_char_boundary(cut) {
            cut -= 1;
        }
        self.text.push_str(&s[..cut]);
        Err(fmt::Error)
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            FormulaKind::True => f.write_str("true"),
            FormulaKind::False => f.write_str("false"),
            FormulaKind::Cmp(rel, a, b) => write!(f, "{} {} {}", a, rel.symbol(), b),
            FormulaKind::Not(a) => write!(f, "!({})", a),
            FormulaKind::And(a, b) => write!(f, "({} && {})", a, b),
            FormulaKind::Or(a, b) => write!(f, "({} || {})", a, b),
            FormulaKind::Implies(a, b) => write!(f, "({} => {})", a, b),
        }
    }
}

/// One simultaneous substitution, memoized per node
struct Substitution<'m> {
    map: &'m HashMap<String, Term>,
    terms: HashMap<usize, Term>,
    formulas: HashMap<usize, Formula>,
}

impl<'m> Substitution<'m> {
    fn new(map: &'m HashMap<String, Term>) -> Self {
        Self { map, terms: HashMap::new(), formulas: HashMap::new() }
    }

    fn term(&mut self, term: &Term) -> Term {
        if let Some(done) = self.terms.get(&term.id()) {
            return done.clone();
        }
        let result = match term.kind() {
            TermKind::Const(_) => term.clone(),
            TermKind::Var(v) => self.map.get(v).cloned().unwrap_or_else(|| term.clone()),
            TermKind::Add(a, b) => {
                let (a, b) = (self.term(a), self.term(b));
                Term::add(a, b)
            }
            TermKind::Sub(a, b) => {
                let (a, b) = (self.term(a), self.term(b));
                Term::sub(a, b)
            }
            TermKind::Mul(a, b) => {
                let (a, b) = (self.term(a), self.term(b));
                Term::mul(a, b)
            }
            TermKind::Neg(a) => Term::neg(self.term(a)),
        };
        self.terms.insert(term.id(), result.clone());
        result
    }

    fn formula(&mut self, formula: &Formula) -> Formula {
        if let Some(done) = self.formulas.get(&formula.id()) {
            return done.clone();
        }
        let result = match formula.kind() {
            FormulaKind::True | FormulaKind::False => formula.clone(),
            FormulaKind::Cmp(rel, a, b) => {
                let (a, b) = (self.term(a), self.term(b));
                Formula::cmp(*rel, a, b)
            }
            FormulaKind::Not(a) => Formula::not(self.formula(a)),
            FormulaKind::And(a, b) => {
                let (a, b) = (self.formula(a), self.formula(b));
                Formula::and(a, b)
            }
            FormulaKind::Or(a, b) => {
                let (a, b) = (self.formula(a), self.formula(b));
                Formula::or(a, b)
            }
            FormulaKind::Implies(a, b) => {
                let (a, b) = (self.formula(a), self.formula(b));
                Formula::implies(a, b)
            }
        };
        self.formulas.insert(formula.id(), result.clone());
        result
    }
}

fn collect_term_vars(term: &Term, seen: &mut HashSet<usize>, out: &mut BTreeSet<String>) {
    if !seen.insert(term.id()) {
        return;
    }
    match term.kind() {
        TermKind::Const(_) => {}
        TermKind::Var(v) => {
            out.insert(v.clone());
        }
        TermKind::Add(a, b) | TermKind::Sub(a, b) | TermKind::Mul(a, b) => {
            collect_term_vars(a, seen, out);
            collect_term_vars(b, seen, out);
        }
        TermKind::Neg(a) => collect_term_vars(a, seen, out),
    }
}

fn collect_formula_vars(formula: &Formula, seen: &mut HashSet<usize>, out: &mut BTreeSet<String>) {
    if !seen.insert(formula.id()) {
        return;
    }
    match formula.kind() {
        FormulaKind::True | FormulaKind::False => {}
        FormulaKind::Cmp(_, a, b) => {
            collect_term_vars(a, seen, out);
            collect_term_vars(b, seen, out);
        }
        FormulaKind::Not(a) => collect_formula_vars(a, seen, out),
        FormulaKind::And(a, b) | FormulaKind::Or(a, b) | FormulaKind::Implies(a, b) => {
            collect_formula_vars(a, seen, out);
            collect_formula_vars(b, seen, out);
        }
    }
}

fn count_term(term: &Term, seen: &mut HashSet<usize>) -> usize {
    if !seen.insert(term.id()) {
        return 0;
    }
    1 + match term.kind() {
        TermKind::Const(_) | TermKind::Var(_) => 0,
        TermKind::Add(a, b) | TermKind::Sub(a, b) | TermKind::Mul(a, b) => count_term(a, seen) + count_term(b, seen),
        TermKind::Neg(a) => count_term(a, seen),
    }
}

fn count_formula(formula: &Formula, seen: &mut HashSet<usize>) -> usize {
    if !seen.insert(formula.id()) {
        return 0;
    }
    1 + match formula.kind() {
        FormulaKind::True | FormulaKind::False => 0,
        FormulaKind::Cmp(_, a, b) => count_term(a, seen) + count_term(b, seen),
        FormulaKind::Not(a) => count_formula(a, seen),
        FormulaKind::And(a, b) | FormulaKind::Or(a, b) | FormulaKind::Implies(a, b) => {
            count_formula(a, seen) + count_formula(b, seen)
        }
    }
}
