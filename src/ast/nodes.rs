use std::fmt;

use super::{LocatedText, Location};

/// Identifier as written in the source
pub type Ident = LocatedText;

/// `{ statement* }`; the program itself is one block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub statements: Vec<Stmt>,
    pub location: Location,
}

impl Block {
    pub fn new(statements: Vec<Stmt>, location: Location) -> Self {
        Self { statements, location }
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    Assignment(Assignment),
    If(IfStmt),
    Check(CheckStmt),
    Print(PrintStmt),
    Input(InputStmt),
    /// Placeholder left by error recovery
    Error(ErrorNode),
}

/// `x := intExpr`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub target: Ident,
    pub value: IntExpr,
    pub location: Location,
}

/// `if boolExpr block else block`; the else branch is mandatory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IfStmt {
    pub condition: BoolExpr,
    pub then_block: Block,
    pub else_block: Block,
    pub location: Location,
}

/// `check(boolExpr)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckStmt {
    pub condition: BoolExpr,
    pub location: Location,
}

/// `print(x)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintStmt {
    pub variable: Ident,
    pub location: Location,
}

/// `<< x`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputStmt {
    pub variable: Ident,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorNode {
    pub text: LocatedText,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntExpr {
    Label(Label),
    Constant(IntConstant),
    Operator(IntOperator),
}

/// A variable read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    pub name: Ident,
}

/// A non-negative decimal literal; the digits are kept verbatim
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntConstant {
    pub literal: LocatedText,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntOp {
    Add,
    Sub,
    Mul,
    Negate,
}

impl IntOp {
    pub fn is_unary(self) -> bool {
        matches!(self, IntOp::Negate)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            IntOp::Add => "+",
            IntOp::Sub | IntOp::Negate => "-",
            IntOp::Mul => "*",
        }
    }
}

impl fmt::Display for IntOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IntOp::Add => "ADD",
            IntOp::Sub => "SUB",
            IntOp::Mul => "MUL",
            IntOp::Negate => "NEGATE",
        };
        f.write_str(name)
    }
}

/// Integer operator; `right` is absent exactly for `Negate`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntOperator {
    pub op: IntOp,
    pub left: Box<IntExpr>,
    pub right: Option<Box<IntExpr>>,
    pub location: Location,
}

impl IntOperator {
    pub fn binary(op: IntOp, left: IntExpr, right: IntExpr, location: Location) -> Self {
        Self { op, left: Box::new(left), right: Some(Box::new(right)), location }
    }

    pub fn negate(operand: IntExpr, location: Location) -> Self {
        Self { op: IntOp::Negate, left: Box::new(operand), right: None, location }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoolExpr {
    Operator(BoolOperator),
    Compare(BoolCompare),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoolOp {
    And,
    Or,
    Not,
}

impl BoolOp {
    pub fn is_unary(self) -> bool {
        matches!(self, BoolOp::Not)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BoolOp::And => "&&",
            BoolOp::Or => "||",
            BoolOp::Not => "!",
        }
    }
}

impl fmt::Display for BoolOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BoolOp::And => "AND",
            BoolOp::Or => "OR",
            BoolOp::Not => "NOT",
        };
        f.write_str(name)
    }
}

/// Boolean connective; `right` is absent exactly for `Not`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoolOperator {
    pub op: BoolOp,
    pub left: Box<BoolExpr>,
    pub right: Option<Box<BoolExpr>>,
    pub location: Location,
}

impl BoolOperator {
    pub fn binary(op: BoolOp, left: BoolExpr, right: BoolExpr, location: Location) -> Self {
        Self { op, left: Box::new(left), right: Some(Box::new(right)), location }
    }

    pub fn not(operand: BoolExpr, location: Location) -> Self {
        Self { op: BoolOp::Not, left: Box::new(operand), right: None, location }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Greater,
    Equal,
    Lesser,
}

impl CompareOp {
    pub fn symbol(self) -> &'static str {
        match self {
            CompareOp::Greater => ">",
            CompareOp::Equal => "==",
            CompareOp::Lesser => "<",
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CompareOp::Greater => "GREATER",
            CompareOp::Equal => "EQUAL",
            CompareOp::Lesser => "LESSER",
        };
        f.write_str(name)
    }
}

/// Integer comparison; comparisons do not chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoolCompare {
    pub op: CompareOp,
    pub left: Box<IntExpr>,
    pub right: Box<IntExpr>,
    pub location: Location,
}

impl BoolCompare {
    pub fn new(op: CompareOp, left: IntExpr, right: IntExpr, location: Location) -> Self {
        Self { op, left: Box::new(left), right: Box::new(right), location }
    }
}
