use std::collections::HashSet;

use crate::ast::*;

use super::ReviewError;

/// Definite-assignment analysis
///
/// One assigned-set per open block. A name assigned in both branches of an
/// `if` counts as assigned after it; a name assigned in only one does not.
#[derive(Debug, Default)]
pub struct AssignmentChecker {
    scopes: Vec<HashSet<String>>,
    closed: Vec<HashSet<String>>,
    violations: Vec<ReviewError>,
}

impl AssignmentChecker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check(&mut self, program: &Block) -> Vec<ReviewError> {
        self.scopes.clear();
        self.closed.clear();
        self.violations.clear();
        program.accept(self);
        self.violations.clone()
    }

    pub fn violations(&self) -> &[ReviewError] {
        &self.violations
    }

    fn is_assigned(&self, name: &str) -> bool {
        self.scopes.iter().any(|scope| scope.contains(name))
    }

    fn assign(&mut self, name: &str) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string());
        }
    }

    fn read(&mut self, name: &Ident) {
        if !self.is_assigned(name.text()) {
            self.violations.push(ReviewError::UseBeforeAssignment {
                name: name.text().to_string(),
                location: name.location(),
            });
        }
    }
}

impl AstVisitor for AssignmentChecker {
    fn enter_block(&mut self, _block: &Block) {
        self.scopes.push(HashSet::new());
    }

    fn exit_block(&mut self, _block: &Block) {
        let scope = self.scopes.pop().unwrap_or_default();
        self.closed.push(scope);
    }

    fn exit_assignment(&mut self, assignment: &Assignment) {
        // the value was already visited, so `x := x + 1` reads x first
        self.assign(assignment.target.text());
    }

    fn exit_if(&mut self, _stmt: &IfStmt) {
        let else_scope = self.closed.pop().unwrap_or_default();
        let then_scope = self.closed.pop().unwrap_or_default();
        for name in then_scope.intersection(&else_scope) {
            self.assign(name);
        }
    }

    fn visit_print(&mut self, print: &PrintStmt) {
        self.read(&print.variable);
    }

    fn visit_input(&mut self, input: &InputStmt) {
        self.assign(input.variable.text());
    }

    fn visit_label(&mut self, label: &Label) {
        self.read(&label.name);
    }
}
