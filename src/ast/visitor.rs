use super::*;

/// Order in which a block hands its statements to a visitor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TraversalOrder {
    #[default]
    Forward,
    Backward,
}

/// AST visitor trait for traversing and processing AST nodes
///
/// Composite nodes get an `enter_*` call before their children and an
/// `exit_*` call after them; leaves get a single `visit_*` call. Children are
/// visited in structural order (an `if` visits its condition, then the then
/// block, then the else block). Only blocks consult [`traversal_order`],
/// reversing their statement list for backward analyses.
///
/// [`traversal_order`]: AstVisitor::traversal_order
pub trait AstVisitor {
    fn traversal_order(&self) -> TraversalOrder {
        TraversalOrder::Forward
    }

    // Statements
    fn enter_block(&mut self, _block: &Block) {}
    fn exit_block(&mut self, _block: &Block) {}
    fn enter_assignment(&mut self, _assignment: &Assignment) {}
    fn exit_assignment(&mut self, _assignment: &Assignment) {}
    fn enter_if(&mut self, _stmt: &IfStmt) {}
    fn exit_if(&mut self, _stmt: &IfStmt) {}
    fn enter_check(&mut self, _check: &CheckStmt) {}
    fn exit_check(&mut self, _check: &CheckStmt) {}
    fn visit_print(&mut self, _print: &PrintStmt) {}
    fn visit_input(&mut self, _input: &InputStmt) {}
    fn visit_error(&mut self, _error: &ErrorNode) {}

    // Expressions
    fn enter_int_operator(&mut self, _operator: &IntOperator) {}
    fn exit_int_operator(&mut self, _operator: &IntOperator) {}
    fn enter_bool_operator(&mut self, _operator: &BoolOperator) {}
    fn exit_bool_operator(&mut self, _operator: &BoolOperator) {}
    fn enter_bool_compare(&mut self, _compare: &BoolCompare) {}
    fn exit_bool_compare(&mut self, _compare: &BoolCompare) {}
    fn visit_label(&mut self, _label: &Label) {}
    fn visit_int_constant(&mut self, _constant: &IntConstant) {}
}

impl AstNode for Block {
    fn location(&self) -> Location {
        self.location
    }

    fn accept<V: AstVisitor + ?Sized>(&self, visitor: &mut V) {
        visitor.enter_block(self);
        match visitor.traversal_order() {
            TraversalOrder::Forward => {
                for stmt in &self.statements {
                    stmt.accept(visitor);
                }
            }
            TraversalOrder::Backward => {
                for stmt in self.statements.iter().rev() {
                    stmt.accept(visitor);
                }
            }
        }
        visitor.exit_block(self);
    }
}

impl AstNode for Stmt {
    fn location(&self) -> Location {
        match self {
            Stmt::Assignment(s) => s.location,
            Stmt::If(s) => s.location,
            Stmt::Check(s) => s.location,
            Stmt::Print(s) => s.location,
            Stmt::Input(s) => s.location,
            Stmt::Error(s) => s.text.location(),
        }
    }

    fn accept<V: AstVisitor + ?Sized>(&self, visitor: &mut V) {
        match self {
            Stmt::Assignment(assignment) => {
                // the target is a write, not a read: only the value is visited
                visitor.enter_assignment(assignment);
                assignment.value.accept(visitor);
                visitor.exit_assignment(assignment);
            }
            Stmt::If(stmt) => {
                visitor.enter_if(stmt);
                stmt.condition.accept(visitor);
                stmt.then_block.accept(visitor);
                stmt.else_block.accept(visitor);
                visitor.exit_if(stmt);
            }
            Stmt::Check(check) => {
                visitor.enter_check(check);
                check.condition.accept(visitor);
                visitor.exit_check(check);
            }
            Stmt::Print(print) => visitor.visit_print(print),
            Stmt::Input(input) => visitor.visit_input(input),
            Stmt::Error(error) => visitor.visit_error(error),
        }
    }
}

impl AstNode for IntExpr {
    fn location(&self) -> Location {
        match self {
            IntExpr::Label(label) => label.name.location(),
            IntExpr::Constant(constant) => constant.literal.location(),
            IntExpr::Operator(operator) => operator.location,
        }
    }

    fn accept<V: AstVisitor + ?Sized>(&self, visitor: &mut V) {
        match self {
            IntExpr::Label(label) => visitor.visit_label(label),
            IntExpr::Constant(constant) => visitor.visit_int_constant(constant),
            IntExpr::Operator(operator) => {
                visitor.enter_int_operator(operator);
                operator.left.accept(visitor);
                if let Some(right) = &operator.right {
                    right.accept(visitor);
                }
                visitor.exit_int_operator(operator);
            }
        }
    }
}

impl AstNode for BoolExpr {
    fn location(&self) -> Location {
        match self {
            BoolExpr::Operator(operator) => operator.location,
            BoolExpr::Compare(compare) => compare.location,
        }
    }

    fn accept<V: AstVisitor + ?Sized>(&self, visitor: &mut V) {
        match self {
            BoolExpr::Operator(operator) => {
                visitor.enter_bool_operator(operator);
                operator.left.accept(visitor);
                if let Some(right) = &operator.right {
                    right.accept(visitor);
                }
                visitor.exit_bool_operator(operator);
            }
            BoolExpr::Compare(compare) => {
                visitor.enter_bool_compare(compare);
                compare.left.accept(visitor);
                compare.right.accept(visitor);
                visitor.exit_bool_compare(compare);
            }
        }
    }
}
