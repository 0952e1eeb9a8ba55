use super::visitor::AstVisitor;
use super::*;

const INDENT: &str = "    ";

// Binding strength of rendered expressions; atoms bind tightest
const PREC_SUM: u8 = 1;
const PREC_PRODUCT: u8 = 2;
const PREC_UNARY: u8 = 3;
const PREC_ATOM: u8 = 4;
const PREC_OR: u8 = 1;
const PREC_AND: u8 = 2;

fn wrap(rendered: (String, u8), needs_parens: bool) -> String {
    if needs_parens {
        format!("({})", rendered.0)
    } else {
        rendered.0
    }
}

/// Serialises a tree back to source text
///
/// Parentheses are emitted only where the tree shape needs them, so parsing
/// the output yields the same tree.
#[derive(Debug, Default)]
pub struct SourcePrinter {
    exprs: Vec<(String, u8)>,
    open_blocks: Vec<Vec<String>>,
    closed_blocks: Vec<Vec<String>>,
}

impl SourcePrinter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn print(&mut self, block: &Block) -> String {
        self.exprs.clear();
        self.open_blocks.clear();
        self.closed_blocks.clear();
        block.accept(self);
        let lines = self.closed_blocks.pop().unwrap_or_default();
        let mut output = String::from("{\n");
        for line in lines {
            output.push_str(INDENT);
            output.push_str(&line);
            output.push('\n');
        }
        output.push_str("}\n");
        output
    }

    fn emit(&mut self, line: String) {
        if let Some(lines) = self.open_blocks.last_mut() {
            lines.push(line);
        }
    }

    fn pop_expr(&mut self) -> (String, u8) {
        self.exprs.pop().unwrap_or_else(|| (String::new(), PREC_ATOM))
    }

    fn pop_binary(&mut self, prec: u8) -> (String, String) {
        let right = self.pop_expr();
        let left = self.pop_expr();
        // operators associate to the left, so an equal-strength right operand keeps its parens
        let right_needs = right.1 <= prec;
        let left_needs = left.1 < prec;
        (wrap(left, left_needs), wrap(right, right_needs))
    }
}

impl AstVisitor for SourcePrinter {
    fn enter_block(&mut self, _block: &Block) {
        self.open_blocks.push(Vec::new());
    }

    fn exit_block(&mut self, _block: &Block) {
        let lines = self.open_blocks.pop().unwrap_or_default();
        self.closed_blocks.push(lines);
    }

    fn exit_assignment(&mut self, assignment: &Assignment) {
        let value = self.pop_expr().0;
        self.emit(format!("{} := {}", assignment.target, value));
    }

    fn exit_if(&mut self, _stmt: &IfStmt) {
        let else_lines = self.closed_blocks.pop().unwrap_or_default();
        let then_lines = self.closed_blocks.pop().unwrap_or_default();
        let condition = self.pop_expr().0;

        self.emit(format!("if {} {{", condition));
        for line in then_lines {
            self.emit(format!("{}{}", INDENT, line));
        }
        self.emit("} else {".to_string());
        for line in else_lines {
            self.emit(format!("{}{}", INDENT, line));
        }
        self.emit("}".to_string());
    }

    fn exit_check(&mut self, _check: &CheckStmt) {
        let condition = self.pop_expr().0;
        self.emit(format!("check({})", condition));
    }

    fn visit_print(&mut self, print: &PrintStmt) {
        self.emit(format!("print({})", print.variable));
    }

    fn visit_input(&mut self, input: &InputStmt) {
        self.emit(format!("<< {}", input.variable));
    }

    fn visit_error(&mut self, error: &ErrorNode) {
        self.emit(error.text.text().to_string());
    }

    fn exit_int_operator(&mut self, operator: &IntOperator) {
        let rendered = match operator.op {
            IntOp::Negate => {
                let operand = self.pop_expr();
                let needs = operand.1 < PREC_UNARY;
                (format!("-{}", wrap(operand, needs)), PREC_UNARY)
            }
            IntOp::Mul => {
                let (left, right) = self.pop_binary(PREC_PRODUCT);
                (format!("{} * {}", left, right), PREC_PRODUCT)
            }
            op => {
                let (left, right) = self.pop_binary(PREC_SUM);
                (format!("{} {} {}", left, op.symbol(), right), PREC_SUM)
            }
        };
        self.exprs.push(rendered);
    }

    fn exit_bool_operator(&mut self, operator: &BoolOperator) {
        let rendered = match operator.op {
            BoolOp::Not => {
                let operand = self.pop_expr();
                let needs = operand.1 != PREC_UNARY;
                (format!("!{}", wrap(operand, needs)), PREC_UNARY)
            }
            BoolOp::And => {
                let (left, right) = self.pop_binary(PREC_AND);
                (format!("{} && {}", left, right), PREC_AND)
            }
            BoolOp::Or => {
                let (left, right) = self.pop_binary(PREC_OR);
                (format!("{} || {}", left, right), PREC_OR)
            }
        };
        self.exprs.push(rendered);
    }

    fn exit_bool_compare(&mut self, compare: &BoolCompare) {
        let right = self.pop_expr().0;
        let left = self.pop_expr().0;
        self.exprs.push((format!("{} {} {}", left, compare.op.symbol(), right), PREC_ATOM));
    }

    fn visit_label(&mut self, label: &Label) {
        self.exprs.push((label.name.text().to_string(), PREC_ATOM));
    }

    fn visit_int_constant(&mut self, constant: &IntConstant) {
        self.exprs.push((constant.literal.text().to_string(), PREC_ATOM));
    }
}

/// Render a program as source text
pub fn print_source(block: &Block) -> String {
    SourcePrinter::new().print(block)
}

#[derive(Debug)]
struct DumpNode {
    label: String,
    children: Vec<DumpNode>,
}

/// Box-drawing dump of the node hierarchy, one node per line
#[derive(Debug, Default)]
pub struct TreePrinter {
    show_locations: bool,
    frames: Vec<Vec<DumpNode>>,
}

impl TreePrinter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_locations(mut self, show: bool) -> Self {
        self.show_locations = show;
        self
    }

    pub fn print(&mut self, block: &Block) -> String {
        self.frames = vec![Vec::new()];
        block.accept(self);
        let mut output = String::new();
        if let Some(root) = self.frames.pop().and_then(|mut roots| roots.pop()) {
            output.push_str(&root.label);
            output.push('\n');
            render_children(&root.children, "", &mut output);
        }
        output
    }

    fn label(&self, text: String, location: Location) -> String {
        if self.show_locations {
            format!("{} @{}:{}", text, location.line, location.column)
        } else {
            text
        }
    }

    fn open(&mut self) {
        self.frames.push(Vec::new());
    }

    fn close(&mut self, text: String, location: Location) {
        let children = self.frames.pop().unwrap_or_default();
        let label = self.label(text, location);
        self.push(DumpNode { label, children });
    }

    fn leaf(&mut self, text: String, location: Location) {
        let label = self.label(text, location);
        self.push(DumpNode { label, children: Vec::new() });
    }

    fn push(&mut self, node: DumpNode) {
        if let Some(frame) = self.frames.last_mut() {
            frame.push(node);
        }
    }
}

fn render_children(children: &[DumpNode], prefix: &str, output: &mut String) {
    for (index, child) in children.iter().enumerate() {
        let last = index + 1 == children.len();
        output.push_str(prefix);
        output.push_str(if last { "└── " } else { "├── " });
        output.push_str(&child.label);
        output.push('\n');
        let nested = format!("{}{}", prefix, if last { "    " } else { "│   " });
        render_children(&child.children, &nested, output);
    }
}

impl AstVisitor for TreePrinter {
    fn enter_block(&mut self, _block: &Block) {
        self.open();
    }
    fn exit_block(&mut self, block: &Block) {
        self.close("Block".to_string(), block.location);
    }
    fn enter_assignment(&mut self, _assignment: &Assignment) {
        self.open();
    }
    fn exit_assignment(&mut self, assignment: &Assignment) {
        self.close(format!("Assignment {}", assignment.target), assignment.location);
    }
    fn enter_if(&mut self, _stmt: &IfStmt) {
        self.open();
    }
    fn exit_if(&mut self, stmt: &IfStmt) {
        self.close("If".to_string(), stmt.location);
    }
    fn enter_check(&mut self, _check: &CheckStmt) {
        self.open();
    }
    fn exit_check(&mut self, check: &CheckStmt) {
        self.close("Check".to_string(), check.location);
    }
    fn visit_print(&mut self, print: &PrintStmt) {
        self.leaf(format!("Print {}", print.variable), print.location);
    }
    fn visit_input(&mut self, input: &InputStmt) {
        self.leaf(format!("Input {}", input.variable), input.location);
    }
    fn visit_error(&mut self, error: &ErrorNode) {
        self.leaf(format!("Error `{}`", error.text), error.text.location());
    }
    fn enter_int_operator(&mut self, _operator: &IntOperator) {
        self.open();
    }
    fn exit_int_operator(&mut self, operator: &IntOperator) {
        self.close(format!("IntOperator {}", operator.op), operator.location);
    }
    fn enter_bool_operator(&mut self, _operator: &BoolOperator) {
        self.open();
    }
    fn exit_bool_operator(&mut self, operator: &BoolOperator) {
        self.close(format!("BoolOperator {}", operator.op), operator.location);
    }
    fn enter_bool_compare(&mut self, _compare: &BoolCompare) {
        self.open();
    }
    fn exit_bool_compare(&mut self, compare: &BoolCompare) {
        self.close(format!("BoolCompare {}", compare.op), compare.location);
    }
    fn visit_label(&mut self, label: &Label) {
        self.leaf(format!("Label {}", label.name), label.name.location());
    }
    fn visit_int_constant(&mut self, constant: &IntConstant) {
        self.leaf(format!("IntConstant {}", constant.literal), constant.literal.location());
    }
}

/// Render the node hierarchy without locations
pub fn dump_tree(block: &Block) -> String {
    TreePrinter::new().print(block)
}
