use crate::ast::*;
use crate::common::consts::{DEFAULT_MAX_PARSE_ERRORS, PARSER_MAX_DEPTH};
use crate::diagnostics::{Diagnostics, Phase};

use super::error::ParseError;
use super::lexer::{LexicalToken, Scanner, Symbol, TokenKind};
use super::trie::TokenTrie;

/// Contents of a parenthesis opened where a boolean was expected
enum ParenBody {
    Bool(BoolExpr),
    Int(IntExpr),
}

/// Recursive-descent parser over a [`Scanner`]
///
/// Productions return `None` after reporting a severe diagnostic. Inside a
/// block a failed statement is replaced by an [`ErrorNode`] and parsing
/// resumes at the next token that can only start a statement. Nesting past
/// [`PARSER_MAX_DEPTH`] aborts the parse instead of exhausting the stack.
pub struct Parser<'a, 'd> {
    scanner: Scanner<'a>,
    diagnostics: &'d mut Diagnostics,
    max_errors: usize,
    errors: usize,
    consumed: usize,
    depth: usize,
    aborted: bool,
}

impl<'a, 'd> Parser<'a, 'd> {
    pub fn new(source: &'a str, trie: &'a TokenTrie, diagnostics: &'d mut Diagnostics) -> Self {
        Self {
            scanner: Scanner::new(source, trie),
            diagnostics,
            max_errors: DEFAULT_MAX_PARSE_ERRORS,
            errors: 0,
            consumed: 0,
            depth: 0,
            aborted: false,
        }
    }

    pub fn with_max_errors(mut self, max_errors: usize) -> Self {
        self.max_errors = max_errors;
        self
    }

    /// program := block
    pub fn parse_program(&mut self) -> Option<Block> {
        let block = self.parse_block()?;
        if let Some((found, location)) = self.peek_text() {
            self.report(ParseError::TrailingInput { found, location });
        }
        Some(block)
    }

    // ---- token helpers ----

    fn peek(&mut self) -> Option<&LexicalToken> {
        self.scanner.peek(&mut *self.diagnostics)
    }

    fn peek_symbol(&mut self) -> Option<Symbol> {
        self.peek().and_then(|token| token.symbol())
    }

    fn peek_text(&mut self) -> Option<(String, Location)> {
        self.peek().map(|token| (token.lexeme().to_string(), token.location()))
    }

    fn check(&mut self, symbol: Symbol) -> bool {
        self.peek_symbol() == Some(symbol)
    }

    fn advance(&mut self) -> Option<LexicalToken> {
        let token = self.scanner.next(&mut *self.diagnostics)?;
        self.consumed += 1;
        Some(token)
    }

    fn match_token(&mut self, symbol: Symbol) -> Option<LexicalToken> {
        if self.check(symbol) {
            self.advance()
        } else {
            None
        }
    }

    /// Consume `symbol` or report what was found instead
    fn expect(&mut self, symbol: Symbol) -> Option<LexicalToken> {
        if self.check(symbol) {
            return self.advance();
        }
        self.unexpected(&format!("`{}`", symbol.lexeme()));
        None
    }

    fn expect_identifier(&mut self) -> Option<Ident> {
        if matches!(self.peek().map(|t| t.kind()), Some(TokenKind::Identifier)) {
            return self.advance().map(LexicalToken::into_text);
        }
        self.unexpected("identifier");
        None
    }

    fn unexpected(&mut self, expected: &str) {
        let error = match self.peek_text() {
            Some((found, location)) => ParseError::unexpected_token(expected, &found, location),
            None => {
                let location = self.scanner.location();
                ParseError::unexpected_end_of_input(expected, location)
            }
        };
        self.report(error);
    }

    fn report(&mut self, error: ParseError) {
        let location = error.location();
        self.diagnostics.severe(Phase::Parser, error.to_string(), Some(location));
    }

    fn too_deep(&mut self) {
        let location = self.scanner.location();
        self.report(ParseError::TooDeep { limit: PARSER_MAX_DEPTH, location });
        self.aborted = true;
    }

    /// Run a production one nesting level further down
    fn nested<T>(&mut self, production: impl FnOnce(&mut Self) -> Option<T>) -> Option<T> {
        if self.depth >= PARSER_MAX_DEPTH {
            self.too_deep();
            return None;
        }
        self.depth += 1;
        let result = production(self);
        self.depth -= 1;
        result
    }

    /// Count one more operator on a left-leaning chain of `links` so far
    fn lengthen(&mut self, links: &mut usize) -> bool {
        *links += 1;
        if self.depth + *links > PARSER_MAX_DEPTH {
            self.too_deep();
            return false;
        }
        true
    }

    /// Skip to a token that can only start a statement, or to `}`
    fn synchronize(&mut self) {
        while let Some(symbol) = self.peek().map(|t| t.symbol()) {
            match symbol {
                Some(s) if s.starts_statement() || s == Symbol::RightBrace => break,
                _ => {
                    self.advance();
                }
            }
        }
    }

    // ---- statements ----

    /// block := '{' statement* '}'
    fn parse_block(&mut self) -> Option<Block> {
        self.nested(Self::parse_block_body)
    }

    fn parse_block_body(&mut self) -> Option<Block> {
        let open = self.expect(Symbol::LeftBrace)?;
        let mut statements = Vec::new();

        while self.peek().is_some() && !self.check(Symbol::RightBrace) {
            let before = self.consumed;
            let location = self.scanner.location();
            if let Some(stmt) = self.parse_statement() {
                statements.push(stmt);
                continue;
            }
            if self.aborted {
                return None;
            }

            self.errors += 1;
            if self.errors >= self.max_errors {
                self.report(ParseError::TooManyErrors { limit: self.max_errors, location });
                self.aborted = true;
                return None;
            }
            let text = self
                .peek()
                .map(|t| t.text().clone())
                .unwrap_or_else(|| LocatedText::new("", location));
            log::debug!("recovering from syntax error at {}", location);
            if self.consumed == before {
                self.advance();
            }
            self.synchronize();
            statements.push(Stmt::Error(ErrorNode { text }));
        }

        self.expect(Symbol::RightBrace)?;
        Some(Block::new(statements, open.location()))
    }

    fn parse_statement(&mut self) -> Option<Stmt> {
        let kind = self.peek().map(|t| t.kind());
        match kind {
            Some(TokenKind::Symbol(Symbol::If)) => self.parse_if().map(Stmt::If),
            Some(TokenKind::Symbol(Symbol::Check)) => self.parse_check().map(Stmt::Check),
            Some(TokenKind::Symbol(Symbol::Print)) => self.parse_print().map(Stmt::Print),
            Some(TokenKind::Symbol(Symbol::Input)) => self.parse_input().map(Stmt::Input),
            Some(TokenKind::Identifier) => self.parse_assignment().map(Stmt::Assignment),
            _ => {
                self.unexpected("statement");
                None
            }
        }
    }

    /// assignment := identifier ':=' intExpr
    fn parse_assignment(&mut self) -> Option<Assignment> {
        let target = self.expect_identifier()?;
        self.expect(Symbol::Assign)?;
        let value = self.parse_int_expr()?;
        let location = target.location();
        Some(Assignment { target, value, location })
    }

    /// if := 'if' boolExpr block 'else' block
    fn parse_if(&mut self) -> Option<IfStmt> {
        let keyword = self.expect(Symbol::If)?;
        let condition = self.parse_bool_expr()?;
        let then_block = self.parse_block()?;
        self.expect(Symbol::Else)?;
        let else_block = self.parse_block()?;
        Some(IfStmt { condition, then_block, else_block, location: keyword.location() })
    }

    /// check := 'check' '(' boolExpr ')'
    fn parse_check(&mut self) -> Option<CheckStmt> {
        let keyword = self.expect(Symbol::Check)?;
        self.expect(Symbol::LeftParen)?;
        let condition = self.parse_bool_expr()?;
        self.expect(Symbol::RightParen)?;
        Some(CheckStmt { condition, location: keyword.location() })
    }

    /// print := 'print' '(' identifier ')'
    fn parse_print(&mut self) -> Option<PrintStmt> {
        let keyword = self.expect(Symbol::Print)?;
        self.expect(Symbol::LeftParen)?;
        let variable = self.expect_identifier()?;
        self.expect(Symbol::RightParen)?;
        Some(PrintStmt { variable, location: keyword.location() })
    }

    /// input := '<<' identifier
    fn parse_input(&mut self) -> Option<InputStmt> {
        let arrow = self.expect(Symbol::Input)?;
        let variable = self.expect_identifier()?;
        Some(InputStmt { variable, location: arrow.location() })
    }

    // ---- integer expressions ----

    /// intExpr := term (('+' | '-') term)*
    fn parse_int_expr(&mut self) -> Option<IntExpr> {
        let first = self.parse_term()?;
        self.parse_add_rest(first)
    }

    fn parse_add_rest(&mut self, mut left: IntExpr) -> Option<IntExpr> {
        let mut links = 0;
        loop {
            let op = match self.peek_symbol() {
                Some(Symbol::Add) => IntOp::Add,
                Some(Symbol::Sub) => IntOp::Sub,
                _ => return Some(left),
            };
            if !self.lengthen(&mut links) {
                return None;
            }
            let token = self.advance()?;
            let right = self.parse_term()?;
            left = IntExpr::Operator(IntOperator::binary(op, left, right, token.location()));
        }
    }

    /// term := unary ('*' unary)*
    fn parse_term(&mut self) -> Option<IntExpr> {
        let first = self.parse_unary()?;
        self.parse_mul_rest(first)
    }

    fn parse_mul_rest(&mut self, mut left: IntExpr) -> Option<IntExpr> {
        let mut links = 0;
        while let Some(token) = self.match_token(Symbol::Mul) {
            if !self.lengthen(&mut links) {
                return None;
            }
            let right = self.parse_unary()?;
            left = IntExpr::Operator(IntOperator::binary(IntOp::Mul, left, right, token.location()));
        }
        Some(left)
    }

    /// The rest of an integer expression whose first primary is already parsed
    fn parse_int_suffix(&mut self, primary: IntExpr) -> Option<IntExpr> {
        let term = self.parse_mul_rest(primary)?;
        self.parse_add_rest(term)
    }

    /// unary := '-' unary | primary
    fn parse_unary(&mut self) -> Option<IntExpr> {
        self.nested(Self::parse_unary_body)
    }

    fn parse_unary_body(&mut self) -> Option<IntExpr> {
        if let Some(token) = self.match_token(Symbol::Sub) {
            let operand = self.parse_unary()?;
            return Some(IntExpr::Operator(IntOperator::negate(operand, token.location())));
        }
        self.parse_primary()
    }

    /// primary := '(' intExpr ')' | identifier | integer
    fn parse_primary(&mut self) -> Option<IntExpr> {
        let kind = self.peek().map(|t| t.kind());
        match kind {
            Some(TokenKind::Symbol(Symbol::LeftParen)) => {
                self.advance()?;
                let inner = self.parse_int_expr()?;
                self.expect(Symbol::RightParen)?;
                Some(inner)
            }
            Some(TokenKind::Identifier) => {
                let name = self.advance()?.into_text();
                Some(IntExpr::Label(Label { name }))
            }
            Some(TokenKind::Integer) => {
                let literal = self.advance()?.into_text();
                Some(IntExpr::Constant(IntConstant { literal }))
            }
            _ => {
                self.unexpected("integer expression");
                None
            }
        }
    }

    // ---- boolean expressions ----

    /// boolExpr := and ('||' and)*
    fn parse_bool_expr(&mut self) -> Option<BoolExpr> {
        let first = self.parse_and()?;
        self.parse_or_rest(first)
    }

    fn parse_or_rest(&mut self, mut left: BoolExpr) -> Option<BoolExpr> {
        let mut links = 0;
        while let Some(token) = self.match_token(Symbol::Or) {
            if !self.lengthen(&mut links) {
                return None;
            }
            let right = self.parse_and()?;
            left = BoolExpr::Operator(BoolOperator::binary(BoolOp::Or, left, right, token.location()));
        }
        Some(left)
    }

    /// and := not ('&&' not)*
    fn parse_and(&mut self) -> Option<BoolExpr> {
        let first = self.parse_not()?;
        self.parse_and_rest(first)
    }

    fn parse_and_rest(&mut self, mut left: BoolExpr) -> Option<BoolExpr> {
        let mut links = 0;
        while let Some(token) = self.match_token(Symbol::And) {
            if !self.lengthen(&mut links) {
                return None;
            }
            let right = self.parse_not()?;
            left = BoolExpr::Operator(BoolOperator::binary(BoolOp::And, left, right, token.location()));
        }
        Some(left)
    }

    /// The rest of a boolean expression whose first operand is already parsed
    fn parse_bool_suffix(&mut self, operand: BoolExpr) -> Option<BoolExpr> {
        let conjunction = self.parse_and_rest(operand)?;
        self.parse_or_rest(conjunction)
    }

    /// not := '!' not | boolPrimary
    fn parse_not(&mut self) -> Option<BoolExpr> {
        self.nested(Self::parse_not_body)
    }

    fn parse_not_body(&mut self) -> Option<BoolExpr> {
        if let Some(token) = self.match_token(Symbol::Not) {
            let operand = self.parse_not()?;
            return Some(BoolExpr::Operator(BoolOperator::not(operand, token.location())));
        }
        self.parse_bool_primary()
    }

    /// boolPrimary := '(' boolExpr ')' | intExpr cmp intExpr
    ///
    /// A parenthesis may also open the left operand of a comparison, as in
    /// `(a + b) * c > 0`; [`Self::parse_paren_body`] tells the two apart.
    fn parse_bool_primary(&mut self) -> Option<BoolExpr> {
        if self.match_token(Symbol::LeftParen).is_some() {
            let body = self.parse_paren_body()?;
            self.expect(Symbol::RightParen)?;
            return match body {
                ParenBody::Bool(expr) => Some(expr),
                ParenBody::Int(primary) => {
                    let left = self.parse_int_suffix(primary)?;
                    self.parse_comparison(left)
                }
            };
        }
        let left = self.parse_int_expr()?;
        self.parse_comparison(left)
    }

    /// Body of a parenthesis whose opening token was just consumed
    fn parse_paren_body(&mut self) -> Option<ParenBody> {
        self.nested(Self::parse_paren_contents)
    }

    fn parse_paren_contents(&mut self) -> Option<ParenBody> {
        if self.check(Symbol::Not) {
            return self.parse_bool_expr().map(ParenBody::Bool);
        }

        let int_expr = if self.match_token(Symbol::LeftParen).is_some() {
            let nested = self.parse_paren_body()?;
            self.expect(Symbol::RightParen)?;
            match nested {
                ParenBody::Bool(expr) => return self.parse_bool_suffix(expr).map(ParenBody::Bool),
                ParenBody::Int(primary) => self.parse_int_suffix(primary)?,
            }
        } else {
            self.parse_int_expr()?
        };

        if self.peek_symbol().is_some_and(Symbol::is_comparison) {
            let comparison = self.parse_comparison(int_expr)?;
            return self.parse_bool_suffix(comparison).map(ParenBody::Bool);
        }
        Some(ParenBody::Int(int_expr))
    }

    /// cmp := '>' | '==' | '<' | '!='; comparisons do not chain
    fn parse_comparison(&mut self, left: IntExpr) -> Option<BoolExpr> {
        let op = match self.peek_symbol() {
            Some(symbol) if symbol.is_comparison() => symbol,
            _ => {
                self.unexpected("comparison operator");
                return None;
            }
        };
        let token = self.advance()?;
        let right = self.parse_int_expr()?;
        let location = token.location();
        let compare = |op| BoolExpr::Compare(BoolCompare::new(op, left, right, location));
        let expr = match op {
            Symbol::Greater => compare(CompareOp::Greater),
            Symbol::Lesser => compare(CompareOp::Lesser),
            Symbol::Equal => compare(CompareOp::Equal),
            // `a != b` is sugar for `!(a == b)`
            _ => BoolExpr::Operator(BoolOperator::not(compare(CompareOp::Equal), location)),
        };
        Some(expr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> (Option<Block>, Diagnostics) {
        let trie = TokenTrie::standard().unwrap();
        let mut diags = Diagnostics::new();
        let block = Parser::new(source, &trie, &mut diags).parse_program();
        (block, diags)
    }

    #[test]
    fn test_parse_assignment_precedence() {
        let (block, diags) = parse("{ x := 1 + 2 * 3 }");
        assert!(!diags.has_severe());
        let block = block.unwrap();
        let Stmt::Assignment(assignment) = &block.statements[0] else { panic!("expected assignment") };
        let IntExpr::Operator(add) = &assignment.value else { panic!("expected operator") };
        assert_eq!(add.op, IntOp::Add);
        assert!(matches!(add.right.as_deref(), Some(IntExpr::Operator(IntOperator { op: IntOp::Mul, .. }))));
    }

    #[test]
    fn test_subtraction_is_left_associative() {
        let (block, _) = parse("{ x := a - b - c }");
        let Stmt::Assignment(assignment) = &block.unwrap().statements[0] else { panic!() };
        let IntExpr::Operator(outer) = &assignment.value else { panic!() };
        assert_eq!(outer.op, IntOp::Sub);
        assert!(matches!(outer.left.as_ref(), IntExpr::Operator(IntOperator { op: IntOp::Sub, .. })));
        assert!(matches!(outer.right.as_deref(), Some(IntExpr::Label(_))));
    }

    #[test]
    fn test_parenthesised_int_in_condition() {
        let (block, diags) = parse("{ check((a + b) * c > 0 && !(x == 1)) }");
        assert!(!diags.has_severe(), "{:?}", diags);
        let Stmt::Check(check) = &block.unwrap().statements[0] else { panic!() };
        let BoolExpr::Operator(and) = &check.condition else { panic!() };
        assert_eq!(and.op, BoolOp::And);
        assert!(matches!(and.left.as_ref(), BoolExpr::Compare(BoolCompare { op: CompareOp::Greater, .. })));
    }

    #[test]
    fn test_not_equal_desugars() {
        let (block, _) = parse("{ check(y != 0) }");
        let Stmt::Check(check) = &block.unwrap().statements[0] else { panic!() };
        let BoolExpr::Operator(not) = &check.condition else { panic!() };
        assert_eq!(not.op, BoolOp::Not);
        assert!(not.right.is_none());
        assert!(matches!(not.left.as_ref(), BoolExpr::Compare(BoolCompare { op: CompareOp::Equal, .. })));
    }

    #[test]
    fn test_recovery_keeps_later_statements() {
        let (block, diags) = parse("{ x := := 3 print(x) }");
        assert!(diags.has_severe());
        let block = block.unwrap();
        assert!(matches!(block.statements[0], Stmt::Error(_)));
        assert!(matches!(block.statements[1], Stmt::Print(_)));
    }

    #[test]
    fn test_missing_else_is_reported() {
        let (_, diags) = parse("{ if x > 0 { y := 1 } }");
        assert!(diags.mentions("Expected `else`"), "{:?}", diags);
    }
}
