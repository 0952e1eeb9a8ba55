use std::fmt;
use std::str::Chars;

use crate::diagnostics::{Diagnostics, Phase};

use super::span::{LocatedChar, LocatedText, Location};
use super::trie::TokenTrie;

/// Fixed-lexeme tokens of the language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
    LeftBrace,
    RightBrace,
    LeftParen,
    RightParen,
    Add,
    Sub,
    Mul,
    Not,
    NotEqual,
    Or,
    And,
    Greater,
    Equal,
    Lesser,
    Assign,
    Input,
    If,
    Else,
    Check,
    Print,
}

impl Symbol {
    pub const ALL: [Symbol; 20] = [
        Symbol::LeftBrace,
        Symbol::RightBrace,
        Symbol::LeftParen,
        Symbol::RightParen,
        Symbol::Add,
        Symbol::Sub,
        Symbol::Mul,
        Symbol::Not,
        Symbol::NotEqual,
        Symbol::Or,
        Symbol::And,
        Symbol::Greater,
        Symbol::Equal,
        Symbol::Lesser,
        Symbol::Assign,
        Symbol::Input,
        Symbol::If,
        Symbol::Else,
        Symbol::Check,
        Symbol::Print,
    ];

    pub fn lexeme(self) -> &'static str {
        match self {
            Symbol::LeftBrace => "{",
            Symbol::RightBrace => "}",
            Symbol::LeftParen => "(",
            Symbol::RightParen => ")",
            Symbol::Add => "+",
            Symbol::Sub => "-",
            Symbol::Mul => "*",
            Symbol::Not => "!",
            Symbol::NotEqual => "!=",
            Symbol::Or => "||",
            Symbol::And => "&&",
            Symbol::Greater => ">",
            Symbol::Equal => "==",
            Symbol::Lesser => "<",
            Symbol::Assign => ":=",
            Symbol::Input => "<<",
            Symbol::If => "if",
            Symbol::Else => "else",
            Symbol::Check => "check",
            Symbol::Print => "print",
        }
    }

    /// Check if this symbol is a keyword
    pub fn is_keyword(self) -> bool {
        matches!(self, Symbol::If | Symbol::Else | Symbol::Check | Symbol::Print)
    }

    /// Check if this symbol can only begin a statement
    pub fn starts_statement(self) -> bool {
        matches!(self, Symbol::If | Symbol::Check | Symbol::Print | Symbol::Input)
    }

    /// Check if this symbol is a comparison operator
    pub fn is_comparison(self) -> bool {
        matches!(self, Symbol::Greater | Symbol::Equal | Symbol::Lesser | Symbol::NotEqual)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.lexeme())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Symbol(Symbol),
    Integer,
    Identifier,
    /// Unrecognisable input; already reported when produced
    Error,
}

/// Lexical token with location information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexicalToken {
    kind: TokenKind,
    text: LocatedText,
}

impl LexicalToken {
    pub fn new(kind: TokenKind, text: LocatedText) -> Self {
        Self { kind, text }
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    /// The fixed symbol, if this is a fixed-lexeme token
    pub fn symbol(&self) -> Option<Symbol> {
        match self.kind {
            TokenKind::Symbol(symbol) => Some(symbol),
            _ => None,
        }
    }

    /// Get the lexeme (actual text)
    pub fn lexeme(&self) -> &str {
        self.text.text()
    }

    pub fn text(&self) -> &LocatedText {
        &self.text
    }

    pub fn into_text(self) -> LocatedText {
        self.text
    }

    pub fn location(&self) -> Location {
        self.text.location()
    }

    /// Check if this token is the given fixed symbol
    pub fn is(&self, symbol: Symbol) -> bool {
        self.kind == TokenKind::Symbol(symbol)
    }
}

impl fmt::Display for LexicalToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.lexeme())
    }
}

/// Character source with unlimited pushback
struct CharStream<'a> {
    chars: Chars<'a>,
    location: Location,
    pushed: Vec<LocatedChar>,
}

impl<'a> CharStream<'a> {
    fn new(source: &'a str) -> Self {
        Self { chars: source.chars(), location: Location::start(), pushed: Vec::new() }
    }

    fn next(&mut self) -> Option<LocatedChar> {
        if let Some(c) = self.pushed.pop() {
            return Some(c);
        }
        let ch = self.chars.next()?;
        let located = LocatedChar { ch, location: self.location };
        self.location.advance(ch);
        Some(located)
    }

    fn push_back(&mut self, c: LocatedChar) {
        self.pushed.push(c);
    }

    /// Return characters in reverse of the order they were read
    fn push_back_all(&mut self, chars: &[LocatedChar]) {
        for &c in chars.iter().rev() {
            self.push_back(c);
        }
    }

    fn peek(&mut self) -> Option<LocatedChar> {
        let c = self.next()?;
        self.push_back(c);
        Some(c)
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> Vec<LocatedChar> {
        let mut taken = Vec::new();
        while let Some(c) = self.next() {
            if !pred(c.ch) {
                self.push_back(c);
                break;
            }
            taken.push(c);
        }
        taken
    }

    fn location(&mut self) -> Location {
        self.peek().map(|c| c.location).unwrap_or(self.location)
    }
}

/// Pull-based scanner with one token of lookahead
///
/// Fixed lexemes are matched through the trie with maximal munch; failing
/// that an integer literal, then an identifier, is tried. Anything else
/// becomes an error token spanning up to the next whitespace.
pub struct Scanner<'a> {
    stream: CharStream<'a>,
    trie: &'a TokenTrie,
    lookahead: Option<LexicalToken>,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str, trie: &'a TokenTrie) -> Self {
        Self { stream: CharStream::new(source), trie, lookahead: None }
    }

    /// Next token without consuming it; `None` at end of input
    pub fn peek(&mut self, diagnostics: &mut Diagnostics) -> Option<&LexicalToken> {
        if self.lookahead.is_none() {
            self.lookahead = self.scan(diagnostics);
        }
        self.lookahead.as_ref()
    }

    pub fn next(&mut self, diagnostics: &mut Diagnostics) -> Option<LexicalToken> {
        match self.lookahead.take() {
            Some(token) => Some(token),
            None => self.scan(diagnostics),
        }
    }

    /// Location of the next unread character (end of input if none)
    pub fn location(&mut self) -> Location {
        match &self.lookahead {
            Some(token) => token.location(),
            None => self.stream.location(),
        }
    }

    fn scan(&mut self, diagnostics: &mut Diagnostics) -> Option<LexicalToken> {
        self.stream.take_while(char::is_whitespace);
        self.stream.peek()?;

        let token = self
            .scan_symbol()
            .or_else(|| self.scan_integer())
            .or_else(|| self.scan_identifier())
            .unwrap_or_else(|| self.scan_error(diagnostics));
        log::trace!("token {:?} `{}` at {}", token.kind(), token.lexeme(), token.location());
        Some(token)
    }

    fn scan_symbol(&mut self) -> Option<LexicalToken> {
        let mut cursor = self.trie.root();
        let mut consumed = Vec::new();
        let mut best: Option<(Symbol, usize)> = None;

        while let Some(c) = self.stream.next() {
            match self.trie.step(cursor, c.ch) {
                Some(next) => {
                    cursor = next;
                    consumed.push(c);
                    if let Some(symbol) = self.trie.terminal(cursor) {
                        best = Some((symbol, consumed.len()));
                    }
                }
                None => {
                    self.stream.push_back(c);
                    break;
                }
            }
        }

        let Some((symbol, len)) = best else {
            self.stream.push_back_all(&consumed);
            return None;
        };
        self.stream.push_back_all(&consumed[len..]);

        // `iffy` is an identifier, not `if` followed by `fy`
        if symbol.is_keyword() {
            if let Some(c) = self.stream.peek() {
                if c.ch.is_ascii_alphanumeric() {
                    self.stream.push_back_all(&consumed[..len]);
                    return None;
                }
            }
        }

        let text = LocatedText::from_chars(&consumed[..len])?;
        Some(LexicalToken::new(TokenKind::Symbol(symbol), text))
    }

    fn scan_integer(&mut self) -> Option<LexicalToken> {
        let digits = self.stream.take_while(|ch| ch.is_ascii_digit());
        let text = LocatedText::from_chars(&digits)?;
        Some(LexicalToken::new(TokenKind::Integer, text))
    }

    fn scan_identifier(&mut self) -> Option<LexicalToken> {
        let first = self.stream.next()?;
        // identifiers are ASCII only; other letters fall through to an error token
        if !first.ch.is_ascii_alphabetic() {
            self.stream.push_back(first);
            return None;
        }
        let mut chars = vec![first];
        chars.extend(self.stream.take_while(|ch| ch.is_ascii_alphanumeric()));
        let text = LocatedText::from_chars(&chars)?;
        Some(LexicalToken::new(TokenKind::Identifier, text))
    }

    fn scan_error(&mut self, diagnostics: &mut Diagnostics) -> LexicalToken {
        let location = self.stream.location();
        let chars = self.stream.take_while(|ch| !ch.is_whitespace());
        let text = LocatedText::from_chars(&chars).unwrap_or_else(|| LocatedText::new("", location));
        diagnostics.severe(
            Phase::Scanner,
            format!("Invalid token `{}` at {}", text.text(), location),
            Some(location),
        );
        LexicalToken::new(TokenKind::Error, text)
    }
}

/// Scan the whole source into a token vector
pub fn tokenize(source: &str, trie: &TokenTrie, diagnostics: &mut Diagnostics) -> Vec<LexicalToken> {
    let mut scanner = Scanner::new(source, trie);
    let mut tokens = Vec::new();
    while let Some(token) = scanner.next(diagnostics) {
        tokens.push(token);
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let trie = TokenTrie::standard().unwrap();
        let mut diags = Diagnostics::new();
        tokenize(source, &trie, &mut diags).iter().map(|t| t.kind()).collect()
    }

    #[test]
    fn test_lexer_statement() {
        assert_eq!(
            kinds("x := 10"),
            vec![TokenKind::Identifier, TokenKind::Symbol(Symbol::Assign), TokenKind::Integer]
        );
    }

    #[test]
    fn test_lexer_keyword_prefix_is_identifier() {
        assert_eq!(kinds("iffy"), vec![TokenKind::Identifier]);
        assert_eq!(kinds("if("), vec![TokenKind::Symbol(Symbol::If), TokenKind::Symbol(Symbol::LeftParen)]);
    }

    #[test]
    fn test_peek_does_not_consume() {
        let trie = TokenTrie::standard().unwrap();
        let mut diags = Diagnostics::new();
        let mut scanner = Scanner::new("a b", &trie);
        assert_eq!(scanner.peek(&mut diags).map(|t| t.lexeme().to_string()), Some("a".to_string()));
        assert_eq!(scanner.next(&mut diags).map(|t| t.lexeme().to_string()), Some("a".to_string()));
        assert_eq!(scanner.next(&mut diags).map(|t| t.lexeme().to_string()), Some("b".to_string()));
        assert!(scanner.peek(&mut diags).is_none());
        assert!(scanner.next(&mut diags).is_none());
    }

    #[test]
    fn test_partial_symbol_is_pushed_back() {
        // `&` alone is not a token, the error token covers the whole run
        let trie = TokenTrie::standard().unwrap();
        let mut diags = Diagnostics::new();
        let tokens = tokenize("&x y", &trie, &mut diags);
        assert_eq!(tokens[0].kind(), TokenKind::Error);
        assert_eq!(tokens[0].lexeme(), "&x");
        assert_eq!(tokens[1].lexeme(), "y");
        assert!(diags.has_severe());
    }

    #[test]
    fn test_identifiers_are_ascii() {
        let trie = TokenTrie::standard().unwrap();
        let mut diags = Diagnostics::new();
        let tokens = tokenize("x\u{663} := 1", &trie, &mut diags);
        assert_eq!(tokens[0].kind(), TokenKind::Identifier);
        assert_eq!(tokens[0].lexeme(), "x");
        assert_eq!(tokens[1].kind(), TokenKind::Error);
        assert_eq!(tokens[2].kind(), TokenKind::Symbol(Symbol::Assign));
        assert!(diags.has_severe());

        assert_eq!(kinds("\u{e9}t\u{e9} := 1")[0], TokenKind::Error);
        assert_eq!(kinds("if\u{3b1}")[0], TokenKind::Symbol(Symbol::If));
    }
}
