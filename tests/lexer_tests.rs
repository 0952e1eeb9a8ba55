use wpc::parser::{tokenize, Symbol, TokenKind, TokenTrie};
use wpc::Diagnostics;

fn kinds(source: &str) -> (Vec<TokenKind>, Diagnostics) {
    let trie = TokenTrie::standard().expect("standard lexicon");
    let mut diagnostics = Diagnostics::new();
    let kinds = tokenize(source, &trie, &mut diagnostics).iter().map(|t| t.kind()).collect();
    (kinds, diagnostics)
}

fn sym(symbol: Symbol) -> TokenKind {
    TokenKind::Symbol(symbol)
}

#[test]
fn lexer_operators_take_longest_match() {
    let (tokens, diagnostics) = kinds("&& || != ! == := << < > * + -");
    assert!(diagnostics.is_empty());
    assert_eq!(
        tokens,
        vec![
            sym(Symbol::And),
            sym(Symbol::Or),
            sym(Symbol::NotEqual),
            sym(Symbol::Not),
            sym(Symbol::Equal),
            sym(Symbol::Assign),
            sym(Symbol::Input),
            sym(Symbol::Lesser),
            sym(Symbol::Greater),
            sym(Symbol::Mul),
            sym(Symbol::Add),
            sym(Symbol::Sub),
        ]
    );
}

#[test]
fn lexer_tokens_need_no_whitespace() {
    let (tokens, _) = kinds("<<x!=y");
    assert_eq!(
        tokens,
        vec![sym(Symbol::Input), TokenKind::Identifier, sym(Symbol::NotEqual), TokenKind::Identifier]
    );
}

#[test]
fn lexer_keywords_yield_to_longer_identifiers() {
    let (tokens, _) = kinds("if iffy else elsewhere check checked print printer");
    assert_eq!(
        tokens,
        vec![
            sym(Symbol::If),
            TokenKind::Identifier,
            sym(Symbol::Else),
            TokenKind::Identifier,
            sym(Symbol::Check),
            TokenKind::Identifier,
            sym(Symbol::Print),
            TokenKind::Identifier,
        ]
    );
}

#[test]
fn lexer_reports_invalid_runs_once() {
    let (tokens, diagnostics) = kinds("x := 1 @@ y");
    assert_eq!(tokens[3], TokenKind::Error);
    assert_eq!(tokens[4], TokenKind::Identifier);
    assert_eq!(diagnostics.severe_count(), 1);
    assert!(diagnostics.mentions("Invalid token `@@`"));
}

#[test]
fn lexer_tracks_lines_and_columns() {
    let trie = TokenTrie::standard().unwrap();
    let mut diagnostics = Diagnostics::new();
    let tokens = tokenize("{\n  total := 42\n}", &trie, &mut diagnostics);
    let positions: Vec<(usize, usize)> =
        tokens.iter().map(|t| (t.location().line, t.location().column)).collect();
    assert_eq!(positions, vec![(1, 1), (2, 3), (2, 9), (2, 12), (3, 1)]);
    assert_eq!(tokens[1].lexeme(), "total");
    assert_eq!(tokens[3].lexeme(), "42");
}
