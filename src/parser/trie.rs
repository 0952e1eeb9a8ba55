//! Prefix trie over the fixed lexemes
//!
//! The scanner walks the trie one character at a time and remembers the last
//! node that terminated a lexeme, which gives maximal munch over the fixed
//! tokens. The trie is built once at startup and handed to every scanner.

use std::collections::BTreeMap;
use std::fmt::Debug;

use thiserror::Error;

use super::lexer::Symbol;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrieError {
    #[error("ambiguous token definition: `{lexeme}` is both {first} and {second}")]
    Ambiguous { lexeme: String, first: String, second: String },

    #[error("empty lexeme defined for {token}")]
    EmptyLexeme { token: String },
}

/// Index of a node inside a [`TokenTrie`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrieCursor(usize);

#[derive(Debug, Clone)]
struct TrieNode<T> {
    children: BTreeMap<char, usize>,
    terminal: Option<T>,
}

impl<T> TrieNode<T> {
    fn empty() -> Self {
        Self { children: BTreeMap::new(), terminal: None }
    }
}

#[derive(Debug, Clone)]
pub struct TokenTrie<T = Symbol> {
    nodes: Vec<TrieNode<T>>,
}

impl<T: Copy + Debug> TokenTrie<T> {
    /// Build a trie from `(lexeme, token)` pairs.
    ///
    /// Two definitions ending on the same node would make the scanner's
    /// choice arbitrary, so they are rejected.
    pub fn build<'a, I>(definitions: I) -> Result<Self, TrieError>
    where
        I: IntoIterator<Item = (&'a str, T)>,
    {
        let mut trie = Self { nodes: vec![TrieNode::empty()] };
        for (lexeme, token) in definitions {
            trie.insert(lexeme, token)?;
        }
        Ok(trie)
    }

    fn insert(&mut self, lexeme: &str, token: T) -> Result<(), TrieError> {
        if lexeme.is_empty() {
            return Err(TrieError::EmptyLexeme { token: format!("{:?}", token) });
        }
        let mut current = 0;
        for ch in lexeme.chars() {
            current = match self.nodes[current].children.get(&ch) {
                Some(&next) => next,
                None => {
                    let next = self.nodes.len();
                    self.nodes.push(TrieNode::empty());
                    self.nodes[current].children.insert(ch, next);
                    next
                }
            };
        }
        if let Some(existing) = self.nodes[current].terminal {
            return Err(TrieError::Ambiguous {
                lexeme: lexeme.to_string(),
                first: format!("{:?}", existing),
                second: format!("{:?}", token),
            });
        }
        self.nodes[current].terminal = Some(token);
        Ok(())
    }

    pub fn root(&self) -> TrieCursor {
        TrieCursor(0)
    }

    /// Follow the edge labelled `ch`, if any
    pub fn step(&self, cursor: TrieCursor, ch: char) -> Option<TrieCursor> {
        self.nodes[cursor.0].children.get(&ch).map(|&next| TrieCursor(next))
    }

    /// Token whose lexeme ends exactly at `cursor`
    pub fn terminal(&self, cursor: TrieCursor) -> Option<T> {
        self.nodes[cursor.0].terminal
    }

    /// Longest fixed lexeme that prefixes `input`, with its length in chars
    pub fn longest_match(&self, input: &str) -> Option<(T, usize)> {
        let mut cursor = self.root();
        let mut best = None;
        for (depth, ch) in input.chars().enumerate() {
            match self.step(cursor, ch) {
                Some(next) => cursor = next,
                None => break,
            }
            if let Some(token) = self.terminal(cursor) {
                best = Some((token, depth + 1));
            }
        }
        best
    }
}

impl TokenTrie<Symbol> {
    /// The trie over every fixed lexeme of the language
    pub fn standard() -> Result<Self, TrieError> {
        Self::build(Symbol::ALL.iter().map(|&symbol| (symbol.lexeme(), symbol)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_lexicon_builds() {
        let trie = TokenTrie::standard().unwrap();
        assert_eq!(trie.longest_match("&&x"), Some((Symbol::And, 2)));
        assert_eq!(trie.longest_match(":= 1"), Some((Symbol::Assign, 2)));
        assert_eq!(trie.longest_match("<<"), Some((Symbol::Input, 2)));
        assert_eq!(trie.longest_match("< 3"), Some((Symbol::Lesser, 1)));
        assert_eq!(trie.longest_match("!="), Some((Symbol::NotEqual, 2)));
        assert_eq!(trie.longest_match("&"), None);
        assert_eq!(trie.longest_match("x"), None);
    }

    #[test]
    fn duplicate_lexeme_is_rejected() {
        let err = TokenTrie::build([("==", 1u8), ("<", 2), ("==", 3)]).unwrap_err();
        assert_eq!(
            err,
            TrieError::Ambiguous { lexeme: "==".to_string(), first: "1".to_string(), second: "3".to_string() }
        );
    }

    #[test]
    fn shared_prefixes_are_not_ambiguous() {
        let trie = TokenTrie::build([("<", 'a'), ("<<", 'b'), ("<<=", 'c')]).unwrap();
        assert_eq!(trie.longest_match("<<<"), Some(('b', 2)));
        assert_eq!(trie.longest_match("<<="), Some(('c', 3)));
    }

    #[test]
    fn empty_lexeme_is_rejected() {
        assert!(matches!(TokenTrie::build([("", 0u8)]), Err(TrieError::EmptyLexeme { .. })));
    }
}
