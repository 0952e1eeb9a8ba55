use std::fmt;

/// Represents a location in source code
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Location {
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
    /// Byte offset from start of file
    pub offset: usize,
}

impl Location {
    /// Create a new location
    pub fn new(line: usize, column: usize, offset: usize) -> Self {
        Self { line, column, offset }
    }

    /// Create a location at the start of a file
    pub fn start() -> Self {
        Self { line: 1, column: 1, offset: 0 }
    }

    /// Advance the location by one character
    pub fn advance(&mut self, ch: char) {
        self.offset += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
    }
}

impl Default for Location {
    fn default() -> Self {
        Self::start()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// A character together with the position it was read from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocatedChar {
    pub ch: char,
    pub location: Location,
}

/// A piece of source text and the position of its first character
///
/// Immutable once built; every token and every tree node carries one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocatedText {
    text: String,
    location: Location,
}

impl LocatedText {
    pub fn new(text: impl Into<String>, location: Location) -> Self {
        Self { text: text.into(), location }
    }

    /// Concatenate located characters; the location is that of the first one
    pub fn from_chars(chars: &[LocatedChar]) -> Option<Self> {
        let first = chars.first()?;
        Some(Self {
            text: chars.iter().map(|c| c.ch).collect(),
            location: first.location,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn location(&self) -> Location {
        self.location
    }

    pub fn line(&self) -> usize {
        self.location.line
    }

    pub fn column(&self) -> usize {
        self.location.column
    }
}

impl fmt::Display for LocatedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Anything that can point back at the source
pub trait HasLocation {
    fn location(&self) -> Location;
}

impl HasLocation for LocatedText {
    fn location(&self) -> Location {
        self.location
    }
}
