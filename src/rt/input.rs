use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

use crate::parser::span::Location;

/// Where `<< x` statements get their text from
pub trait InputSource {
    /// One line for `variable`, or `None` once input is exhausted
    fn read_line(&mut self, variable: &str, location: Location) -> io::Result<Option<String>>;
}

/// Interactive input: prompts on stderr, reads stdin
#[derive(Debug, Default)]
pub struct StdinInput;

impl StdinInput {
    pub fn new() -> Self {
        Self
    }
}

impl InputSource for StdinInput {
    fn read_line(&mut self, variable: &str, _location: Location) -> io::Result<Option<String>> {
        let mut stderr = io::stderr();
        write!(stderr, "{}? ", variable)?;
        stderr.flush()?;

        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }
}

/// Pre-recorded lines, answered in order
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    lines: VecDeque<String>,
}

impl ScriptedInput {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { lines: lines.into_iter().map(Into::into).collect() }
    }

    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push_back(line.into());
    }

    pub fn remaining(&self) -> usize {
        self.lines.len()
    }
}

impl InputSource for ScriptedInput {
    fn read_line(&mut self, _variable: &str, _location: Location) -> io::Result<Option<String>> {
        Ok(self.lines.pop_front())
    }
}
