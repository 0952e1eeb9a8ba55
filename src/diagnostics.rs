//! Diagnostics sink
//!
//! Every phase reports user-facing problems into a [`Diagnostics`] value that
//! the caller owns and passes in explicitly. Entries keep their insertion
//! order. Each entry is also mirrored to the `log` facade so that `RUST_LOG`
//! shows the same stream interleaved with internal tracing.

use std::fmt;

use crate::parser::span::Location;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Info,
    Warning,
    Severe,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Severe => "error",
        };
        f.write_str(name)
    }
}

/// The pipeline phase that produced a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Scanner,
    Parser,
    Review,
    Verifier,
    Runtime,
}

impl Phase {
    fn target(self) -> &'static str {
        match self {
            Phase::Scanner => "wpc::scanner",
            Phase::Parser => "wpc::parser",
            Phase::Review => "wpc::review",
            Phase::Verifier => "wpc::verifier",
            Phase::Runtime => "wpc::runtime",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Scanner => "scanner",
            Phase::Parser => "parser",
            Phase::Review => "review",
            Phase::Verifier => "verifier",
            Phase::Runtime => "runtime",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub phase: Phase,
    pub message: String,
    pub location: Option<Location>,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location {
            Some(loc) => write!(f, "{}[{}] {}:{}: {}", self.severity, self.phase, loc.line, loc.column, self.message),
            None => write!(f, "{}[{}]: {}", self.severity, self.phase, self.message),
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        let level = match diagnostic.severity {
            Severity::Info => log::Level::Info,
            Severity::Warning => log::Level::Warn,
            Severity::Severe => log::Level::Error,
        };
        log::log!(target: diagnostic.phase.target(), level, "{}", diagnostic);
        self.entries.push(diagnostic);
    }

    pub fn report(&mut self, severity: Severity, phase: Phase, message: impl Into<String>, location: Option<Location>) {
        self.push(Diagnostic { severity, phase, message: message.into(), location });
    }

    pub fn info(&mut self, phase: Phase, message: impl Into<String>, location: Option<Location>) {
        self.report(Severity::Info, phase, message, location);
    }

    pub fn warning(&mut self, phase: Phase, message: impl Into<String>, location: Option<Location>) {
        self.report(Severity::Warning, phase, message, location);
    }

    pub fn severe(&mut self, phase: Phase, message: impl Into<String>, location: Option<Location>) {
        self.report(Severity::Severe, phase, message, location);
    }

    pub fn has_severe(&self) -> bool {
        self.entries.iter().any(|d| d.severity == Severity::Severe)
    }

    pub fn severe_count(&self) -> usize {
        self.entries.iter().filter(|d| d.severity == Severity::Severe).count()
    }

    /// Count of severe entries produced by one phase
    pub fn severe_count_in(&self, phase: Phase) -> usize {
        self.entries
            .iter()
            .filter(|d| d.severity == Severity::Severe && d.phase == phase)
            .count()
    }

    pub fn max_severity(&self) -> Option<Severity> {
        self.entries.iter().map(|d| d.severity).max()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True if any entry's message contains `needle`
    pub fn mentions(&self, needle: &str) -> bool {
        self.entries.iter().any(|d| d.message.contains(needle))
    }

    pub fn drain(&mut self) -> impl Iterator<Item = Diagnostic> + '_ {
        self.entries.drain(..)
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_is_tracked_in_order() {
        let mut diags = Diagnostics::new();
        assert_eq!(diags.max_severity(), None);
        diags.info(Phase::Parser, "first", None);
        diags.severe(Phase::Scanner, "second", Some(Location::new(2, 4, 10)));
        diags.warning(Phase::Review, "third", None);

        assert!(diags.has_severe());
        assert_eq!(diags.severe_count(), 1);
        assert_eq!(diags.severe_count_in(Phase::Parser), 0);
        assert_eq!(diags.max_severity(), Some(Severity::Severe));
        let messages: Vec<&str> = diags.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(messages, vec!["first", "second", "third"]);
    }

    #[test]
    fn display_includes_location() {
        let d = Diagnostic {
            severity: Severity::Severe,
            phase: Phase::Parser,
            message: "Expected }".to_string(),
            location: Some(Location::new(3, 9, 0)),
        };
        assert_eq!(d.to_string(), "error[parser] 3:9: Expected }");
    }
}
