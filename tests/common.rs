// Shared helpers for integration tests
#![allow(dead_code)]

use std::time::Duration;

use wpc::ast::Block;
use wpc::{Config, Diagnostics, Verdict};

/// Default configuration with a deadline generous enough for slow CI machines
pub fn test_config() -> Config {
    Config::default().with_timeout(Duration::from_secs(30))
}

/// Parse a program that is expected to be well-formed
pub fn parse(source: &str) -> Block {
    let mut diagnostics = Diagnostics::new();
    match wpc::parse_source(source, &test_config(), &mut diagnostics) {
        Ok(program) => program,
        Err(err) => panic!("parse failed: {}\n{:?}", err, diagnostics),
    }
}

/// Run the full static pipeline and return the verdict with its diagnostics
pub fn verify(source: &str) -> (Verdict, Diagnostics) {
    let mut diagnostics = Diagnostics::new();
    match wpc::check_source(source, &test_config(), &mut diagnostics) {
        Ok((_, verdict)) => (verdict, diagnostics),
        Err(err) => panic!("pipeline failed before a verdict: {}\n{:?}", err, diagnostics),
    }
}
