mod common;

use std::fs;

use common::test_config;
use wpc::{Diagnostics, Error, Phase};

#[test]
fn run_file_verifies_and_executes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("square.wp");
    fs::write(&path, "{ x := 12 y := x * x check(y == 144) }").unwrap();

    let mut diagnostics = Diagnostics::new();
    let verdict = wpc::run_file(&path, &test_config(), &mut diagnostics).unwrap();
    assert!(verdict.is_verified());
    assert!(!diagnostics.has_severe());
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut diagnostics = Diagnostics::new();
    let result = wpc::run_file(dir.path().join("absent.wp"), &test_config(), &mut diagnostics);
    assert!(matches!(result, Err(Error::Io(_))));
}

#[test]
fn phases_stop_at_the_first_failure() {
    let mut diagnostics = Diagnostics::new();
    let result = wpc::check_source("{ x := check(x > 0) }", &test_config(), &mut diagnostics);
    assert!(matches!(result, Err(Error::Parse { .. })));
    assert!(diagnostics.severe_count_in(Phase::Parser) > 0);
    assert_eq!(diagnostics.severe_count_in(Phase::Review), 0);
    assert_eq!(diagnostics.severe_count_in(Phase::Verifier), 0);

    let mut diagnostics = Diagnostics::new();
    let result = wpc::check_source("{ print(y) }", &test_config(), &mut diagnostics);
    assert!(matches!(result, Err(Error::DefiniteAssignment { errors: 1 })));
    assert_eq!(diagnostics.severe_count_in(Phase::Verifier), 0);
}

#[test]
fn environment_overrides_configuration() {
    let mut config = test_config();
    config
        .apply_env(|key| match key {
            "WPC_SOLVER_TIMEOUT_MS" => Some("1500".to_string()),
            "WPC_RUNTIME_CHECKS" => Some("no".to_string()),
            _ => None,
        })
        .unwrap();
    assert_eq!(config.solver_timeout, std::time::Duration::from_millis(1500));
    assert!(!config.runtime_checks);
}
