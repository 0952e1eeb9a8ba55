use std::time::{Duration, Instant};

use wpc::verify::solver::Z3Prover;
use wpc::verify::{FailureReason, Verdict, Verifier, WpEngine};
use wpc::{Diagnostics, Error, Phase};

mod common;
use common::{parse, test_config, verify};

fn verified(source: &str) -> bool {
    verify(source).0.is_verified()
}

#[test]
fn wp_substitution_law() {
    assert!(verified("{ x := 1 check(x == 1) }"));
    assert!(!verified("{ x := 1 check(x == 2) }"));
}

#[test]
fn branch_soundness() {
    assert!(verified("{ x := 5 if x > 0 { y := 1 } else { y := -1 } check(y != 0) }"));
    // with x pinned to 5 the else branch is dead, so only a free x exposes it
    assert!(verified("{ x := 5 if x > 0 { y := 1 } else { y := 0 } check(y != 0) }"));

    let (verdict, diagnostics) = verify("{ << x if x > 0 { y := 1 } else { y := 0 } check(y != 0) }");
    assert!(!verdict.is_verified());
    assert!(diagnostics.has_severe());
}

/// Engine and solver only; definite assignment would reject the free read
fn verified_without_review(source: &str) -> bool {
    let program = parse(source);
    wpc::verify::verify_program(&program, &test_config(), &mut Diagnostics::new())
        .unwrap()
        .is_verified()
}

#[test]
fn free_variables_are_universal() {
    assert!(!verified_without_review("{ check(x > 0) }"));
    assert!(verified_without_review("{ check(x == x) }"));
}

#[test]
fn definite_assignment_gate_blocks_verification() {
    let mut diagnostics = Diagnostics::new();
    let source = "{ x := 1 if x > 0 { y := 1 } else { } print(y) }";
    let result = wpc::check_source(source, &test_config(), &mut diagnostics);
    assert!(matches!(result, Err(Error::DefiniteAssignment { .. })));
}

#[test]
fn verification_is_idempotent() {
    let program = parse("{ << a << b if a > b { m := a } else { m := b } check(m > a - 1 && m > b - 1) }");
    let first = WpEngine::obligation(&program).unwrap();
    let second = WpEngine::obligation(&program).unwrap();
    assert_eq!(first, second);

    let config = test_config();
    let one = wpc::verify::verify_program(&program, &config, &mut Diagnostics::new()).unwrap();
    let two = wpc::verify::verify_program(&program, &config, &mut Diagnostics::new()).unwrap();
    assert_eq!(one, two);
    assert_eq!(one, Verdict::Verified);
}

#[test]
fn counterexample_points_at_failing_check() {
    let source = "{\n  << x\n  y := x * 2\n  check(y == x + x)\n  check(y > 10)\n}";
    let (verdict, diagnostics) = verify(source);
    let failure = verdict.failure().expect("should not verify");
    assert_eq!(failure.reason, FailureReason::Counterexample);
    let at = failure.failed_check.expect("replay should find the check");
    assert_eq!((at.line, at.column), (5, 3));
    let model = failure.model.as_ref().expect("model");
    assert!(model.get("x@2:3").is_some(), "{}", model);
    assert!(diagnostics.iter().any(|d| d.phase == Phase::Verifier && d.location == Some(at)));
}

#[test]
fn input_is_treated_as_unknown_value() {
    assert!(!verified("{ << x check(x > 0) }"));
    assert!(verified("{ << x if x > 0 { y := x } else { y := 1 - x } check(y > 0) }"));
}

#[test]
fn reassignment_uses_latest_value() {
    assert!(verified("{ x := 1 x := x + 1 x := x * x check(x == 4) }"));
    assert!(verified("{ << x y := x x := 0 check(y == y + x) }"));
}

#[test]
fn checks_guard_later_code_only_forward() {
    // a later check cannot justify an earlier one
    assert!(!verified("{ << x check(x > 0) check(x > 5) }"));
    assert!(verified("{ << x if x > 5 { check(x > 0) } else { } }"));
}

#[test]
fn nonlinear_facts_about_squares() {
    assert!(verified("{ << x check(x * x > -1) }"));
    assert!(verified("{ << a << b x := a * b check(x == b * a) }"));
    assert!(!verified("{ << x check(x * x > 0) }"));
}

#[test]
fn obligation_is_available_for_display() {
    let program = parse("{ check(x > 0) }");
    let obligation = WpEngine::obligation(&program).unwrap();
    assert!(!obligation.is_true());
    assert_eq!(obligation.to_string(), "x > 0");
    assert!(!obligation.is_false());
}

#[test]
fn syntax_errors_never_reach_the_solver() {
    let trie = wpc::parser::TokenTrie::standard().unwrap();
    let mut diagnostics = Diagnostics::new();
    let program = wpc::parser::parse_program("{ x := ) check(x == 1) }", &trie, 10, &mut diagnostics).unwrap();
    let err = wpc::verify::verify_program(&program, &test_config(), &mut diagnostics).unwrap_err();
    assert!(matches!(err, Error::Verification { .. }));
}

#[test]
fn squares_of_differences_are_nonnegative() {
    assert!(verified("{ << a << b c := (a - b) * (a - b) check(c > 0 - 1) }"));
}

#[test]
fn long_chains_of_ifs_stay_tractable() {
    let mut source = String::from("{ << x y := 0\n");
    for _ in 0..30 {
        source.push_str("if x > y { y := y + 1 } else { y := y - 1 }\n");
    }
    source.push_str("check(y < 1000) }");

    let started = Instant::now();
    let (verdict, _) = verify(&source);
    assert!(verdict.is_verified());
    assert!(started.elapsed() < Duration::from_secs(20), "took {:?}", started.elapsed());
}

#[test]
fn branch_versions_stay_out_of_counterexamples() {
    let (verdict, _) = verify("{ << x if x > 0 { y := x } else { y := 0 } check(y > 0) }");
    let model = verdict.failure().and_then(|f| f.model.as_ref()).expect("model");
    assert!(model.iter().all(|(name, _)| !name.contains('#')), "{}", model);
    assert!(verdict.failure().and_then(|f| f.failed_check).is_some());
}

#[test]
fn expired_deadline_is_not_verified() {
    let program = parse("{ << x << y << z if x > 0 && y > 0 && z > 0 { check(!(x * x * x + y * y * y == z * z * z)) } else { } }");
    let mut verifier = Verifier::new(Box::new(Z3Prover::new(Duration::ZERO)));
    let mut diagnostics = Diagnostics::new();
    let verdict = verifier.verify(&program, &mut diagnostics).unwrap();
    let failure = verdict.failure().expect("a millisecond cannot settle this");
    assert!(matches!(failure.reason, FailureReason::Unknown(_)), "{:?}", failure.reason);
    assert!(diagnostics.severe_count_in(Phase::Verifier) > 0);
}
