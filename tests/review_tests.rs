use wpc::review::{check_definite_assignment, AssignmentChecker, ReviewError};
use wpc::{Config, Diagnostics, Error, Phase};

mod common;
use common::parse;

fn definitely_assigned(source: &str) -> (bool, Diagnostics) {
    let program = parse(source);
    let mut diagnostics = Diagnostics::new();
    let ok = check_definite_assignment(&program, &mut diagnostics);
    (ok, diagnostics)
}

#[test]
fn review_accepts_straight_line_code() {
    let (ok, diagnostics) = definitely_assigned("{ x := 1 y := x + 1 print(y) check(y > x) }");
    assert!(ok);
    assert!(diagnostics.is_empty());
}

#[test]
fn review_rejects_read_before_write() {
    let (ok, diagnostics) = definitely_assigned("{ y := x + 1 x := 0 }");
    assert!(!ok);
    assert_eq!(diagnostics.severe_count_in(Phase::Review), 1);
    assert!(diagnostics.mentions("'x'"), "{:?}", diagnostics);
}

#[test]
fn review_self_reference_reads_first() {
    let (ok, _) = definitely_assigned("{ x := x + 1 }");
    assert!(!ok);
}

#[test]
fn review_requires_assignment_on_both_branches() {
    let one_sided = "{ x := 1 if x > 0 { y := 1 } else { } print(y) }";
    let (ok, diagnostics) = definitely_assigned(one_sided);
    assert!(!ok);
    let location = diagnostics.iter().next().and_then(|d| d.location).unwrap();
    assert_eq!(location.column, 45);

    let both = "{ x := 1 if x > 0 { y := 1 } else { y := 2 } print(y) }";
    assert!(definitely_assigned(both).0);
}

#[test]
fn review_branch_local_names_stay_local() {
    let (ok, _) = definitely_assigned("{ x := 1 if x > 0 { t := 1 print(t) } else { t := 2 } print(t) }");
    assert!(ok);
    let (ok, _) = definitely_assigned("{ x := 1 if x > 0 { t := 1 } else { print(t) } }");
    assert!(!ok);
}

#[test]
fn review_input_counts_as_assignment() {
    assert!(definitely_assigned("{ << n print(n) }").0);
}

#[test]
fn review_reports_every_violation() {
    let program = parse("{ print(a) print(b) c := a + b }");
    let violations = AssignmentChecker::new().check(&program);
    let names: Vec<&str> = violations
        .iter()
        .filter_map(|v| match v {
            ReviewError::UseBeforeAssignment { name, .. } => Some(name.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(names, vec!["a", "b", "a", "b"]);
}

#[test]
fn review_gates_verification() {
    let mut diagnostics = Diagnostics::new();
    let source = "{ x := 1 if x > 0 { y := 1 } else { } print(y) }";
    let err = wpc::check_source(source, &Config::default(), &mut diagnostics).unwrap_err();
    assert!(matches!(err, Error::DefiniteAssignment { errors: 1 }));
    assert_eq!(diagnostics.severe_count_in(Phase::Verifier), 0);
}
