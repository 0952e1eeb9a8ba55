use std::time::{Duration, Instant};

use num_bigint::BigInt;
use wpc::verify::solver::{self, SatResult, Solver, Z3Prover};
use wpc::verify::{Formula, Rel, Term};
use wpc::Config;

fn x() -> Term {
    Term::var("x")
}

fn y() -> Term {
    Term::var("y")
}

fn z3() -> Z3Prover {
    Z3Prover::new(Duration::from_secs(30))
}

/// 0 < x < 2 has exactly the solution x = 1
fn unit_interval() -> Formula {
    Formula::and(
        Formula::cmp(Rel::Gt, x(), Term::constant(0)),
        Formula::cmp(Rel::Lt, x(), Term::constant(2)),
    )
}

fn assert_model_satisfies(result: &SatResult, formula: &Formula) {
    match result {
        SatResult::Sat(Some(model)) => assert!(formula.eval(&|name| model.value(name)), "model {} is wrong", model),
        other => panic!("expected a model, got {:?}", other),
    }
}

fn cube(t: Term) -> Term {
    Term::mul(t.clone(), Term::mul(t.clone(), t))
}

#[test]
fn finds_the_only_integer_solution() {
    let formula = unit_interval();
    let result = z3().check_sat(&formula).unwrap();
    assert_model_satisfies(&result, &formula);
    if let SatResult::Sat(Some(model)) = result {
        assert_eq!(model.value("x"), BigInt::from(1));
    }
}

#[test]
fn respects_integrality() {
    let formula = Formula::and(
        Formula::cmp(Rel::Gt, x(), Term::constant(0)),
        Formula::cmp(Rel::Lt, x(), Term::constant(1)),
    );
    assert_eq!(z3().check_sat(&formula).unwrap(), SatResult::Unsat);
}

#[test]
fn handles_implication_chains() {
    // x > y, y > 3, and not x > 4 cannot all hold
    let formula = Formula::and(
        Formula::and(Formula::cmp(Rel::Gt, x(), y()), Formula::cmp(Rel::Gt, y(), Term::constant(3))),
        Formula::not(Formula::cmp(Rel::Gt, x(), Term::constant(4))),
    );
    assert_eq!(z3().check_sat(&formula).unwrap(), SatResult::Unsat);
}

#[test]
fn product_of_positives_is_positive() {
    let premise = Formula::and(
        Formula::cmp(Rel::Gt, x(), Term::constant(0)),
        Formula::cmp(Rel::Gt, y(), Term::constant(0)),
    );
    let conclusion = Formula::cmp(Rel::Gt, Term::mul(x(), y()), Term::constant(0));
    let violated = Formula::and(premise, Formula::not(conclusion));
    assert_eq!(z3().check_sat(&violated).unwrap(), SatResult::Unsat);
}

#[test]
fn square_of_a_difference_is_never_negative() {
    // (a - b) * (a - b) > -1 fails for no a, b
    let d = Term::sub(Term::var("a"), Term::var("b"));
    let holds = Formula::cmp(Rel::Gt, Term::mul(d.clone(), d), Term::constant(-1));
    assert_eq!(z3().check_sat(&Formula::not(holds)).unwrap(), SatResult::Unsat);
}

#[test]
fn commutativity_is_valid() {
    let sum = Formula::cmp(Rel::Eq, Term::add(x(), y()), Term::add(y(), x()));
    assert_eq!(z3().check_sat(&Formula::not(sum.clone())).unwrap(), SatResult::Unsat);
    assert_model_satisfies(&z3().check_sat(&sum).unwrap(), &sum);
}

#[test]
fn expired_deadline_is_unknown() {
    // x^3 + y^3 == z^3 over positive integers: no solution, and nothing z3 settles in a millisecond
    let positive = |t: Term| Formula::cmp(Rel::Gt, t, Term::constant(0));
    let fermat = Formula::and(
        Formula::and(positive(x()), positive(y())),
        Formula::and(
            positive(Term::var("z")),
            Formula::cmp(Rel::Eq, Term::add(cube(x()), cube(y())), cube(Term::var("z"))),
        ),
    );
    let started = Instant::now();
    let result = Z3Prover::new(Duration::ZERO).check_sat(&fermat).unwrap();
    assert!(matches!(result, SatResult::Unknown(_)), "got {:?}", result);
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[test]
fn backend_follows_config() {
    assert_eq!(solver::from_config(&Config::default()).name(), "z3");
}
