mod common;

use common::{parse, test_config};
use num_bigint::BigInt;
use wpc::rt::{Interpreter, RuntimeError, ScriptedInput};
use wpc::{Diagnostics, Error, Phase};

/// Verify and run `source` with scripted input, returning what it printed
fn run(source: &str, inputs: &[&str]) -> Result<String, Error> {
    let mut input = ScriptedInput::new(inputs.iter().copied());
    let mut output = Vec::new();
    let mut diagnostics = Diagnostics::new();
    wpc::run_source(source, &test_config(), &mut input, &mut output, &mut diagnostics)?;
    Ok(String::from_utf8(output).unwrap())
}

#[test]
fn maximum_of_two_inputs() {
    let source = "{ << a << b if a > b { m := a } else { m := b } check(m > a - 1) print(m) }";
    assert_eq!(run(source, &["7", "3"]).unwrap(), "m: 7\n");
    assert_eq!(run(source, &["-4", "12"]).unwrap(), "m: 12\n");
}

#[test]
fn only_the_taken_branch_runs() {
    let source = "{ x := 1 if x > 5 { y := 0 } else { y := 2 } print(y) }";
    assert_eq!(run(source, &[]).unwrap(), "y: 2\n");
}

#[test]
fn integers_are_unbounded() {
    let source = "{ x := 99999999999 y := x * x print(y) }";
    assert_eq!(run(source, &[]).unwrap(), "y: 9999999999800000000001\n");
}

#[test]
fn prints_follow_program_order() {
    let source = "{ << x y := x - 10 print(y) print(x) z := -y print(z) }";
    assert_eq!(run(source, &["4"]).unwrap(), "y: -6\nx: 4\nz: 6\n");
}

#[test]
fn malformed_input_is_asked_again() {
    assert_eq!(run("{ << x print(x) }", &["abc", "  5 "]).unwrap(), "x: 5\n");
}

#[test]
fn exhausted_input_is_a_runtime_error() {
    let mut diagnostics = Diagnostics::new();
    let mut input = ScriptedInput::new(["1"]);
    let mut output = Vec::new();
    let result = wpc::run_source("{ << x << y print(y) }", &test_config(), &mut input, &mut output, &mut diagnostics);
    match result {
        Err(Error::Runtime(RuntimeError::EndOfInput { name, .. })) => assert_eq!(name, "y"),
        other => panic!("expected end of input, got {:?}", other),
    }
    assert_eq!(diagnostics.severe_count_in(Phase::Runtime), 1);
    assert!(output.is_empty());
}

#[test]
fn unverified_program_never_runs() {
    let mut input = ScriptedInput::new(["-1"]);
    let mut output = Vec::new();
    let mut diagnostics = Diagnostics::new();
    let result = wpc::run_source(
        "{ << x print(x) check(x > 0) }",
        &test_config(),
        &mut input,
        &mut output,
        &mut diagnostics,
    );
    assert!(matches!(result, Err(Error::Verification { .. })));
    assert!(output.is_empty());
    assert_eq!(input.remaining(), 1);
}

#[test]
fn runtime_checks_catch_failures_without_verification() {
    let program = parse("{ x := 1 check(x > 2) print(x) }");
    let mut input = ScriptedInput::default();
    let mut output = Vec::new();
    let mut interpreter = Interpreter::new(&mut input, &mut output);
    match interpreter.run(&program) {
        Err(RuntimeError::CheckFailed { location }) => assert_eq!((location.line, location.column), (1, 10)),
        other => panic!("expected a failed check, got {:?}", other),
    }
    assert!(output.is_empty());
}

#[test]
fn unassigned_read_is_reported() {
    let program = parse("{ print(z) }");
    let mut input = ScriptedInput::default();
    let mut output = Vec::new();
    let mut interpreter = Interpreter::new(&mut input, &mut output);
    match interpreter.run(&program) {
        Err(RuntimeError::Unassigned { name, .. }) => assert_eq!(name, "z"),
        other => panic!("expected unassigned read, got {:?}", other),
    }
}

#[test]
fn environment_survives_the_run() {
    let program = parse("{ << n sq := n * n }");
    let mut input = ScriptedInput::new(["12"]);
    let mut output = Vec::new();
    let mut interpreter = Interpreter::new(&mut input, &mut output);
    interpreter.run(&program).unwrap();
    assert_eq!(interpreter.env()["sq"], BigInt::from(144));
}
