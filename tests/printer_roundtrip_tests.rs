use wpc::ast::{dump_tree, print_source, TreePrinter};

mod common;
use common::parse;

fn assert_round_trip(source: &str) {
    let original = parse(source);
    let printed = print_source(&original);
    let reparsed = parse(&printed);
    assert_eq!(dump_tree(&original), dump_tree(&reparsed), "printed form:\n{}", printed);
    // printing is a fixed point after one round
    assert_eq!(print_source(&reparsed), printed);
}

#[test]
fn round_trip_preserves_arithmetic_shape() {
    assert_round_trip("{ x := a - (b - c) y := (a - b) - c z := -(a + b) * c w := a * (b * c) }");
}

#[test]
fn round_trip_preserves_boolean_shape() {
    assert_round_trip("{ check(!(a > b && c == d) || (a < c && (b > d || !(d == 0)))) }");
}

#[test]
fn round_trip_preserves_nested_branches() {
    let source = r#"
{
    << n
    if n > 10 {
        if n < 20 { m := n - 10 } else { m := 0 }
    } else {
        m := 10 - n
    }
    check(m > 0 - 1)
    print(m)
}
"#;
    assert_round_trip(source);
}

#[test]
fn round_trip_keeps_parenthesised_comparison_operand() {
    assert_round_trip("{ check((a + b) * c > 0) }");
}

#[test]
fn printer_output_is_canonical() {
    let program = parse("{x:=1+2*3 if x>0{print(x)}else{check(!(x==7))}}");
    let expected = "\
{
    x := 1 + 2 * 3
    if x > 0 {
        print(x)
    } else {
        check(!(x == 7))
    }
}
";
    assert_eq!(print_source(&program), expected);
}

#[test]
fn tree_dump_can_show_locations() {
    let program = parse("{\n  x := 1\n}");
    let dump = TreePrinter::new().with_locations(true).print(&program);
    assert!(dump.contains("Assignment x"), "{}", dump);
    assert!(dump.contains("2:3"), "{}", dump);
}
