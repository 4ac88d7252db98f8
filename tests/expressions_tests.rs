// End-to-end tests through the Expressions entry point.
//
// Each section exercises one observable behaviour of expression text in,
// decimal or message out.

use std::str::FromStr;

use decimal_expr::{ErrorKind, EvalError, Expressions, RoundingMode};
use bigdecimal::BigDecimal;

fn d(s: &str) -> BigDecimal {
    BigDecimal::from_str(s).unwrap()
}

fn eval_str(input: &str) -> String {
    Expressions::new().eval_to_string(input)
}

// ============================================================================
// Section: Numbers
// ============================================================================

#[test]
fn scientific_notation_is_rendered_plain() {
    assert_eq!(eval_str("1E+7"), "10000000");
    assert_eq!(eval_str(".123e2 + 3212.123e-2"), "44.42123");
    assert_eq!(eval_str("1E+7 - 52132e-2"), "9999478.68");
    assert_eq!(eval_str(".101e+2"), "10.1");
    assert_eq!(eval_str("1e30"), format!("1{}", "0".repeat(30)));
}

#[test]
fn short_results_are_not_padded() {
    assert_eq!(eval_str("1"), "1");
    assert_eq!(eval_str("1/4"), "0.25");
    assert_eq!(eval_str("6/3"), "2");
    assert_eq!(eval_str("2 * 5"), "10");
}

#[test]
fn literal_matches_library_parse() {
    let expressions = Expressions::new();
    for text in ["123.4500", "0.1", "7", "-0.000123"] {
        assert_eq!(expressions.eval(text).unwrap(), d(text), "{}", text);
    }
    assert_eq!(expressions.eval("123.4500").unwrap().to_plain_string(), "123.4500");
}

#[test]
fn decimal_arithmetic_is_exact() {
    assert_eq!(eval_str("0.1 + 0.2"), "0.3");
    assert_eq!(eval_str("1.10 * 3"), "3.30");
    assert_eq!(eval_str("100 - 99.99"), "0.01");
}

#[test]
fn negative_zero_renders_as_zero() {
    assert_eq!(eval_str("-0"), "0");
    assert_eq!(eval_str("0 * -5"), "0");
}

// ============================================================================
// Section: Operators
// ============================================================================

#[test]
fn operator_precedence() {
    assert_eq!(eval_str("2 + 3 * 4"), "14");
    assert_eq!(eval_str("(2 + 3) * 4"), "20");
    assert_eq!(eval_str("2 ^ 3 ^ 2"), "512");
    assert_eq!(eval_str("-2 ^ 2"), "-4");
    assert_eq!(eval_str("1 + 2 == 3"), "1");
    assert_eq!(eval_str("1 < 2 && 2 < 1 || 1"), "1");
}

#[test]
fn comparison_and_logic_yield_one_or_zero() {
    assert_eq!(eval_str("3 > 2"), "1");
    assert_eq!(eval_str("3 < 2"), "0");
    assert_eq!(eval_str("5 && 7"), "1");
    assert_eq!(eval_str("0 || 0"), "0");
}

#[test]
fn division_by_zero_message() {
    assert_eq!(eval_str("1/0"), "Evaluation error: Division by zero");
    assert_eq!(eval_str("5 % 0"), "Evaluation error: Division by zero");
}

#[test]
fn short_circuit_through_facade() {
    assert_eq!(eval_str("0 && 1/0"), "0");
    assert_eq!(eval_str("1 || nope"), "1");
}

// ============================================================================
// Section: Constants and functions
// ============================================================================

#[test]
fn constants() {
    let expressions = Expressions::new();
    assert_eq!(expressions.eval("pI").unwrap(), expressions.eval("PI").unwrap());
    let pi = expressions.eval("π").unwrap().to_plain_string();
    assert!(pi.starts_with("3.14159265358979323846264338327950288"), "{}", pi);
    let e = expressions.eval("E").unwrap().to_plain_string();
    assert!(e.starts_with("2.71828182845904523536028747135266249"), "{}", e);
    assert_eq!(expressions.eval_to_string("pi"), "3.141592653589793");
    assert_eq!(expressions.eval_to_string("e"), "2.718281828459045");
}

#[test]
fn default_functions() {
    let cases = [
        ("min(-1, 0, 1)", "-1"),
        ("MaX(-1, 0, 1)", "1"),
        ("if(1, 2, 3)", "2"),
        ("if(0, 2, 3)", "3"),
        ("abs(-2.5)", "2.5"),
        ("SUM(1, 2)", "3"),
        ("avg(2, 4)", "3"),
        ("floor(-0.5)", "-1"),
        ("ceil(0.5)", "1"),
        ("round(1.005, 2)", "1.00"),
        ("√(9)", "3"),
        ("max(abs(-5), sqrt(16), 2 ^ 2)", "5"),
    ];
    for (input, expected) in cases {
        assert_eq!(eval_str(input), expected, "{}", input);
    }
}

#[test]
fn arity_error_message() {
    assert_eq!(
        eval_str("abs(1, 2)"),
        "Evaluation error: abs expects 1 argument, got 2"
    );
    assert_eq!(
        eval_str("if(1)"),
        "Evaluation error: if expects 3 arguments, got 1"
    );
}

#[test]
fn custom_function() {
    let mut expressions = Expressions::new();
    expressions.add_function("Triple", |args: &[BigDecimal]| -> Result<BigDecimal, EvalError> {
        match args {
            [x] => Ok(x * BigDecimal::from(3)),
            _ => Err(EvalError::InvalidArgument("triple takes one value".to_string())),
        }
    });
    assert_eq!(expressions.eval_to_string("triple(14)"), "42");
    assert_eq!(
        expressions.eval_to_string("TRIPLE(1, 2)"),
        "Evaluation error: Invalid argument: triple takes one value"
    );
}

// ============================================================================
// Section: Variables
// ============================================================================

#[test]
fn redefinition_is_seen_by_dependents() {
    let mut expressions = Expressions::new();
    expressions.define("X", "1 + 1").unwrap();
    expressions.define("y", "x * 10").unwrap();
    assert_eq!(expressions.eval_to_string("y"), "20");

    expressions.define("x", "10").unwrap();
    assert_eq!(expressions.eval_to_string("y"), "100");
}

#[test]
fn define_value() {
    let mut expressions = Expressions::new();
    expressions.define_value("price", d("19.99")).define_value("qty", 3);
    assert_eq!(expressions.eval_to_string("price * qty"), "59.97");
}

#[test]
fn define_rejects_malformed_text() {
    let mut expressions = Expressions::new();
    let err = expressions.define("x", "1 +").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Parse);
    assert!(!expressions.evaluator().has_variable("x"));
}

#[test]
fn constants_can_be_shadowed() {
    let mut expressions = Expressions::new();
    expressions.define("e", "5").unwrap();
    assert_eq!(expressions.eval_to_string("e"), "5");
    assert_eq!(expressions.eval_to_string("π > 3"), "1");
}

#[test]
fn circular_definition_message() {
    let mut expressions = Expressions::new();
    expressions.define("a", "b").unwrap().define("b", "a").unwrap();
    assert_eq!(
        expressions.eval_to_string("a"),
        "Evaluation error: Circular definition: a → b → a"
    );
}

// ============================================================================
// Section: Precision and rounding
// ============================================================================

#[test]
fn default_precision() {
    let expressions = Expressions::new();
    assert_eq!(expressions.precision(), 16);
    assert_eq!(expressions.rounding_mode(), RoundingMode::HalfEven);
    assert_eq!(expressions.eval_to_string("1/3"), "0.3333333333333333");
    assert_eq!(expressions.eval_to_string("2/3"), "0.6666666666666667");
}

#[test]
fn precision_applies_to_results() {
    let mut expressions = Expressions::new();
    expressions.set_precision(5).unwrap();
    assert_eq!(expressions.eval_to_string("10/3"), "3.3333");
    assert_eq!(expressions.eval_to_string("123456789"), "123460000");
    // literals are kept whole until formatting
    assert_eq!(expressions.eval("1.23456789").unwrap(), d("1.23456789"));
}

#[test]
fn precision_bounds() {
    let mut expressions = Expressions::new();
    assert_eq!(
        expressions.set_precision(0).unwrap_err().kind(),
        ErrorKind::Config
    );
    assert!(expressions.set_precision(100_001).is_err());
    assert_eq!(expressions.precision(), 16);
    assert!(expressions.set_precision(100_000).is_ok());
}

#[test]
fn high_precision() {
    let mut expressions = Expressions::new();
    expressions.set_precision(40).unwrap();
    assert_eq!(expressions.eval_to_string("1/3"), format!("0.{}", "3".repeat(40)));
    assert_eq!(
        expressions.eval_to_string("pi"),
        "3.141592653589793238462643383279502884197"
    );
    assert_eq!(
        expressions.eval_to_string("2^100"),
        "1267650600228229401496703205376"
    );
}

#[test]
fn floor_and_ceil_stay_on_their_side() {
    assert_eq!(eval_str("floor(12345678901234567.5)"), "12345678901234560");
    assert_eq!(eval_str("ceil(12345678901234567.5)"), "12345678901234570");
    assert_eq!(eval_str("floor(-12345678901234567.5)"), "-12345678901234570");
}

#[test]
fn long_chain_through_facade() {
    let source = vec!["0.5"; 12_000].join(" + ");
    assert_eq!(eval_str(&source), "6000.0");
}

#[test]
fn debug_output_names_the_mode() {
    let expressions = Expressions::new();
    let debug = format!("{:?}", expressions);
    assert!(debug.contains("Expressions"), "{}", debug);
    assert!(debug.contains("HalfEven"), "{}", debug);
}

#[test]
fn rounding_modes() {
    let cases = [
        (RoundingMode::Up, "3", "-3"),
        (RoundingMode::Down, "2", "-2"),
        (RoundingMode::Ceiling, "3", "-2"),
        (RoundingMode::Floor, "2", "-3"),
        (RoundingMode::HalfUp, "3", "-3"),
        (RoundingMode::HalfDown, "2", "-2"),
        (RoundingMode::HalfEven, "2", "-2"),
    ];
    for (mode, positive, negative) in cases {
        let mut expressions = Expressions::new();
        expressions.set_precision(1).unwrap().set_rounding_mode(mode);
        assert_eq!(expressions.eval_to_string("2.5"), positive, "{}", mode);
        assert_eq!(expressions.eval_to_string("-2.5"), negative, "{}", mode);
    }
}

#[test]
fn instances_do_not_share_state() {
    let mut first = Expressions::new();
    first.set_precision(2).unwrap().define("x", "1").unwrap();
    let second = Expressions::new();

    assert_eq!(first.eval_to_string("2/3"), "0.67");
    assert_eq!(second.eval_to_string("2/3"), "0.6666666666666667");
    assert!(second.eval("x").is_err());
}

// ============================================================================
// Section: Error stages
// ============================================================================

#[test]
fn errors_report_their_stage() {
    let expressions = Expressions::new();
    assert_eq!(expressions.eval("1 # 2").unwrap_err().kind(), ErrorKind::Scan);
    assert_eq!(expressions.eval("1 +").unwrap_err().kind(), ErrorKind::Parse);
    assert_eq!(expressions.eval("(1").unwrap_err().kind(), ErrorKind::Parse);
    assert_eq!(expressions.eval("missing").unwrap_err().kind(), ErrorKind::Eval);
}

#[test]
fn error_messages() {
    assert_eq!(eval_str("missing + 1"), "Evaluation error: Undefined variable: missing");
    assert_eq!(eval_str("nope(1)"), "Evaluation error: Undefined function: nope");
    assert_eq!(
        eval_str("1 +"),
        "Parse error: Expected expression at position 3, found end of expression"
    );
    assert_eq!(
        eval_str("1 $ 2"),
        "Scan error: Unexpected character '$' at position 2"
    );
}
