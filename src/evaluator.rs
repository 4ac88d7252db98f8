use std::{collections::HashMap, fmt};

use bigdecimal::{
    BigDecimal,
    num_traits::{One, Signed, ToPrimitive, Zero},
};
use tracing::{debug, trace};

use crate::{
    ast::{BinOp, Expr, LogicalOp, UnaryOp},
    decimal_mode::{self, DecimalMode},
    function::{Arity, Function},
};

/// Maximum depth of nested evaluation, counted across variable references.
///
/// Left-associative operator chains are walked in a loop and do not count
/// toward it.
pub const MAX_EVAL_DEPTH: usize = 256;

/// Largest integer exponent `^` accepts.
pub const MAX_EXPONENT: u64 = 10_000;

/// Errors that can occur during expression evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum EvalError {
    /// Reference to a name that was never defined
    UndefinedVariable(String),

    /// Call to a function that was never registered
    UndefinedFunction(String),

    /// A variable whose definition refers back to itself
    CircularDefinition(Vec<String>),

    /// Evaluation nested deeper than [`MAX_EVAL_DEPTH`]
    NestingTooDeep { limit: usize },

    /// Wrong number of arguments for a function
    Arity {
        function: String,
        expected: Arity,
        got: usize,
    },

    /// Argument outside a function's or operator's domain
    InvalidArgument(String),

    /// Division or remainder by zero
    DivisionByZero,

    /// Result too large to compute
    Overflow(String),
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalError::UndefinedVariable(name) => write!(f, "Undefined variable: {}", name),
            EvalError::UndefinedFunction(name) => write!(f, "Undefined function: {}", name),
            EvalError::CircularDefinition(path) => {
                write!(f, "Circular definition: {}", path.join(" → "))
            }
            EvalError::NestingTooDeep { limit } => {
                write!(f, "Expression is nested more than {} levels deep", limit)
            }
            EvalError::Arity {
                function,
                expected,
                got,
            } => write!(f, "{} expects {}, got {}", function, expected, got),
            EvalError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            EvalError::DivisionByZero => write!(f, "Division by zero"),
            EvalError::Overflow(msg) => write!(f, "Overflow: {}", msg),
        }
    }
}

impl std::error::Error for EvalError {}

/// Folds a variable or function name for lookup.
pub fn fold_name(name: &str) -> String {
    name.to_lowercase()
}

fn truth(value: bool) -> BigDecimal {
    if value { BigDecimal::one() } else { BigDecimal::zero() }
}

/// Per-evaluation state: the chain of variables currently being resolved
/// and the current nesting depth.
#[derive(Debug, Default)]
struct EvalContext {
    resolving: Vec<String>,
    depth: usize,
}

/// One pending operation on the left spine of an operator chain.
enum Step<'a> {
    Binary(BinOp, &'a Expr),
    Logical(LogicalOp, &'a Expr),
}

/// Tree-walking evaluator.
///
/// Variables are stored as expressions and re-evaluated on every reference,
/// so redefining a name changes every expression that mentions it without
/// re-parsing anything.
#[derive(Default)]
pub struct Evaluator {
    variables: HashMap<String, Expr>,
    functions: HashMap<String, Box<dyn Function>>,
    decimal_mode: DecimalMode,
}

impl fmt::Debug for Evaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut variables: Vec<&String> = self.variables.keys().collect();
        variables.sort();
        let mut functions: Vec<&String> = self.functions.keys().collect();
        functions.sort();
        f.debug_struct("Evaluator")
            .field("variables", &variables)
            .field("functions", &functions)
            .field("decimal_mode", &self.decimal_mode)
            .finish()
    }
}

impl Evaluator {
    /// Creates an evaluator with no variables or functions.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn decimal_mode(&self) -> DecimalMode {
        self.decimal_mode
    }

    pub fn set_decimal_mode(&mut self, mode: DecimalMode) {
        debug!(precision = mode.precision(), rounding = %mode.rounding(), "decimal mode changed");
        self.decimal_mode = mode;
    }

    /// Binds `name` to `expr`, replacing any earlier definition.
    pub fn define(&mut self, name: &str, expr: Expr) {
        debug!(variable = name, %expr, "define variable");
        self.variables.insert(fold_name(name), expr);
    }

    /// Registers `function` under `name`, replacing any earlier one.
    pub fn add_function<F>(&mut self, name: &str, function: F)
    where
        F: Function + 'static,
    {
        let replaced = self.has_function(name);
        debug!(function = name, replaced, "add function");
        self.functions.insert(fold_name(name), Box::new(function));
    }

    pub fn has_variable(&self, name: &str) -> bool {
        self.variables.contains_key(&fold_name(name))
    }

    pub fn has_function(&self, name: &str) -> bool {
        self.functions.contains_key(&fold_name(name))
    }

    /// Evaluates `expr` against the current variables, functions and
    /// decimal mode.
    ///
    /// # Examples
    ///
    /// ```
    /// use decimal_expr::{Evaluator, Expr};
    /// use decimal_expr::ast::BinOp;
    ///
    /// let mut evaluator = Evaluator::new();
    /// evaluator.define("x", Expr::literal(20));
    ///
    /// let expr = Expr::binary(Expr::variable("X"), BinOp::Add, Expr::literal(22));
    /// assert_eq!(evaluator.eval(&expr).unwrap().to_plain_string(), "42");
    /// ```
    pub fn eval(&self, expr: &Expr) -> Result<BigDecimal, EvalError> {
        let mut context = EvalContext::default();
        self.eval_expr(expr, &mut context)
    }

    fn eval_expr(&self, expr: &Expr, context: &mut EvalContext) -> Result<BigDecimal, EvalError> {
        if context.depth >= MAX_EVAL_DEPTH {
            return Err(EvalError::NestingTooDeep {
                limit: MAX_EVAL_DEPTH,
            });
        }
        context.depth += 1;
        let result = self.eval_node(expr, context);
        context.depth -= 1;
        result
    }

    fn eval_node(&self, expr: &Expr, context: &mut EvalContext) -> Result<BigDecimal, EvalError> {
        match expr {
            Expr::Literal(n) => Ok(n.clone()),
            Expr::Variable(name) => self.eval_variable(name, context),
            Expr::Grouping(inner) => self.eval_expr(inner, context),
            Expr::Unary { op, operand } => {
                let value = self.eval_expr(operand, context)?;
                match op {
                    UnaryOp::Negate => Ok(-value),
                }
            }
            Expr::Binary { .. } | Expr::Logical { .. } => self.eval_chain(expr, context),
            Expr::Call { name, args } => {
                let function = self
                    .functions
                    .get(&fold_name(name))
                    .ok_or_else(|| EvalError::UndefinedFunction(name.clone()))?;

                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(self.eval_expr(arg, context)?);
                }
                function.call(&values, &self.decimal_mode)
            }
        }
    }

    /// Evaluates a run of binary and logical operators down the left spine
    /// in a loop, innermost first.
    fn eval_chain(&self, expr: &Expr, context: &mut EvalContext) -> Result<BigDecimal, EvalError> {
        let mut steps = Vec::new();
        let mut node = expr;
        loop {
            match node {
                Expr::Binary { op, left, right } => {
                    steps.push(Step::Binary(*op, right));
                    node = left;
                }
                Expr::Logical { op, left, right } => {
                    steps.push(Step::Logical(*op, right));
                    node = left;
                }
                _ => break,
            }
        }

        let mut value = self.eval_expr(node, context)?;
        for step in steps.into_iter().rev() {
            value = match step {
                Step::Binary(op, right) => {
                    let right_val = self.eval_expr(right, context)?;
                    self.apply_binop(op, value, right_val)?
                }
                Step::Logical(LogicalOp::And, _) if value.is_zero() => BigDecimal::zero(),
                Step::Logical(LogicalOp::Or, _) if !value.is_zero() => BigDecimal::one(),
                Step::Logical(_, right) => {
                    let right_val = self.eval_expr(right, context)?;
                    truth(!right_val.is_zero())
                }
            };
        }
        Ok(value)
    }

    fn eval_variable(&self, name: &str, context: &mut EvalContext) -> Result<BigDecimal, EvalError> {
        let key = fold_name(name);

        if context.resolving.contains(&key) {
            let mut path = context.resolving.clone();
            path.push(key);
            return Err(EvalError::CircularDefinition(path));
        }

        let stored = self
            .variables
            .get(&key)
            .ok_or_else(|| EvalError::UndefinedVariable(name.to_string()))?;

        trace!(variable = %key, depth = context.depth, "resolving variable");
        context.resolving.push(key);
        let result = self.eval_expr(stored, context);
        context.resolving.pop();

        result
    }

    fn apply_binop(
        &self,
        op: BinOp,
        left: BigDecimal,
        right: BigDecimal,
    ) -> Result<BigDecimal, EvalError> {
        match op {
            BinOp::Add => Ok(left + right),
            BinOp::Subtract => Ok(left - right),
            BinOp::Multiply => Ok(left * right),
            BinOp::Divide => self
                .decimal_mode
                .divide(&left, &right)
                .ok_or(EvalError::DivisionByZero),
            BinOp::Modulo => {
                if right.is_zero() {
                    return Err(EvalError::DivisionByZero);
                }
                Ok(left % right)
            }
            BinOp::Power => self.power(&left, &right),
            BinOp::Equal => Ok(truth(left == right)),
            BinOp::NotEqual => Ok(truth(left != right)),
            BinOp::LessThan => Ok(truth(left < right)),
            BinOp::GreaterThan => Ok(truth(left > right)),
            BinOp::LessEqual => Ok(truth(left <= right)),
            BinOp::GreaterEqual => Ok(truth(left >= right)),
        }
    }

    /// `base ^ exponent`.
    ///
    /// Non-negative integer exponents up to [`MAX_EXPONENT`] are exact.
    /// Negative integer exponents take the rounded reciprocal. Fractional
    /// exponents go through `f64` and are rounded to the decimal mode.
    fn power(&self, base: &BigDecimal, exponent: &BigDecimal) -> Result<BigDecimal, EvalError> {
        if base.is_zero() && exponent.is_negative() {
            return Err(EvalError::DivisionByZero);
        }

        if exponent.is_integer() {
            let magnitude = exponent
                .abs()
                .to_u64()
                .filter(|m| *m <= MAX_EXPONENT)
                .ok_or_else(|| {
                    EvalError::Overflow(format!(
                        "exponent {} is larger than {}",
                        exponent.to_plain_string(),
                        MAX_EXPONENT
                    ))
                })?;
            let raised = pow_integer(base, magnitude);
            if !exponent.is_negative() {
                return Ok(raised);
            }
            return self
                .decimal_mode
                .divide(&BigDecimal::one(), &raised)
                .ok_or(EvalError::DivisionByZero);
        }

        if base.is_negative() {
            return Err(EvalError::InvalidArgument(format!(
                "{} ^ {} has no real result",
                base.to_plain_string(),
                exponent.to_plain_string()
            )));
        }
        if base.is_zero() {
            return Ok(BigDecimal::zero());
        }

        let out_of_range = || {
            EvalError::Overflow(format!(
                "{} ^ {} is out of range",
                base.to_plain_string(),
                exponent.to_plain_string()
            ))
        };
        let b = base.to_f64().filter(|v| v.is_finite()).ok_or_else(out_of_range)?;
        let e = exponent.to_f64().filter(|v| v.is_finite()).ok_or_else(out_of_range)?;
        decimal_mode::from_float(b.powf(e))
            .map(|result| self.decimal_mode.round(&result))
            .ok_or_else(out_of_range)
    }
}

/// Exact `base ^ exponent` by repeated squaring.
fn pow_integer(base: &BigDecimal, mut exponent: u64) -> BigDecimal {
    let mut result = BigDecimal::one();
    let mut square = base.clone();
    while exponent > 0 {
        if exponent & 1 == 1 {
            result = &result * &square;
        }
        exponent >>= 1;
        if exponent > 0 {
            square = &square * &square;
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, rc::Rc};

    use super::*;
    use crate::{parser::parse, scanner::scan};

    fn expr(source: &str) -> Expr {
        parse(scan(source).unwrap()).unwrap()
    }

    #[test]
    fn test_logical_results_are_canonical() {
        let evaluator = Evaluator::new();
        assert_eq!(evaluator.eval(&expr("5 && 7")).unwrap(), BigDecimal::one());
        assert_eq!(evaluator.eval(&expr("0 || -3")).unwrap(), BigDecimal::one());
        assert_eq!(evaluator.eval(&expr("0 || 0")).unwrap(), BigDecimal::zero());
    }

    #[test]
    fn test_chain_short_circuits_midway() {
        let evaluator = Evaluator::new();
        assert_eq!(evaluator.eval(&expr("0 && nope && nope")).unwrap(), BigDecimal::zero());
        assert_eq!(evaluator.eval(&expr("1 + 1 > 1 || nope")).unwrap(), BigDecimal::one());
        assert!(evaluator.eval(&expr("1 && nope")).is_err());
    }

    #[test]
    fn test_circular_definition() {
        let mut evaluator = Evaluator::new();
        evaluator.define("a", expr("b + 1"));
        evaluator.define("B", expr("A * 2"));

        assert_eq!(
            evaluator.eval(&expr("a")),
            Err(EvalError::CircularDefinition(vec![
                "a".to_string(),
                "b".to_string(),
                "a".to_string()
            ]))
        );
    }

    #[test]
    fn test_same_variable_twice_is_not_circular() {
        let mut evaluator = Evaluator::new();
        evaluator.define("x", expr("3"));
        evaluator.define("y", expr("x * x"));
        assert_eq!(evaluator.eval(&expr("y + x")).unwrap(), BigDecimal::from(12));
    }

    #[test]
    fn test_nested_definitions_hit_depth_limit() {
        let mut evaluator = Evaluator::new();
        let nested = format!("{}v0{}", "(".repeat(40), ")".repeat(40));
        evaluator.define("v0", expr("1"));
        for i in 1..=20 {
            evaluator.define(&format!("v{}", i), expr(&nested.replace("v0", &format!("v{}", i - 1))));
        }
        assert_eq!(
            evaluator.eval(&expr("v20")),
            Err(EvalError::NestingTooDeep {
                limit: MAX_EVAL_DEPTH
            })
        );
        assert_eq!(evaluator.eval(&expr("v3")).unwrap(), BigDecimal::one());
    }

    #[test]
    fn test_integer_power_is_exact() {
        assert_eq!(pow_integer(&"1.1".parse().unwrap(), 2).to_plain_string(), "1.21");
        assert_eq!(pow_integer(&BigDecimal::from(7), 0), BigDecimal::one());
        assert_eq!(
            pow_integer(&BigDecimal::from(2), 100).to_plain_string(),
            "1267650600228229401496703205376"
        );
    }

    #[test]
    fn test_arguments_evaluated_left_to_right() {
        let order = Rc::new(Cell::new(0u32));
        let mut evaluator = Evaluator::new();

        let counter = Rc::clone(&order);
        evaluator.add_function("tick", move |_: &[BigDecimal]| -> Result<BigDecimal, EvalError> {
            counter.set(counter.get() + 1);
            Ok(BigDecimal::from(counter.get()))
        });
        evaluator.add_function("digits", |args: &[BigDecimal]| -> Result<BigDecimal, EvalError> {
            Ok(args
                .iter()
                .fold(BigDecimal::zero(), |acc, d| acc * BigDecimal::from(10) + d))
        });

        assert_eq!(
            evaluator.eval(&expr("digits(tick(), tick(), tick())")).unwrap(),
            BigDecimal::from(123)
        );
        assert_eq!(order.get(), 3);
    }

    #[test]
    fn test_debug_lists_names() {
        let mut evaluator = Evaluator::new();
        evaluator.define("Rate", expr("2"));
        evaluator.add_function("f", |_: &[BigDecimal]| -> Result<BigDecimal, EvalError> {
            Ok(BigDecimal::zero())
        });
        assert!(evaluator.has_function("F"));
        let debug = format!("{:?}", evaluator);
        assert!(debug.contains("\"rate\""), "{}", debug);
        assert!(debug.contains("\"f\""), "{}", debug);
    }
}
