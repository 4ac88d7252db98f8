//! The public entry point: an evaluator pre-loaded with constants and
//! functions, driven by expression text.

use bigdecimal::BigDecimal;
use tracing::debug;

use crate::{
    ast::Expr,
    builtins,
    decimal_mode::{DecimalMode, MAX_PRECISION, RoundingMode},
    error::Error,
    evaluator::Evaluator,
    function::Function,
    parser::Parser,
    scanner::Scanner,
};

/// Evaluates expression text to decimals.
///
/// # Examples
///
/// ```
/// use decimal_expr::{Expressions, RoundingMode};
///
/// let mut expressions = Expressions::new();
/// expressions
///     .set_precision(4)
///     .unwrap()
///     .set_rounding_mode(RoundingMode::HalfUp)
///     .define("rate", "1 / 8")
///     .unwrap();
///
/// assert_eq!(expressions.eval_to_string("rate + 1"), "1.125");
/// assert_eq!(expressions.eval_to_string("2 / 3"), "0.6667");
/// ```
#[derive(Debug)]
pub struct Expressions {
    evaluator: Evaluator,
}

impl Default for Expressions {
    fn default() -> Self {
        Self::new()
    }
}

impl Expressions {
    /// Creates an instance with `π`, `pi`, `e` and the default functions.
    pub fn new() -> Self {
        let mut evaluator = Evaluator::new();
        for (name, value) in builtins::constants() {
            evaluator.define(name, Expr::Literal(value));
        }
        for builtin in builtins::functions() {
            evaluator.add_function(builtin.name, builtin);
        }
        Expressions { evaluator }
    }

    pub fn precision(&self) -> u64 {
        self.evaluator.decimal_mode().precision()
    }

    pub fn rounding_mode(&self) -> RoundingMode {
        self.evaluator.decimal_mode().rounding()
    }

    pub fn decimal_mode(&self) -> DecimalMode {
        self.evaluator.decimal_mode()
    }

    /// Sets the number of significant digits kept when rounding.
    ///
    /// Fails unless `1 <= precision <= MAX_PRECISION`.
    pub fn set_precision(&mut self, precision: u64) -> Result<&mut Self, Error> {
        let mode = self
            .evaluator
            .decimal_mode()
            .with_precision(precision)
            .ok_or_else(|| {
                Error::Config(format!(
                    "precision must be between 1 and {}, got {}",
                    MAX_PRECISION, precision
                ))
            })?;
        self.evaluator.set_decimal_mode(mode);
        Ok(self)
    }

    pub fn set_rounding_mode(&mut self, rounding: RoundingMode) -> &mut Self {
        let mode = self.evaluator.decimal_mode().with_rounding(rounding);
        self.evaluator.set_decimal_mode(mode);
        self
    }

    /// Defines `name` as the expression `expression`.
    ///
    /// The expression is kept unevaluated, so it may mention names that are
    /// defined later and it follows their redefinitions.
    pub fn define(&mut self, name: &str, expression: &str) -> Result<&mut Self, Error> {
        let expr = self.parse(expression)?;
        self.evaluator.define(name, expr);
        Ok(self)
    }

    /// Defines `name` as a fixed value.
    pub fn define_value(&mut self, name: &str, value: impl Into<BigDecimal>) -> &mut Self {
        self.evaluator.define(name, Expr::Literal(value.into()));
        self
    }

    pub fn add_function<F>(&mut self, name: &str, function: F) -> &mut Self
    where
        F: Function + 'static,
    {
        self.evaluator.add_function(name, function);
        self
    }

    /// Scans and parses `expression` without evaluating it.
    pub fn parse(&self, expression: &str) -> Result<Expr, Error> {
        let tokens = Scanner::new(expression).scan_tokens()?;
        let expr = Parser::new(tokens).parse()?;
        Ok(expr)
    }

    pub fn eval(&self, expression: &str) -> Result<BigDecimal, Error> {
        debug!(expression, "evaluating");
        let expr = self.parse(expression)?;
        let value = self.evaluator.eval(&expr)?;
        Ok(value)
    }

    /// Evaluates `expression`, rounds the result to the configured
    /// significant digits and renders it without an exponent.
    ///
    /// Failures are returned as their message rather than as an error.
    pub fn eval_to_string(&self, expression: &str) -> String {
        match self.eval(expression) {
            Ok(value) => self.format(&value),
            Err(e) => {
                debug!(expression, error = %e, "evaluation failed");
                e.to_string()
            }
        }
    }

    /// Rounds `value` to the configured significant digits in plain
    /// notation. Values that already fit are printed as they are.
    pub fn format(&self, value: &BigDecimal) -> String {
        self.evaluator.decimal_mode().round(value).to_plain_string()
    }

    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }
}
