//! Callable abstraction shared by builtin and user-supplied functions.

use std::fmt;

use bigdecimal::BigDecimal;

use crate::{decimal_mode::DecimalMode, evaluator::EvalError};

/// A named function callable from an expression.
///
/// Arguments arrive already evaluated, left to right. Implementations check
/// their own arity and domain and report violations as [`EvalError`]s.
///
/// Any closure `Fn(&[BigDecimal]) -> Result<BigDecimal, EvalError>` is a
/// `Function`:
///
/// ```
/// use decimal_expr::{EvalError, Expressions};
/// use bigdecimal::BigDecimal;
///
/// let mut expressions = Expressions::new();
/// expressions.add_function("double", |args: &[BigDecimal]| match args {
///     [x] => Ok(x * BigDecimal::from(2)),
///     _ => Err(EvalError::InvalidArgument("double takes one argument".into())),
/// });
///
/// assert_eq!(expressions.eval_to_string("DOUBLE(21)"), "42");
/// ```
pub trait Function {
    fn call(&self, args: &[BigDecimal], mode: &DecimalMode) -> Result<BigDecimal, EvalError>;
}

impl<F> Function for F
where
    F: Fn(&[BigDecimal]) -> Result<BigDecimal, EvalError>,
{
    fn call(&self, args: &[BigDecimal], _mode: &DecimalMode) -> Result<BigDecimal, EvalError> {
        self(args)
    }
}

/// Number of arguments a function accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    AtLeast(usize),
    Between(usize, usize),
}

impl Arity {
    pub fn accepts(&self, count: usize) -> bool {
        match *self {
            Arity::Exact(n) => count == n,
            Arity::AtLeast(n) => count >= n,
            Arity::Between(min, max) => (min..=max).contains(&count),
        }
    }

    /// Fails with [`EvalError::Arity`] when `count` is not accepted.
    pub fn check(&self, function: &str, count: usize) -> Result<(), EvalError> {
        if self.accepts(count) {
            Ok(())
        } else {
            Err(EvalError::Arity {
                function: function.to_string(),
                expected: *self,
                got: count,
            })
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plural = |n: usize| if n == 1 { "argument" } else { "arguments" };
        match *self {
            Arity::Exact(n) => write!(f, "{} {}", n, plural(n)),
            Arity::AtLeast(n) => write!(f, "at least {} {}", n, plural(n)),
            Arity::Between(min, max) => write!(f, "{} to {} arguments", min, max),
        }
    }
}

/// Signature of a builtin body. Arity is checked before it runs.
pub type BuiltinFn = fn(&[BigDecimal], &DecimalMode) -> Result<BigDecimal, EvalError>;

/// A function implemented by this crate, with a declared arity.
#[derive(Clone, Copy)]
pub struct Builtin {
    pub name: &'static str,
    pub arity: Arity,
    body: BuiltinFn,
}

impl Builtin {
    pub const fn new(name: &'static str, arity: Arity, body: BuiltinFn) -> Self {
        Builtin { name, arity, body }
    }
}

impl fmt::Debug for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Builtin")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish()
    }
}

impl Function for Builtin {
    fn call(&self, args: &[BigDecimal], mode: &DecimalMode) -> Result<BigDecimal, EvalError> {
        self.arity.check(self.name, args.len())?;
        (self.body)(args, mode)
    }
}
