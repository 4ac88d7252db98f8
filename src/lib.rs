pub mod ast;
pub mod builtins;
pub mod decimal_mode;
pub mod error;
pub mod evaluator;
pub mod expressions;
pub mod function;
pub mod parser;
pub mod scanner;

#[cfg(feature = "cli")]
pub mod cli;

pub use ast::{BinOp, Expr, LogicalOp, Token, TokenKind, UnaryOp};
pub use decimal_mode::{DecimalMode, RoundingMode};
pub use error::{Error, ErrorKind};
pub use evaluator::{EvalError, Evaluator};
pub use expressions::Expressions;
pub use function::{Arity, Builtin, Function};
pub use parser::{ParseError, Parser};
pub use scanner::{ScanError, Scanner};
