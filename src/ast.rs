//! # Decimal Expressions - Abstract Syntax Tree
//!
//! This module defines the tokens and tree nodes shared by the scanner,
//! parser and evaluator.
//!
//! ## Architecture Overview
//!
//! - **[tokens]** - Lexical tokens produced by the scanner
//! - **[expressions]** - Expression nodes (literals, variables, operations, calls)
//! - **[operators]** - Unary, binary and logical operators
//!
//! ## Quick Start
//!
//! ```text
//! if(rate > 0.05, principal * rate, 0) + round(fee, 2)
//! ```
//!
//! ## Precedence
//!
//! From loosest to tightest binding:
//!
//! ```text
//! ||
//! &&
//! ==  !=
//! >  >=  <  <=
//! +  -
//! *  /  %
//! unary -
//! ^            (right-associative)
//! ```
//!
//! Because unary minus binds looser than `^`, `-2^2` is `-(2^2)`. The right
//! operand of `^` may itself be negated, so `2^-3` parses as `2^(-3)`.
pub mod expressions;
pub mod operators;
pub mod tokens;

pub use expressions::Expr;
pub use operators::{BinOp, LogicalOp, UnaryOp};
pub use tokens::{Token, TokenKind};
