//! CLI support for decimal-expr
//!
//! Provides programmatic access to the `dexpr` commands so they can be
//! embedded in other tools.

mod check;
mod eval;
mod functions;

pub use check::{CheckResult, execute_check};
pub use eval::{EvalOptions, EvalOutput, execute_eval, parse_definition};
pub use functions::list_functions;

use std::io;

/// Errors that can occur during CLI operations
#[derive(Debug)]
pub enum CliError {
    /// Scan, parse, evaluation or configuration error
    Expression(crate::Error),
    /// `--define` argument not of the form `NAME=EXPR`
    InvalidDefinition(String),
    /// JSON serialization error
    Json(serde_json::Error),
    /// IO error
    Io(io::Error),
    /// No expression given and nothing piped to stdin
    NoInput,
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Expression(e) => write!(f, "{}", e),
            CliError::InvalidDefinition(d) => {
                write!(f, "Invalid definition '{}' (expected NAME=EXPR)", d)
            }
            CliError::Json(e) => write!(f, "JSON error: {}", e),
            CliError::Io(e) => write!(f, "IO error: {}", e),
            CliError::NoInput => write!(
                f,
                "No expression provided. Pass one as an argument or pipe lines to stdin."
            ),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Expression(e) => Some(e),
            CliError::Json(e) => Some(e),
            CliError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<crate::Error> for CliError {
    fn from(e: crate::Error) -> Self {
        CliError::Expression(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Json(e)
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        CliError::Io(e)
    }
}
