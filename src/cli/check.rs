//! Validate expression syntax without evaluating

use super::CliError;
use crate::Expressions;

/// Result of a syntax check
#[derive(Debug)]
pub struct CheckResult {
    /// The parsed tree, fully parenthesized
    pub tree: String,
}

/// Scan and parse `expression`, reporting the first error
pub fn execute_check(expression: &str) -> Result<CheckResult, CliError> {
    let expr = Expressions::new().parse(expression)?;
    Ok(CheckResult {
        tree: expr.to_string(),
    })
}
