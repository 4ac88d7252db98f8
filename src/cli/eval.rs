//! Evaluate expressions with CLI-supplied configuration

use serde_json::json;

use super::CliError;
use crate::{Expressions, RoundingMode};

/// Options for the eval command
#[derive(Debug, Clone, Default)]
pub struct EvalOptions {
    /// Expressions to evaluate, in order
    pub expressions: Vec<String>,
    /// Significant digits, if not the default
    pub precision: Option<u64>,
    /// Rounding mode, if not the default
    pub rounding: Option<RoundingMode>,
    /// `NAME=EXPR` definitions applied before evaluating
    pub definitions: Vec<String>,
}

/// Outcome of evaluating one expression
#[derive(Debug, Clone, PartialEq)]
pub struct EvalOutput {
    pub expression: String,
    pub result: Result<String, String>,
}

impl EvalOutput {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    pub fn to_json(&self) -> serde_json::Value {
        match &self.result {
            Ok(value) => json!({ "expression": self.expression, "result": value }),
            Err(message) => json!({ "expression": self.expression, "error": message }),
        }
    }
}

/// Split `NAME=EXPR` at the first `=`.
pub fn parse_definition(definition: &str) -> Result<(&str, &str), CliError> {
    match definition.split_once('=') {
        Some((name, expr)) if !name.trim().is_empty() && !expr.trim().is_empty() => {
            Ok((name.trim(), expr.trim()))
        }
        _ => Err(CliError::InvalidDefinition(definition.to_string())),
    }
}

/// Configure an [`Expressions`] from `options` and evaluate each expression.
///
/// Configuration and definition errors abort; per-expression failures are
/// reported in the returned outputs.
pub fn execute_eval(options: &EvalOptions) -> Result<Vec<EvalOutput>, CliError> {
    if options.expressions.is_empty() {
        return Err(CliError::NoInput);
    }

    let mut expressions = Expressions::new();
    if let Some(precision) = options.precision {
        expressions.set_precision(precision)?;
    }
    if let Some(rounding) = options.rounding {
        expressions.set_rounding_mode(rounding);
    }
    for definition in &options.definitions {
        let (name, expr) = parse_definition(definition)?;
        expressions.define(name, expr)?;
    }

    let outputs = options
        .expressions
        .iter()
        .map(|expression| EvalOutput {
            expression: expression.clone(),
            result: expressions
                .eval(expression)
                .map(|value| expressions.format(&value))
                .map_err(|e| e.to_string()),
        })
        .collect();

    Ok(outputs)
}
