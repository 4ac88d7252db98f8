use std::fmt;

use crate::{evaluator::EvalError, parser::ParseError, scanner::ScanError};

/// Which pipeline stage an [`Error`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Scan,
    Parse,
    Eval,
    Config,
}

/// Any failure from scanning, parsing, evaluating or configuring.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Scanner error
    Scan(ScanError),
    /// Parser error
    Parse(ParseError),
    /// Evaluation error
    Eval(EvalError),
    /// Rejected configuration value
    Config(String),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Scan(_) => ErrorKind::Scan,
            Error::Parse(_) => ErrorKind::Parse,
            Error::Eval(_) => ErrorKind::Eval,
            Error::Config(_) => ErrorKind::Config,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Scan(e) => write!(f, "Scan error: {}", e),
            Error::Parse(e) => write!(f, "Parse error: {}", e),
            Error::Eval(e) => write!(f, "Evaluation error: {}", e),
            Error::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Scan(e) => Some(e),
            Error::Parse(e) => Some(e),
            Error::Eval(e) => Some(e),
            Error::Config(_) => None,
        }
    }
}

impl From<ScanError> for Error {
    fn from(e: ScanError) -> Self {
        Error::Scan(e)
    }
}

impl From<ParseError> for Error {
    fn from(e: ParseError) -> Self {
        Error::Parse(e)
    }
}

impl From<EvalError> for Error {
    fn from(e: EvalError) -> Self {
        Error::Eval(e)
    }
}
