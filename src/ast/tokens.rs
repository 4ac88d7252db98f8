use bigdecimal::BigDecimal;

/// The kind of a lexical token, carrying the parsed literal for numbers.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    /// Decimal numeral, parsed exactly from the source text
    ///
    /// # Examples
    /// ```text
    /// 42
    /// 3.14
    /// .5
    /// 1E+7
    /// 3212.123e-2
    /// ```
    Number(BigDecimal),

    // Identifiers
    /// Variable, constant or function name
    ///
    /// Starts with a letter, underscore or a non-ASCII symbol, followed by
    /// letters, digits or underscores. Case is preserved here; lookups fold it.
    ///
    /// # Examples
    /// ```text
    /// x
    /// rate_2
    /// π
    /// √
    /// ```
    Identifier(String),

    // Arithmetic
    /// Addition (`+`)
    Plus,

    /// Subtraction or negation (`-`)
    Minus,

    /// Multiplication (`*`)
    Star,

    /// Division (`/`)
    Slash,

    /// Remainder (`%`)
    Percent,

    /// Exponentiation (`^`)
    Caret,

    // Comparison
    /// Equality operator
    EqEq,

    /// Inequality operator
    NotEq,

    /// Less than
    Lt,

    /// Greater than
    Gt,

    /// Less than or equal
    LtEq,

    /// Greater than or equal
    GtEq,

    // Logical
    /// Logical AND (`&&`)
    AmpAmp,

    /// Logical OR (`||`)
    PipePipe,

    // Delimiters
    /// Left parenthesis for grouping or function calls
    LParen,

    /// Right parenthesis
    RParen,

    /// Comma separating function arguments
    Comma,

    /// End of input
    Eof,
}

/// A token produced by the [`Scanner`](crate::scanner::Scanner).
///
/// Tokens are never mutated after scanning. `position` is the char offset of
/// the first character of the lexeme.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub position: usize,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, position: usize) -> Self {
        Token {
            kind,
            lexeme: lexeme.into(),
            position,
        }
    }

    /// The decimal literal of a number token.
    pub fn literal(&self) -> Option<&BigDecimal> {
        match &self.kind {
            TokenKind::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }

    /// Text used when reporting this token in an error message.
    pub fn describe(&self) -> String {
        if self.is_eof() {
            "end of expression".to_string()
        } else {
            format!("'{}'", self.lexeme)
        }
    }
}
