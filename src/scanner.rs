use std::{fmt, str::FromStr};

use bigdecimal::BigDecimal;
use tracing::trace;

use crate::{
    ast::{Token, TokenKind},
    decimal_mode::MAX_PRECISION,
};

/// Errors raised while turning source text into tokens.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanError {
    /// A character that starts no token
    UnexpectedCharacter { ch: char, position: usize },

    /// The first half of a two-character operator (`=`, `&`, `|`) on its own
    IncompleteOperator {
        ch: char,
        expected: &'static str,
        position: usize,
    },

    /// A numeral that does not match the number grammar or whose exponent
    /// is out of range
    MalformedNumber {
        lexeme: String,
        position: usize,
        reason: String,
    },
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanError::UnexpectedCharacter { ch, position } => {
                write!(f, "Unexpected character '{}' at position {}", ch, position)
            }
            ScanError::IncompleteOperator {
                ch,
                expected,
                position,
            } => write!(
                f,
                "Unexpected '{}' at position {} (did you mean '{}'?)",
                ch, position, expected
            ),
            ScanError::MalformedNumber {
                lexeme,
                position,
                reason,
            } => write!(
                f,
                "Malformed number '{}' at position {}: {}",
                lexeme, position, reason
            ),
        }
    }
}

impl std::error::Error for ScanError {}

pub struct Scanner {
    input: Vec<char>,
    position: usize,
}

impl Scanner {
    pub fn new(input: &str) -> Self {
        Scanner {
            input: input.chars().collect(),
            position: 0,
        }
    }

    /// Scans the whole input. The returned sequence always ends with
    /// [`TokenKind::Eof`].
    pub fn scan_tokens(mut self) -> Result<Vec<Token>, ScanError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.is_eof();
            tokens.push(token);
            if done {
                break;
            }
        }
        trace!(count = tokens.len(), "scanned tokens");
        Ok(tokens)
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn lexeme_from(&self, start: usize) -> String {
        self.input[start..self.position].iter().collect()
    }

    fn read_identifier(&mut self) -> String {
        let mut result = String::new();
        // The first character may be a symbol such as `√`
        if let Some(ch) = self.current_char() {
            result.push(ch);
            self.advance();
        }
        while let Some(ch) = self.current_char() {
            if ch.is_alphanumeric() || ch == '_' {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        result
    }

    fn read_digits(&mut self, into: &mut String) {
        while let Some(ch) = self.current_char() {
            if ch.is_ascii_digit() {
                into.push(ch);
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_number(&mut self) -> Result<Token, ScanError> {
        let start = self.position;
        let mut number = String::new();
        let malformed = |lexeme: &str, reason: &str| ScanError::MalformedNumber {
            lexeme: lexeme.to_string(),
            position: start,
            reason: reason.to_string(),
        };

        self.read_digits(&mut number);

        if self.current_char() == Some('.') {
            number.push('.');
            self.advance();
            if !self.current_char().is_some_and(|c| c.is_ascii_digit()) {
                return Err(malformed(&number, "expected digit after '.'"));
            }
            self.read_digits(&mut number);
        }

        if let Some(marker @ ('e' | 'E')) = self.current_char() {
            number.push(marker);
            self.advance();
            if let Some(sign @ ('+' | '-')) = self.current_char() {
                number.push(sign);
                self.advance();
            }
            if !self.current_char().is_some_and(|c| c.is_ascii_digit()) {
                return Err(malformed(&number, "expected digit in exponent"));
            }
            self.read_digits(&mut number);
        }

        let source = if number.starts_with('.') {
            format!("0{}", number)
        } else {
            number.clone()
        };
        let value = BigDecimal::from_str(&source).map_err(|e| malformed(&number, &e.to_string()))?;
        let (_, scale) = value.as_bigint_and_exponent();
        if scale.unsigned_abs() > MAX_PRECISION {
            return Err(malformed(&number, "exponent out of range"));
        }

        Ok(Token::new(TokenKind::Number(value), number, start))
    }

    fn single(&mut self, kind: TokenKind) -> Token {
        let start = self.position;
        self.advance();
        Token::new(kind, self.lexeme_from(start), start)
    }

    /// Emits `double` when the next character is `second`, otherwise `single`.
    fn one_or_two(&mut self, second: char, double: TokenKind, single: TokenKind) -> Token {
        let start = self.position;
        if self.peek_char(1) == Some(second) {
            self.advance();
            self.advance();
            Token::new(double, self.lexeme_from(start), start)
        } else {
            self.advance();
            Token::new(single, self.lexeme_from(start), start)
        }
    }

    /// Two-character operators whose first character is meaningless alone.
    fn pair(&mut self, ch: char, expected: &'static str, kind: TokenKind) -> Result<Token, ScanError> {
        if self.peek_char(1) == Some(ch) {
            let start = self.position;
            self.advance();
            self.advance();
            Ok(Token::new(kind, self.lexeme_from(start), start))
        } else {
            Err(ScanError::IncompleteOperator {
                ch,
                expected,
                position: self.position,
            })
        }
    }

    pub fn next_token(&mut self) -> Result<Token, ScanError> {
        self.skip_whitespace();

        let token = match self.current_char() {
            None => Token::new(TokenKind::Eof, "", self.position),
            Some('+') => self.single(TokenKind::Plus),
            Some('-') => self.single(TokenKind::Minus),
            Some('*') => self.single(TokenKind::Star),
            Some('/') => self.single(TokenKind::Slash),
            Some('%') => self.single(TokenKind::Percent),
            Some('^') => self.single(TokenKind::Caret),
            Some('(') => self.single(TokenKind::LParen),
            Some(')') => self.single(TokenKind::RParen),
            Some(',') => self.single(TokenKind::Comma),
            Some('>') => self.one_or_two('=', TokenKind::GtEq, TokenKind::Gt),
            Some('<') => self.one_or_two('=', TokenKind::LtEq, TokenKind::Lt),
            Some('=') => self.pair('=', "==", TokenKind::EqEq)?,
            Some('&') => self.pair('&', "&&", TokenKind::AmpAmp)?,
            Some('|') => self.pair('|', "||", TokenKind::PipePipe)?,
            Some('!') => {
                if self.peek_char(1) == Some('=') {
                    let start = self.position;
                    self.advance();
                    self.advance();
                    Token::new(TokenKind::NotEq, "!=", start)
                } else {
                    return Err(ScanError::IncompleteOperator {
                        ch: '!',
                        expected: "!=",
                        position: self.position,
                    });
                }
            }
            Some('.') => {
                if self.peek_char(1).is_some_and(|c| c.is_ascii_digit()) {
                    self.read_number()?
                } else {
                    return Err(ScanError::MalformedNumber {
                        lexeme: ".".to_string(),
                        position: self.position,
                        reason: "expected digit after '.'".to_string(),
                    });
                }
            }
            Some(ch) if ch.is_ascii_digit() => self.read_number()?,
            Some(ch) if is_identifier_start(ch) => {
                let start = self.position;
                let name = self.read_identifier();
                Token::new(TokenKind::Identifier(name.clone()), name, start)
            }
            Some(ch) => {
                return Err(ScanError::UnexpectedCharacter {
                    ch,
                    position: self.position,
                });
            }
        };

        Ok(token)
    }
}

/// Letters, underscore, and non-ASCII symbols like `π` or `√`.
fn is_identifier_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_' || (!ch.is_ascii() && !ch.is_whitespace() && !ch.is_numeric())
}

/// Scans `input` into tokens.
pub fn scan(input: &str) -> Result<Vec<Token>, ScanError> {
    Scanner::new(input).scan_tokens()
}
