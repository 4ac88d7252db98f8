use std::{fmt, mem};

use crate::ast::{BinOp, Expr, LogicalOp, Token, TokenKind, UnaryOp};

/// Maximum nesting of groupings, calls, prefix operators and exponents.
///
/// Each level of nesting costs one pass through the whole precedence
/// ladder, about ten stack frames. Flat operator chains do not nest and
/// are not limited.
pub const MAX_DEPTH: usize = 64;

/// Errors raised while building an expression tree from tokens.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    /// A required token was missing
    UnexpectedToken {
        expected: &'static str,
        found: String,
        position: usize,
    },

    /// No expression can start at this token
    ExpectedExpression { found: String, position: usize },

    /// A complete expression was followed by more tokens
    TrailingInput { found: String, position: usize },

    /// Nesting exceeded [`MAX_DEPTH`]
    NestingTooDeep { limit: usize },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::UnexpectedToken {
                expected,
                found,
                position,
            } => write!(
                f,
                "Expected {} at position {}, found {}",
                expected, position, found
            ),
            ParseError::ExpectedExpression { found, position } => {
                write!(f, "Expected expression at position {}, found {}", position, found)
            }
            ParseError::TrailingInput { found, position } => write!(
                f,
                "Expected end of expression at position {}, found {}",
                position, found
            ),
            ParseError::NestingTooDeep { limit } => {
                write!(f, "Expression is nested more than {} levels deep", limit)
            }
        }
    }
}

impl std::error::Error for ParseError {}

pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    depth: usize,
}

impl Parser {
    /// Creates a parser over a scanned token sequence.
    ///
    /// A missing end marker is appended so the cursor can never run past the
    /// end.
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if !tokens.last().is_some_and(Token::is_eof) {
            let position = tokens.last().map_or(0, |t| t.position + t.lexeme.chars().count());
            tokens.push(Token::new(TokenKind::Eof, "", position));
        }
        Parser {
            tokens,
            current: 0,
            depth: 0,
        }
    }

    fn current_token(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn advance(&mut self) -> Token {
        let token = self.tokens[self.current].clone();
        if !token.is_eof() {
            self.current += 1;
        }
        token
    }

    fn check(&self, kind: &TokenKind) -> bool {
        mem::discriminant(&self.current_token().kind) == mem::discriminant(kind)
    }

    fn expect(&mut self, kind: TokenKind, expected: &'static str) -> Result<Token, ParseError> {
        if !self.check(&kind) {
            let token = self.current_token();
            return Err(ParseError::UnexpectedToken {
                expected,
                found: token.describe(),
                position: token.position,
            });
        }
        Ok(self.advance())
    }

    fn enter(&mut self) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(ParseError::NestingTooDeep { limit: MAX_DEPTH });
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    /// Parse primary expressions: numbers, names, calls and groupings
    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let token = self.current_token();
        match &token.kind {
            TokenKind::Number(n) => {
                let value = n.clone();
                self.advance();
                Ok(Expr::Literal(value))
            }
            TokenKind::Identifier(name) => {
                let name = name.clone();
                self.advance();

                if self.check(&TokenKind::LParen) {
                    self.advance();
                    self.enter()?;
                    let args = self.parse_arguments()?;
                    self.leave();
                    Ok(Expr::Call { name, args })
                } else {
                    Ok(Expr::Variable(name))
                }
            }
            TokenKind::LParen => {
                self.advance();
                self.enter()?;
                let expr = self.parse_expression()?;
                self.leave();
                self.expect(TokenKind::RParen, "')'")?;
                Ok(Expr::Grouping(Box::new(expr)))
            }
            _ => Err(ParseError::ExpectedExpression {
                found: token.describe(),
                position: token.position,
            }),
        }
    }

    /// Parse a call's argument list; the opening '(' is already consumed
    fn parse_arguments(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut args = vec![];

        if !self.check(&TokenKind::RParen) {
            loop {
                args.push(self.parse_expression()?);
                if self.check(&TokenKind::Comma) {
                    self.advance();
                } else {
                    break;
                }
            }
        }

        self.expect(TokenKind::RParen, "')' after arguments")?;
        Ok(args)
    }

    fn parse_exponent(&mut self) -> Result<Expr, ParseError> {
        let left = self.parse_primary()?;

        if self.check(&TokenKind::Caret) {
            self.advance();
            self.enter()?;
            // Recursing through unary makes `^` right-associative and allows `2^-3`
            let right = self.parse_unary()?;
            self.leave();

            return Ok(Expr::binary(left, BinOp::Power, right));
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        if self.check(&TokenKind::Minus) {
            self.advance();
            self.enter()?;
            let operand = self.parse_unary()?;
            self.leave();

            return Ok(Expr::unary(UnaryOp::Negate, operand));
        }
        self.parse_exponent()
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_unary()?;

        loop {
            let op = match self.current_token().kind {
                TokenKind::Star => BinOp::Multiply,
                TokenKind::Slash => BinOp::Divide,
                TokenKind::Percent => BinOp::Modulo,
                _ => break,
            };

            self.advance();
            let right = self.parse_unary()?;
            left = Expr::binary(left, op, right);
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let op = match self.current_token().kind {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Subtract,
                _ => break,
            };

            self.advance();
            let right = self.parse_multiplicative()?;
            left = Expr::binary(left, op, right);
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_additive()?;

        loop {
            let op = match self.current_token().kind {
                TokenKind::Gt => BinOp::GreaterThan,
                TokenKind::GtEq => BinOp::GreaterEqual,
                TokenKind::Lt => BinOp::LessThan,
                TokenKind::LtEq => BinOp::LessEqual,
                _ => break,
            };

            self.advance();
            let right = self.parse_additive()?;
            left = Expr::binary(left, op, right);
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_comparison()?;

        loop {
            let op = match self.current_token().kind {
                TokenKind::EqEq => BinOp::Equal,
                TokenKind::NotEq => BinOp::NotEqual,
                _ => break,
            };

            self.advance();
            let right = self.parse_comparison()?;
            left = Expr::binary(left, op, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_equality()?;

        while self.check(&TokenKind::AmpAmp) {
            self.advance();
            let right = self.parse_equality()?;
            left = Expr::logical(left, LogicalOp::And, right);
        }
        Ok(left)
    }

    fn parse_or(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_and()?;

        while self.check(&TokenKind::PipePipe) {
            self.advance();
            let right = self.parse_and()?;
            left = Expr::logical(left, LogicalOp::Or, right);
        }
        Ok(left)
    }

    pub fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        self.parse_or()
    }

    /// Parses exactly one expression; leftover tokens are an error.
    pub fn parse(&mut self) -> Result<Expr, ParseError> {
        let expr = self.parse_expression()?;

        let token = self.current_token();
        if !token.is_eof() {
            return Err(ParseError::TrailingInput {
                found: token.describe(),
                position: token.position,
            });
        }
        Ok(expr)
    }
}

/// Parses a token sequence into one expression tree.
pub fn parse(tokens: Vec<Token>) -> Result<Expr, ParseError> {
    Parser::new(tokens).parse()
}
