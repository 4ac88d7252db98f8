use std::{fmt, mem};

use bigdecimal::BigDecimal;

use crate::ast::{BinOp, LogicalOp, UnaryOp};

/// Abstract Syntax Tree node representing a parsed expression.
///
/// Trees are built bottom-up by the parser and never mutated afterwards.
/// Each node owns its children, so a tree is always acyclic.
///
/// Left-associative operators build trees that lean left, one level per
/// operator. Dropping and displaying walk that left spine in a loop, so a
/// long flat chain like `1 + 1 + ... + 1` never recurses once per term.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Literal decimal number
    ///
    /// # Example
    /// ```text
    /// 42.50
    /// ```
    Literal(BigDecimal),

    /// Reference to a variable or constant, resolved at evaluation time
    ///
    /// The name keeps its source casing; lookups are case-insensitive.
    Variable(String),

    /// Prefix operation
    ///
    /// # Example
    /// ```text
    /// -x
    /// ```
    Unary { op: UnaryOp, operand: Box<Expr> },

    /// Arithmetic, comparison or equality operation
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// Short-circuiting `&&` / `||`
    Logical {
        op: LogicalOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// Parenthesized expression
    Grouping(Box<Expr>),

    /// Named function call
    ///
    /// # Examples
    /// ```text
    /// max(a, b, 3)
    /// √(2)
    /// ```
    Call { name: String, args: Vec<Expr> },
}

impl Expr {
    pub fn literal(value: impl Into<BigDecimal>) -> Self {
        Expr::Literal(value.into())
    }

    pub fn variable(name: impl Into<String>) -> Self {
        Expr::Variable(name.into())
    }

    pub fn unary(op: UnaryOp, operand: Expr) -> Self {
        Expr::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    pub fn binary(left: Expr, op: BinOp, right: Expr) -> Self {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn logical(left: Expr, op: LogicalOp, right: Expr) -> Self {
        Expr::Logical {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn grouping(inner: Expr) -> Self {
        Expr::Grouping(Box::new(inner))
    }

    pub fn call(name: impl Into<String>, args: Vec<Expr>) -> Self {
        Expr::Call {
            name: name.into(),
            args,
        }
    }

    /// Moves this node's children into `out`, leaving it a leaf.
    fn detach_children(&mut self, out: &mut Vec<Expr>) {
        fn take(child: &mut Expr) -> Expr {
            mem::replace(child, Expr::Variable(String::new()))
        }

        match self {
            Expr::Literal(_) | Expr::Variable(_) => {}
            Expr::Unary { operand: child, .. } | Expr::Grouping(child) => out.push(take(child)),
            Expr::Binary { left, right, .. } | Expr::Logical { left, right, .. } => {
                out.push(take(left));
                out.push(take(right));
            }
            Expr::Call { args, .. } => out.append(args),
        }
    }
}

impl Drop for Expr {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        self.detach_children(&mut pending);
        while let Some(mut child) = pending.pop() {
            child.detach_children(&mut pending);
        }
    }
}

/// Renders the tree back to source form, with every operation grouped.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(n) => f.write_str(&n.to_plain_string()),
            Expr::Variable(name) => f.write_str(name),
            Expr::Unary { op, operand } => write!(f, "({}{})", op, operand),
            Expr::Binary { .. } | Expr::Logical { .. } => {
                let mut steps: Vec<(&dyn fmt::Display, &Expr)> = Vec::new();
                let mut node = self;
                loop {
                    match node {
                        Expr::Binary { op, left, right } => {
                            steps.push((op as &dyn fmt::Display, right.as_ref()));
                            node = left;
                        }
                        Expr::Logical { op, left, right } => {
                            steps.push((op as &dyn fmt::Display, right.as_ref()));
                            node = left;
                        }
                        _ => break,
                    }
                }

                for _ in 0..steps.len() {
                    f.write_str("(")?;
                }
                write!(f, "{}", node)?;
                for (op, right) in steps.iter().rev() {
                    write!(f, " {} {})", op, right)?;
                }
                Ok(())
            }
            Expr::Grouping(inner) => write!(f, "({})", inner),
            Expr::Call { name, args } => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                f.write_str(")")
            }
        }
    }
}
