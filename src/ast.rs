//! Expression tree built by the parser.
//!
//! The tree is a closed set of variants, each exclusively owning its
//! children. Consumers (the printer here, an evaluator later) dispatch by
//! exhaustive match so that adding a variant is a compile error until every
//! consumer handles it.

use std::fmt;

use crate::parser::lexer::Token;

/// Literal payload carried by tokens and by leaf expressions.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Number(f64),
    Str(String),
    Nil,
}

/// One node of the expression tree.
///
/// Nodes are immutable once built; the parser constructs them bottom-up and
/// hands the root to the caller, which takes full ownership.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// `true`, `42`, `"text"`, `nil`
    Literal(Value),
    /// `( expr )`
    Grouping(Box<Expr>),
    /// `!expr` or `-expr`
    Unary { operator: Token, operand: Box<Expr> },
    /// `expr op expr`, where op is arithmetic, comparison, equality or `,`
    Binary {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },
    /// `cond ? then : else`
    Conditional {
        condition: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
    },
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::Nil => write!(f, "nil"),
        }
    }
}

/// Parenthesized prefix form, e.g. `(+ 1 (* 2 3))`.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(value) => write!(f, "{value}"),
            Expr::Grouping(inner) => write!(f, "(group {inner})"),
            Expr::Unary { operator, operand } => {
                write!(f, "({} {})", operator.lexeme, operand)
            }
            Expr::Binary {
                left,
                operator,
                right,
            } => write!(f, "({} {} {})", operator.lexeme, left, right),
            Expr::Conditional {
                condition,
                then_branch,
                else_branch,
            } => write!(f, "(?: {condition} {then_branch} {else_branch})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lexer::TokenKind;

    fn token(kind: TokenKind, lexeme: &str) -> Token {
        Token {
            kind,
            lexeme: lexeme.to_string(),
            literal: None,
            line: 1,
        }
    }

    #[test]
    fn prints_nested_binary() {
        let expr = Expr::Binary {
            left: Box::new(Expr::Literal(Value::Number(1.0))),
            operator: token(TokenKind::Plus, "+"),
            right: Box::new(Expr::Binary {
                left: Box::new(Expr::Literal(Value::Number(2.0))),
                operator: token(TokenKind::Star, "*"),
                right: Box::new(Expr::Literal(Value::Number(3.0))),
            }),
        };
        assert_eq!(expr.to_string(), "(+ 1 (* 2 3))");
    }

    #[test]
    fn prints_grouping_and_unary() {
        let expr = Expr::Unary {
            operator: token(TokenKind::Minus, "-"),
            operand: Box::new(Expr::Grouping(Box::new(Expr::Literal(
                Value::Number(4.5),
            )))),
        };
        assert_eq!(expr.to_string(), "(- (group 4.5))");
    }

    #[test]
    fn prints_conditional() {
        let expr = Expr::Conditional {
            condition: Box::new(Expr::Literal(Value::Bool(true))),
            then_branch: Box::new(Expr::Literal(Value::Str("yes".to_string()))),
            else_branch: Box::new(Expr::Literal(Value::Nil)),
        };
        assert_eq!(expr.to_string(), "(?: true yes nil)");
    }
}
