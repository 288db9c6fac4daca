use super::Expression;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A bare literal value, either written inline on a node or held by a constant node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Number(f64),
    String(String),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Number(n) => {
                // whole numbers beyond the i64 range would saturate in the cast
                if n.fract() == 0.0 && n.is_finite() && n.abs() < i64::MAX as f64 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            Literal::String(s) => write!(f, "{:?}", s),
        }
    }
}

impl Literal {
    /// False for NaN and infinite numbers, which the wire format cannot carry.
    pub fn is_finite(&self) -> bool {
        match self {
            Literal::Number(n) => n.is_finite(),
            Literal::String(_) => true,
        }
    }
}

/// An operand of an [`Expression`]. Argument positions are significant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExpressionArg {
    NumberLiteral(f64),
    StringLiteral(String),
    ExpressionRef(Expression),
}

impl ExpressionArg {
    pub fn as_expression(&self) -> Option<&Expression> {
        match self {
            ExpressionArg::ExpressionRef(expr) => Some(expr),
            _ => None,
        }
    }

    /// Returns the literal carried by this argument, `None` for nested expressions.
    pub fn as_literal(&self) -> Option<Literal> {
        match self {
            ExpressionArg::NumberLiteral(n) => Some(Literal::Number(*n)),
            ExpressionArg::StringLiteral(s) => Some(Literal::String(s.clone())),
            ExpressionArg::ExpressionRef(_) => None,
        }
    }

    pub fn is_expression(&self) -> bool {
        matches!(self, ExpressionArg::ExpressionRef(_))
    }
}

impl From<Literal> for ExpressionArg {
    fn from(literal: Literal) -> Self {
        match literal {
            Literal::Number(n) => ExpressionArg::NumberLiteral(n),
            Literal::String(s) => ExpressionArg::StringLiteral(s),
        }
    }
}

impl From<Expression> for ExpressionArg {
    fn from(expr: Expression) -> Self {
        ExpressionArg::ExpressionRef(expr)
    }
}

impl fmt::Display for ExpressionArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpressionArg::ExpressionRef(expr) => write!(f, "{}", expr),
            other => match other.as_literal() {
                Some(literal) => write!(f, "{}", literal),
                None => Ok(()),
            },
        }
    }
}
