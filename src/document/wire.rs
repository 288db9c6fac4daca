use crate::ast::{Expression, ExpressionArg};
use crate::error::DocumentError;
use serde::{Deserialize, Serialize};

/// Argument type tag used by the wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dtype {
    Num,
    Str,
    Exp,
}

/// One expression as exchanged with the management API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpressionJson {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<ArgJson>>,
}

/// One argument as exchanged with the management API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArgJson {
    pub dtype: Dtype,
    #[serde(rename = "num", default, skip_serializing_if = "Option::is_none")]
    pub number: Option<f64>,
    #[serde(rename = "str", default, skip_serializing_if = "Option::is_none")]
    pub string: Option<String>,
    #[serde(rename = "exp", default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<Box<ExpressionJson>>,
}

impl From<&Expression> for ExpressionJson {
    fn from(expr: &Expression) -> Self {
        let data = if expr.args.is_empty() {
            None
        } else {
            Some(expr.args.iter().map(ArgJson::from).collect())
        };
        Self {
            name: expr.name.clone(),
            data,
        }
    }
}

impl From<&ExpressionArg> for ArgJson {
    fn from(arg: &ExpressionArg) -> Self {
        let empty = ArgJson {
            dtype: Dtype::Num,
            number: None,
            string: None,
            expression: None,
        };
        match arg {
            ExpressionArg::NumberLiteral(n) => ArgJson {
                number: Some(*n),
                ..empty
            },
            ExpressionArg::StringLiteral(s) => ArgJson {
                dtype: Dtype::Str,
                string: Some(s.clone()),
                ..empty
            },
            ExpressionArg::ExpressionRef(e) => ArgJson {
                dtype: Dtype::Exp,
                expression: Some(Box::new(ExpressionJson::from(e))),
                ..empty
            },
        }
    }
}

/// Serializes expressions back into the wire format.
///
/// # Errors
///
/// `DocumentError::InvalidExpression` if a number is NaN or infinite; JSON would
/// carry it as `null`, which the validator rejects on the way back in.
pub fn to_document_value(expressions: &[Expression]) -> Result<serde_json::Value, DocumentError> {
    serde_json::to_value(wire_document(expressions)?)
        .map_err(|e| DocumentError::Json(e.to_string()))
}

/// Serializes expressions into pretty-printed wire-format JSON text.
pub fn to_document_string(expressions: &[Expression]) -> Result<String, DocumentError> {
    serde_json::to_string_pretty(&wire_document(expressions)?)
        .map_err(|e| DocumentError::Json(e.to_string()))
}

fn wire_document(expressions: &[Expression]) -> Result<Vec<ExpressionJson>, DocumentError> {
    let mut path = Vec::new();
    for (index, expr) in expressions.iter().enumerate() {
        path.push(index);
        ensure_finite(expr, &mut path)?;
        path.pop();
    }
    Ok(expressions.iter().map(ExpressionJson::from).collect())
}

fn ensure_finite(expr: &Expression, path: &mut Vec<usize>) -> Result<(), DocumentError> {
    for (index, arg) in expr.args.iter().enumerate() {
        path.push(index);
        match arg {
            ExpressionArg::NumberLiteral(n) if !n.is_finite() => {
                return Err(DocumentError::InvalidExpression {
                    path: path.clone(),
                    reason: format!("number {} cannot be written as JSON", n),
                });
            }
            ExpressionArg::ExpressionRef(nested) => ensure_finite(nested, path)?,
            _ => {}
        }
        path.pop();
    }
    Ok(())
}
