use crate::ast::{Expression, ExpressionArg};
use crate::error::DocumentError;
use serde_json::Value;

/// Validates an untrusted JSON value and converts it into expressions.
///
/// The value must be an array; every element must be a well-formed expression
/// `{ name, data? }` whose arguments are `num`/`str` literals or nested
/// expressions, checked recursively. A single bad element rejects the whole
/// document.
///
/// # Errors
///
/// * `DocumentError::InvalidDocument` if the top-level value is not an array.
/// * `DocumentError::InvalidExpression` with the index path to the first offending
///   element otherwise.
pub fn parse_expression_document(raw: &Value) -> Result<Vec<Expression>, DocumentError> {
    let items = raw.as_array().ok_or_else(|| {
        DocumentError::InvalidDocument(format!(
            "expected an array of expressions, found {}",
            describe(raw)
        ))
    })?;

    let mut path = Vec::new();
    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            path.push(index);
            let parsed = parse_expression(item, &mut path);
            path.pop();
            parsed
        })
        .collect()
}

/// Parses JSON text and validates it with [`parse_expression_document`].
pub fn parse_expression_document_str(text: &str) -> Result<Vec<Expression>, DocumentError> {
    let raw: Value = serde_json::from_str(text).map_err(|e| DocumentError::Json(e.to_string()))?;
    parse_expression_document(&raw)
}

/// Shape check for a single candidate expression.
pub fn is_expression(raw: &Value) -> bool {
    parse_expression(raw, &mut Vec::new()).is_ok()
}

fn parse_expression(raw: &Value, path: &mut Vec<usize>) -> Result<Expression, DocumentError> {
    let object = raw
        .as_object()
        .ok_or_else(|| invalid(path, format!("expected an object, found {}", describe(raw))))?;

    let name = match object.get("name") {
        Some(Value::String(name)) if !name.is_empty() => name.clone(),
        Some(Value::String(_)) => return Err(invalid(path, "'name' is empty")),
        Some(other) => {
            return Err(invalid(
                path,
                format!("'name' must be a string, found {}", describe(other)),
            ));
        }
        None => return Err(invalid(path, "missing 'name'")),
    };

    let args = match object.get("data") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => {
            let mut args = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                path.push(index);
                let arg = parse_arg(item, path);
                path.pop();
                args.push(arg?);
            }
            args
        }
        Some(other) => {
            return Err(invalid(
                path,
                format!("'data' must be an array, found {}", describe(other)),
            ));
        }
    };

    Ok(Expression { name, args })
}

fn parse_arg(raw: &Value, path: &mut Vec<usize>) -> Result<ExpressionArg, DocumentError> {
    let object = raw.as_object().ok_or_else(|| {
        invalid(
            path,
            format!("expected an argument object, found {}", describe(raw)),
        )
    })?;

    let dtype = object
        .get("dtype")
        .and_then(Value::as_str)
        .ok_or_else(|| invalid(path, "argument has no string 'dtype'"))?;

    match dtype {
        "num" => object
            .get("num")
            .and_then(Value::as_f64)
            .map(ExpressionArg::NumberLiteral)
            .ok_or_else(|| invalid(path, "argument of dtype 'num' has no numeric 'num'")),
        "str" => object
            .get("str")
            .and_then(Value::as_str)
            .map(|s| ExpressionArg::StringLiteral(s.to_string()))
            .ok_or_else(|| invalid(path, "argument of dtype 'str' has no string 'str'")),
        "exp" => {
            let nested = object
                .get("exp")
                .ok_or_else(|| invalid(path, "argument of dtype 'exp' has no 'exp'"))?;
            parse_expression(nested, path).map(ExpressionArg::ExpressionRef)
        }
        other => Err(invalid(path, format!("unknown dtype '{}'", other))),
    }
}

fn invalid(path: &[usize], reason: impl Into<String>) -> DocumentError {
    DocumentError::InvalidExpression {
        path: path.to_vec(),
        reason: reason.into(),
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
