use super::parse_expression_document;
use crate::ast::Expression;
use crate::error::DocumentError;
use crate::registry::OperationRegistry;
use serde_json::Value;

/// A rule-category check layered on top of the structural validator.
///
/// Policies only see documents that already passed the shape check, so they
/// work on typed [`Expression`]s.
pub trait DocumentPolicy {
    /// Checks the top-level expression at `index` of the document.
    fn check(&self, index: usize, expr: &Expression) -> Result<(), DocumentError>;
}

/// Validates `raw` structurally, then applies `policy` to every top-level expression.
pub fn parse_with_policy(
    raw: &Value,
    policy: &dyn DocumentPolicy,
) -> Result<Vec<Expression>, DocumentError> {
    let expressions = parse_expression_document(raw)?;
    for (index, expr) in expressions.iter().enumerate() {
        policy.check(index, expr)?;
    }
    Ok(expressions)
}

/// Study rules: each top-level entry is `IFTHEN(checkEventType(...), ...)`.
pub struct StudyRulePolicy;

impl DocumentPolicy for StudyRulePolicy {
    fn check(&self, index: usize, expr: &Expression) -> Result<(), DocumentError> {
        if expr.name != "IFTHEN" {
            return Err(DocumentError::InvalidExpression {
                path: vec![index],
                reason: format!("study rule must be 'IFTHEN', found '{}'", expr.name),
            });
        }
        match expr.args.first().and_then(|arg| arg.as_expression()) {
            Some(condition) if condition.name == "checkEventType" => Ok(()),
            Some(condition) => Err(DocumentError::InvalidExpression {
                path: vec![index, 0],
                reason: format!(
                    "study rule condition must be 'checkEventType', found '{}'",
                    condition.name
                ),
            }),
            None => Err(DocumentError::InvalidExpression {
                path: vec![index, 0],
                reason: "study rule condition must be a 'checkEventType' expression".to_string(),
            }),
        }
    }
}

/// Rejects operation names, at any depth, that the registry does not know.
pub struct KnownOperationsPolicy<'a> {
    pub registry: &'a OperationRegistry,
}

impl<'a> KnownOperationsPolicy<'a> {
    fn check_tree(&self, expr: &Expression, path: &mut Vec<usize>) -> Result<(), DocumentError> {
        if !self.registry.contains(&expr.name) {
            return Err(DocumentError::InvalidExpression {
                path: path.clone(),
                reason: format!("unknown operation '{}'", expr.name),
            });
        }
        for (index, child) in expr.nested() {
            path.push(index);
            let checked = self.check_tree(child, path);
            path.pop();
            checked?;
        }
        Ok(())
    }
}

impl<'a> DocumentPolicy for KnownOperationsPolicy<'a> {
    fn check(&self, index: usize, expr: &Expression) -> Result<(), DocumentError> {
        self.check_tree(expr, &mut vec![index])
    }
}

/// Requires every contained policy to pass, reporting the first failure.
#[derive(Default)]
pub struct CompositePolicy<'a> {
    policies: Vec<Box<dyn DocumentPolicy + 'a>>,
}

impl<'a> CompositePolicy<'a> {
    pub fn new() -> Self {
        Self {
            policies: Vec::new(),
        }
    }

    pub fn with(mut self, policy: impl DocumentPolicy + 'a) -> Self {
        self.policies.push(Box::new(policy));
        self
    }
}

impl<'a> DocumentPolicy for CompositePolicy<'a> {
    fn check(&self, index: usize, expr: &Expression) -> Result<(), DocumentError> {
        self.policies.iter().try_for_each(|p| p.check(index, expr))
    }
}
