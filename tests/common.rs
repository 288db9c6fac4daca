//! Common test utilities for building expression documents and checking graph invariants.
use exprgraph::prelude::*;
use serde_json::{Value, json};
use ahash::AHashSet;

#[allow(dead_code)]
pub fn num(value: f64) -> ExpressionArg {
    ExpressionArg::NumberLiteral(value)
}

#[allow(dead_code)]
pub fn string(value: &str) -> ExpressionArg {
    ExpressionArg::StringLiteral(value.to_string())
}

#[allow(dead_code)]
pub fn exp(expr: Expression) -> ExpressionArg {
    ExpressionArg::ExpressionRef(expr)
}

/// `and(X, Y)` where `X` and `Y` are unregistered leaf operations.
#[allow(dead_code)]
pub fn and_document() -> Value {
    json!([
        {
            "name": "and",
            "data": [
                { "dtype": "exp", "exp": { "name": "X" } },
                { "dtype": "exp", "exp": { "name": "Y" } }
            ]
        }
    ])
}

/// `IF("cond", 1, 0)`: every argument is a literal.
#[allow(dead_code)]
pub fn if_literal_document() -> Value {
    json!([
        {
            "name": "IF",
            "data": [
                { "dtype": "str", "str": "cond" },
                { "dtype": "num", "num": 1 },
                { "dtype": "num", "num": 0 }
            ]
        }
    ])
}

/// Two study rules, each `IFTHEN(checkEventType(..), ...)`.
#[allow(dead_code)]
pub fn study_rules_document() -> Value {
    json!([
        {
            "name": "IFTHEN",
            "data": [
                { "dtype": "exp", "exp": { "name": "checkEventType", "data": [{ "dtype": "str", "str": "ENTER" }] } },
                { "dtype": "exp", "exp": { "name": "ADD_NEW_SURVEY", "data": [
                    { "dtype": "str", "str": "intake" },
                    { "dtype": "num", "num": 0 },
                    { "dtype": "num", "num": 0 },
                    { "dtype": "str", "str": "normal" }
                ] } }
            ]
        },
        {
            "name": "IFTHEN",
            "data": [
                { "dtype": "exp", "exp": { "name": "checkEventType", "data": [{ "dtype": "str", "str": "SUBMIT" }] } },
                { "dtype": "exp", "exp": { "name": "UPDATE_FLAG", "data": [
                    { "dtype": "str", "str": "symptoms" },
                    { "dtype": "str", "str": "yes" }
                ] } }
            ]
        }
    ])
}

/// A deeper rule mixing literals, registered and unregistered operations.
///
/// `IFTHEN(checkEventType("SUBMIT"),
///         and(gt(getResponseValueAsNum("weekly", "rg.scg"), 2), not(isDefined(getAttribute("p", "flag")))),
///         UPDATE_FLAG("sick", "yes"))`
#[allow(dead_code)]
pub fn sample_rule() -> Expression {
    let response = Expression::new(
        "getResponseValueAsNum",
        vec![string("weekly"), string("rg.scg")],
    );
    let greater = Expression::new("gt", vec![exp(response), num(2.0)]);
    let attribute = Expression::new("getAttribute", vec![string("p"), string("flag")]);
    let defined = Expression::new("isDefined", vec![exp(attribute)]);
    let negated = Expression::new("not", vec![exp(defined)]);
    let condition = Expression::new("and", vec![exp(greater), exp(negated)]);
    Expression::new(
        "IFTHEN",
        vec![
            exp(Expression::new("checkEventType", vec![string("SUBMIT")])),
            exp(condition),
            exp(Expression::new("UPDATE_FLAG", vec![string("sick"), string("yes")])),
        ],
    )
}

/// An expression built only from operations the registry does not know.
#[allow(dead_code)]
pub fn custom_expression() -> Expression {
    Expression::new(
        "custom",
        vec![
            num(1.5),
            exp(Expression::new("inner", vec![string("a"), exp(Expression::leaf("deep"))])),
            string("tail"),
            exp(Expression::leaf("last")),
        ],
    )
}

/// Asserts the at-most-one-per-slot and at-most-one-incoming invariants.
#[allow(dead_code)]
pub fn assert_edge_invariants(state: &GraphState) {
    let mut slots = AHashSet::new();
    let mut targets = AHashSet::new();
    for edge in &state.edges {
        assert!(
            slots.insert((edge.source.clone(), edge.source_slot)),
            "slot {} of '{}' has more than one edge",
            edge.source_slot,
            edge.source
        );
        assert!(
            targets.insert(edge.target.clone()),
            "node '{}' has more than one incoming edge",
            edge.target
        );
    }
}

/// Asserts that no two node boxes overlap.
#[allow(dead_code)]
pub fn assert_no_overlap(state: &GraphState) {
    for (i, a) in state.nodes.iter().enumerate() {
        for b in state.nodes.iter().skip(i + 1) {
            let separated = a.position.x + a.size.width <= b.position.x
                || b.position.x + b.size.width <= a.position.x
                || a.bottom() <= b.position.y
                || b.bottom() <= a.position.y;
            assert!(separated, "nodes '{}' and '{}' overlap", a.id, b.id);
        }
    }
}
