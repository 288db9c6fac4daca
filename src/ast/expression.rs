use super::{ExpressionArg, Literal};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A named operation with ordered, positional arguments.
///
/// This is the canonical tree form of survey display logic and participant-action
/// rules. Graph views are derived from it and rebuilt back into it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expression {
    pub name: String,
    pub args: Vec<ExpressionArg>,
}

impl Expression {
    pub fn new(name: impl Into<String>, args: Vec<ExpressionArg>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }

    /// An operation without arguments.
    pub fn leaf(name: impl Into<String>) -> Self {
        Self::new(name, Vec::new())
    }

    /// Iterates over the nested expressions together with their argument position.
    pub fn nested(&self) -> impl Iterator<Item = (usize, &Expression)> {
        self.args
            .iter()
            .enumerate()
            .filter_map(|(index, arg)| arg.as_expression().map(|expr| (index, expr)))
    }

    /// True when no argument holds a nested expression.
    pub fn is_leaf(&self) -> bool {
        self.nested().next().is_none()
    }

    /// Number of expression nodes in this tree, including `self`.
    pub fn node_count(&self) -> usize {
        1 + self.nested().map(|(_, e)| e.node_count()).sum::<usize>()
    }

    /// Depth of the tree; a leaf has depth 1.
    pub fn depth(&self) -> usize {
        1 + self.nested().map(|(_, e)| e.depth()).max().unwrap_or(0)
    }

    /// Collects every operation name used in the tree, in depth-first order.
    pub fn collect_names<'a>(&'a self, names: &mut Vec<&'a str>) {
        names.push(&self.name);
        for (_, child) in self.nested() {
            child.collect_names(names);
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.args.iter().join(", "))
    }
}

/// A wrapper to display an expression as an indented tree.
pub struct DisplayExpression<'a> {
    pub expr: &'a Expression,
}

impl<'a> fmt::Display for DisplayExpression<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.expr.name)?;
        self.fmt_args(self.expr, f, "")
    }
}

impl<'a> DisplayExpression<'a> {
    fn fmt_args(&self, expr: &Expression, f: &mut fmt::Formatter<'_>, prefix: &str) -> fmt::Result {
        let count = expr.args.len();
        for (index, arg) in expr.args.iter().enumerate() {
            let is_last = index + 1 == count;
            let node_marker = if is_last { "└── " } else { "├── " };
            write!(f, "{}{}[{}] ", prefix, node_marker, index)?;

            match arg {
                ExpressionArg::ExpressionRef(child) => {
                    writeln!(f, "{}", child.name)?;
                    let child_prefix = format!("{}{}", prefix, if is_last { "    " } else { "│   " });
                    self.fmt_args(child, f, &child_prefix)?;
                }
                ExpressionArg::NumberLiteral(n) => writeln!(f, "{}", Literal::Number(*n))?,
                ExpressionArg::StringLiteral(s) => writeln!(f, "{:?}", s)?,
            }
        }
        Ok(())
    }
}
