//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and functions of the
//! exprgraph crate.
//!
//! # Example
//!
//! ```rust,no_run
//! use exprgraph::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let text = std::fs::read_to_string("path/to/rules.json")?;
//! let expressions = parse_expression_document_str(&text)?;
//!
//! let registry = OperationRegistry::with_defaults();
//! let graph = LayoutEngine::new(&registry, LayoutConfig::default()).layout_document(&expressions);
//! assert_eq!(reconstruct_document(&graph)?, expressions);
//! # Ok(())
//! # }
//! ```

// Expression model
pub use crate::ast::{DisplayExpression, Expression, ExpressionArg, Literal};

// Documents and validation
pub use crate::document::{
    CompositePolicy, DocumentPolicy, KnownOperationsPolicy, StudyRulePolicy,
    parse_expression_document, parse_expression_document_str, parse_with_policy,
    to_document_string, to_document_value,
};

// Graph model, layout and reconstruction
pub use crate::config::LayoutConfig;
pub use crate::graph::{
    GraphEdge, GraphNode, GraphState, NodeContent, Position, ROOT_ID, Size, Slot, edge_id,
    node_id, parse_node_id,
};
pub use crate::layout::{LayoutEngine, layout};
pub use crate::reconstruct::{reconstruct, reconstruct_document};
pub use crate::registry::{Arity, NodeKind, OperationRegistry, OperationSchema};

// Editing
pub use crate::editor::{EditOp, EditorSession};

// Error types
pub use crate::error::{
    DocumentError, EditError, EditorError, IdError, ReconstructionError, SnapshotError,
};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
