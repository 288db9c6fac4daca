//! # exprgraph - Expression Tree ↔ Node Graph Engine
//!
//! **exprgraph** is the core of a visual rule editor. It takes the expression
//! documents used for survey display logic and participant-action rules, lays them
//! out as positioned node graphs for interactive editing, applies graph edits, and
//! rebuilds a valid expression document from the edited graph.
//!
//! ## Core Workflow
//!
//! 1.  **Validate**: Hand an untrusted JSON value to [`document::parse_expression_document`]
//!     (optionally with a [`document::DocumentPolicy`]) to get typed [`ast::Expression`]s.
//! 2.  **Lay Out**: Use a [`layout::LayoutEngine`] to turn the expressions into a
//!     [`graph::GraphState`] of positioned nodes and slot edges.
//! 3.  **Edit**: Apply connect / disconnect / delete / add / move operations, either
//!     directly on `GraphState` or through an [`editor::EditorSession`] that keeps
//!     an edit log and undo history.
//! 4.  **Reconstruct**: Rebuild the expressions with [`reconstruct::reconstruct_document`]
//!     and serialize them with [`document::to_document_value`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use exprgraph::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let raw = serde_json::json!([
//!         { "name": "and", "data": [
//!             { "dtype": "exp", "exp": { "name": "X" } },
//!             { "dtype": "exp", "exp": { "name": "Y" } }
//!         ]}
//!     ]);
//!
//!     let expressions = parse_expression_document(&raw)?;
//!     let registry = OperationRegistry::with_defaults();
//!     let engine = LayoutEngine::new(&registry, LayoutConfig::default());
//!     let graph = engine.layout_document(&expressions);
//!
//!     // Unplug `Y` and plug in a fresh constant instead.
//!     let graph = graph.disconnect(&edge_id("root.0", 1));
//!     let constant = GraphNode::constant(
//!         Some("c1".to_string()),
//!         Literal::Number(7.0),
//!         Position::new(0.0, 400.0),
//!         engine.config(),
//!     );
//!     let graph = graph.add_node(constant)?.connect("root.0", 1, "c1")?;
//!
//!     let rebuilt = reconstruct_document(&graph)?;
//!     println!("{}", rebuilt[0]); // and(X(), 7)
//!     Ok(())
//! }
//! ```

pub mod ast;
pub mod config;
pub mod document;
pub mod editor;
pub mod error;
pub mod graph;
pub mod layout;
pub mod prelude;
pub mod reconstruct;
pub mod registry;
