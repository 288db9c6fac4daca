use crate::ast::{Expression, Literal};
use crate::config::LayoutConfig;
use crate::document::{DocumentPolicy, parse_expression_document, parse_with_policy, to_document_value};
use crate::error::EditorError;
use crate::graph::model::fresh_id;
use crate::graph::{GraphEdge, GraphNode, GraphState, Position, ROOT_ID, parse_node_id};
use crate::layout::LayoutEngine;
use crate::reconstruct::{reconstruct_document, reconstruct_document_traced};
use crate::registry::{NodeKind, OperationRegistry};
use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// One user edit, as recorded in the session's edit log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EditOp {
    Connect {
        source: String,
        slot: usize,
        target: String,
    },
    Disconnect {
        edge_id: String,
    },
    DeleteNode {
        node_id: String,
    },
    AddNode {
        kind: NodeKind,
        position: Position,
        id: Option<String>,
    },
    AddOperationNode {
        name: String,
        position: Position,
        id: Option<String>,
    },
    AddConstantNode {
        value: Literal,
        position: Position,
        id: Option<String>,
    },
    MoveNode {
        node_id: String,
        position: Position,
    },
    SetInlineValue {
        node_id: String,
        index: usize,
        value: Option<Literal>,
    },
    AddRoot {
        node_id: String,
    },
    RemoveRoot {
        node_id: String,
    },
}

/// A single open editor: owns the current graph and applies edits atomically.
///
/// The graph is replaced only when an edit succeeds, so a rejected edit leaves
/// the session exactly as it was.
pub struct EditorSession {
    registry: OperationRegistry,
    config: LayoutConfig,
    state: GraphState,
    /// Previous graphs, each with the edit-log length at that point.
    history: Vec<(GraphState, usize)>,
    log: Vec<EditOp>,
}

impl EditorSession {
    /// A session showing an empty document.
    pub fn new(registry: OperationRegistry, config: LayoutConfig) -> Self {
        let state = LayoutEngine::new(&registry, config.clone()).layout_document(&[]);
        Self {
            registry,
            config,
            state,
            history: Vec::new(),
            log: Vec::new(),
        }
    }

    /// Opens a session on an untrusted JSON document.
    pub fn open(
        raw: &serde_json::Value,
        registry: OperationRegistry,
        config: LayoutConfig,
    ) -> Result<Self, EditorError> {
        let mut session = Self::new(registry, config);
        session.load_document(raw)?;
        Ok(session)
    }

    /// Replaces the whole document. Invalid documents are rejected before anything
    /// changes; history and edit log start over.
    pub fn load_document(&mut self, raw: &serde_json::Value) -> Result<(), EditorError> {
        let expressions = parse_expression_document(raw)?;
        self.load_expressions(&expressions);
        Ok(())
    }

    /// Like [`EditorSession::load_document`], additionally enforcing `policy`.
    pub fn load_document_with_policy(
        &mut self,
        raw: &serde_json::Value,
        policy: &dyn DocumentPolicy,
    ) -> Result<(), EditorError> {
        let expressions = parse_with_policy(raw, policy)?;
        self.load_expressions(&expressions);
        Ok(())
    }

    pub fn load_expressions(&mut self, expressions: &[Expression]) {
        self.state = self.engine().layout_document(expressions);
        self.history.clear();
        self.log.clear();
        info!(
            expressions = expressions.len(),
            nodes = self.state.nodes.len(),
            "document loaded"
        );
    }

    pub fn state(&self) -> &GraphState {
        &self.state
    }

    pub fn registry(&self) -> &OperationRegistry {
        &self.registry
    }

    /// Edits applied since the document was loaded, oldest first.
    pub fn log(&self) -> &[EditOp] {
        &self.log
    }

    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }

    /// Applies one edit. On failure the session is unchanged.
    pub fn apply(&mut self, op: EditOp) -> Result<(), EditorError> {
        match self.apply_to_state(&op) {
            Ok(next) => {
                debug!(?op, "edit applied");
                self.replace_state(next);
                self.log.push(op);
                Ok(())
            }
            Err(e) => {
                warn!(?op, error = %e, "edit rejected");
                Err(e)
            }
        }
    }

    fn apply_to_state(&self, op: &EditOp) -> Result<GraphState, EditorError> {
        let state = &self.state;
        let next = match op {
            EditOp::Connect {
                source,
                slot,
                target,
            } => state.connect(source, *slot, target)?,
            EditOp::Disconnect { edge_id } => state.disconnect(edge_id),
            EditOp::DeleteNode { node_id } => state.delete_node(node_id)?,
            EditOp::AddNode { kind, position, id } => state.add_node(GraphNode::for_kind(
                *kind,
                id.clone(),
                *position,
                &self.registry,
                &self.config,
            ))?,
            EditOp::AddOperationNode { name, position, id } => state.add_node(
                GraphNode::operation(id.clone(), name, *position, &self.registry, &self.config),
            )?,
            EditOp::AddConstantNode {
                value,
                position,
                id,
            } => state.add_node(GraphNode::constant(
                id.clone(),
                value.clone(),
                *position,
                &self.config,
            ))?,
            EditOp::MoveNode { node_id, position } => state.move_node(node_id, *position)?,
            EditOp::SetInlineValue {
                node_id,
                index,
                value,
            } => state.set_inline_value(node_id, *index, value.clone())?,
            EditOp::AddRoot { node_id } => state.add_root(node_id)?,
            EditOp::RemoveRoot { node_id } => state.remove_root(node_id),
        };
        Ok(next)
    }

    /// Reverts the most recent successful edit.
    pub fn undo(&mut self) -> Result<(), EditorError> {
        let (previous, log_len) = self.history.pop().ok_or(EditorError::NothingToUndo)?;
        self.state = previous;
        self.log.truncate(log_len);
        Ok(())
    }

    /// Rebuilds the document from the current graph.
    pub fn expressions(&self) -> Result<Vec<Expression>, EditorError> {
        Ok(reconstruct_document(&self.state)?)
    }

    /// Rebuilds the document and serializes it into the wire format for saving.
    pub fn save_document(&self) -> Result<serde_json::Value, EditorError> {
        let expressions = self.expressions()?;
        Ok(to_document_value(&expressions)?)
    }

    /// Recomputes positions and path ids from the current document.
    ///
    /// Persistent node keys survive. Nodes not wired into the document keep their
    /// ids, positions and connections among themselves; a detached node whose id
    /// now clashes with a laid-out node receives a fresh id.
    pub fn relayout(&mut self) -> Result<(), EditorError> {
        let trace = reconstruct_document_traced(&self.state)?;
        let mut next = self.engine().layout_document(&trace.expressions);

        for node in &mut next.nodes {
            if let Some(key) = parse_node_id(&node.id)
                .ok()
                .and_then(|path| trace.keys.get(&path))
            {
                node.key = *key;
            }
        }

        let taken: AHashSet<String> = next.nodes.iter().map(|n| n.id.clone()).collect();
        let mut renamed: AHashMap<String, String> = AHashMap::new();
        for node in &self.state.nodes {
            // the empty-document placeholder is regenerated by the layout
            if trace.visited.contains(&node.id) || node.id == ROOT_ID {
                continue;
            }
            let mut detached = node.clone();
            if taken.contains(&detached.id) {
                let id = fresh_id();
                renamed.insert(detached.id.clone(), id.clone());
                detached.id = id;
            }
            next.nodes.push(detached);
        }
        let rename = |id: &str| renamed.get(id).cloned().unwrap_or_else(|| id.to_string());
        for edge in &self.state.edges {
            if trace.visited.contains(&edge.source)
                || trace.visited.contains(&edge.target)
                || edge.source == ROOT_ID
                || edge.target == ROOT_ID
            {
                continue;
            }
            next.edges.push(GraphEdge::new(
                &rename(&edge.source),
                edge.source_slot,
                &rename(&edge.target),
            ));
        }

        debug!(
            nodes = next.nodes.len(),
            detached = self.state.nodes.len().saturating_sub(trace.visited.len()),
            "graph relaid out"
        );
        self.replace_state(next);
        Ok(())
    }

    /// Binary snapshot of the current graph.
    pub fn snapshot(&self) -> Result<Vec<u8>, EditorError> {
        Ok(self.state.to_bytes()?)
    }

    /// Replaces the current graph with a snapshot. Undoable.
    pub fn restore(&mut self, bytes: &[u8]) -> Result<(), EditorError> {
        let restored = GraphState::from_bytes(bytes)?;
        self.replace_state(restored);
        Ok(())
    }

    fn replace_state(&mut self, next: GraphState) {
        let previous = std::mem::replace(&mut self.state, next);
        self.history.push((previous, self.log.len()));
    }

    fn engine(&self) -> LayoutEngine<'_> {
        LayoutEngine::new(&self.registry, self.config.clone())
    }
}
