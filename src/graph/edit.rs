//! Edit operations on a live graph.
//!
//! Every operation takes `&self` and returns a new [`GraphState`]; a rejected
//! operation returns an [`EditError`] and the original state is untouched.

use super::model::{GraphEdge, GraphNode, GraphState, NodeContent, Position, constant_kind};
use crate::ast::Literal;
use crate::error::EditError;
use ahash::AHashSet;

impl GraphState {
    /// Plugs the subtree rooted at `target_id` into `slot` of `source_id`.
    ///
    /// # Errors
    ///
    /// * `NodeNotFound` if either node is missing.
    /// * `UnknownSlot` if the source has no such slot (constants have none).
    /// * `SlotOccupied` if the slot already has an edge; disconnect it first.
    /// * `TargetAlreadyConnected` if the target already feeds another slot.
    pub fn connect(
        &self,
        source_id: &str,
        slot: usize,
        target_id: &str,
    ) -> Result<GraphState, EditError> {
        let source = self.require_node(source_id)?;
        self.require_node(target_id)?;

        if source.slot(slot).is_none() {
            return Err(EditError::UnknownSlot {
                node_id: source_id.to_string(),
                slot,
            });
        }
        if let Some(existing) = self.edge_from(source_id, slot) {
            return Err(EditError::SlotOccupied {
                node_id: source_id.to_string(),
                slot,
                edge_id: existing.id.clone(),
            });
        }
        if let Some(existing) = self.incoming(target_id) {
            return Err(EditError::TargetAlreadyConnected {
                target_id: target_id.to_string(),
                source_id: existing.source.clone(),
                slot: existing.source_slot,
            });
        }

        let closes_cycle = self.reaches(target_id, source_id);
        let mut next = self.clone();
        next.edges.push(GraphEdge::new(source_id, slot, target_id));
        // A plugged-in subtree is no longer a top-level expression, unless the
        // edge loops back into it: the root stays so that reconstruction reports
        // the cycle instead of dropping the rule.
        if !closes_cycle {
            next.roots.retain(|root| root != target_id);
        }
        Ok(next)
    }

    /// Removes the edge with `edge_id`. Unknown ids are ignored.
    pub fn disconnect(&self, edge_id: &str) -> GraphState {
        let mut next = self.clone();
        next.edges.retain(|e| e.id != edge_id);
        next
    }

    /// Removes a node together with every node reachable only through it.
    ///
    /// All edges touching a removed node go too, including the parent edge that
    /// fed the node into a slot, which leaves that slot empty.
    pub fn delete_node(&self, node_id: &str) -> Result<GraphState, EditError> {
        self.require_node(node_id)?;

        let mut removed: AHashSet<&str> = AHashSet::new();
        removed.insert(node_id);
        // Each node has at most one incoming edge, so a target whose feeding
        // source is removed is reachable only through the removed subtree.
        loop {
            let before = removed.len();
            for edge in &self.edges {
                if removed.contains(edge.source.as_str()) {
                    removed.insert(edge.target.as_str());
                }
            }
            if removed.len() == before {
                break;
            }
        }

        let mut next = self.clone();
        next.nodes.retain(|n| !removed.contains(n.id.as_str()));
        next.edges.retain(|e| {
            !removed.contains(e.source.as_str()) && !removed.contains(e.target.as_str())
        });
        next.roots.retain(|r| !removed.contains(r.as_str()));
        Ok(next)
    }

    /// Inserts an unconnected node built with one of the [`GraphNode`] constructors.
    ///
    /// Nodes carrying a NaN or infinite number are rejected with `NonFiniteNumber`.
    pub fn add_node(&self, node: GraphNode) -> Result<GraphState, EditError> {
        if self.node(&node.id).is_some() {
            return Err(EditError::DuplicateNodeId(node.id));
        }
        let non_finite = match &node.content {
            NodeContent::Constant(value) => (!value.is_finite()).then_some(0),
            NodeContent::Operation { inline, .. } => inline
                .iter()
                .position(|value| value.as_ref().is_some_and(|v| !v.is_finite())),
        };
        if let Some(index) = non_finite {
            return Err(EditError::NonFiniteNumber {
                node_id: node.id,
                index,
            });
        }
        let mut next = self.clone();
        next.nodes.push(node);
        Ok(next)
    }

    /// Moves a node. Purely cosmetic.
    pub fn move_node(&self, node_id: &str, position: Position) -> Result<GraphState, EditError> {
        let mut next = self.clone();
        let node = next
            .node_mut(node_id)
            .ok_or_else(|| EditError::NodeNotFound(node_id.to_string()))?;
        node.position = position;
        Ok(next)
    }

    /// Sets the literal written directly on a node for argument `index`.
    ///
    /// On operation nodes `index` must be an existing argument position or one of
    /// the node's slots; `None` clears the value. On constant nodes only index `0`
    /// with a value is accepted, and the node kind follows the literal type.
    pub fn set_inline_value(
        &self,
        node_id: &str,
        index: usize,
        value: Option<Literal>,
    ) -> Result<GraphState, EditError> {
        if value.as_ref().is_some_and(|v| !v.is_finite()) {
            return Err(EditError::NonFiniteNumber {
                node_id: node_id.to_string(),
                index,
            });
        }
        let mut next = self.clone();
        let node = next
            .node_mut(node_id)
            .ok_or_else(|| EditError::NodeNotFound(node_id.to_string()))?;
        let has_slot = node.slot(index).is_some();
        let unknown_slot = || EditError::UnknownSlot {
            node_id: node_id.to_string(),
            slot: index,
        };

        match (&mut node.content, value) {
            (NodeContent::Operation { inline, .. }, value) => {
                if index >= inline.len() {
                    if !has_slot {
                        return Err(unknown_slot());
                    }
                    inline.resize(index + 1, None);
                }
                inline[index] = value;
            }
            (NodeContent::Constant(current), Some(value)) if index == 0 => {
                node.kind = constant_kind(&value);
                *current = value;
            }
            (NodeContent::Constant(_), _) => return Err(unknown_slot()),
        }
        Ok(next)
    }

    /// Appends an operation node to the top-level expressions of the document.
    pub fn add_root(&self, node_id: &str) -> Result<GraphState, EditError> {
        let node = self.require_node(node_id)?;
        if matches!(node.content, NodeContent::Constant(_)) {
            return Err(EditError::NotAnOperation(node_id.to_string()));
        }
        if let Some(existing) = self.incoming(node_id) {
            return Err(EditError::TargetAlreadyConnected {
                target_id: node_id.to_string(),
                source_id: existing.source.clone(),
                slot: existing.source_slot,
            });
        }

        let mut next = self.clone();
        if !next.is_root(node_id) {
            next.roots.push(node_id.to_string());
        }
        Ok(next)
    }

    /// Drops a node from the top-level expressions. The node itself stays.
    pub fn remove_root(&self, node_id: &str) -> GraphState {
        let mut next = self.clone();
        next.roots.retain(|r| r != node_id);
        next
    }

    /// True if `to` is `from` or lies in the subtree below `from`.
    fn reaches(&self, from: &str, to: &str) -> bool {
        let mut seen: AHashSet<&str> = AHashSet::new();
        let mut pending = vec![from];
        while let Some(id) = pending.pop() {
            if id == to {
                return true;
            }
            if seen.insert(id) {
                pending.extend(self.outgoing(id).map(|e| e.target.as_str()));
            }
        }
        false
    }

    fn require_node(&self, node_id: &str) -> Result<&GraphNode, EditError> {
        self.node(node_id)
            .ok_or_else(|| EditError::NodeNotFound(node_id.to_string()))
    }
}
