use crate::ast::{Expression, ExpressionArg};
use crate::error::ReconstructionError;
use crate::graph::{GraphIndex, GraphNode, GraphState, NodeContent};
use ahash::{AHashMap, AHashSet};
use tracing::{debug, trace};
use uuid::Uuid;

/// Result of a document reconstruction that also records where each visited
/// node ended up in the rebuilt trees.
pub struct ReconstructionTrace {
    pub expressions: Vec<Expression>,
    /// Tree path (top-level index, then argument indices) to the persistent key of
    /// the operation node that produced it.
    pub keys: AHashMap<Vec<usize>, Uuid>,
    /// Ids of every node reached from a root, constants included.
    pub visited: AHashSet<String>,
}

/// Rebuilds the expression rooted at `root_id`.
///
/// Nodes not reachable from `root_id` are ignored.
///
/// # Errors
///
/// * `NodeNotFound` if the root or an edge target is missing.
/// * `ConstantRoot` if `root_id` is a constant node.
/// * `UnnamedOperation` for an operation node without a name.
/// * `MissingRequiredSlot` for a mandatory argument with neither edge nor value.
/// * `CyclicGraph` if a node is reached again while its own subtree is being built.
pub fn reconstruct(state: &GraphState, root_id: &str) -> Result<Expression, ReconstructionError> {
    let mut walker = Walker::new(state);
    let expr = walker.root(root_id, &[])?;
    debug!(root = %root_id, nodes = walker.visited.len(), "expression reconstructed");
    Ok(expr)
}

/// Rebuilds every top-level expression listed in `state.roots`, in order.
pub fn reconstruct_document(state: &GraphState) -> Result<Vec<Expression>, ReconstructionError> {
    reconstruct_document_traced(state).map(|trace| trace.expressions)
}

/// Like [`reconstruct_document`], also reporting which nodes produced which tree
/// positions.
pub fn reconstruct_document_traced(
    state: &GraphState,
) -> Result<ReconstructionTrace, ReconstructionError> {
    let mut walker = Walker::new(state);
    let expressions = state
        .roots
        .iter()
        .enumerate()
        .map(|(index, root_id)| walker.root(root_id, &[index]))
        .collect::<Result<Vec<_>, _>>()?;

    debug!(
        expressions = expressions.len(),
        nodes = walker.visited.len(),
        "document reconstructed"
    );
    Ok(ReconstructionTrace {
        expressions,
        keys: walker.keys,
        visited: walker.visited.into_iter().map(str::to_string).collect(),
    })
}

struct Walker<'a> {
    index: GraphIndex<'a>,
    /// Operation nodes whose subtree is under construction.
    visiting: AHashSet<&'a str>,
    stack: Vec<&'a str>,
    tree_path: Vec<usize>,
    keys: AHashMap<Vec<usize>, Uuid>,
    visited: AHashSet<&'a str>,
}

impl<'a> Walker<'a> {
    fn new(state: &'a GraphState) -> Self {
        Self {
            index: GraphIndex::new(state),
            visiting: AHashSet::new(),
            stack: Vec::new(),
            tree_path: Vec::new(),
            keys: AHashMap::new(),
            visited: AHashSet::new(),
        }
    }

    fn root(&mut self, root_id: &str, tree_path: &[usize]) -> Result<Expression, ReconstructionError> {
        let node = self
            .index
            .node(root_id)
            .ok_or_else(|| ReconstructionError::NodeNotFound {
                missing_node_id: root_id.to_string(),
                referenced_from: "<root>".to_string(),
            })?;
        if matches!(node.content, NodeContent::Constant(_)) {
            return Err(ReconstructionError::ConstantRoot(root_id.to_string()));
        }

        self.tree_path = tree_path.to_vec();
        match self.visit(node)? {
            ExpressionArg::ExpressionRef(expr) => Ok(expr),
            _ => Err(ReconstructionError::ConstantRoot(root_id.to_string())),
        }
    }

    fn visit(&mut self, node: &'a GraphNode) -> Result<ExpressionArg, ReconstructionError> {
        let node_id = node.id.as_str();
        self.visited.insert(node_id);

        let (name, inline) = match &node.content {
            NodeContent::Constant(value) => return Ok(value.clone().into()),
            NodeContent::Operation { name, inline } => (name, inline),
        };

        if !self.visiting.insert(node_id) {
            let mut path: Vec<String> = self.stack.iter().map(|id| id.to_string()).collect();
            path.push(node_id.to_string());
            return Err(ReconstructionError::CyclicGraph {
                node_id: node_id.to_string(),
                path,
            });
        }
        if name.is_empty() {
            return Err(ReconstructionError::UnnamedOperation(node_id.to_string()));
        }
        self.stack.push(node_id);
        self.keys.insert(self.tree_path.clone(), node.key);
        trace!(node = %node_id, name = %name, "rebuilding node");

        let arg_count = node
            .slots
            .iter()
            .map(|slot| slot.index + 1)
            .max()
            .unwrap_or(0)
            .max(inline.len());

        let mut args: Vec<Option<ExpressionArg>> = Vec::with_capacity(arg_count);
        for position in 0..arg_count {
            if let Some(edge) = self.index.edge_from(node_id, position) {
                let target = self.index.node(&edge.target).ok_or_else(|| {
                    ReconstructionError::NodeNotFound {
                        missing_node_id: edge.target.clone(),
                        referenced_from: node_id.to_string(),
                    }
                })?;
                self.tree_path.push(position);
                let arg = self.visit(target);
                self.tree_path.pop();
                args.push(Some(arg?));
            } else if let Some(Some(value)) = inline.get(position) {
                args.push(Some(value.clone().into()));
            } else if node.slot(position).is_some_and(|slot| slot.required) {
                return Err(missing_slot(node, position));
            } else {
                args.push(None);
            }
        }

        // Optional trailing arguments may be left out, but positions cannot shift.
        while matches!(args.last(), Some(None)) {
            args.pop();
        }
        if let Some(gap) = args.iter().position(Option::is_none) {
            return Err(missing_slot(node, gap));
        }

        self.stack.pop();
        self.visiting.remove(node_id);
        Ok(ExpressionArg::ExpressionRef(Expression {
            name: name.clone(),
            args: args.into_iter().flatten().collect(),
        }))
    }
}

fn missing_slot(node: &GraphNode, position: usize) -> ReconstructionError {
    ReconstructionError::MissingRequiredSlot {
        node_id: node.id.clone(),
        slot: position,
        label: node.slot_label(position),
    }
}
