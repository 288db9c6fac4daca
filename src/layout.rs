use crate::ast::{Expression, ExpressionArg};
use crate::config::LayoutConfig;
use crate::graph::{GraphEdge, GraphNode, GraphState, Position, ROOT_ID, node_id};
use crate::registry::OperationRegistry;
use tracing::{debug, trace};

/// Nodes and edges produced for one subtree, root node first.
struct Subtree {
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
}

impl Subtree {
    fn bottom(&self) -> f64 {
        self.nodes
            .iter()
            .map(GraphNode::bottom)
            .fold(f64::NEG_INFINITY, f64::max)
    }
}

/// Converts expression trees into positioned graphs.
///
/// The walk is depth-first and left-to-right. Each node sits at its anchor;
/// children form a column to the right of their parent, stacked top to bottom so
/// that no two subtree bounding boxes overlap. A parent is aligned with its first
/// child rather than centered across all children.
pub struct LayoutEngine<'a> {
    registry: &'a OperationRegistry,
    config: LayoutConfig,
}

impl<'a> LayoutEngine<'a> {
    pub fn new(registry: &'a OperationRegistry, config: LayoutConfig) -> Self {
        Self { registry, config }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Lays out a single expression as the first top-level entry, `root.0`.
    pub fn layout(&self, root: &Expression) -> GraphState {
        let origin = self.config.origin;
        let subtree = self.layout_expression(root, node_id(ROOT_ID, 0), origin.x, origin.y);
        debug!(
            nodes = subtree.nodes.len(),
            edges = subtree.edges.len(),
            "expression laid out"
        );
        GraphState {
            roots: vec![node_id(ROOT_ID, 0)],
            nodes: subtree.nodes,
            edges: subtree.edges,
        }
    }

    /// Lays out every top-level expression of a document, stacked vertically.
    ///
    /// An empty document yields a single placeholder `root` node and no roots.
    pub fn layout_document(&self, expressions: &[Expression]) -> GraphState {
        let origin = self.config.origin;
        if expressions.is_empty() {
            return GraphState {
                nodes: vec![GraphNode::empty_root(origin, &self.config)],
                edges: Vec::new(),
                roots: Vec::new(),
            };
        }

        let mut state = GraphState::new();
        let mut running_y = origin.y;
        for (index, expr) in expressions.iter().enumerate() {
            let subtree = self.layout_expression(expr, node_id(ROOT_ID, index), origin.x, running_y);
            running_y = subtree.bottom() + self.config.vertical_padding;
            state.roots.push(node_id(ROOT_ID, index));
            state.nodes.extend(subtree.nodes);
            state.edges.extend(subtree.edges);
        }

        debug!(
            expressions = expressions.len(),
            nodes = state.nodes.len(),
            edges = state.edges.len(),
            "document laid out"
        );
        state
    }

    /// Lays out one argument anchored as child `child_index` of `parent_id`.
    ///
    /// A literal argument becomes a single constant node.
    pub fn layout_argument(
        &self,
        arg: &ExpressionArg,
        parent_id: &str,
        child_index: usize,
        anchor: Position,
    ) -> GraphState {
        let id = node_id(parent_id, child_index);
        let subtree = match arg {
            ExpressionArg::ExpressionRef(expr) => {
                self.layout_expression(expr, id, anchor.x, anchor.y)
            }
            literal => Subtree {
                nodes: literal
                    .as_literal()
                    .map(|value| GraphNode::constant(Some(id), value, anchor, &self.config))
                    .into_iter()
                    .collect(),
                edges: Vec::new(),
            },
        };
        GraphState {
            nodes: subtree.nodes,
            edges: subtree.edges,
            roots: Vec::new(),
        }
    }

    fn layout_expression(&self, expr: &Expression, id: String, x: f64, y: f64) -> Subtree {
        let mut node =
            GraphNode::from_expression(id, expr, Position::new(x, y), self.registry, &self.config);
        trace!(node = %node.id, name = %expr.name, slots = node.slots.len(), "node placed");

        if expr.is_leaf() {
            return Subtree {
                nodes: vec![node],
                edges: Vec::new(),
            };
        }

        let child_x = x + node.size.width + self.config.horizontal_padding;
        let mut running_y = y;
        let mut first_child_y = None;
        let mut descendants = Vec::new();
        let mut edges = Vec::new();

        for (index, child) in expr.nested() {
            let subtree = self.layout_expression(child, node_id(&node.id, index), child_x, running_y);
            let Some(child_root) = subtree.nodes.first() else {
                continue;
            };
            first_child_y.get_or_insert(child_root.position.y);
            let edge = GraphEdge::new(&node.id, index, &child_root.id);

            running_y = subtree.bottom() + self.config.vertical_padding;
            descendants.extend(subtree.nodes);
            edges.extend(subtree.edges);
            edges.push(edge);
        }

        if let Some(first_y) = first_child_y {
            node.position.y = first_y;
        }

        let mut nodes = Vec::with_capacity(descendants.len() + 1);
        nodes.push(node);
        nodes.extend(descendants);
        Subtree { nodes, edges }
    }
}

/// Lays out `root` with the default geometry.
pub fn layout(root: &Expression, registry: &OperationRegistry) -> GraphState {
    LayoutEngine::new(registry, LayoutConfig::default()).layout(root)
}
