use super::id::{ROOT_ID, edge_id};
use crate::ast::{Expression, Literal};
use crate::config::LayoutConfig;
use crate::registry::{NodeKind, OperationRegistry, default_slot_label};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Top-left anchor of a node box.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

/// An argument position of a node that accepts a nested expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    /// Argument position fed by this slot.
    pub index: usize,
    pub label: String,
    pub required: bool,
}

/// What a node stands for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeContent {
    /// An operation. `inline` holds one entry per argument position: the literal
    /// written directly on the node, or `None` when the position is fed by an edge
    /// or left empty.
    Operation {
        name: String,
        inline: Vec<Option<Literal>>,
    },
    /// A standalone constant that can be plugged into a slot.
    Constant(Literal),
}

/// The editable projection of one expression or constant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    /// Persistent identity, stable across relayouts unlike `id`.
    pub key: Uuid,
    pub kind: NodeKind,
    pub position: Position,
    pub size: Size,
    pub slots: Vec<Slot>,
    pub content: NodeContent,
}

impl GraphNode {
    /// Projects `expr` onto a single node. Children are not included.
    ///
    /// Registered operations expose every position their schema declares;
    /// unregistered ones only expose the positions currently holding a nested
    /// expression. A slot is required only if the schema says so and the
    /// expression actually supplies that argument.
    pub fn from_expression(
        id: String,
        expr: &Expression,
        position: Position,
        registry: &OperationRegistry,
        config: &LayoutConfig,
    ) -> Self {
        let slots: Vec<Slot> = match registry.get(&expr.name) {
            Some(schema) => schema
                .slot_positions(expr.args.len())
                .map(|index| Slot {
                    index,
                    label: schema.slot_label(index),
                    // positions the document never supplied stay optional
                    required: schema.is_required(index) && index < expr.args.len(),
                })
                .collect(),
            None => expr
                .nested()
                .map(|(index, _)| Slot {
                    index,
                    label: default_slot_label(index),
                    required: true,
                })
                .collect(),
        };

        Self {
            id,
            key: Uuid::new_v4(),
            kind: registry.kind_of(&expr.name),
            position,
            size: config.node_size(slots.len()),
            slots,
            content: NodeContent::Operation {
                name: expr.name.clone(),
                inline: expr.args.iter().map(|arg| arg.as_literal()).collect(),
            },
        }
    }

    /// A fresh, unconnected operation node as created from the editor palette.
    pub fn operation(
        id: Option<String>,
        name: &str,
        position: Position,
        registry: &OperationRegistry,
        config: &LayoutConfig,
    ) -> Self {
        let mut node = Self::from_expression(
            id.unwrap_or_else(fresh_id),
            &Expression::leaf(name),
            position,
            registry,
            config,
        );
        if let Some(schema) = registry.get(name) {
            for slot in &mut node.slots {
                slot.required = schema.is_required(slot.index);
            }
        }
        if let NodeContent::Operation { inline, .. } = &mut node.content {
            inline.resize(node.slots.len(), None);
        }
        node
    }

    /// A fresh constant node.
    pub fn constant(
        id: Option<String>,
        value: Literal,
        position: Position,
        config: &LayoutConfig,
    ) -> Self {
        Self {
            id: id.unwrap_or_else(fresh_id),
            key: Uuid::new_v4(),
            kind: constant_kind(&value),
            position,
            size: config.node_size(0),
            slots: Vec::new(),
            content: NodeContent::Constant(value),
        }
    }

    /// A fresh node of `kind`, using the registry's default operation for that kind.
    ///
    /// Constants start at `0` or `""`. `Other` has no default operation and yields an
    /// unnamed node that must be given a name before it can be saved.
    pub fn for_kind(
        kind: NodeKind,
        id: Option<String>,
        position: Position,
        registry: &OperationRegistry,
        config: &LayoutConfig,
    ) -> Self {
        match kind {
            NodeKind::ConstantNumber => Self::constant(id, Literal::Number(0.0), position, config),
            NodeKind::ConstantString => {
                Self::constant(id, Literal::String(String::new()), position, config)
            }
            _ => {
                let name = registry
                    .default_for_kind(kind)
                    .map_or("", |schema| schema.name.as_str());
                let mut node = Self::operation(id, name, position, registry, config);
                node.kind = kind;
                node
            }
        }
    }

    /// Placeholder shown for a document without expressions.
    pub fn empty_root(position: Position, config: &LayoutConfig) -> Self {
        Self {
            id: ROOT_ID.to_string(),
            key: Uuid::new_v4(),
            kind: NodeKind::Other,
            position,
            size: config.node_size(0),
            slots: Vec::new(),
            content: NodeContent::Operation {
                name: String::new(),
                inline: Vec::new(),
            },
        }
    }

    /// Operation name, `None` for constants.
    pub fn name(&self) -> Option<&str> {
        match &self.content {
            NodeContent::Operation { name, .. } => Some(name),
            NodeContent::Constant(_) => None,
        }
    }

    pub fn slot(&self, index: usize) -> Option<&Slot> {
        self.slots.iter().find(|slot| slot.index == index)
    }

    pub fn slot_label(&self, index: usize) -> String {
        self.slot(index)
            .map_or_else(|| default_slot_label(index), |slot| slot.label.clone())
    }

    /// Lower edge of the node box.
    pub fn bottom(&self) -> f64 {
        self.position.y + self.size.height
    }
}

pub(crate) fn constant_kind(value: &Literal) -> NodeKind {
    match value {
        Literal::Number(_) => NodeKind::ConstantNumber,
        Literal::String(_) => NodeKind::ConstantString,
    }
}

pub(crate) fn fresh_id() -> String {
    Uuid::new_v4().to_string()
}

/// A directed connection from a slot of `source` to the subtree rooted at `target`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GraphEdge {
    pub id: String,
    pub source: String,
    pub source_slot: usize,
    pub target: String,
}

impl GraphEdge {
    pub fn new(source: &str, source_slot: usize, target: &str) -> Self {
        Self {
            id: edge_id(source, source_slot),
            source: source.to_string(),
            source_slot,
            target: target.to_string(),
        }
    }
}

/// A complete graph view of a document.
///
/// `roots` lists the top-level expressions in document order. A root only has an
/// incoming edge when that edge closes a cycle through it, which makes the
/// document fail to reconstruct.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GraphState {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub roots: Vec<String>,
}

impl GraphState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub(crate) fn node_mut(&mut self, id: &str) -> Option<&mut GraphNode> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    pub fn edge(&self, id: &str) -> Option<&GraphEdge> {
        self.edges.iter().find(|e| e.id == id)
    }

    /// The edge leaving `source` through `slot`, if that slot is populated.
    pub fn edge_from(&self, source: &str, slot: usize) -> Option<&GraphEdge> {
        self.edges
            .iter()
            .find(|e| e.source == source && e.source_slot == slot)
    }

    /// The edge plugging `target` into some slot, if any.
    pub fn incoming(&self, target: &str) -> Option<&GraphEdge> {
        self.edges.iter().find(|e| e.target == target)
    }

    pub fn outgoing<'a>(&'a self, source: &'a str) -> impl Iterator<Item = &'a GraphEdge> + 'a {
        self.edges.iter().filter(move |e| e.source == source)
    }

    pub fn is_root(&self, id: &str) -> bool {
        self.roots.iter().any(|r| r == id)
    }
}

/// Hash lookups over a [`GraphState`] for linear-time walks.
pub struct GraphIndex<'a> {
    nodes: AHashMap<&'a str, &'a GraphNode>,
    slots: AHashMap<&'a str, AHashMap<usize, &'a GraphEdge>>,
}

impl<'a> GraphIndex<'a> {
    pub fn new(state: &'a GraphState) -> Self {
        let nodes = state.nodes.iter().map(|n| (n.id.as_str(), n)).collect();
        let mut slots: AHashMap<&'a str, AHashMap<usize, &'a GraphEdge>> = AHashMap::new();
        for edge in &state.edges {
            slots
                .entry(edge.source.as_str())
                .or_default()
                .insert(edge.source_slot, edge);
        }
        Self { nodes, slots }
    }

    pub fn node(&self, id: &str) -> Option<&'a GraphNode> {
        self.nodes.get(id).copied()
    }

    pub fn edge_from(&self, source: &str, slot: usize) -> Option<&'a GraphEdge> {
        self.slots
            .get(source)
            .and_then(|by_slot| by_slot.get(&slot))
            .copied()
    }
}
