use itertools::Itertools;
use thiserror::Error;

fn format_path(path: &[usize]) -> String {
    if path.is_empty() {
        "<document>".to_string()
    } else {
        path.iter().join(".")
    }
}

/// Errors raised while accepting an expression document from untrusted input.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DocumentError {
    #[error("Invalid expression document: {0}")]
    InvalidDocument(String),

    #[error("Invalid expression at {}: {reason}", format_path(.path))]
    InvalidExpression { path: Vec<usize>, reason: String },

    #[error("Failed to parse document JSON: {0}")]
    Json(String),
}

/// Errors raised when parsing a path-derived node id.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IdError {
    #[error("Node id '{0}' is not rooted at the document root")]
    NotRooted(String),

    #[error("Node id '{id}' has a non-numeric segment '{segment}'")]
    InvalidSegment { id: String, segment: String },
}

/// Rejected graph edits. A rejected edit never changes the graph.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditError {
    #[error("Node '{0}' does not exist in the graph")]
    NodeNotFound(String),

    #[error("A node with id '{0}' already exists")]
    DuplicateNodeId(String),

    #[error("Node '{node_id}' has no slot {slot}")]
    UnknownSlot { node_id: String, slot: usize },

    #[error("Slot {slot} of node '{node_id}' is already connected by edge '{edge_id}'")]
    SlotOccupied {
        node_id: String,
        slot: usize,
        edge_id: String,
    },

    #[error("Node '{target_id}' is already connected to slot {slot} of node '{source_id}'")]
    TargetAlreadyConnected {
        target_id: String,
        source_id: String,
        slot: usize,
    },

    #[error("Node '{0}' is not an operation node")]
    NotAnOperation(String),

    #[error("Value {index} of node '{node_id}' is not a finite number")]
    NonFiniteNumber { node_id: String, index: usize },
}

/// Errors raised while rebuilding an expression tree from a graph.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReconstructionError {
    #[error("Node '{missing_node_id}' not found, referenced from '{referenced_from}'")]
    NodeNotFound {
        missing_node_id: String,
        referenced_from: String,
    },

    #[error("Node '{0}' is a constant and cannot be the root of an expression")]
    ConstantRoot(String),

    #[error("Node '{0}' has no operation name")]
    UnnamedOperation(String),

    #[error("Slot {slot} ('{label}') of node '{node_id}' has neither a connection nor a value")]
    MissingRequiredSlot {
        node_id: String,
        slot: usize,
        label: String,
    },

    #[error("Cycle detected at node '{node_id}' (path: {})", .path.join(" -> "))]
    CyclicGraph { node_id: String, path: Vec<String> },
}

/// Errors raised while encoding or decoding graph snapshots.
#[derive(Error, Debug, Clone)]
pub enum SnapshotError {
    #[error("Snapshot encoding failed: {0}")]
    Encode(String),

    #[error("Snapshot decoding failed: {0}")]
    Decode(String),
}

/// Errors surfaced by an editor session.
#[derive(Error, Debug, Clone)]
pub enum EditorError {
    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Edit(#[from] EditError),

    #[error(transparent)]
    Reconstruction(#[from] ReconstructionError),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error("Nothing to undo")]
    NothingToUndo,
}
