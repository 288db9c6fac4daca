use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Presentation category of a graph node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    ConstantNumber,
    ConstantString,
    DynamicValue,
    Comparison,
    Logical,
    Action,
    FlowControl,
    Other,
}

impl NodeKind {
    pub fn is_constant(self) -> bool {
        matches!(self, NodeKind::ConstantNumber | NodeKind::ConstantString)
    }
}

/// How many argument positions an operation exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Arity {
    Fixed(usize),
    Variadic { min: usize },
}

/// Describes one operation: its category, slot labels and mandatory positions.
///
/// Positions `0..required_slots` are mandatory; any later position is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationSchema {
    pub name: String,
    pub kind: NodeKind,
    pub slot_labels: Vec<String>,
    pub arity: Arity,
    pub required_slots: usize,
}

impl OperationSchema {
    pub fn new(
        name: &str,
        kind: NodeKind,
        arity: Arity,
        required_slots: usize,
        slot_labels: &[&str],
    ) -> Self {
        Self {
            name: name.to_string(),
            kind,
            slot_labels: slot_labels.iter().map(|l| l.to_string()).collect(),
            arity,
            required_slots,
        }
    }

    /// Label of an argument position; unlabeled positions fall back to `arg N`.
    pub fn slot_label(&self, index: usize) -> String {
        self.slot_labels
            .get(index)
            .cloned()
            .unwrap_or_else(|| default_slot_label(index))
    }

    pub fn is_required(&self, index: usize) -> bool {
        index < self.required_slots
    }

    /// Slot positions for an instance of this operation holding `arg_count` arguments.
    pub fn slot_positions(&self, arg_count: usize) -> Range<usize> {
        match self.arity {
            Arity::Fixed(n) => 0..n.max(arg_count),
            Arity::Variadic { min } => 0..min.max(arg_count),
        }
    }
}

pub fn default_slot_label(index: usize) -> String {
    format!("arg {}", index)
}

/// Lookup table of known operations.
///
/// Operation categories are data: adding an operation means registering a schema,
/// never branching on its name.
#[derive(Debug, Clone, Default)]
pub struct OperationRegistry {
    schemas: AHashMap<String, OperationSchema>,
    defaults: AHashMap<NodeKind, String>,
}

impl OperationRegistry {
    /// An empty registry. Every operation resolves to [`NodeKind::Other`].
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry preloaded with the study and survey engine operations.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        register_default_operations(&mut registry);
        registry
    }

    pub fn register(&mut self, schema: OperationSchema) -> &mut Self {
        self.schemas.insert(schema.name.clone(), schema);
        self
    }

    /// Makes `user_name` resolve to the schema registered as `registered_name`.
    pub fn with_alias(mut self, user_name: &str, registered_name: &str) -> Self {
        if let Some(schema) = self.schemas.get(registered_name).cloned() {
            self.schemas.insert(
                user_name.to_string(),
                OperationSchema {
                    name: user_name.to_string(),
                    ..schema
                },
            );
        }
        self
    }

    /// Sets the operation used when the editor creates a fresh node of `kind`.
    pub fn set_default_for_kind(&mut self, kind: NodeKind, name: &str) -> &mut Self {
        self.defaults.insert(kind, name.to_string());
        self
    }

    pub fn get(&self, name: &str) -> Option<&OperationSchema> {
        self.schemas.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    pub fn kind_of(&self, name: &str) -> NodeKind {
        self.get(name).map_or(NodeKind::Other, |s| s.kind)
    }

    pub fn default_for_kind(&self, kind: NodeKind) -> Option<&OperationSchema> {
        self.defaults.get(&kind).and_then(|name| self.get(name))
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

/// Master macro defining the built-in operation table and the per-kind defaults.
macro_rules! define_operations {
    ( $( ($name:expr, $kind:ident, $arity:expr, $required:expr, [$($label:expr),* $(,)?]) ),* $(,)? ; $( $default_kind:ident => $default_name:expr ),* $(,)? ) => {
        fn register_default_operations(registry: &mut OperationRegistry) {
            $( registry.register(OperationSchema::new($name, NodeKind::$kind, $arity, $required, &[$($label),*])); )*
            $( registry.set_default_for_kind(NodeKind::$default_kind, $default_name); )*
        }
    };
}

define_operations! {
    // Flow control
    ("IF", FlowControl, Arity::Fixed(3), 2, ["condition", "true-branch", "false-branch"]),
    ("IFTHEN", FlowControl, Arity::Variadic { min: 2 }, 1, ["condition", "action"]),
    ("DO", FlowControl, Arity::Variadic { min: 1 }, 1, ["action"]),

    // Logical
    ("and", Logical, Arity::Variadic { min: 2 }, 2, []),
    ("or", Logical, Arity::Variadic { min: 2 }, 2, []),
    ("not", Logical, Arity::Fixed(1), 1, ["operand"]),

    // Comparison and checks
    ("eq", Comparison, Arity::Fixed(2), 2, ["left", "right"]),
    ("lt", Comparison, Arity::Fixed(2), 2, ["left", "right"]),
    ("lte", Comparison, Arity::Fixed(2), 2, ["left", "right"]),
    ("gt", Comparison, Arity::Fixed(2), 2, ["left", "right"]),
    ("gte", Comparison, Arity::Fixed(2), 2, ["left", "right"]),
    ("isDefined", Comparison, Arity::Fixed(1), 1, ["value"]),
    ("checkEventType", Comparison, Arity::Fixed(1), 1, ["event type"]),
    ("checkSurveyResponseKey", Comparison, Arity::Fixed(1), 1, ["survey key"]),
    ("hasStudyStatus", Comparison, Arity::Fixed(1), 1, ["status"]),
    ("responseHasKeysAny", Comparison, Arity::Variadic { min: 3 }, 3, ["item key", "response path", "key"]),

    // Dynamic values
    ("getAttribute", DynamicValue, Arity::Fixed(2), 2, ["object", "attribute"]),
    ("timestampWithOffset", DynamicValue, Arity::Variadic { min: 1 }, 1, ["offset", "reference"]),
    ("getResponseValueAsNum", DynamicValue, Arity::Fixed(2), 2, ["item key", "response path"]),
    ("getStudyEntryTime", DynamicValue, Arity::Fixed(0), 0, []),
    ("getContext", DynamicValue, Arity::Fixed(0), 0, []),
    ("getResponses", DynamicValue, Arity::Fixed(0), 0, []),

    // Participant actions
    ("ADD_NEW_SURVEY", Action, Arity::Fixed(4), 4, ["survey key", "activate from", "activate until", "category"]),
    ("REMOVE_ALL_SURVEYS", Action, Arity::Fixed(0), 0, []),
    ("REMOVE_SURVEYS_BY_KEY", Action, Arity::Fixed(2), 2, ["survey key", "category"]),
    ("UPDATE_STUDY_STATUS", Action, Arity::Fixed(1), 1, ["status"]),
    ("UPDATE_FLAG", Action, Arity::Fixed(2), 2, ["key", "value"]),
    ("REMOVE_FLAG", Action, Arity::Fixed(1), 1, ["key"]),
    ("ADD_REPORT", Action, Arity::Fixed(1), 1, ["report key"]),
    ;
    FlowControl => "IF",
    Logical => "and",
    Comparison => "eq",
    DynamicValue => "getAttribute",
    Action => "UPDATE_FLAG",
}
