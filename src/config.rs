use crate::graph::{Position, Size};
use serde::{Deserialize, Serialize};

/// Geometry used by the layout engine.
///
/// Every field has a default, so a partial JSON object such as
/// `{ "node_width": 300 }` is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Fixed width of every node box.
    pub node_width: f64,
    /// Height of the title area of a node.
    pub header_height: f64,
    /// Height of one slot row.
    pub slot_row_height: f64,
    /// Extra height between the header and the first slot row, only when slots exist.
    pub divider_height: f64,
    /// Horizontal gap between a parent column and its children.
    pub horizontal_padding: f64,
    /// Vertical gap between sibling subtrees.
    pub vertical_padding: f64,
    /// Anchor of the first top-level node.
    pub origin: Position,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_width: 250.0,
            header_height: 40.0,
            slot_row_height: 28.0,
            divider_height: 8.0,
            horizontal_padding: 80.0,
            vertical_padding: 40.0,
            origin: Position::default(),
        }
    }
}

impl LayoutConfig {
    /// Box size of a node exposing `slot_count` slots.
    pub fn node_size(&self, slot_count: usize) -> Size {
        let divider = if slot_count > 0 {
            self.divider_height
        } else {
            0.0
        };
        Size {
            width: self.node_width,
            height: self.header_height + slot_count as f64 * self.slot_row_height + divider,
        }
    }

    /// Loads a configuration from JSON text; missing fields keep their defaults.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}
