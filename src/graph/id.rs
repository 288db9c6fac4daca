//! Path-derived node identifiers.
//!
//! A laid-out node's id is the root token followed by the argument indices taken
//! to reach it, e.g. `root.0.2`. Ids are transient: any structural edit that moves
//! a subtree changes the ids beneath it.

use crate::error::IdError;

pub const ROOT_ID: &str = "root";
const SEPARATOR: char = '.';

/// Id of the `child_index`-th child of `parent_id`.
pub fn node_id(parent_id: &str, child_index: usize) -> String {
    format!("{}{}{}", parent_id, SEPARATOR, child_index)
}

/// Id of the node reached by following `path` from the root.
pub fn node_id_for_path(path: &[usize]) -> String {
    path.iter()
        .fold(ROOT_ID.to_string(), |id, index| node_id(&id, *index))
}

/// Recovers the index path encoded in a node id, without the root token.
pub fn parse_node_id(id: &str) -> Result<Vec<usize>, IdError> {
    let mut segments = id.split(SEPARATOR);
    if segments.next() != Some(ROOT_ID) {
        return Err(IdError::NotRooted(id.to_string()));
    }
    segments
        .map(|segment| {
            let invalid = || IdError::InvalidSegment {
                id: id.to_string(),
                segment: segment.to_string(),
            };
            // `node_id` never emits signs or leading zeros; "01" would alias "1"
            if !segment.bytes().all(|b| b.is_ascii_digit())
                || (segment.len() > 1 && segment.starts_with('0'))
            {
                return Err(invalid());
            }
            segment.parse::<usize>().map_err(|_| invalid())
        })
        .collect()
}

/// Id of the edge leaving `source_id` through `slot`.
pub fn edge_id(source_id: &str, slot: usize) -> String {
    format!("{}-{}", source_id, slot)
}
