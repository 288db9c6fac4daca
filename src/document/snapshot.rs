use crate::error::SnapshotError;
use crate::graph::GraphState;
use bincode::config::standard;
use bincode::serde::{decode_from_slice, encode_to_vec};

impl GraphState {
    /// Encodes the graph, positions and persistent keys included, as a compact
    /// binary snapshot (drafts, clipboard contents).
    pub fn to_bytes(&self) -> Result<Vec<u8>, SnapshotError> {
        encode_to_vec(self, standard()).map_err(|e| SnapshotError::Encode(e.to_string()))
    }

    /// Decodes a snapshot produced by [`GraphState::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SnapshotError> {
        decode_from_slice(bytes, standard())
            .map(|(state, _)| state) // bincode 2 returns (value, bytes_read)
            .map_err(|e| SnapshotError::Decode(e.to_string()))
    }
}
