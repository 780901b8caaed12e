//! Chunk: a unit of embedded text, optionally linked to a node.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{NodeId, PropertyMap};

/// Opaque chunk identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChunkId(pub Uuid);

impl ChunkId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ChunkId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ChunkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: ChunkId,
    pub content: String,
    pub embedding: Vec<f32>,
    #[serde(default)]
    pub linked_node_id: Option<NodeId>,
    #[serde(default)]
    pub metadata: PropertyMap,
}

impl Chunk {
    pub fn new(content: impl Into<String>, embedding: Vec<f32>) -> Self {
        Self {
            id: ChunkId::new(),
            content: content.into(),
            embedding,
            linked_node_id: None,
            metadata: PropertyMap::new(),
        }
    }

    pub fn linked_to(mut self, node: NodeId) -> Self {
        self.linked_node_id = Some(node);
        self
    }

    /// Cosine similarity between this chunk's embedding and `query`.
    pub fn similarity(&self, query: &[f32]) -> f32 {
        cosine_similarity(&self.embedding, query)
    }
}

/// Cosine similarity; 0.0 for mismatched dimensions or zero vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let (mut dot, mut na, mut nb) = (0.0f32, 0.0f32, 0.0f32);
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        na += x * x;
        nb += y * y;
    }
    if na == 0.0 || nb == 0.0 {
        return 0.0;
    }
    dot / (na.sqrt() * nb.sqrt())
}
