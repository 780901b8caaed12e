//! Retrieval results.

use serde::{Deserialize, Serialize};

use crate::model::{Chunk, Edge, MatchedPath, Node, Subgraph};

/// Which retrieval method actually produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RetrievalStrategy {
    /// Graph structure shaped the chunk selection.
    Hybrid,
    /// Plain similarity search.
    VectorOnly,
    /// Direct neighbourhood expansion from given seeds.
    Expansion,
}

impl std::fmt::Display for RetrievalStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RetrievalStrategy::Hybrid => "HYBRID",
            RetrievalStrategy::VectorOnly => "VECTOR_ONLY",
            RetrievalStrategy::Expansion => "EXPANSION",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalResult {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub chunks: Vec<Chunk>,
    /// Matched paths, populated by pattern-based retrieval.
    #[serde(default)]
    pub paths: Vec<MatchedPath>,
    pub strategy: RetrievalStrategy,
    pub retrieval_time_ms: u64,
}

impl RetrievalResult {
    pub fn new(strategy: RetrievalStrategy) -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            chunks: Vec::new(),
            paths: Vec::new(),
            strategy,
            retrieval_time_ms: 0,
        }
    }

    pub fn vector_only(chunks: Vec<Chunk>) -> Self {
        Self { chunks, ..Self::new(RetrievalStrategy::VectorOnly) }
    }

    pub fn from_subgraph(subgraph: Subgraph, strategy: RetrievalStrategy) -> Self {
        Self {
            nodes: subgraph.nodes,
            edges: subgraph.edges,
            ..Self::new(strategy)
        }
    }

    pub fn with_chunks(mut self, chunks: Vec<Chunk>) -> Self {
        self.chunks = chunks;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty() && self.chunks.is_empty()
    }

    pub fn total_results(&self) -> usize {
        self.nodes.len() + self.edges.len() + self.chunks.len()
    }

    /// Fewer than `threshold` items in total.
    pub fn is_thin(&self, threshold: usize) -> bool {
        self.total_results() < threshold
    }
}
