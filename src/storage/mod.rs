//! # Store Contracts
//!
//! These are THE read contracts between the retrieval engine and whatever
//! holds the knowledge graph and the embedded chunks. The engine never
//! writes through them.
//!
//! ## Implementations
//!
//! | Store | Module | Description |
//! |-------|--------|-------------|
//! | `MemoryGraphStore` | `memory` | In-memory arena for testing/embedding |
//! | `MemoryChunkStore` | `memory` | Brute-force cosine search over a Vec |
//!
//! Persistent backends implement the same traits out of tree and are handed
//! to the engine as `Arc<dyn GraphStore>` / `Arc<dyn ChunkStore>`.

pub mod memory;

use async_trait::async_trait;

use crate::model::*;
use crate::Result;

pub use memory::{MemoryChunkStore, MemoryGraphStore};

// ============================================================================
// GraphStore
// ============================================================================

/// Read access to the typed knowledge graph.
///
/// A missing node is `Ok(None)`, never an error. Errors are reserved for
/// the store itself failing.
#[async_trait]
pub trait GraphStore: Send + Sync + 'static {
    /// Get a node by id.
    async fn get_node(&self, id: NodeId) -> Result<Option<Node>>;

    /// Opposite endpoints of every edge incident to `id`, direction-agnostic.
    async fn get_neighbors(&self, id: NodeId) -> Result<Vec<Node>>;

    /// Every edge where `id` is source or target, in store order.
    async fn edges_for_node(&self, id: NodeId) -> Result<Vec<Edge>>;

    /// Nodes within `depth` undirected hops of the seeds, plus every edge
    /// whose endpoints are both in that set. Depth 0 is the seeds alone.
    async fn extract_subgraph(&self, seeds: &[NodeId], depth: usize) -> Result<Subgraph>;

    async fn find_nodes_by_label(&self, label: &str) -> Result<Vec<Node>>;

    async fn find_edges_by_relation_type(&self, relation_type: &str) -> Result<Vec<Edge>>;

    /// Number of incident edges.
    ///
    /// Default: counts `edges_for_node`.
    async fn degree(&self, id: NodeId) -> Result<usize> {
        Ok(self.edges_for_node(id).await?.len())
    }
}

// ============================================================================
// ChunkStore
// ============================================================================

/// Read access to embedded text chunks.
#[async_trait]
pub trait ChunkStore: Send + Sync + 'static {
    /// The `k` chunks most similar to `embedding`, best first.
    async fn find_top_k_similar(&self, embedding: &[f32], k: usize) -> Result<Vec<Chunk>>;

    /// Every chunk linked to `node_id`.
    async fn find_by_linked_node_id(&self, node_id: NodeId) -> Result<Vec<Chunk>>;
}
