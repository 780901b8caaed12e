//! # graphfuse: Hybrid Graph + Vector Context Retrieval
//!
//! Assembles prompt context for language models by fusing traversal over a
//! typed knowledge graph with embedding similarity search over text chunks.
//!
//! ## Design Principles
//!
//! 1. **Trait-first**: `GraphStore`, `ChunkStore` and `Embedder` are the
//!    contracts between the engine and whatever holds the data
//! 2. **Clean DTOs**: `Node`, `Edge`, `Chunk`, `Value` cross all boundaries
//! 3. **Explicit fallback**: retrieval walks a fixed chain of plans and
//!    always returns something usable
//! 4. **Per-request state only**: nothing survives a call except the stores
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use graphfuse::{
//!     Chunk, Edge, Embedder, GraphQuery, HybridRetriever, MemoryChunkStore,
//!     MemoryGraphStore, Node, ResolutionTarget, RetrievalRequest,
//! };
//!
//! # async fn example(embedder: Arc<dyn Embedder>) -> graphfuse::Result<()> {
//! let graph = MemoryGraphStore::new();
//! let chunks = MemoryChunkStore::new();
//!
//! let doctor = graph.insert_node(Node::labeled("Doctor").with_property("name", "House"));
//! let patient = graph.insert_node(Node::labeled("Patient").with_property("name", "Ada"));
//! graph.insert_edge(Edge::new(doctor, patient, "TREATS"))?;
//! chunks.insert(Chunk::new("Dr. House leads diagnostics.", embedder.embed("Dr. House").await?).linked_to(doctor));
//!
//! let retriever = HybridRetriever::new(Arc::new(graph), Arc::new(chunks), embedder);
//! let request = RetrievalRequest::new("Who does Dr. House treat?")
//!     .with_graph_query(GraphQuery::with_targets(vec![
//!         ResolutionTarget::new("Dr. House").with_type_hint("Doctor"),
//!     ]));
//!
//! let result = retriever.retrieve(&request).await?;
//! println!("{} via {}", result.total_results(), result.strategy);
//! # Ok(())
//! # }
//! ```
//!
//! ## Stores
//!
//! | Store | Module | Description |
//! |-------|--------|-------------|
//! | `MemoryGraphStore` | `storage::memory` | In-memory graph for testing/embedding |
//! | `MemoryChunkStore` | `storage::memory` | Brute-force cosine search |

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod query;
pub mod storage;
pub mod embedding;
pub mod retrieval;
pub mod assembler;
pub mod config;

// ============================================================================
// Re-exports: Model (the DTOs)
// ============================================================================

pub use model::{
    Chunk, ChunkId, Direction, Edge, EdgeId, MatchedPath, Node, NodeId,
    PropertyMap, Subgraph, Value,
};

// ============================================================================
// Re-exports: Query language
// ============================================================================

pub use query::{
    CombinatorKind, Constraint, ConstraintOp, GraphPattern, GraphQuery,
    QueryCombinator, RankingStrategy, ResolutionTarget, RetrievalRequest,
    RetrievalResult, RetrievalStrategy, TraversalHint, TraversalStep,
};

// ============================================================================
// Re-exports: Stores, embedding, engine
// ============================================================================

pub use storage::{ChunkStore, GraphStore, MemoryChunkStore, MemoryGraphStore};
pub use embedding::{Embedder, EmbeddingModel, OffloadedEmbedder};
pub use retrieval::{EntryPoint, HybridRetriever, RetrievalPlan};
pub use assembler::ContextAssembler;
pub use config::RetrievalConfig;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("{operation} timed out after {millis} ms")]
    Timeout { operation: String, millis: u64 },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
