//! In-memory stores.
//!
//! This is the reference implementation of `GraphStore` and `ChunkStore`.
//! The whole graph lives in one arena (id → record maps plus adjacency and
//! label indices) behind a single `RwLock`, so a reader always sees a
//! consistent graph.
//!
//! ## Limitations
//!
//! - **No persistence**: everything is dropped with the store.
//! - **No vector index**: similarity search is a full scan.
//!
//! Use these stores for:
//! - Testing the retrieval engine
//! - Embedding graphfuse in applications that keep their graph in memory

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use hashbrown::HashSet;
use parking_lot::RwLock;

use crate::model::*;
use crate::{Error, Result};
use super::{ChunkStore, GraphStore};

// ============================================================================
// MemoryGraphStore
// ============================================================================

/// In-memory knowledge graph. Cheap to clone; clones share the arena.
#[derive(Clone, Default)]
pub struct MemoryGraphStore {
    inner: Arc<RwLock<GraphArena>>,
}

#[derive(Default)]
struct GraphArena {
    nodes: HashMap<NodeId, Node>,
    edges: HashMap<EdgeId, Edge>,
    /// node_id → incident edge ids, insertion order
    adjacency: HashMap<NodeId, Vec<EdgeId>>,
    /// label → node ids, insertion order
    label_index: HashMap<String, Vec<NodeId>>,
}

impl GraphArena {
    fn incident(&self, id: NodeId) -> Vec<Edge> {
        self.adjacency
            .get(&id)
            .map(|ids| ids.iter().filter_map(|eid| self.edges.get(eid).cloned()).collect())
            .unwrap_or_default()
    }
}

impl MemoryGraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a node.
    pub fn insert_node(&self, node: Node) -> NodeId {
        let id = node.id;
        let mut arena = self.inner.write();
        if let Some(old) = arena.nodes.get(&id).map(|n| n.label.clone()) {
            if let Some(ids) = arena.label_index.get_mut(&old) {
                ids.retain(|nid| *nid != id);
            }
        }
        arena.label_index.entry(node.label.clone()).or_default().push(id);
        arena.adjacency.entry(id).or_default();
        arena.nodes.insert(id, node);
        id
    }

    /// Insert an edge. Both endpoints must already exist.
    pub fn insert_edge(&self, edge: Edge) -> Result<EdgeId> {
        let mut arena = self.inner.write();
        if !arena.nodes.contains_key(&edge.source) {
            return Err(Error::NotFound(format!("Source node {}", edge.source)));
        }
        if !arena.nodes.contains_key(&edge.target) {
            return Err(Error::NotFound(format!("Target node {}", edge.target)));
        }

        let id = edge.id;
        arena.adjacency.entry(edge.source).or_default().push(id);
        if edge.source != edge.target {
            arena.adjacency.entry(edge.target).or_default().push(id);
        }
        arena.edges.insert(id, edge);
        Ok(id)
    }

    /// Remove a node and its incident edges. Returns true if it existed.
    pub fn remove_node(&self, id: NodeId) -> bool {
        let mut arena = self.inner.write();
        let Some(node) = arena.nodes.remove(&id) else {
            return false;
        };
        if let Some(ids) = arena.label_index.get_mut(&node.label) {
            ids.retain(|nid| *nid != id);
        }
        let incident = arena.adjacency.remove(&id).unwrap_or_default();
        for eid in incident {
            if let Some(edge) = arena.edges.remove(&eid) {
                if let Some(other) = edge.other_end(id) {
                    if let Some(adj) = arena.adjacency.get_mut(&other) {
                        adj.retain(|e| *e != eid);
                    }
                }
            }
        }
        true
    }

    pub fn node_count(&self) -> usize {
        self.inner.read().nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.inner.read().edges.len()
    }
}

#[async_trait]
impl GraphStore for MemoryGraphStore {
    async fn get_node(&self, id: NodeId) -> Result<Option<Node>> {
        Ok(self.inner.read().nodes.get(&id).cloned())
    }

    async fn get_neighbors(&self, id: NodeId) -> Result<Vec<Node>> {
        let arena = self.inner.read();
        let mut seen = HashSet::new();
        Ok(arena
            .incident(id)
            .iter()
            .filter_map(|e| e.other_end(id))
            .filter(|n| seen.insert(*n))
            .filter_map(|n| arena.nodes.get(&n).cloned())
            .collect())
    }

    async fn edges_for_node(&self, id: NodeId) -> Result<Vec<Edge>> {
        Ok(self.inner.read().incident(id))
    }

    async fn extract_subgraph(&self, seeds: &[NodeId], depth: usize) -> Result<Subgraph> {
        let arena = self.inner.read();

        // BFS, undirected, recording discovery order
        let mut visited: HashSet<NodeId> = HashSet::new();
        let mut order: Vec<NodeId> = Vec::new();
        let mut queue: VecDeque<(NodeId, usize)> = VecDeque::new();

        for seed in seeds {
            if arena.nodes.contains_key(seed) && visited.insert(*seed) {
                order.push(*seed);
                queue.push_back((*seed, 0));
            }
        }

        while let Some((current, d)) = queue.pop_front() {
            if d >= depth {
                continue;
            }
            for edge in arena.incident(current) {
                let Some(next) = edge.other_end(current) else { continue };
                if arena.nodes.contains_key(&next) && visited.insert(next) {
                    order.push(next);
                    queue.push_back((next, d + 1));
                }
            }
        }

        let nodes: Vec<Node> = order.iter().filter_map(|id| arena.nodes.get(id).cloned()).collect();

        let mut seen_edges = HashSet::new();
        let mut edges = Vec::new();
        for id in &order {
            for eid in arena.adjacency.get(id).into_iter().flatten() {
                let Some(edge) = arena.edges.get(eid) else { continue };
                if visited.contains(&edge.source)
                    && visited.contains(&edge.target)
                    && seen_edges.insert(*eid)
                {
                    edges.push(edge.clone());
                }
            }
        }

        Ok(Subgraph::new(nodes, edges))
    }

    async fn find_nodes_by_label(&self, label: &str) -> Result<Vec<Node>> {
        let arena = self.inner.read();
        let ids = arena.label_index.get(label).cloned().unwrap_or_default();
        Ok(ids.iter().filter_map(|id| arena.nodes.get(id).cloned()).collect())
    }

    async fn find_edges_by_relation_type(&self, relation_type: &str) -> Result<Vec<Edge>> {
        let arena = self.inner.read();
        let mut edges: Vec<Edge> = arena
            .edges
            .values()
            .filter(|e| e.relation_type == relation_type)
            .cloned()
            .collect();
        edges.sort_by_key(|e| e.created);
        Ok(edges)
    }

    async fn degree(&self, id: NodeId) -> Result<usize> {
        Ok(self.inner.read().adjacency.get(&id).map_or(0, Vec::len))
    }
}

// ============================================================================
// MemoryChunkStore
// ============================================================================

/// In-memory chunk collection with exhaustive cosine search.
#[derive(Clone, Default)]
pub struct MemoryChunkStore {
    chunks: Arc<RwLock<Vec<Chunk>>>,
}

impl MemoryChunkStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, chunk: Chunk) -> ChunkId {
        let id = chunk.id;
        self.chunks.write().push(chunk);
        id
    }

    pub fn len(&self) -> usize {
        self.chunks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.read().is_empty()
    }
}

#[async_trait]
impl ChunkStore for MemoryChunkStore {
    async fn find_top_k_similar(&self, embedding: &[f32], k: usize) -> Result<Vec<Chunk>> {
        let chunks = self.chunks.read();
        let mut scored: Vec<(f32, &Chunk)> = chunks.iter().map(|c| (c.similarity(embedding), c)).collect();
        // Stable: equal scores keep insertion order
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        Ok(scored.into_iter().take(k).map(|(_, c)| c.clone()).collect())
    }

    async fn find_by_linked_node_id(&self, node_id: NodeId) -> Result<Vec<Chunk>> {
        Ok(self
            .chunks
            .read()
            .iter()
            .filter(|c| c.linked_node_id == Some(node_id))
            .cloned()
            .collect())
    }
}

// ============================================================================
// Tests
// ============================================================================
