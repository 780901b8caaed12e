//! Shared fixtures for the end-to-end tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use graphfuse::storage::{ChunkStore, GraphStore};
use graphfuse::{
    Chunk, Edge, Embedder, Error, MemoryChunkStore, MemoryGraphStore, Node, NodeId, Result, Subgraph,
};

// ============================================================================
// Embedders
// ============================================================================

/// Known texts map to fixed vectors; everything else gets `fallback`.
pub struct MapEmbedder {
    vectors: HashMap<String, Vec<f32>>,
    fallback: Vec<f32>,
    pub calls: AtomicUsize,
}

impl MapEmbedder {
    pub fn new(fallback: Vec<f32>) -> Self {
        Self { vectors: HashMap::new(), fallback, calls: AtomicUsize::new(0) }
    }

    pub fn with(mut self, text: &str, vector: Vec<f32>) -> Self {
        self.vectors.insert(text.to_string(), vector);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Embedder for MapEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.vectors.get(text).cloned().unwrap_or_else(|| self.fallback.clone()))
    }
}

/// Delegates to a [`MapEmbedder`] and records every text it embeds.
pub struct RecordingEmbedder {
    inner: MapEmbedder,
    texts: Mutex<Vec<String>>,
}

impl RecordingEmbedder {
    pub fn new(inner: MapEmbedder) -> Self {
        Self { inner, texts: Mutex::new(Vec::new()) }
    }

    pub fn texts(&self) -> Vec<String> {
        self.texts.lock().clone()
    }
}

#[async_trait]
impl Embedder for RecordingEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.texts.lock().push(text.to_string());
        self.inner.embed(text).await
    }
}

pub struct FailingEmbedder;

#[async_trait]
impl Embedder for FailingEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Err(Error::Embedding("provider unavailable".into()))
    }
}

// ============================================================================
// Store wrappers
// ============================================================================

/// Counts the calls made against an in-memory graph.
#[derive(Default)]
pub struct CountingGraphStore {
    pub inner: MemoryGraphStore,
    pub neighbor_calls: AtomicUsize,
    pub edge_calls: AtomicUsize,
}

impl CountingGraphStore {
    pub fn new(inner: MemoryGraphStore) -> Self {
        Self { inner, ..Self::default() }
    }

    pub fn neighbor_calls(&self) -> usize {
        self.neighbor_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GraphStore for CountingGraphStore {
    async fn get_node(&self, id: NodeId) -> Result<Option<Node>> {
        self.inner.get_node(id).await
    }

    async fn get_neighbors(&self, id: NodeId) -> Result<Vec<Node>> {
        self.neighbor_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.get_neighbors(id).await
    }

    async fn edges_for_node(&self, id: NodeId) -> Result<Vec<Edge>> {
        self.edge_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.edges_for_node(id).await
    }

    async fn extract_subgraph(&self, seeds: &[NodeId], depth: usize) -> Result<Subgraph> {
        self.inner.extract_subgraph(seeds, depth).await
    }

    async fn find_nodes_by_label(&self, label: &str) -> Result<Vec<Node>> {
        self.inner.find_nodes_by_label(label).await
    }

    async fn find_edges_by_relation_type(&self, relation_type: &str) -> Result<Vec<Edge>> {
        self.inner.find_edges_by_relation_type(relation_type).await
    }
}

/// Delegates to a [`MemoryChunkStore`] and records the `k` of every
/// similarity search.
pub struct RecordingChunkStore {
    inner: MemoryChunkStore,
    ks: Mutex<Vec<usize>>,
}

impl RecordingChunkStore {
    pub fn new(inner: MemoryChunkStore) -> Self {
        Self { inner, ks: Mutex::new(Vec::new()) }
    }

    pub fn ks(&self) -> Vec<usize> {
        self.ks.lock().clone()
    }
}

#[async_trait]
impl ChunkStore for RecordingChunkStore {
    async fn find_top_k_similar(&self, embedding: &[f32], k: usize) -> Result<Vec<Chunk>> {
        self.ks.lock().push(k);
        self.inner.find_top_k_similar(embedding, k).await
    }

    async fn find_by_linked_node_id(&self, node_id: NodeId) -> Result<Vec<Chunk>> {
        self.inner.find_by_linked_node_id(node_id).await
    }
}

/// A chunk store that never answers in time.
pub struct SlowChunkStore(pub Duration);

#[async_trait]
impl ChunkStore for SlowChunkStore {
    async fn find_top_k_similar(&self, _embedding: &[f32], _k: usize) -> Result<Vec<Chunk>> {
        tokio::time::sleep(self.0).await;
        Ok(Vec::new())
    }

    async fn find_by_linked_node_id(&self, _node_id: NodeId) -> Result<Vec<Chunk>> {
        tokio::time::sleep(self.0).await;
        Ok(Vec::new())
    }
}

// ============================================================================
// Graph fixtures
// ============================================================================

/// Doctor -TREATS-> Patient -HAS-> Condition, plus chunks describing each.
pub struct Clinic {
    pub graph: MemoryGraphStore,
    pub chunks: MemoryChunkStore,
    pub doctor: NodeId,
    pub patient: NodeId,
    pub condition: NodeId,
}

pub const DOCTOR_VEC: [f32; 4] = [1.0, 0.0, 0.0, 0.0];
pub const PATIENT_VEC: [f32; 4] = [0.0, 1.0, 0.0, 0.0];
pub const CONDITION_VEC: [f32; 4] = [0.0, 0.0, 1.0, 0.0];
pub const NOISE_VEC: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

pub fn clinic() -> Clinic {
    let graph = MemoryGraphStore::new();
    let chunks = MemoryChunkStore::new();

    let doctor = graph.insert_node(
        Node::labeled("Doctor").with_property("name", "Gregory House").with_property("specialty", "diagnostics"),
    );
    let patient = graph.insert_node(Node::labeled("Patient").with_property("name", "Ada").with_property("age", 42));
    let condition = graph.insert_node(Node::labeled("Condition").with_property("name", "diabetes"));

    graph.insert_edge(Edge::new(doctor, patient, "TREATS").with_weight(0.9)).unwrap();
    graph.insert_edge(Edge::new(patient, condition, "HAS")).unwrap();

    chunks.insert(Chunk::new("Dr. House runs the diagnostics department.", DOCTOR_VEC.to_vec()).linked_to(doctor));
    chunks.insert(Chunk::new("Ada was admitted in March.", PATIENT_VEC.to_vec()).linked_to(patient));
    chunks.insert(Chunk::new("Diabetes requires insulin management.", CONDITION_VEC.to_vec()).linked_to(condition));
    chunks.insert(Chunk::new("The cafeteria opens at seven.", NOISE_VEC.to_vec()));

    Clinic { graph, chunks, doctor, patient, condition }
}

pub fn embedder() -> Arc<MapEmbedder> {
    Arc::new(clinic_vectors())
}

pub fn clinic_vectors() -> MapEmbedder {
    MapEmbedder::new(NOISE_VEC.to_vec())
        .with("Dr. House", DOCTOR_VEC.to_vec())
        .with("Ada", PATIENT_VEC.to_vec())
        .with("diabetes", CONDITION_VEC.to_vec())
}
