//! Entry-point resolution: free-text targets → graph node ids.
//!
//! A target is embedded, the nearest chunks are fetched, and the nodes those
//! chunks are linked to become candidates. A type hint then either accepts a
//! candidate as is, corrects it to a one-hop neighbour with the right label,
//! or discards it.

use std::sync::Arc;
use std::time::Duration;

use futures::future::try_join_all;
use hashbrown::HashSet;

use super::{guarded, EntryPoint};
use crate::config::RetrievalConfig;
use crate::embedding::Embedder;
use crate::model::{cosine_similarity, NodeId};
use crate::query::ResolutionTarget;
use crate::storage::{ChunkStore, GraphStore};
use crate::Result;

pub struct EntryPointResolver {
    embedder: Arc<dyn Embedder>,
    chunks: Arc<dyn ChunkStore>,
    graph: Arc<dyn GraphStore>,
    call_timeout: Option<Duration>,
}

impl EntryPointResolver {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        chunks: Arc<dyn ChunkStore>,
        graph: Arc<dyn GraphStore>,
        config: &RetrievalConfig,
    ) -> Self {
        Self { embedder, chunks, graph, call_timeout: config.call_timeout() }
    }

    /// Resolve targets to distinct node ids, first occurrence wins.
    pub async fn resolve(&self, targets: &[ResolutionTarget], top_k: usize) -> Result<Vec<NodeId>> {
        Ok(self
            .resolve_scored(targets, top_k)
            .await?
            .into_iter()
            .map(|e| e.node_id)
            .collect())
    }

    /// Like [`resolve`](Self::resolve), keeping each node's similarity.
    pub async fn resolve_scored(&self, targets: &[ResolutionTarget], top_k: usize) -> Result<Vec<EntryPoint>> {
        let per_target = try_join_all(targets.iter().map(|t| self.resolve_target(t, top_k))).await?;

        let mut seen = HashSet::new();
        let resolved: Vec<EntryPoint> = per_target
            .into_iter()
            .flatten()
            .filter(|e| seen.insert(e.node_id))
            .collect();

        tracing::debug!(targets = targets.len(), entry_points = resolved.len(), "Entry points resolved");
        Ok(resolved)
    }

    async fn resolve_target(&self, target: &ResolutionTarget, top_k: usize) -> Result<Vec<EntryPoint>> {
        if target.description.trim().is_empty() {
            return Ok(Vec::new());
        }

        let embedding = guarded("embed", self.call_timeout, self.embedder.embed(&target.description)).await?;
        let chunks = guarded(
            "find_top_k_similar",
            self.call_timeout,
            self.chunks.find_top_k_similar(&embedding, top_k),
        )
        .await?;

        // Distinct linked nodes in rank order, scored by their best chunk
        let mut candidates: Vec<EntryPoint> = Vec::new();
        for chunk in &chunks {
            let Some(node_id) = chunk.linked_node_id else { continue };
            let score = cosine_similarity(&embedding, &chunk.embedding) as f64;
            match candidates.iter_mut().find(|c| c.node_id == node_id) {
                Some(existing) => existing.score = existing.score.max(score),
                None => candidates.push(EntryPoint::new(node_id, score)),
            }
        }

        let nodes = try_join_all(
            candidates
                .iter()
                .map(|c| guarded("get_node", self.call_timeout, self.graph.get_node(c.node_id))),
        )
        .await?;

        let mut resolved = Vec::new();
        for (candidate, node) in candidates.into_iter().zip(nodes) {
            let Some(node) = node else {
                tracing::warn!(
                    node_id = %candidate.node_id,
                    target = %target.description,
                    "Chunk links to a node missing from the graph, skipping"
                );
                continue;
            };

            let Some(hint) = target.type_hint.as_deref() else {
                resolved.push(candidate);
                continue;
            };

            if node.has_label(hint) {
                resolved.push(candidate);
                continue;
            }

            let neighbours = guarded("get_neighbors", self.call_timeout, self.graph.get_neighbors(node.id)).await?;
            let before = resolved.len();
            resolved.extend(
                neighbours
                    .iter()
                    .filter(|n| n.has_label(hint))
                    .map(|n| EntryPoint::new(n.id, candidate.score)),
            );
            if resolved.len() == before {
                tracing::debug!(
                    node_id = %node.id,
                    label = %node.label,
                    type_hint = hint,
                    "Candidate discarded, no neighbour matches type hint"
                );
            }
        }

        Ok(resolved)
    }
}
