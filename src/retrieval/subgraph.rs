//! Subgraph extraction and node-budget truncation.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use hashbrown::{HashMap, HashSet};

use super::guarded;
use crate::config::RetrievalConfig;
use crate::model::{NodeId, Subgraph};
use crate::storage::GraphStore;
use crate::Result;

pub struct SubgraphExtractor {
    graph: Arc<dyn GraphStore>,
    call_timeout: Option<Duration>,
}

impl SubgraphExtractor {
    pub fn new(graph: Arc<dyn GraphStore>, config: &RetrievalConfig) -> Self {
        Self { graph, call_timeout: config.call_timeout() }
    }

    /// Neighbourhood of `seeds` within `depth` hops.
    pub async fn extract(&self, seeds: &[NodeId], depth: usize) -> Result<Subgraph> {
        if seeds.is_empty() {
            return Ok(Subgraph::default());
        }
        guarded("extract_subgraph", self.call_timeout, self.graph.extract_subgraph(seeds, depth)).await
    }
}

/// Cut `subgraph` down to `budget` nodes, keeping the seeds and the nodes
/// closest to them.
///
/// Closeness is BFS distance over the subgraph's own edges, ignoring
/// direction. When the seeds' component runs out before the budget is
/// reached, the rest is filled with remaining nodes in subgraph order.
/// Seeds are never dropped, so the result can exceed `budget` when there
/// are more seeds than budget.
pub fn truncate(subgraph: Subgraph, budget: usize, seeds: &[NodeId]) -> Subgraph {
    if subgraph.nodes.len() <= budget {
        return subgraph;
    }

    let original = subgraph.nodes.len();
    let present = subgraph.node_ids();

    let mut adjacency: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
    for edge in &subgraph.edges {
        adjacency.entry(edge.source).or_default().push(edge.target);
        adjacency.entry(edge.target).or_default().push(edge.source);
    }

    let mut keep: HashSet<NodeId> = HashSet::new();
    let mut queue: VecDeque<NodeId> = VecDeque::new();
    for seed in seeds {
        if present.contains(seed) && keep.insert(*seed) {
            queue.push_back(*seed);
        }
    }

    'bfs: while let Some(current) = queue.pop_front() {
        for next in adjacency.get(&current).into_iter().flatten() {
            if keep.len() >= budget {
                break 'bfs;
            }
            if keep.insert(*next) {
                queue.push_back(*next);
            }
        }
    }

    for node in &subgraph.nodes {
        if keep.len() >= budget {
            break;
        }
        keep.insert(node.id);
    }

    let nodes: Vec<_> = subgraph.nodes.into_iter().filter(|n| keep.contains(&n.id)).collect();
    let edges: Vec<_> = subgraph
        .edges
        .into_iter()
        .filter(|e| keep.contains(&e.source) && keep.contains(&e.target))
        .collect();

    tracing::warn!(
        original,
        kept = nodes.len(),
        budget,
        "Subgraph exceeds node budget, truncated"
    );
    Subgraph::new(nodes, edges)
}
