//! Pattern execution: walk a multi-hop template from each entry point.
//!
//! Steps run one after another. A path may come back to a node it already
//! holds; the step count bounds the walk. Within a step the edge fetches for every
//! partial path run concurrently and are joined, then the node lookups for
//! every candidate are joined, before the next step starts. Entry points
//! are independent and run concurrently.

use std::sync::Arc;
use std::time::Duration;

use futures::future::try_join_all;
use hashbrown::{HashMap, HashSet};
use smallvec::{smallvec, SmallVec};

use super::{guarded, ConstraintEvaluator, EntryPoint};
use crate::config::RetrievalConfig;
use crate::model::{Edge, MatchedPath, Node, NodeId};
use crate::query::{GraphPattern, RankingStrategy};
use crate::storage::GraphStore;
use crate::Result;

/// A path under construction.
#[derive(Debug, Clone)]
struct PartialPath {
    nodes: SmallVec<[NodeId; 8]>,
    relations: SmallVec<[String; 8]>,
    weights: SmallVec<[f64; 8]>,
    /// Degree of every node except the terminal one, seen while expanding.
    degrees: SmallVec<[usize; 8]>,
}

impl PartialPath {
    fn start(node: NodeId) -> Self {
        Self {
            nodes: smallvec![node],
            relations: SmallVec::new(),
            weights: SmallVec::new(),
            degrees: SmallVec::new(),
        }
    }

    fn terminal(&self) -> NodeId {
        // never empty: built from `start`
        self.nodes[self.nodes.len() - 1]
    }

    fn extend(&self, terminal_degree: usize, edge: &Edge, next: NodeId) -> Self {
        let mut path = self.clone();
        path.degrees.push(terminal_degree);
        path.relations.push(edge.relation_type.clone());
        path.weights.push(edge.weight);
        path.nodes.push(next);
        path
    }
}

/// Executes [`GraphPattern`]s against a [`GraphStore`].
pub struct PatternExecutor {
    graph: Arc<dyn GraphStore>,
    max_partial_paths: usize,
    call_timeout: Option<Duration>,
}

impl PatternExecutor {
    pub fn new(graph: Arc<dyn GraphStore>, config: &RetrievalConfig) -> Self {
        Self {
            graph,
            max_partial_paths: config.max_partial_paths,
            call_timeout: config.call_timeout(),
        }
    }

    /// Run `pattern` from every entry point and return the best `max_paths`
    /// matches, highest score first. Equal scores keep discovery order.
    pub async fn execute(
        &self,
        pattern: &GraphPattern,
        entry_points: &[EntryPoint],
        max_paths: usize,
        ranking: RankingStrategy,
    ) -> Result<Vec<MatchedPath>> {
        if entry_points.is_empty() || max_paths == 0 {
            return Ok(Vec::new());
        }

        let evaluator = ConstraintEvaluator::new(&pattern.constraints);
        let per_entry = try_join_all(
            entry_points
                .iter()
                .map(|entry| self.execute_from(pattern, &evaluator, *entry, ranking)),
        )
        .await?;

        let mut paths: Vec<MatchedPath> = per_entry.into_iter().flatten().collect();
        // sort_by is stable
        paths.sort_by(|a, b| b.score.total_cmp(&a.score));
        paths.truncate(max_paths);

        tracing::debug!(
            pattern_id = %pattern.pattern_id,
            entry_points = entry_points.len(),
            paths = paths.len(),
            "Pattern executed"
        );
        Ok(paths)
    }

    async fn execute_from(
        &self,
        pattern: &GraphPattern,
        evaluator: &ConstraintEvaluator<'_>,
        entry: EntryPoint,
        ranking: RankingStrategy,
    ) -> Result<Vec<MatchedPath>> {
        let mut working = vec![PartialPath::start(entry.node_id)];

        for (step_index, step) in pattern.steps.iter().enumerate() {
            // Phase 1: incident edges of every terminal, concurrently
            let edge_lists = try_join_all(
                working
                    .iter()
                    .map(|p| guarded("edges_for_node", self.call_timeout, self.graph.edges_for_node(p.terminal()))),
            )
            .await?;

            let mut candidates: Vec<(usize, usize, Edge, NodeId)> = Vec::new();
            for (path_idx, (path, edges)) in working.iter().zip(edge_lists).enumerate() {
                let degree = edges.len();
                for edge in edges {
                    if !step.matches_relation(&edge.relation_type) {
                        continue;
                    }
                    let Some(next) = edge.follow(path.terminal(), step.direction) else {
                        continue;
                    };
                    candidates.push((path_idx, degree, edge, next));
                }
            }

            // Phase 2: look up each distinct candidate node once
            let mut seen = HashSet::new();
            let distinct: Vec<NodeId> = candidates
                .iter()
                .map(|(_, _, _, next)| *next)
                .filter(|id| seen.insert(*id))
                .collect();
            let looked_up = try_join_all(
                distinct
                    .iter()
                    .map(|id| guarded("get_node", self.call_timeout, self.graph.get_node(*id))),
            )
            .await?;
            let nodes: HashMap<NodeId, Node> = distinct
                .into_iter()
                .zip(looked_up)
                .filter_map(|(id, node)| node.map(|n| (id, n)))
                .collect();

            // Phase 3: filter and extend
            let mut next_working = Vec::new();
            let mut dropped = 0usize;
            for (path_idx, degree, edge, next) in candidates {
                let Some(node) = nodes.get(&next) else { continue };
                if !step.matches_target_label(&node.label) {
                    continue;
                }
                if !evaluator.evaluate(node, step_index) {
                    continue;
                }
                if next_working.len() >= self.max_partial_paths {
                    dropped += 1;
                    continue;
                }
                next_working.push(working[path_idx].extend(degree, &edge, next));
            }

            if dropped > 0 {
                tracing::warn!(
                    pattern_id = %pattern.pattern_id,
                    step = step_index,
                    dropped,
                    cap = self.max_partial_paths,
                    "Partial path cap reached, dropping branches"
                );
            }
            if next_working.is_empty() {
                return Ok(Vec::new());
            }
            working = next_working;
        }

        let terminal_degrees = if ranking == RankingStrategy::NodeCentrality {
            try_join_all(
                working
                    .iter()
                    .map(|p| guarded("degree", self.call_timeout, self.graph.degree(p.terminal()))),
            )
            .await?
        } else {
            vec![0; working.len()]
        };

        let explanation = format!(
            "Matched pattern: {}",
            if pattern.description.is_empty() { &pattern.pattern_id } else { &pattern.description }
        );

        Ok(working
            .into_iter()
            .zip(terminal_degrees)
            .map(|(path, terminal_degree)| {
                let score = score_path(&path, terminal_degree, entry.score, ranking);
                MatchedPath {
                    pattern_id: pattern.pattern_id.clone(),
                    node_ids: path.nodes.into_vec(),
                    relation_types: path.relations.into_vec(),
                    score,
                    explanation: explanation.clone(),
                }
            })
            .collect())
    }
}

fn score_path(path: &PartialPath, terminal_degree: usize, entry_score: f64, ranking: RankingStrategy) -> f64 {
    let length_score = 1.0 / path.nodes.len() as f64;
    match ranking {
        RankingStrategy::PathLength => length_score,
        RankingStrategy::EdgeWeight => path.weights.iter().sum(),
        RankingStrategy::NodeCentrality => {
            let total: usize = path.degrees.iter().sum::<usize>() + terminal_degree;
            let mean = total as f64 / path.nodes.len() as f64;
            mean / (1.0 + mean)
        }
        RankingStrategy::SemanticScore => entry_score,
        RankingStrategy::Hybrid => {
            let mean_weight = if path.weights.is_empty() {
                0.0
            } else {
                path.weights.iter().sum::<f64>() / path.weights.len() as f64
            };
            (length_score + mean_weight.clamp(0.0, 1.0) + entry_score) / 3.0
        }
    }
}
