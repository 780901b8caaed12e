//! Combining several patterns with Union / Intersection / Sequential.

use futures::future::try_join_all;
use hashbrown::{HashMap, HashSet};

use super::{EntryPoint, PatternExecutor};
use crate::model::{MatchedPath, NodeId};
use crate::query::{CombinatorKind, QueryCombinator, RankingStrategy};
use crate::Result;

/// Execute every pattern of `combinator` and merge the results.
pub async fn combine(
    executor: &PatternExecutor,
    combinator: &QueryCombinator,
    entry_points: &[EntryPoint],
    max_paths: usize,
    ranking: RankingStrategy,
) -> Result<Vec<MatchedPath>> {
    if combinator.patterns.is_empty() {
        return Ok(Vec::new());
    }

    match combinator.kind {
        CombinatorKind::Union => {
            let results = try_join_all(
                combinator
                    .patterns
                    .iter()
                    .map(|p| executor.execute(p, entry_points, max_paths, ranking)),
            )
            .await?;
            Ok(results.into_iter().flatten().collect())
        }

        CombinatorKind::Intersection => {
            let mut results = try_join_all(
                combinator
                    .patterns
                    .iter()
                    .map(|p| executor.execute(p, entry_points, max_paths, ranking)),
            )
            .await?;

            let mut common: HashSet<NodeId> = touched(&results[0]);
            for paths in &results[1..] {
                let ids = touched(paths);
                common.retain(|id| ids.contains(id));
            }

            let first = results.swap_remove(0);
            Ok(first
                .into_iter()
                .filter(|p| p.node_ids.iter().any(|id| common.contains(id)))
                .collect())
        }

        CombinatorKind::Sequential => {
            let mut all = Vec::new();
            let mut starts: Vec<EntryPoint> = entry_points.to_vec();

            for (stage, pattern) in combinator.patterns.iter().enumerate() {
                let paths = executor.execute(pattern, &starts, max_paths, ranking).await?;
                if paths.is_empty() {
                    tracing::debug!(stage, pattern_id = %pattern.pattern_id, "Sequential stage matched nothing");
                    return Ok(Vec::new());
                }

                // each terminal inherits the score of the entry point its path began at
                let mut origin: HashMap<NodeId, f64> = HashMap::new();
                for entry in &starts {
                    origin.entry(entry.node_id).or_insert(entry.score);
                }
                let mut seen = HashSet::new();
                starts = paths
                    .iter()
                    .filter_map(|p| {
                        let score = p.start().and_then(|s| origin.get(&s)).copied().unwrap_or(1.0);
                        p.end().map(|end| EntryPoint::new(end, score))
                    })
                    .filter(|e| seen.insert(e.node_id))
                    .collect();
                all.extend(paths);
            }
            Ok(all)
        }
    }
}

fn touched(paths: &[MatchedPath]) -> HashSet<NodeId> {
    paths.iter().flat_map(|p| p.node_ids.iter().copied()).collect()
}
