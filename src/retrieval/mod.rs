//! # Hybrid Retrieval Engine
//!
//! ```text
//! RetrievalRequest
//!   → HybridRetriever (plan chain: pattern → targeted hybrid → vector)
//!       → EntryPointResolver   text → node ids
//!       → PatternExecutor      multi-hop templates → MatchedPath
//!       → SubgraphExtractor    neighbourhood + node budget
//!       → keywords             query enrichment, chunk prioritisation
//!   → RetrievalResult
//! ```
//!
//! Every external call goes through [`guarded`], which applies the
//! configured per-call timeout.

pub mod combinator;
pub mod constraint;
pub mod keywords;
pub mod orchestrator;
pub mod pattern;
pub mod resolver;
pub mod subgraph;

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::model::NodeId;
use crate::{Error, Result};

pub use combinator::combine;
pub use constraint::ConstraintEvaluator;
pub use keywords::{enrich_query, harvest_keywords, prioritize_chunks};
pub use orchestrator::{HybridRetriever, PlanOutcome, RetrievalPlan};
pub use pattern::PatternExecutor;
pub use resolver::EntryPointResolver;
pub use subgraph::{truncate, SubgraphExtractor};

/// A resolved traversal start: the node plus how well it matched.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EntryPoint {
    pub node_id: NodeId,
    /// Cosine similarity of the chunk that resolved this node.
    pub score: f64,
}

impl EntryPoint {
    pub fn new(node_id: NodeId, score: f64) -> Self {
        Self { node_id, score }
    }
}

impl From<NodeId> for EntryPoint {
    fn from(node_id: NodeId) -> Self {
        Self { node_id, score: 1.0 }
    }
}

/// Await `fut`, failing with `Error::Timeout` after `limit`.
pub async fn guarded<T, F>(operation: &'static str, limit: Option<Duration>, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match limit {
        None => fut.await,
        Some(limit) => match tokio::time::timeout(limit, fut).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(operation, millis = limit.as_millis() as u64, "External call timed out");
                Err(Error::Timeout {
                    operation: operation.to_string(),
                    millis: limit.as_millis() as u64,
                })
            }
        },
    }
}
