//! MatchedPath: one concrete walk that satisfied a graph pattern.

use serde::{Deserialize, Serialize};
use super::NodeId;

/// A path produced by pattern execution: node -[rel]-> node -[rel]-> node ...
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedPath {
    pub pattern_id: String,
    /// Nodes along the path. Always has one more element than `relation_types`.
    pub node_ids: Vec<NodeId>,
    /// Relation types of the edges connecting consecutive nodes.
    pub relation_types: Vec<String>,
    pub score: f64,
    pub explanation: String,
}

impl MatchedPath {
    /// Number of hops.
    pub fn len(&self) -> usize {
        self.relation_types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relation_types.is_empty()
    }

    pub fn start(&self) -> Option<NodeId> {
        self.node_ids.first().copied()
    }

    pub fn end(&self) -> Option<NodeId> {
        self.node_ids.last().copied()
    }

    pub fn node_at_step(&self, step: usize) -> Option<NodeId> {
        self.node_ids.get(step).copied()
    }

    /// Render as `a →[REL]→ b →[REL]→ c`.
    pub fn to_path_string(&self) -> String {
        let mut out = String::new();
        for (i, id) in self.node_ids.iter().enumerate() {
            out.push_str(&id.to_string());
            if let Some(rel) = self.relation_types.get(i) {
                out.push_str(&format!(" →[{rel}]→ "));
            }
        }
        out
    }
}
