//! Edge (typed, directed relationship) in the knowledge graph.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{NodeId, PropertyMap, Value};

/// Opaque edge identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(pub Uuid);

impl EdgeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EdgeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EdgeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Traversal direction relative to the node being expanded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    /// The node is the edge's source.
    #[default]
    Outgoing,
    /// The node is the edge's target.
    Incoming,
    Both,
}

/// A directed, typed edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub relation_type: String,
    pub source: NodeId,
    pub target: NodeId,
    #[serde(default)]
    pub properties: PropertyMap,
    #[serde(default = "default_weight")]
    pub weight: f64,
    pub created: DateTime<Utc>,
}

fn default_weight() -> f64 {
    1.0
}

impl Edge {
    pub fn new(source: NodeId, target: NodeId, relation_type: impl Into<String>) -> Self {
        Self {
            id: EdgeId::new(),
            relation_type: relation_type.into(),
            source,
            target,
            properties: PropertyMap::new(),
            weight: default_weight(),
            created: Utc::now(),
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// The "other" end of the edge from the given node.
    pub fn other_end(&self, from: NodeId) -> Option<NodeId> {
        match from {
            n if n == self.source => Some(self.target),
            n if n == self.target => Some(self.source),
            _ => None,
        }
    }

    /// The endpoint reached by following this edge from `node` in `dir`.
    pub fn follow(&self, node: NodeId, dir: Direction) -> Option<NodeId> {
        match dir {
            Direction::Outgoing if self.source == node => Some(self.target),
            Direction::Incoming if self.target == node => Some(self.source),
            Direction::Both => self.other_end(node),
            _ => None,
        }
    }
}
