//! Node in the knowledge graph.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{PropertyMap, Value};

/// Opaque node identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub Uuid);

impl NodeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A typed entity in the knowledge graph.
///
/// Identity is the id; label plus properties carry the semantic type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub label: String,
    #[serde(default)]
    pub properties: PropertyMap,
    /// Free text the indexer embeds on behalf of this node.
    #[serde(default)]
    pub vectorizable_content: Option<String>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl Node {
    pub fn new(id: NodeId, label: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            label: label.into(),
            properties: PropertyMap::new(),
            vectorizable_content: None,
            created: now,
            updated: now,
        }
    }

    /// A node with a fresh random id.
    pub fn labeled(label: impl Into<String>) -> Self {
        Self::new(NodeId::new(), label)
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.vectorizable_content = Some(content.into());
        self
    }

    pub fn has_label(&self, label: &str) -> bool {
        self.label == label
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }
}
