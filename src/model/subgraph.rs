//! Subgraph: an induced neighbourhood of nodes and edges.

use hashbrown::HashSet;
use serde::{Deserialize, Serialize};

use super::{Edge, Node, NodeId};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Subgraph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl Subgraph {
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        Self { nodes, edges }
    }

    pub fn node_ids(&self) -> HashSet<NodeId> {
        self.nodes.iter().map(|n| n.id).collect()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.iter().any(|n| n.id == id)
    }

    /// Keep only edges whose relation type is listed. An empty list keeps all.
    pub fn retain_relation_types(&mut self, relation_types: &[String]) {
        if relation_types.is_empty() {
            return;
        }
        self.edges.retain(|e| relation_types.iter().any(|t| *t == e.relation_type));
    }
}
