//! Retrieval requests and their boundary validation.

use serde::{Deserialize, Serialize};

use super::{GraphPattern, QueryCombinator, RankingStrategy};
use crate::{Error, Result};

pub const DEFAULT_TOP_K: usize = 10;
pub const DEFAULT_MAX_GRAPH_NODES: usize = 100;
pub const DEFAULT_MAX_TOKEN_BUDGET: usize = 4000;

const MAX_QUERY_CHARS: usize = 10_000;
const MAX_TOP_K: usize = 1_000;
const MAX_GRAPH_NODES: usize = 10_000;
const MAX_TOKEN_BUDGET: usize = 200_000;
const MAX_SEMANTIC_KEYWORDS: usize = 50;
const MAX_KEYWORD_CHARS: usize = 200;

/// Free text naming something that should become a traversal entry point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionTarget {
    pub description: String,
    /// Expected label of the resolved node, e.g. `"Patient"`.
    #[serde(default)]
    pub type_hint: Option<String>,
}

impl ResolutionTarget {
    pub fn new(description: impl Into<String>) -> Self {
        Self { description: description.into(), type_hint: None }
    }

    pub fn with_type_hint(mut self, type_hint: impl Into<String>) -> Self {
        self.type_hint = Some(type_hint.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TraversalHint {
    pub max_depth: usize,
    /// Keep only edges of these types. Empty keeps all.
    #[serde(default)]
    pub relation_types: Vec<String>,
}

/// Structured part of a request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphQuery {
    #[serde(default)]
    pub targets: Vec<ResolutionTarget>,
    #[serde(default)]
    pub traversal: Option<TraversalHint>,
    #[serde(default)]
    pub patterns: Vec<GraphPattern>,
    #[serde(default)]
    pub combinator: Option<QueryCombinator>,
    #[serde(default)]
    pub ranking_strategy: RankingStrategy,
}

impl GraphQuery {
    pub fn with_targets(targets: Vec<ResolutionTarget>) -> Self {
        Self { targets, ..Self::default() }
    }

    pub fn with_patterns(targets: Vec<ResolutionTarget>, patterns: Vec<GraphPattern>) -> Self {
        Self { targets, patterns, ..Self::default() }
    }

    pub fn traversal(mut self, hint: TraversalHint) -> Self {
        self.traversal = Some(hint);
        self
    }

    pub fn combinator(mut self, combinator: QueryCombinator) -> Self {
        self.combinator = Some(combinator);
        self
    }

    pub fn ranked_by(mut self, strategy: RankingStrategy) -> Self {
        self.ranking_strategy = strategy;
        self
    }

    pub fn has_targets(&self) -> bool {
        !self.targets.is_empty()
    }

    pub fn has_combinator(&self) -> bool {
        self.combinator.as_ref().is_some_and(|c| !c.patterns.is_empty())
    }

    /// Whether the caller asked for pattern-based traversal.
    pub fn uses_patterns(&self) -> bool {
        !self.patterns.is_empty() || self.has_combinator()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalRequest {
    pub query: String,
    #[serde(default)]
    pub graph_query: Option<GraphQuery>,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default = "default_max_graph_nodes")]
    pub max_graph_nodes: usize,
    #[serde(default = "default_max_token_budget")]
    pub max_token_budget: usize,
    #[serde(default)]
    pub semantic_keywords: Vec<String>,
}

fn default_top_k() -> usize { DEFAULT_TOP_K }
fn default_max_graph_nodes() -> usize { DEFAULT_MAX_GRAPH_NODES }
fn default_max_token_budget() -> usize { DEFAULT_MAX_TOKEN_BUDGET }

impl RetrievalRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            graph_query: None,
            top_k: DEFAULT_TOP_K,
            max_graph_nodes: DEFAULT_MAX_GRAPH_NODES,
            max_token_budget: DEFAULT_MAX_TOKEN_BUDGET,
            semantic_keywords: Vec::new(),
        }
    }

    pub fn with_graph_query(mut self, graph_query: GraphQuery) -> Self {
        self.graph_query = Some(graph_query);
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_max_graph_nodes(mut self, max_graph_nodes: usize) -> Self {
        self.max_graph_nodes = max_graph_nodes;
        self
    }

    pub fn with_max_token_budget(mut self, max_token_budget: usize) -> Self {
        self.max_token_budget = max_token_budget;
        self
    }

    pub fn with_semantic_keywords<S: Into<String>>(mut self, keywords: impl IntoIterator<Item = S>) -> Self {
        self.semantic_keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    pub fn targets(&self) -> &[super::ResolutionTarget] {
        self.graph_query.as_ref().map_or(&[], |q| q.targets.as_slice())
    }

    /// Reject malformed input before it reaches the engine.
    pub fn validate(&self) -> Result<()> {
        if self.query.trim().is_empty() {
            return Err(Error::InvalidRequest("query cannot be blank".into()));
        }
        if self.query.chars().count() > MAX_QUERY_CHARS {
            return Err(Error::InvalidRequest(format!(
                "query must not exceed {MAX_QUERY_CHARS} characters"
            )));
        }
        if !(1..=MAX_TOP_K).contains(&self.top_k) {
            return Err(Error::InvalidRequest(format!(
                "top_k must be between 1 and {MAX_TOP_K}, got {}", self.top_k
            )));
        }
        if !(1..=MAX_GRAPH_NODES).contains(&self.max_graph_nodes) {
            return Err(Error::InvalidRequest(format!(
                "max_graph_nodes must be between 1 and {MAX_GRAPH_NODES}, got {}", self.max_graph_nodes
            )));
        }
        if self.max_token_budget > MAX_TOKEN_BUDGET {
            return Err(Error::InvalidRequest(format!(
                "max_token_budget cannot exceed {MAX_TOKEN_BUDGET}"
            )));
        }
        if self.semantic_keywords.len() > MAX_SEMANTIC_KEYWORDS {
            return Err(Error::InvalidRequest(format!(
                "at most {MAX_SEMANTIC_KEYWORDS} semantic keywords allowed"
            )));
        }
        for kw in &self.semantic_keywords {
            if kw.trim().is_empty() || kw.chars().count() > MAX_KEYWORD_CHARS {
                return Err(Error::InvalidRequest(format!(
                    "semantic keywords must be non-blank and at most {MAX_KEYWORD_CHARS} characters"
                )));
            }
        }
        Ok(())
    }
}
