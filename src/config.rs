//! Retrieval engine configuration.
//!
//! ```rust
//! use graphfuse::RetrievalConfig;
//!
//! let config = RetrievalConfig::from_json_str(r#"{"max_depth": 3}"#).unwrap();
//! assert_eq!(config.max_depth, 3);
//! assert_eq!(config.default_depth, 2);
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Tunables for `HybridRetriever`. Unset fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Expansion depth when the request carries no traversal hint.
    pub default_depth: usize,
    /// Upper bound on any requested depth.
    pub max_depth: usize,
    /// Graph-derived keywords appended to the vector query.
    pub max_graph_keywords: usize,
    /// Hybrid search fetches `max(top_k * oversample_factor, top_k + oversample_min_extra)`.
    pub oversample_factor: usize,
    pub oversample_min_extra: usize,
    /// Cap on partial paths held per entry point during pattern execution.
    pub max_partial_paths: usize,
    /// Per-call guard on store and embedder calls. `None` disables it.
    pub call_timeout_ms: Option<u64>,
    /// Results with fewer items than this count as thin.
    pub thin_result_threshold: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            default_depth: 2,
            max_depth: 5,
            max_graph_keywords: 10,
            oversample_factor: 2,
            oversample_min_extra: 5,
            max_partial_paths: 10_000,
            call_timeout_ms: Some(30_000),
            thin_result_threshold: 5,
        }
    }
}

impl RetrievalConfig {
    /// Parse from JSON, filling missing fields with defaults, then validate.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_depth == 0 {
            return Err(Error::Config("max_depth must be at least 1".into()));
        }
        if self.default_depth > self.max_depth {
            return Err(Error::Config(format!(
                "default_depth ({}) exceeds max_depth ({})",
                self.default_depth, self.max_depth
            )));
        }
        if self.oversample_factor == 0 {
            return Err(Error::Config("oversample_factor must be at least 1".into()));
        }
        if self.max_partial_paths == 0 {
            return Err(Error::Config("max_partial_paths must be at least 1".into()));
        }
        if self.call_timeout_ms == Some(0) {
            return Err(Error::Config("call_timeout_ms must be positive when set".into()));
        }
        Ok(())
    }

    pub fn call_timeout(&self) -> Option<Duration> {
        self.call_timeout_ms.map(Duration::from_millis)
    }

    /// Candidate count for hybrid search at the given `top_k`.
    pub fn oversampled_k(&self, top_k: usize) -> usize {
        (top_k * self.oversample_factor).max(top_k + self.oversample_min_extra)
    }

    pub fn clamp_depth(&self, depth: usize) -> usize {
        depth.min(self.max_depth)
    }
}
