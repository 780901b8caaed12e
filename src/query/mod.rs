//! Retrieval query language: requests, patterns, constraints, results.
//!
//! Everything here is plain data. A request is built (or deserialized),
//! validated once at the boundary, and handed to the retrieval engine.

pub mod pattern;
pub mod request;
pub mod result;

pub use pattern::{
    CombinatorKind, Constraint, ConstraintOp, GraphPattern, QueryCombinator,
    RankingStrategy, TraversalStep, WILDCARD,
};
pub use request::{GraphQuery, ResolutionTarget, RetrievalRequest, TraversalHint};
pub use result::{RetrievalResult, RetrievalStrategy};
