//! Declarative traversal patterns: steps, constraints, ranking, combinators.

use serde::{Deserialize, Serialize};

use crate::model::{Direction, Value};

/// Label or relation type that matches anything.
pub const WILDCARD: &str = "*";

/// One hop of a pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraversalStep {
    /// Label expected at the start of the hop. Informational: the working
    /// set already determines where the hop starts.
    #[serde(default)]
    pub source_label: Option<String>,
    /// `None` or `"*"` follows any relation type.
    #[serde(default)]
    pub relation_type: Option<String>,
    /// `"*"` accepts any label.
    pub target_label: String,
    #[serde(default)]
    pub direction: Direction,
    #[serde(default)]
    pub step_index: usize,
}

impl TraversalStep {
    pub fn new(
        source_label: impl Into<String>,
        relation_type: impl Into<String>,
        target_label: impl Into<String>,
    ) -> Self {
        Self {
            source_label: Some(source_label.into()),
            relation_type: Some(relation_type.into()),
            target_label: target_label.into(),
            direction: Direction::Outgoing,
            step_index: 0,
        }
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn at_index(mut self, step_index: usize) -> Self {
        self.step_index = step_index;
        self
    }

    pub fn matches_relation(&self, relation_type: &str) -> bool {
        match self.relation_type.as_deref() {
            None | Some(WILDCARD) => true,
            Some(t) => t == relation_type,
        }
    }

    pub fn matches_target_label(&self, label: &str) -> bool {
        self.target_label == WILDCARD || self.target_label == label
    }
}

/// Property predicate operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConstraintOp {
    Equals,
    In,
    NotIn,
    GreaterThan,
    LessThan,
    GreaterThanOrEqual,
    LessThanOrEqual,
    /// Substring for strings, membership for list properties.
    Contains,
    StartsWith,
    EndsWith,
    /// Whole-string regular expression match.
    Matches,
}

/// A predicate on a node reached at some step of a pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    pub op: ConstraintOp,
    /// Only nodes with this label are checked.
    #[serde(default)]
    pub node_label: Option<String>,
    pub property_path: String,
    pub value: Value,
    /// `None` applies the constraint at every step.
    #[serde(default)]
    pub at_step: Option<usize>,
}

impl Constraint {
    pub fn new(op: ConstraintOp, property_path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            op,
            node_label: None,
            property_path: property_path.into(),
            value: value.into(),
            at_step: None,
        }
    }

    pub fn equals(property_path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(ConstraintOp::Equals, property_path, value)
    }

    pub fn one_of(property_path: impl Into<String>, values: Vec<Value>) -> Self {
        Self::new(ConstraintOp::In, property_path, Value::List(values))
    }

    pub fn none_of(property_path: impl Into<String>, values: Vec<Value>) -> Self {
        Self::new(ConstraintOp::NotIn, property_path, Value::List(values))
    }

    pub fn greater_than(property_path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(ConstraintOp::GreaterThan, property_path, value)
    }

    pub fn less_than(property_path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(ConstraintOp::LessThan, property_path, value)
    }

    pub fn for_label(mut self, label: impl Into<String>) -> Self {
        self.node_label = Some(label.into());
        self
    }

    pub fn at_step(mut self, step: usize) -> Self {
        self.at_step = Some(step);
        self
    }
}

/// A multi-hop traversal template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphPattern {
    pub pattern_id: String,
    pub steps: Vec<TraversalStep>,
    #[serde(default)]
    pub constraints: Vec<Constraint>,
    #[serde(default)]
    pub description: String,
}

impl GraphPattern {
    pub fn new(pattern_id: impl Into<String>, steps: Vec<TraversalStep>) -> Self {
        let steps = steps
            .into_iter()
            .enumerate()
            .map(|(i, s)| s.at_index(i))
            .collect();
        Self {
            pattern_id: pattern_id.into(),
            steps,
            constraints: Vec::new(),
            description: String::new(),
        }
    }

    pub fn single_hop(
        source_label: impl Into<String>,
        relation_type: impl Into<String>,
        target_label: impl Into<String>,
    ) -> Self {
        Self::new("single_hop", vec![TraversalStep::new(source_label, relation_type, target_label)])
            .with_description("Single hop traversal")
    }

    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// How matched paths are scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RankingStrategy {
    /// Shorter paths rank higher.
    #[default]
    PathLength,
    /// Heavier paths rank higher.
    EdgeWeight,
    /// Paths through well-connected nodes rank higher.
    NodeCentrality,
    /// Paths from better-matching entry points rank higher.
    SemanticScore,
    /// Mix of length, weight and entry similarity.
    Hybrid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CombinatorKind {
    /// Every pattern's paths.
    Union,
    /// Paths touching nodes that every pattern reached.
    Intersection,
    /// Each pattern starts where the previous one ended.
    Sequential,
}

/// Several patterns combined with a logical operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryCombinator {
    pub kind: CombinatorKind,
    pub patterns: Vec<GraphPattern>,
    #[serde(default)]
    pub description: String,
}

impl QueryCombinator {
    pub fn new(kind: CombinatorKind, patterns: Vec<GraphPattern>) -> Self {
        Self { kind, patterns, description: String::new() }
    }
}
