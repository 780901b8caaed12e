//! Constraint evaluation against node properties.
//!
//! Evaluation is total: a type mismatch, a missing property or a bad
//! regular expression makes the predicate false, never an error.

use std::cmp::Ordering;
use std::collections::HashMap;

use regex::Regex;

use crate::model::{Node, PropertyMap, Value};
use crate::query::{Constraint, ConstraintOp};

/// Checks one pattern's constraints. Built per pattern execution; the
/// `Matches` expressions are compiled once up front and dropped with it.
pub struct ConstraintEvaluator<'a> {
    constraints: &'a [Constraint],
    /// expression → compiled regex, `None` for expressions that failed to compile
    regexes: HashMap<&'a str, Option<Regex>>,
}

impl<'a> ConstraintEvaluator<'a> {
    pub fn new(constraints: &'a [Constraint]) -> Self {
        let mut regexes = HashMap::new();
        for constraint in constraints.iter().filter(|c| c.op == ConstraintOp::Matches) {
            if let Value::String(pattern) = &constraint.value {
                regexes.entry(pattern.as_str()).or_insert_with(|| compile_whole(pattern));
            }
        }
        Self { constraints, regexes }
    }

    /// True when every constraint applicable to `node` at `step_index` holds.
    pub fn evaluate(&self, node: &Node, step_index: usize) -> bool {
        self.constraints
            .iter()
            .filter(|c| applies(c, node, step_index))
            .all(|c| self.check(node, c))
    }

    fn check(&self, node: &Node, constraint: &Constraint) -> bool {
        let actual = resolve_path(&node.properties, &constraint.property_path);
        let expected = &constraint.value;

        match constraint.op {
            ConstraintOp::Equals => actual.is_some_and(|v| v.loose_eq(expected)),
            ConstraintOp::In => match expected.as_list() {
                Some(list) => contains_value(list, actual.unwrap_or(&Value::Null)),
                None => false,
            },
            ConstraintOp::NotIn => match expected.as_list() {
                Some(list) => !contains_value(list, actual.unwrap_or(&Value::Null)),
                None => true,
            },
            ConstraintOp::GreaterThan => compare(actual, expected) == Ordering::Greater,
            ConstraintOp::LessThan => compare(actual, expected) == Ordering::Less,
            ConstraintOp::GreaterThanOrEqual => compare(actual, expected) != Ordering::Less,
            ConstraintOp::LessThanOrEqual => compare(actual, expected) != Ordering::Greater,
            ConstraintOp::Contains => match (actual, expected) {
                (Some(Value::String(s)), Value::String(needle)) => s.contains(needle.as_str()),
                (Some(Value::List(items)), needle) => contains_value(items, needle),
                _ => false,
            },
            ConstraintOp::StartsWith => match (actual, expected) {
                (Some(Value::String(s)), Value::String(prefix)) => s.starts_with(prefix.as_str()),
                _ => false,
            },
            ConstraintOp::EndsWith => match (actual, expected) {
                (Some(Value::String(s)), Value::String(suffix)) => s.ends_with(suffix.as_str()),
                _ => false,
            },
            ConstraintOp::Matches => match (actual, expected) {
                (Some(Value::String(s)), Value::String(pattern)) => self.full_match(pattern, s),
                _ => false,
            },
        }
    }

    fn full_match(&self, pattern: &str, text: &str) -> bool {
        self.regexes
            .get(pattern)
            .and_then(Option::as_ref)
            .is_some_and(|re| re.is_match(text))
    }
}

fn compile_whole(pattern: &str) -> Option<Regex> {
    match Regex::new(&format!("^(?:{pattern})$")) {
        Ok(re) => Some(re),
        Err(e) => {
            tracing::debug!(pattern, error = %e, "Invalid constraint regex");
            None
        }
    }
}

fn applies(constraint: &Constraint, node: &Node, step_index: usize) -> bool {
    if constraint.at_step.is_some_and(|s| s != step_index) {
        return false;
    }
    match &constraint.node_label {
        Some(label) => node.has_label(label),
        None => true,
    }
}

fn contains_value(list: &[Value], needle: &Value) -> bool {
    list.iter().any(|v| v.loose_eq(needle))
}

/// Numeric comparison. Anything that won't read as a number compares equal.
fn compare(actual: Option<&Value>, expected: &Value) -> Ordering {
    match (actual.and_then(Value::to_number), expected.to_number()) {
        (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        _ => Ordering::Equal,
    }
}

/// Look up `path` in `properties`; dotted paths walk nested maps.
pub fn resolve_path<'a>(properties: &'a PropertyMap, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return None;
    }
    let mut segments = path.split('.');
    let first = segments.next()?;
    let mut current = properties.get(first)?;
    for segment in segments {
        current = current.as_map()?.get(segment)?;
    }
    Some(current)
}
