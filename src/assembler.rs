//! Prompt context rendering: a `RetrievalResult` as Markdown text.
//!
//! ```text
//! RetrievalResult → ContextAssembler::assemble(budget) → Markdown
//!   header · Semantic Context · Graph Context · Relationships
//! ```
//!
//! Token counts are estimated at four characters per token, rounded up.
//! The header is always written; each section after it stops at the first
//! item that would exceed the budget.

use std::fmt::Write;

use hashbrown::{HashMap, HashSet};

use crate::model::{Node, NodeId, PropertyMap, Value};
use crate::query::RetrievalResult;

const CHARS_PER_TOKEN: usize = 4;

/// Estimated token count of `text`.
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(CHARS_PER_TOKEN)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ContextAssembler;

impl ContextAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render `result` within `max_tokens`.
    pub fn assemble(&self, result: &RetrievalResult, max_tokens: usize) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "## Retrieved Context");
        let _ = writeln!(
            out,
            "Strategy: {} | Retrieved in {} ms",
            result.strategy, result.retrieval_time_ms
        );

        if result.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "No relevant context found.");
            return out;
        }

        let mut budget = Budget { used: estimate_tokens(&out), max: max_tokens };

        // Semantic Context
        let chunk_items = result
            .chunks
            .iter()
            .enumerate()
            .map(|(i, c)| format!("[{}] {}\n", i + 1, c.content.trim()));
        budget.section(&mut out, "Semantic Context", chunk_items);

        // Graph Context
        let node_items = result.nodes.iter().map(|n| format!("- {}\n", describe_node(n)));
        let written = budget.section(&mut out, "Graph Context", node_items);
        let rendered: HashSet<NodeId> = result.nodes.iter().take(written).map(|n| n.id).collect();

        // Relationships between rendered nodes
        let names: HashMap<NodeId, String> = result
            .nodes
            .iter()
            .filter(|n| rendered.contains(&n.id))
            .map(|n| (n.id, display_name(n)))
            .collect();
        let edge_items = result.edges.iter().filter_map(|e| {
            let source = names.get(&e.source)?;
            let target = names.get(&e.target)?;
            Some(format!("- {source} -[{}]-> {target}\n", e.relation_type))
        });
        budget.section(&mut out, "Relationships", edge_items);

        out
    }
}

struct Budget {
    used: usize,
    max: usize,
}

impl Budget {
    fn fits(&self, text: &str) -> bool {
        self.used + estimate_tokens(text) <= self.max
    }

    fn take(&mut self, out: &mut String, text: &str) {
        self.used += estimate_tokens(text);
        out.push_str(text);
    }

    /// Write as many items as fit; returns how many were written.
    fn section(&mut self, out: &mut String, title: &str, items: impl Iterator<Item = String>) -> usize {
        let heading = format!("\n### {title}\n");
        let mut written = 0;
        for item in items {
            let cost = if written > 0 { item } else { format!("{heading}{item}") };
            if !self.fits(&cost) {
                break;
            }
            self.take(out, &cost);
            written += 1;
        }
        written
    }
}

/// `name` or `title` property when present, otherwise label plus id.
fn display_name(node: &Node) -> String {
    ["name", "title"]
        .iter()
        .find_map(|k| node.get(k).and_then(Value::as_str))
        .map(str::to_string)
        .unwrap_or_else(|| format!("{}:{}", node.label, node.id))
}

fn describe_node(node: &Node) -> String {
    let props = format_properties(&node.properties);
    if props.is_empty() {
        format!("({}) {}", node.label, display_name(node))
    } else {
        format!("({}) {} {{{}}}", node.label, display_name(node), props)
    }
}

/// `key: value` pairs, sorted by key, skipping the display name.
fn format_properties(props: &PropertyMap) -> String {
    let mut keys: Vec<&String> = props.keys().filter(|k| *k != "name" && *k != "title").collect();
    keys.sort();
    keys.iter()
        .map(|k| format!("{}: {}", k, props[*k]))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Chunk, Edge, Subgraph};
    use crate::query::RetrievalStrategy;

    fn sample() -> RetrievalResult {
        let doctor = Node::labeled("Doctor").with_property("name", "House").with_property("ward", "B2");
        let patient = Node::labeled("Patient").with_property("name", "Ada");
        let edge = Edge::new(doctor.id, patient.id, "TREATS");
        RetrievalResult::from_subgraph(Subgraph::new(vec![doctor, patient], vec![edge]), RetrievalStrategy::Hybrid)
            .with_chunks(vec![Chunk::new("House treats Ada for diabetes.", vec![1.0])])
    }

    #[test]
    fn test_estimate_tokens() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("abcd"), 1);
        assert_eq!(estimate_tokens("abcde"), 2);
    }

    #[test]
    fn test_full_render() {
        let text = ContextAssembler::new().assemble(&sample(), 4000);
        assert!(text.starts_with("## Retrieved Context\nStrategy: HYBRID"));
        assert!(text.contains("### Semantic Context\n[1] House treats Ada for diabetes."));
        assert!(text.contains("- (Doctor) House {ward: \"B2\"}"));
        assert!(text.contains("- (Patient) Ada"));
        assert!(text.contains("- House -[TREATS]-> Ada"));
    }

    #[test]
    fn test_tight_budget_keeps_header_only() {
        let text = ContextAssembler::new().assemble(&sample(), 5);
        assert!(text.contains("Strategy: HYBRID"));
        assert!(!text.contains("Semantic Context"));
        assert!(!text.contains("Graph Context"));
    }

    #[test]
    fn test_relationships_need_both_endpoints() {
        let header = "## Retrieved Context\nStrategy: HYBRID | Retrieved in 0 ms\n";
        let chunk = "\n### Semantic Context\n[1] House treats Ada for diabetes.\n";
        let first_node = "\n### Graph Context\n- (Doctor) House {ward: \"B2\"}\n";
        let budget = estimate_tokens(header) + estimate_tokens(chunk) + estimate_tokens(first_node);

        let text = ContextAssembler::new().assemble(&sample(), budget);
        assert!(text.contains("(Doctor) House"));
        assert!(!text.contains("(Patient) Ada"));
        assert!(!text.contains("TREATS"));
    }

    #[test]
    fn test_empty_result() {
        let text = ContextAssembler::new().assemble(&RetrievalResult::vector_only(Vec::new()), 100);
        assert!(text.contains("No relevant context found."));
    }
}
