//! Query enrichment from graph context, and graph-aware chunk ordering.

use hashbrown::HashSet;

use crate::model::{Chunk, NodeId, Subgraph};

/// Canonical hyphenated UUID text, which carries no search signal.
fn looks_like_identifier(s: &str) -> bool {
    s.len() == 36 && s.bytes().all(|b| b.is_ascii_hexdigit() || b == b'-')
}

/// Terms describing the subgraph: node labels, scalar property values
/// longer than two characters, then edge relation types. Distinct, in
/// first-seen order, at most `max`.
pub fn harvest_keywords(subgraph: &Subgraph, max: usize) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut keywords = Vec::new();
    let mut push = |kw: String| {
        if keywords.len() < max && seen.insert(kw.clone()) {
            keywords.push(kw);
        }
    };

    for node in &subgraph.nodes {
        push(node.label.clone());

        let mut keys: Vec<&String> = node.properties.keys().collect();
        keys.sort();
        for key in keys {
            let Some(text) = node.properties[key].as_keyword() else { continue };
            if text.chars().count() > 2 && !looks_like_identifier(&text) {
                push(text);
            }
        }
    }
    for edge in &subgraph.edges {
        push(edge.relation_type.clone());
    }

    keywords
}

/// `query` followed by the graph keywords and the caller's keywords.
pub fn enrich_query(query: &str, graph_keywords: &[String], semantic_keywords: &[String]) -> String {
    let mut enriched = query.trim().to_string();
    for kw in graph_keywords.iter().chain(semantic_keywords) {
        let kw = kw.trim();
        if kw.is_empty() {
            continue;
        }
        if !enriched.is_empty() {
            enriched.push(' ');
        }
        enriched.push_str(kw);
    }
    enriched
}

/// Chunks linked to an in-context node first, then the rest, each group in
/// its original order, cut to `top_k`.
pub fn prioritize_chunks(chunks: Vec<Chunk>, in_context: &HashSet<NodeId>, top_k: usize) -> Vec<Chunk> {
    let (linked, unlinked): (Vec<Chunk>, Vec<Chunk>) = chunks
        .into_iter()
        .partition(|c| c.linked_node_id.is_some_and(|id| in_context.contains(&id)));

    linked.into_iter().chain(unlinked).take(top_k).collect()
}
