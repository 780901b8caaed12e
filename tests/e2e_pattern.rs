//! End-to-end tests for pattern execution and pattern combinators.
//!
//! Each test builds a small in-memory graph and runs `PatternExecutor`
//! (or `combine`) directly from known entry points.

mod common;

use std::sync::Arc;

use graphfuse::retrieval::{combine, PatternExecutor};
use graphfuse::{
    CombinatorKind, Constraint, ConstraintOp, Direction, Edge, EntryPoint, GraphPattern,
    MemoryGraphStore, Node, NodeId, QueryCombinator, RankingStrategy, RetrievalConfig,
    TraversalStep,
};
use pretty_assertions::assert_eq;

fn executor(graph: &MemoryGraphStore) -> PatternExecutor {
    PatternExecutor::new(Arc::new(graph.clone()), &RetrievalConfig::default())
}

fn treats() -> GraphPattern {
    GraphPattern::new("treats", vec![TraversalStep::new("Doctor", "TREATS", "Patient")])
        .with_description("Doctor treats patient")
}

fn treats_condition() -> GraphPattern {
    GraphPattern::new(
        "treats_condition",
        vec![
            TraversalStep::new("Doctor", "TREATS", "Patient"),
            TraversalStep::new("Patient", "HAS", "Condition"),
        ],
    )
}

// ============================================================================
// Single and multi hop
// ============================================================================

#[tokio::test]
async fn test_single_hop_path_length_score() {
    let graph = MemoryGraphStore::new();
    let doctor = graph.insert_node(Node::labeled("Doctor"));
    let patient = graph.insert_node(Node::labeled("Patient"));
    graph.insert_edge(Edge::new(doctor, patient, "TREATS")).unwrap();

    let paths = executor(&graph)
        .execute(&treats(), &[doctor.into()], 10, RankingStrategy::PathLength)
        .await
        .unwrap();

    assert_eq!(paths.len(), 1);
    assert_eq!(paths[0].node_ids, vec![doctor, patient]);
    assert_eq!(paths[0].relation_types, vec!["TREATS".to_string()]);
    assert_eq!(paths[0].score, 0.5);
    assert_eq!(paths[0].explanation, "Matched pattern: Doctor treats patient");
}

#[tokio::test]
async fn test_two_hop_path() {
    let clinic = common::clinic();
    let paths = executor(&clinic.graph)
        .execute(&treats_condition(), &[clinic.doctor.into()], 10, RankingStrategy::PathLength)
        .await
        .unwrap();

    assert_eq!(paths.len(), 1);
    let path = &paths[0];
    assert_eq!(path.node_ids, vec![clinic.doctor, clinic.patient, clinic.condition]);
    assert_eq!(path.len(), 2);
    assert_eq!(path.node_at_step(1), Some(clinic.patient));
    assert_eq!(path.node_at_step(3), None);
    assert!((path.score - 1.0 / 3.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_wrong_label_yields_nothing() {
    let clinic = common::clinic();
    let pattern = GraphPattern::single_hop("Doctor", "TREATS", "Condition");
    let paths = executor(&clinic.graph)
        .execute(&pattern, &[clinic.doctor.into()], 10, RankingStrategy::PathLength)
        .await
        .unwrap();
    assert!(paths.is_empty());
}

#[tokio::test]
async fn test_missing_entry_point_yields_nothing() {
    let clinic = common::clinic();
    let paths = executor(&clinic.graph)
        .execute(&treats(), &[NodeId::new().into()], 10, RankingStrategy::PathLength)
        .await
        .unwrap();
    assert!(paths.is_empty());
}

// ============================================================================
// Direction
// ============================================================================

#[tokio::test]
async fn test_incoming_direction() {
    let clinic = common::clinic();
    let pattern = GraphPattern::new(
        "treated_by",
        vec![TraversalStep::new("Patient", "TREATS", "Doctor").with_direction(Direction::Incoming)],
    );
    let paths = executor(&clinic.graph)
        .execute(&pattern, &[clinic.patient.into()], 10, RankingStrategy::PathLength)
        .await
        .unwrap();
    assert_eq!(paths.len(), 1);
    assert_eq!(paths[0].end(), Some(clinic.doctor));

    // Outgoing from the patient finds no TREATS edge
    let outgoing = GraphPattern::single_hop("Patient", "TREATS", "Doctor");
    let none = executor(&clinic.graph)
        .execute(&outgoing, &[clinic.patient.into()], 10, RankingStrategy::PathLength)
        .await
        .unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn test_both_directions_with_wildcards() {
    let clinic = common::clinic();
    let pattern = GraphPattern::new(
        "anything",
        vec![TraversalStep::new("Patient", "*", "*").with_direction(Direction::Both)],
    );
    let paths = executor(&clinic.graph)
        .execute(&pattern, &[clinic.patient.into()], 10, RankingStrategy::PathLength)
        .await
        .unwrap();

    let mut ends: Vec<NodeId> = paths.iter().filter_map(|p| p.end()).collect();
    ends.sort();
    let mut expected = vec![clinic.doctor, clinic.condition];
    expected.sort();
    assert_eq!(ends, expected);
}

#[tokio::test]
async fn test_round_trip_returns_to_entry() {
    let graph = MemoryGraphStore::new();
    let a = graph.insert_node(Node::labeled("Person"));
    let b = graph.insert_node(Node::labeled("Person"));
    graph.insert_edge(Edge::new(a, b, "KNOWS")).unwrap();
    graph.insert_edge(Edge::new(b, a, "KNOWS")).unwrap();

    let pattern = GraphPattern::new(
        "round_trip",
        vec![
            TraversalStep::new("Person", "KNOWS", "Person"),
            TraversalStep::new("Person", "KNOWS", "Person"),
        ],
    );
    let paths = executor(&graph)
        .execute(&pattern, &[a.into()], 10, RankingStrategy::PathLength)
        .await
        .unwrap();
    assert_eq!(paths.len(), 1);
    assert_eq!(paths[0].node_ids, vec![a, b, a]);
}

#[tokio::test]
async fn test_colleagues_sharing_a_patient() {
    let graph = MemoryGraphStore::new();
    let house = graph.insert_node(Node::labeled("Doctor"));
    let wilson = graph.insert_node(Node::labeled("Doctor"));
    let patient = graph.insert_node(Node::labeled("Patient"));
    graph.insert_edge(Edge::new(house, patient, "TREATS")).unwrap();
    graph.insert_edge(Edge::new(wilson, patient, "TREATS")).unwrap();

    let pattern = GraphPattern::new(
        "colleagues",
        vec![
            TraversalStep::new("Doctor", "TREATS", "Patient"),
            TraversalStep::new("Patient", "TREATS", "Doctor").with_direction(Direction::Incoming),
        ],
    );
    let paths = executor(&graph)
        .execute(&pattern, &[house.into()], 10, RankingStrategy::PathLength)
        .await
        .unwrap();

    // the entry doctor is a valid other end too
    let ends: Vec<NodeId> = paths.iter().filter_map(|p| p.end()).collect();
    assert_eq!(ends, vec![house, wilson]);
}

#[tokio::test]
async fn test_self_loop_is_a_single_hop() {
    let graph = MemoryGraphStore::new();
    let ceo = graph.insert_node(Node::labeled("Employee"));
    graph.insert_edge(Edge::new(ceo, ceo, "REPORTS_TO")).unwrap();

    let pattern = GraphPattern::new(
        "reports_to",
        vec![TraversalStep::new("Employee", "REPORTS_TO", "Employee")],
    );
    let paths = executor(&graph)
        .execute(&pattern, &[ceo.into()], 10, RankingStrategy::PathLength)
        .await
        .unwrap();
    assert_eq!(paths.len(), 1);
    assert_eq!(paths[0].node_ids, vec![ceo, ceo]);
    assert_eq!(paths[0].relation_types, vec!["REPORTS_TO".to_string()]);
}

// ============================================================================
// Constraints
// ============================================================================

#[tokio::test]
async fn test_constraint_at_step() {
    let graph = MemoryGraphStore::new();
    let doctor = graph.insert_node(Node::labeled("Doctor"));
    let young = graph.insert_node(Node::labeled("Patient").with_property("age", 12));
    let old = graph.insert_node(Node::labeled("Patient").with_property("age", 70));
    graph.insert_edge(Edge::new(doctor, young, "TREATS")).unwrap();
    graph.insert_edge(Edge::new(doctor, old, "TREATS")).unwrap();

    let adults = treats().with_constraint(Constraint::greater_than("age", 18).at_step(0));
    let paths = executor(&graph)
        .execute(&adults, &[doctor.into()], 10, RankingStrategy::PathLength)
        .await
        .unwrap();
    assert_eq!(paths.len(), 1);
    assert_eq!(paths[0].end(), Some(old));

    // A constraint for another step does not filter this one
    let elsewhere = treats().with_constraint(Constraint::greater_than("age", 18).at_step(1));
    let paths = executor(&graph)
        .execute(&elsewhere, &[doctor.into()], 10, RankingStrategy::PathLength)
        .await
        .unwrap();
    assert_eq!(paths.len(), 2);
}

#[tokio::test]
async fn test_label_scoped_regex_constraint() {
    let clinic = common::clinic();
    let pattern = treats_condition()
        .with_constraint(Constraint::new(ConstraintOp::Matches, "name", "dia.*").for_label("Condition"));
    let paths = executor(&clinic.graph)
        .execute(&pattern, &[clinic.doctor.into()], 10, RankingStrategy::PathLength)
        .await
        .unwrap();
    assert_eq!(paths.len(), 1);

    let strict = treats_condition()
        .with_constraint(Constraint::new(ConstraintOp::Matches, "name", "asthma").for_label("Condition"));
    let paths = executor(&clinic.graph)
        .execute(&strict, &[clinic.doctor.into()], 10, RankingStrategy::PathLength)
        .await
        .unwrap();
    assert!(paths.is_empty());
}

// ============================================================================
// Ranking and limits
// ============================================================================

#[tokio::test]
async fn test_edge_weight_ranking_and_max_paths() {
    let graph = MemoryGraphStore::new();
    let doctor = graph.insert_node(Node::labeled("Doctor"));
    let mut patients = Vec::new();
    for weight in [0.2, 0.9, 0.5] {
        let p = graph.insert_node(Node::labeled("Patient"));
        graph.insert_edge(Edge::new(doctor, p, "TREATS").with_weight(weight)).unwrap();
        patients.push(p);
    }

    let paths = executor(&graph)
        .execute(&treats(), &[doctor.into()], 2, RankingStrategy::EdgeWeight)
        .await
        .unwrap();
    assert_eq!(paths.len(), 2);
    assert_eq!(paths[0].end(), Some(patients[1]));
    assert_eq!(paths[1].end(), Some(patients[2]));
}

#[tokio::test]
async fn test_equal_scores_keep_discovery_order() {
    let graph = MemoryGraphStore::new();
    let doctor = graph.insert_node(Node::labeled("Doctor"));
    let first = graph.insert_node(Node::labeled("Patient"));
    let second = graph.insert_node(Node::labeled("Patient"));
    graph.insert_edge(Edge::new(doctor, first, "TREATS")).unwrap();
    graph.insert_edge(Edge::new(doctor, second, "TREATS")).unwrap();

    let paths = executor(&graph)
        .execute(&treats(), &[doctor.into()], 10, RankingStrategy::PathLength)
        .await
        .unwrap();
    let ends: Vec<_> = paths.iter().filter_map(|p| p.end()).collect();
    assert_eq!(ends, vec![first, second]);
}

#[tokio::test]
async fn test_semantic_ranking_uses_entry_score() {
    let graph = MemoryGraphStore::new();
    let weak = graph.insert_node(Node::labeled("Doctor"));
    let strong = graph.insert_node(Node::labeled("Doctor"));
    for doctor in [weak, strong] {
        let p = graph.insert_node(Node::labeled("Patient"));
        graph.insert_edge(Edge::new(doctor, p, "TREATS")).unwrap();
    }

    let entries = [EntryPoint::new(weak, 0.3), EntryPoint::new(strong, 0.8)];
    let paths = executor(&graph)
        .execute(&treats(), &entries, 10, RankingStrategy::SemanticScore)
        .await
        .unwrap();
    assert_eq!(paths[0].start(), Some(strong));
    assert_eq!(paths[0].score, 0.8);
}

#[tokio::test]
async fn test_partial_path_cap() {
    let graph = MemoryGraphStore::new();
    let doctor = graph.insert_node(Node::labeled("Doctor"));
    for _ in 0..20 {
        let p = graph.insert_node(Node::labeled("Patient"));
        graph.insert_edge(Edge::new(doctor, p, "TREATS")).unwrap();
    }

    let config = RetrievalConfig { max_partial_paths: 5, ..RetrievalConfig::default() };
    let executor = PatternExecutor::new(Arc::new(graph), &config);
    let paths = executor
        .execute(&treats(), &[doctor.into()], 100, RankingStrategy::PathLength)
        .await
        .unwrap();
    assert_eq!(paths.len(), 5);
}

#[tokio::test]
async fn test_every_path_has_one_more_node_than_relations() {
    let clinic = common::clinic();
    let pattern = GraphPattern::new(
        "wide",
        vec![
            TraversalStep::new("*", "*", "*").with_direction(Direction::Both),
            TraversalStep::new("*", "*", "*").with_direction(Direction::Both),
        ],
    );
    let entries: Vec<EntryPoint> = [clinic.doctor, clinic.patient, clinic.condition]
        .into_iter()
        .map(EntryPoint::from)
        .collect();

    for ranking in [
        RankingStrategy::PathLength,
        RankingStrategy::EdgeWeight,
        RankingStrategy::NodeCentrality,
        RankingStrategy::Hybrid,
    ] {
        let paths = executor(&clinic.graph).execute(&pattern, &entries, 100, ranking).await.unwrap();
        assert!(!paths.is_empty());
        for path in &paths {
            assert_eq!(path.node_ids.len(), path.relation_types.len() + 1);
        }
    }
}

// ============================================================================
// Combinators
// ============================================================================

#[tokio::test]
async fn test_union_combinator() {
    let clinic = common::clinic();
    let combinator = QueryCombinator::new(CombinatorKind::Union, vec![treats(), treats_condition()]);
    let paths = combine(
        &executor(&clinic.graph),
        &combinator,
        &[clinic.doctor.into()],
        10,
        RankingStrategy::PathLength,
    )
    .await
    .unwrap();
    let ids: Vec<&str> = paths.iter().map(|p| p.pattern_id.as_str()).collect();
    assert_eq!(ids, vec!["treats", "treats_condition"]);
}

#[tokio::test]
async fn test_intersection_combinator() {
    let clinic = common::clinic();
    let other_doctor = clinic.graph.insert_node(Node::labeled("Doctor"));
    let other_patient = clinic.graph.insert_node(Node::labeled("Patient"));
    clinic.graph.insert_edge(Edge::new(other_doctor, other_patient, "TREATS")).unwrap();

    let combinator = QueryCombinator::new(CombinatorKind::Intersection, vec![treats(), treats_condition()]);
    let entries: [EntryPoint; 2] = [clinic.doctor.into(), other_doctor.into()];
    let paths = combine(&executor(&clinic.graph), &combinator, &entries, 10, RankingStrategy::PathLength)
        .await
        .unwrap();

    // Only the first pattern's path through the shared nodes survives
    assert_eq!(paths.len(), 1);
    assert_eq!(paths[0].pattern_id, "treats");
    assert_eq!(paths[0].start(), Some(clinic.doctor));
}

#[tokio::test]
async fn test_sequential_combinator() {
    let clinic = common::clinic();
    let has = GraphPattern::new("has", vec![TraversalStep::new("Patient", "HAS", "Condition")]);
    let combinator = QueryCombinator::new(CombinatorKind::Sequential, vec![treats(), has.clone()]);

    let paths = combine(
        &executor(&clinic.graph),
        &combinator,
        &[clinic.doctor.into()],
        10,
        RankingStrategy::PathLength,
    )
    .await
    .unwrap();
    assert_eq!(paths.len(), 2);
    assert_eq!(paths[1].start(), Some(clinic.patient));
    assert_eq!(paths[1].end(), Some(clinic.condition));

    // A stage that matches nothing empties the whole result
    let broken = QueryCombinator::new(CombinatorKind::Sequential, vec![has, treats()]);
    let paths = combine(
        &executor(&clinic.graph),
        &broken,
        &[clinic.doctor.into()],
        10,
        RankingStrategy::PathLength,
    )
    .await
    .unwrap();
    assert!(paths.is_empty());
}

#[tokio::test]
async fn test_sequential_carries_entry_scores() {
    let clinic = common::clinic();
    let has = GraphPattern::new("has", vec![TraversalStep::new("Patient", "HAS", "Condition")]);
    let combinator = QueryCombinator::new(CombinatorKind::Sequential, vec![treats(), has]);

    let paths = combine(
        &executor(&clinic.graph),
        &combinator,
        &[EntryPoint::new(clinic.doctor, 0.6)],
        10,
        RankingStrategy::SemanticScore,
    )
    .await
    .unwrap();
    assert_eq!(paths.len(), 2);
    assert_eq!(paths[1].start(), Some(clinic.patient));
    assert_eq!(paths[1].score, 0.6);
}
