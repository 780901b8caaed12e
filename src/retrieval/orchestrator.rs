//! The hybrid orchestrator: picks a retrieval plan and falls back.
//!
//! Plans are tried in [`RetrievalPlan::CHAIN`] order. A plan is only
//! attempted if the request carries what it needs, and a plan that finds
//! no graph signal reports [`PlanOutcome::Exhausted`] so the next one runs.
//! The last plan, plain vector search, always produces a result.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::try_join_all;
use hashbrown::HashSet;

use super::{
    combine, enrich_query, guarded, harvest_keywords, prioritize_chunks, truncate,
    constraint::resolve_path, EntryPointResolver, PatternExecutor, SubgraphExtractor,
};
use crate::assembler::ContextAssembler;
use crate::config::RetrievalConfig;
use crate::embedding::Embedder;
use crate::model::{Chunk, Node, NodeId, Value};
use crate::query::{GraphQuery, RetrievalRequest, RetrievalResult, RetrievalStrategy};
use crate::storage::{ChunkStore, GraphStore};
use crate::Result;

/// One step of the fallback chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetrievalPlan {
    /// Resolve targets, run declared patterns, return the matched nodes
    /// with their linked chunks.
    PatternTraversal,
    /// Resolve targets, expand a neighbourhood, and use it to steer
    /// vector search.
    TargetedHybrid,
    /// Plain similarity search.
    VectorSearch,
}

impl RetrievalPlan {
    pub const CHAIN: &'static [RetrievalPlan] = &[
        RetrievalPlan::PatternTraversal,
        RetrievalPlan::TargetedHybrid,
        RetrievalPlan::VectorSearch,
    ];

    pub fn can_attempt(self, request: &RetrievalRequest) -> bool {
        let graph_query = request.graph_query.as_ref();
        match self {
            RetrievalPlan::PatternTraversal => graph_query.is_some_and(GraphQuery::uses_patterns),
            RetrievalPlan::TargetedHybrid => {
                graph_query.is_some_and(|q| q.has_targets() && !q.uses_patterns())
            }
            RetrievalPlan::VectorSearch => true,
        }
    }
}

#[derive(Debug)]
pub enum PlanOutcome {
    Useful(RetrievalResult),
    /// No structural signal; try the next plan.
    Exhausted,
}

/// Hybrid graph + vector retriever.
///
/// Holds no per-request state; one instance serves concurrent requests.
pub struct HybridRetriever {
    graph: Arc<dyn GraphStore>,
    chunks: Arc<dyn ChunkStore>,
    embedder: Arc<dyn Embedder>,
    config: RetrievalConfig,
    resolver: EntryPointResolver,
    executor: PatternExecutor,
    extractor: SubgraphExtractor,
}

impl HybridRetriever {
    /// Build a retriever with the default configuration.
    pub fn new(
        graph: Arc<dyn GraphStore>,
        chunks: Arc<dyn ChunkStore>,
        embedder: Arc<dyn Embedder>,
    ) -> Self {
        Self::build(graph, chunks, embedder, RetrievalConfig::default())
    }

    /// Build a retriever with `config`, rejecting invalid settings.
    pub fn with_config(
        graph: Arc<dyn GraphStore>,
        chunks: Arc<dyn ChunkStore>,
        embedder: Arc<dyn Embedder>,
        config: RetrievalConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(graph, chunks, embedder, config))
    }

    fn build(
        graph: Arc<dyn GraphStore>,
        chunks: Arc<dyn ChunkStore>,
        embedder: Arc<dyn Embedder>,
        config: RetrievalConfig,
    ) -> Self {
        let resolver = EntryPointResolver::new(
            Arc::clone(&embedder),
            Arc::clone(&chunks),
            Arc::clone(&graph),
            &config,
        );
        let executor = PatternExecutor::new(Arc::clone(&graph), &config);
        let extractor = SubgraphExtractor::new(Arc::clone(&graph), &config);
        Self { graph, chunks, embedder, config, resolver, executor, extractor }
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    fn timeout(&self) -> Option<Duration> {
        self.config.call_timeout()
    }

    // ========================================================================
    // Retrieval
    // ========================================================================

    /// Answer `request` with the first plan in the chain that finds something.
    #[tracing::instrument(skip_all, fields(top_k = request.top_k, max_graph_nodes = request.max_graph_nodes))]
    pub async fn retrieve(&self, request: &RetrievalRequest) -> Result<RetrievalResult> {
        request.validate()?;
        let started = Instant::now();

        for plan in RetrievalPlan::CHAIN {
            if !plan.can_attempt(request) {
                continue;
            }
            match self.attempt(*plan, request).await? {
                PlanOutcome::Useful(mut result) => {
                    result.retrieval_time_ms = started.elapsed().as_millis() as u64;
                    tracing::info!(
                        plan = ?plan,
                        strategy = %result.strategy,
                        nodes = result.nodes.len(),
                        edges = result.edges.len(),
                        chunks = result.chunks.len(),
                        paths = result.paths.len(),
                        elapsed_ms = result.retrieval_time_ms,
                        "Retrieval complete"
                    );
                    if result.is_thin(self.config.thin_result_threshold) {
                        tracing::debug!(total = result.total_results(), "Thin retrieval result");
                    }
                    return Ok(result);
                }
                PlanOutcome::Exhausted => {
                    tracing::debug!(plan = ?plan, "Plan found no graph signal, falling back");
                }
            }
        }

        // VectorSearch always attempts and is always useful
        let mut result = RetrievalResult::vector_only(Vec::new());
        result.retrieval_time_ms = started.elapsed().as_millis() as u64;
        Ok(result)
    }

    async fn attempt(&self, plan: RetrievalPlan, request: &RetrievalRequest) -> Result<PlanOutcome> {
        match plan {
            RetrievalPlan::PatternTraversal => self.pattern_traversal(request).await,
            RetrievalPlan::TargetedHybrid => self.targeted_hybrid(request).await,
            RetrievalPlan::VectorSearch => self.vector_search(request).await.map(PlanOutcome::Useful),
        }
    }

    async fn pattern_traversal(&self, request: &RetrievalRequest) -> Result<PlanOutcome> {
        let Some(graph_query) = request.graph_query.as_ref() else {
            return Ok(PlanOutcome::Exhausted);
        };

        let entry_points = self.resolver.resolve_scored(&graph_query.targets, request.top_k).await?;
        if entry_points.is_empty() {
            tracing::debug!("No entry points for pattern traversal");
            return Ok(PlanOutcome::Exhausted);
        }

        let ranking = graph_query.ranking_strategy;
        let declared = try_join_all(
            graph_query
                .patterns
                .iter()
                .map(|p| self.executor.execute(p, &entry_points, request.top_k, ranking)),
        );
        let combined = async {
            match &graph_query.combinator {
                Some(c) if !c.patterns.is_empty() => {
                    combine(&self.executor, c, &entry_points, request.top_k, ranking).await
                }
                _ => Ok(Vec::new()),
            }
        };
        let (declared, combined) = futures::try_join!(declared, combined)?;

        let paths: Vec<_> = declared.into_iter().flatten().chain(combined).collect();
        if paths.is_empty() {
            tracing::debug!(entry_points = entry_points.len(), "Patterns matched no paths");
            return Ok(PlanOutcome::Exhausted);
        }

        let mut seen = HashSet::new();
        let node_ids: Vec<NodeId> = paths
            .iter()
            .flat_map(|p| p.node_ids.iter().copied())
            .filter(|id| seen.insert(*id))
            .collect();

        let subgraph = self.extractor.extract(&node_ids, 0).await?;
        let chunks = self.linked_chunks(&node_ids).await?;

        let mut result = RetrievalResult::from_subgraph(subgraph, RetrievalStrategy::Hybrid).with_chunks(chunks);
        result.paths = paths;
        Ok(PlanOutcome::Useful(result))
    }

    async fn targeted_hybrid(&self, request: &RetrievalRequest) -> Result<PlanOutcome> {
        let entry_points = self.resolver.resolve(request.targets(), request.top_k).await?;
        if entry_points.is_empty() {
            tracing::debug!("No entry points resolved, falling back to vector search");
            return Ok(PlanOutcome::Exhausted);
        }

        let hint = request.graph_query.as_ref().and_then(|q| q.traversal.as_ref());
        let depth = self
            .config
            .clamp_depth(hint.map_or(self.config.default_depth, |h| h.max_depth));

        let mut subgraph = self.extractor.extract(&entry_points, depth).await?;
        if let Some(hint) = hint {
            subgraph.retain_relation_types(&hint.relation_types);
        }
        let subgraph = truncate(subgraph, request.max_graph_nodes, &entry_points);

        let keywords = harvest_keywords(&subgraph, self.config.max_graph_keywords);
        let enriched = enrich_query(&request.query, &keywords, &request.semantic_keywords);
        tracing::debug!(depth, keywords = keywords.len(), "Enriched query with graph context");

        let embedding = guarded("embed", self.timeout(), self.embedder.embed(&enriched)).await?;
        let k = self.config.oversampled_k(request.top_k);
        let candidates = guarded(
            "find_top_k_similar",
            self.timeout(),
            self.chunks.find_top_k_similar(&embedding, k),
        )
        .await?;

        let in_context = subgraph.node_ids();
        let chunks = prioritize_chunks(candidates, &in_context, request.top_k);
        let strategy = if chunks
            .iter()
            .any(|c| c.linked_node_id.is_some_and(|id| in_context.contains(&id)))
        {
            RetrievalStrategy::Hybrid
        } else {
            RetrievalStrategy::VectorOnly
        };

        Ok(PlanOutcome::Useful(RetrievalResult::from_subgraph(subgraph, strategy).with_chunks(chunks)))
    }

    async fn vector_search(&self, request: &RetrievalRequest) -> Result<RetrievalResult> {
        let query = enrich_query(&request.query, &[], &request.semantic_keywords);
        let embedding = guarded("embed", self.timeout(), self.embedder.embed(&query)).await?;
        let chunks = guarded(
            "find_top_k_similar",
            self.timeout(),
            self.chunks.find_top_k_similar(&embedding, request.top_k),
        )
        .await?;
        Ok(RetrievalResult::vector_only(chunks))
    }

    async fn linked_chunks(&self, node_ids: &[NodeId]) -> Result<Vec<Chunk>> {
        let per_node = try_join_all(node_ids.iter().map(|id| {
            guarded("find_by_linked_node_id", self.timeout(), self.chunks.find_by_linked_node_id(*id))
        }))
        .await?;

        let mut seen = HashSet::new();
        Ok(per_node.into_iter().flatten().filter(|c| seen.insert(c.id)).collect())
    }

    /// Neighbourhood of `seeds` within `depth` hops (clamped to the
    /// configured maximum), optionally keeping only some relation types.
    #[tracing::instrument(skip_all, fields(seeds = seeds.len(), depth = depth))]
    pub async fn expand(
        &self,
        seeds: &[NodeId],
        depth: usize,
        relation_types: &[String],
    ) -> Result<RetrievalResult> {
        let started = Instant::now();
        let depth = self.config.clamp_depth(depth);

        let mut subgraph = self.extractor.extract(seeds, depth).await?;
        subgraph.retain_relation_types(relation_types);

        let mut result = RetrievalResult::from_subgraph(subgraph, RetrievalStrategy::Expansion);
        result.retrieval_time_ms = started.elapsed().as_millis() as u64;
        tracing::info!(
            nodes = result.nodes.len(),
            edges = result.edges.len(),
            elapsed_ms = result.retrieval_time_ms,
            "Expansion complete"
        );
        Ok(result)
    }

    /// Retrieve, then render the result as prompt context within the
    /// request's token budget.
    pub async fn retrieve_context(&self, request: &RetrievalRequest) -> Result<String> {
        let result = self.retrieve(request).await?;
        Ok(ContextAssembler::new().assemble(&result, request.max_token_budget))
    }

    // ========================================================================
    // Lookups
    // ========================================================================

    pub async fn find_node(&self, id: NodeId) -> Result<Option<Node>> {
        guarded("get_node", self.timeout(), self.graph.get_node(id)).await
    }

    pub async fn find_by_label(&self, label: &str) -> Result<Vec<Node>> {
        guarded("find_nodes_by_label", self.timeout(), self.graph.find_nodes_by_label(label)).await
    }

    /// Nodes with `label` whose property at `property_path` equals `value`.
    /// Dotted paths reach into nested maps.
    pub async fn find_nodes_by_property(
        &self,
        label: &str,
        property_path: &str,
        value: &Value,
    ) -> Result<Vec<Node>> {
        let nodes = self.find_by_label(label).await?;
        Ok(nodes
            .into_iter()
            .filter(|n| resolve_path(&n.properties, property_path).is_some_and(|v| v.loose_eq(value)))
            .collect())
    }
}
