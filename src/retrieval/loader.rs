//! Retrieval loader
//!
//! # Pipeline
//! 1. Score nodes and edges against the query embedding
//! 2. Assign rank-based prizes; no prize means an empty outcome
//! 3. Solve the PCST instance
//! 4. Materialize and re-index the selection
//!
//! A cancellation token is checked before steps 1, 2 and 3. Once the solver
//! runs, the query completes.
//!
//! # Batches
//! Configuration and dimensionality are checked for every query before any
//! work is dispatched, and abort the whole batch. Each query then runs on a
//! blocking worker behind a semaphore sized by `BatchConfig::workers`; a
//! per-query timeout fails only that query's slot. The worker keeps its
//! permit until the abandoned work actually stops, so at most `workers`
//! pipelines ever run at once.
//!
//! Outcome telemetry (subgraph, empty, failure, timeout, cancellation) is
//! recorded once per query from the result the caller receives.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::future::join_all;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio_util::sync::CancellationToken;

use crate::embedding::{CacheStats, EmbeddingCache};
use crate::errors::{Result, RetrievalError};
use crate::graph::Graph;
use crate::materialize::SubgraphMaterializer;
use crate::pcst::PcstSolver;
use crate::prize::PrizeAssigner;
use crate::retrieval::config::{BatchConfig, RetrievalConfig};
use crate::retrieval::stream::RetrievalStream;
use crate::retrieval::types::{Query, RetrievalOutcome};
use crate::scoring::SimilarityScorer;
use crate::telemetry::{TelemetryCollector, TelemetryEvent};

/// The four pipeline stages configured for one session
#[derive(Debug, Clone)]
struct Pipeline {
    scorer: SimilarityScorer,
    assigner: PrizeAssigner,
    solver: PcstSolver,
    materializer: SubgraphMaterializer,
}

impl Pipeline {
    fn new(config: &RetrievalConfig) -> Self {
        Self {
            scorer: SimilarityScorer::new(config.similarity),
            assigner: PrizeAssigner::from_config(config),
            solver: PcstSolver::from_config(config),
            materializer: SubgraphMaterializer::from_config(config),
        }
    }

    fn run(
        &self,
        index: usize,
        query: &Query,
        graph: &Graph,
        cache: Option<&EmbeddingCache>,
        telemetry: &TelemetryCollector,
        token: Option<&CancellationToken>,
    ) -> Result<RetrievalOutcome> {
        let checkpoint = |stage: &str| -> Result<()> {
            if token.map_or(false, CancellationToken::is_cancelled) {
                tracing::debug!(query = index, stage, "Query cancelled");
                return Err(RetrievalError::Cancelled);
            }
            Ok(())
        };

        telemetry.record(TelemetryEvent::QueryStarted {
            query: index,
            timestamp: Instant::now(),
        });

        checkpoint("scoring")?;
        let scores = self.scorer.score(&query.embedding, graph, cache)?;

        checkpoint("prizes")?;
        let prizes = self.assigner.assign(&scores);
        telemetry.record(TelemetryEvent::PrizesAssigned {
            query: index,
            eligible_nodes: prizes.eligible_nodes(),
            eligible_edges: prizes.eligible_edges(),
            timestamp: Instant::now(),
        });
        if prizes.is_empty() {
            return Ok(empty(index));
        }

        checkpoint("solver")?;
        let started = Instant::now();
        let selection = self.solver.solve(graph, &prizes)?;
        telemetry.record(TelemetryEvent::SolverCompleted {
            query: index,
            nodes: selection.node_count(),
            edges: selection.edge_count(),
            growth_events: selection.growth_events,
            duration_ms: started.elapsed().as_millis() as u64,
            timestamp: Instant::now(),
        });
        if selection.is_empty() {
            return Ok(empty(index));
        }

        let subgraph = self.materializer.materialize(graph, &selection)?;
        if subgraph.is_empty() {
            return Ok(empty(index));
        }
        tracing::debug!(
            query = index,
            nodes = subgraph.node_count(),
            edges = subgraph.edge_count(),
            "Subgraph retrieved"
        );
        Ok(RetrievalOutcome::Subgraph(subgraph))
    }
}

fn empty(index: usize) -> RetrievalOutcome {
    tracing::debug!(query = index, "No relevant content");
    RetrievalOutcome::Empty
}

/// Retrieve one subgraph without a long-lived loader
pub fn retrieve(query: &Query, graph: &Graph, config: &RetrievalConfig) -> Result<RetrievalOutcome> {
    config.validate()?;
    Pipeline::new(config).run(0, query, graph, None, &TelemetryCollector::new(), None)
}

/// Retrieval session over one shared, read-only graph
#[derive(Debug, Clone)]
pub struct RetrievalLoader {
    graph: Arc<Graph>,
    config: RetrievalConfig,
    batch: BatchConfig,
    cache: Arc<EmbeddingCache>,
    telemetry: TelemetryCollector,
    pipeline: Pipeline,
}

impl RetrievalLoader {
    /// Create a loader; fails fast on an invalid configuration
    pub fn new(graph: Graph, config: RetrievalConfig) -> Result<Self> {
        Self::from_shared(Arc::new(graph), config)
    }

    pub fn from_shared(graph: Arc<Graph>, config: RetrievalConfig) -> Result<Self> {
        config.validate()?;
        tracing::info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            dimension = graph.dimension(),
            "Retrieval loader ready"
        );
        let elements = (graph.node_count() + graph.edge_count()) as u64;
        Ok(Self {
            pipeline: Pipeline::new(&config),
            cache: Arc::new(EmbeddingCache::with_capacity(elements)),
            graph,
            config,
            batch: BatchConfig::default(),
            telemetry: TelemetryCollector::new(),
        })
    }

    pub fn with_batch_config(mut self, batch: BatchConfig) -> Self {
        self.batch = batch;
        self
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    pub fn batch_config(&self) -> &BatchConfig {
        &self.batch
    }

    pub fn telemetry(&self) -> &TelemetryCollector {
        &self.telemetry
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Retrieve the subgraph for one query
    pub fn retrieve(&self, query: &Query) -> Result<RetrievalOutcome> {
        self.retrieve_indexed(0, query, None)
    }

    /// Retrieve, abandoning the query if `token` fires before the solver
    pub fn retrieve_cancellable(
        &self,
        query: &Query,
        token: &CancellationToken,
    ) -> Result<RetrievalOutcome> {
        self.retrieve_indexed(0, query, Some(token))
    }

    pub(crate) fn retrieve_indexed(
        &self,
        index: usize,
        query: &Query,
        token: Option<&CancellationToken>,
    ) -> Result<RetrievalOutcome> {
        let result = self.execute(index, query, token);
        self.record_outcome(index, &result);
        result
    }

    /// Run the pipeline; stage events only, the outcome is not recorded
    fn execute(
        &self,
        index: usize,
        query: &Query,
        token: Option<&CancellationToken>,
    ) -> Result<RetrievalOutcome> {
        let result = self.pipeline.run(
            index,
            query,
            &self.graph,
            Some(&self.cache),
            &self.telemetry,
            token,
        );
        self.telemetry.record_cache(self.cache.stats());
        result
    }

    /// Record the outcome a caller actually receives
    fn record_outcome(&self, index: usize, result: &Result<RetrievalOutcome>) {
        let timestamp = Instant::now();
        let event = match result {
            Ok(RetrievalOutcome::Subgraph(subgraph)) => TelemetryEvent::Materialized {
                query: index,
                nodes: subgraph.node_count(),
                edges: subgraph.edge_count(),
                truncated: subgraph.truncated,
                timestamp,
            },
            Ok(RetrievalOutcome::Empty) => TelemetryEvent::EmptyResult {
                query: index,
                timestamp,
            },
            Err(RetrievalError::Cancelled) => TelemetryEvent::QueryCancelled {
                query: index,
                timestamp,
            },
            Err(RetrievalError::Timeout { duration_ms }) => TelemetryEvent::QueryTimedOut {
                query: index,
                duration_ms: *duration_ms,
                timestamp,
            },
            Err(err) => {
                tracing::warn!(query = index, error = %err, "Query failed");
                TelemetryEvent::QueryFailed {
                    query: index,
                    error: err.to_string(),
                    timestamp,
                }
            }
        };
        self.telemetry.record(event);
    }

    /// Batch-fatal checks run before any query is dispatched
    pub(crate) fn check_batch(&self, queries: &[Query]) -> Result<()> {
        self.config.validate()?;
        if self.graph.is_empty() {
            return Ok(());
        }
        let expected = self.graph.dimension();
        match queries.iter().find(|q| q.embedding.len() != expected) {
            Some(query) => Err(RetrievalError::DimensionMismatch {
                expected,
                actual: query.embedding.len(),
            }),
            None => Ok(()),
        }
    }

    /// Retrieve every query concurrently; results keep input order
    ///
    /// The outer error is batch-fatal; each inner result belongs to one
    /// query.
    pub async fn retrieve_batch(
        &self,
        queries: Vec<Query>,
    ) -> Result<Vec<Result<RetrievalOutcome>>> {
        self.check_batch(&queries)?;

        let workers = self.batch.effective_workers();
        let timeout = self.batch.timeout_ms.map(Duration::from_millis);
        let semaphore = Arc::new(Semaphore::new(workers));
        let batch_token = CancellationToken::new();
        tracing::info!(queries = queries.len(), workers, "Dispatching retrieval batch");

        let mut handles = Vec::with_capacity(queries.len());
        for (index, query) in queries.into_iter().enumerate() {
            let loader = self.clone();
            let semaphore = Arc::clone(&semaphore);
            let token = batch_token.child_token();
            handles.push(tokio::spawn(async move {
                let permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|e| RetrievalError::WorkerFailed(e.to_string()))?;
                loader.run_worker(index, query, permit, token, timeout).await
            }));
        }

        let results = join_all(handles)
            .await
            .into_iter()
            .map(|joined| match joined {
                Ok(result) => result,
                Err(e) => Err(RetrievalError::WorkerFailed(e.to_string())),
            })
            .collect();
        Ok(results)
    }

    /// Run one query on a blocking worker
    ///
    /// The permit moves into the blocking task, so the worker slot stays
    /// taken until the work itself ends, even after a timeout has already
    /// failed the query's slot.
    async fn run_worker(
        &self,
        index: usize,
        query: Query,
        permit: OwnedSemaphorePermit,
        token: CancellationToken,
        timeout: Option<Duration>,
    ) -> Result<RetrievalOutcome> {
        let loader = self.clone();
        let worker_token = token.clone();
        let task = tokio::task::spawn_blocking(move || {
            let result = loader.execute(index, &query, Some(&worker_token));
            loader.telemetry.record(TelemetryEvent::WorkerReleased {
                query: index,
                timestamp: Instant::now(),
            });
            drop(permit);
            result
        });

        let result = match timeout {
            Some(limit) => match tokio::time::timeout(limit, task).await {
                Ok(joined) => joined.unwrap_or_else(|e| Err(RetrievalError::WorkerFailed(e.to_string()))),
                Err(_) => {
                    // The blocking task stops at its next checkpoint; its result is dropped
                    token.cancel();
                    let duration_ms = limit.as_millis() as u64;
                    tracing::warn!(query = index, duration_ms, "Query timed out");
                    Err(RetrievalError::Timeout { duration_ms })
                }
            },
            None => task
                .await
                .unwrap_or_else(|e| Err(RetrievalError::WorkerFailed(e.to_string()))),
        };
        self.record_outcome(index, &result);
        result
    }

    /// Lazy, restartable sequence of per-query results
    pub fn stream<'a>(&'a self, queries: &'a [Query]) -> Result<RetrievalStream<'a>> {
        self.check_batch(queries)?;
        Ok(RetrievalStream::new(self, queries))
    }
}
