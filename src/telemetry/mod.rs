//! Telemetry for retrieval pipelines
//!
//! Collects per-query pipeline events and keeps aggregated statistics.
//! The collector is cheap to clone and shared by every batch worker.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::embedding::CacheStats;

/// Telemetry event types
#[derive(Debug, Clone)]
pub enum TelemetryEvent {
    QueryStarted {
        query: usize,
        timestamp: Instant,
    },
    PrizesAssigned {
        query: usize,
        eligible_nodes: usize,
        eligible_edges: usize,
        timestamp: Instant,
    },
    SolverCompleted {
        query: usize,
        nodes: usize,
        edges: usize,
        growth_events: usize,
        duration_ms: u64,
        timestamp: Instant,
    },
    Materialized {
        query: usize,
        nodes: usize,
        edges: usize,
        truncated: bool,
        timestamp: Instant,
    },
    EmptyResult {
        query: usize,
        timestamp: Instant,
    },
    QueryFailed {
        query: usize,
        error: String,
        timestamp: Instant,
    },
    QueryTimedOut {
        query: usize,
        duration_ms: u64,
        timestamp: Instant,
    },
    QueryCancelled {
        query: usize,
        timestamp: Instant,
    },
    /// A batch worker finished its blocking work and freed its slot
    WorkerReleased {
        query: usize,
        timestamp: Instant,
    },
}

/// Telemetry statistics
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TelemetryStats {
    pub queries_started: usize,
    pub subgraphs_returned: usize,
    pub empty_results: usize,
    pub failures: usize,
    pub timeouts: usize,
    pub cancellations: usize,
    pub truncations: usize,
    pub growth_events: usize,
    pub solver_time_ms: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
}

/// Telemetry collector
#[derive(Clone)]
pub struct TelemetryCollector {
    events: Arc<Mutex<Vec<TelemetryEvent>>>,
    stats: Arc<Mutex<TelemetryStats>>,
    start_time: Instant,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl TelemetryCollector {
    /// Create a new telemetry collector
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
            stats: Arc::new(Mutex::new(TelemetryStats::default())),
            start_time: Instant::now(),
        }
    }

    /// Record an event
    pub fn record(&self, event: TelemetryEvent) {
        {
            let mut stats = lock(&self.stats);
            match &event {
                TelemetryEvent::QueryStarted { .. } => stats.queries_started += 1,
                TelemetryEvent::PrizesAssigned { .. } => {}
                TelemetryEvent::SolverCompleted {
                    growth_events,
                    duration_ms,
                    ..
                } => {
                    stats.growth_events += growth_events;
                    stats.solver_time_ms += duration_ms;
                }
                TelemetryEvent::Materialized { truncated, .. } => {
                    stats.subgraphs_returned += 1;
                    if *truncated {
                        stats.truncations += 1;
                    }
                }
                TelemetryEvent::EmptyResult { .. } => stats.empty_results += 1,
                TelemetryEvent::QueryFailed { .. } => stats.failures += 1,
                TelemetryEvent::QueryTimedOut { .. } => stats.timeouts += 1,
                TelemetryEvent::QueryCancelled { .. } => stats.cancellations += 1,
                TelemetryEvent::WorkerReleased { .. } => {}
            }
        }

        lock(&self.events).push(event);
    }

    /// Copy embedding cache counters into the stats
    pub fn record_cache(&self, cache: CacheStats) {
        let mut stats = lock(&self.stats);
        stats.cache_hits = cache.hits;
        stats.cache_misses = cache.misses;
    }

    /// Get current statistics
    pub fn get_stats(&self) -> TelemetryStats {
        lock(&self.stats).clone()
    }

    /// Get elapsed time since start
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Get event count
    pub fn event_count(&self) -> usize {
        lock(&self.events).len()
    }

    /// Get recent events (last n)
    pub fn recent_events(&self, n: usize) -> Vec<TelemetryEvent> {
        let events = lock(&self.events);
        let start = events.len().saturating_sub(n);
        events[start..].to_vec()
    }

    /// Share of finished queries that returned a subgraph or an empty result
    pub fn success_rate(&self) -> f64 {
        let stats = lock(&self.stats);
        let ok = stats.subgraphs_returned + stats.empty_results;
        let total = ok + stats.failures + stats.timeouts + stats.cancellations;
        if total == 0 {
            1.0
        } else {
            ok as f64 / total as f64
        }
    }

    /// One-paragraph summary for the command line
    pub fn summary(&self) -> String {
        let stats = self.get_stats();
        format!(
            "queries: {}, subgraphs: {}, empty: {}, failed: {}, timed out: {}, \
             cancelled: {}, truncated: {}, solver: {}ms, cache hits/misses: {}/{}, elapsed: {:?}",
            stats.queries_started,
            stats.subgraphs_returned,
            stats.empty_results,
            stats.failures,
            stats.timeouts,
            stats.cancellations,
            stats.truncations,
            stats.solver_time_ms,
            stats.cache_hits,
            stats.cache_misses,
            self.elapsed()
        )
    }
}

impl Default for TelemetryCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TelemetryCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelemetryCollector")
            .field("events", &self.event_count())
            .field("stats", &self.get_stats())
            .finish()
    }
}
