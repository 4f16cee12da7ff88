//! PCST solver: growth, pruning and single-tree selection
//!
//! # Flow
//! 1. Build the dense instance (effective edge costs from the cost model)
//! 2. Grow moats until no merge or deactivation remains
//! 3. Prune each growth tree with the configured strategy
//! 4. When connectivity is enforced, root the forest at a virtual node and
//!    keep the single tree it selects
//!
//! Virtual edges are priced above the total prize, which no moat can reach
//! during growth, so they never become tight there and only enter at the
//! pruning stage.

use std::time::Instant;

use crate::errors::{Result, RetrievalError};
use crate::graph::Graph;
use crate::pcst::growth::grow;
use crate::pcst::instance::{EdgeCostModel, Instance};
use crate::pcst::prune::{prune_forest, select_rooted, PrunedTree};
use crate::pcst::types::{PcstResult, PruningStrategy};
use crate::prize::Prizes;
use crate::retrieval::config::RetrievalConfig;

/// Approximate Prize-Collecting Steiner Tree solver
#[derive(Debug, Clone)]
pub struct PcstSolver {
    cost_model: EdgeCostModel,
    cost_multiplier: f64,
    pruning: PruningStrategy,
    enforce_connectivity: bool,
    virtual_root_cost: f64,
}

impl Default for PcstSolver {
    fn default() -> Self {
        Self::from_config(&RetrievalConfig::default())
    }
}

impl PcstSolver {
    pub fn from_config(config: &RetrievalConfig) -> Self {
        Self {
            cost_model: config.edge_cost_model,
            cost_multiplier: config.node_cost_multiplier,
            pruning: config.pruning,
            enforce_connectivity: config.enforce_connectivity,
            virtual_root_cost: config.virtual_root_cost,
        }
    }

    pub fn with_pruning(mut self, pruning: PruningStrategy) -> Self {
        self.pruning = pruning;
        self
    }

    pub fn with_connectivity(mut self, enforce: bool) -> Self {
        self.enforce_connectivity = enforce;
        self
    }

    pub fn with_cost_model(mut self, model: EdgeCostModel) -> Self {
        self.cost_model = model;
        self
    }

    /// Solve over `graph` with prizes aligned to its positions
    pub fn solve(&self, graph: &Graph, prizes: &Prizes) -> Result<PcstResult> {
        if prizes.node_prizes.len() != graph.node_count()
            || prizes.edge_prizes.len() != graph.edge_count()
        {
            return Err(RetrievalError::Generic(format!(
                "prize vectors ({} nodes, {} edges) do not match graph ({} nodes, {} edges)",
                prizes.node_prizes.len(),
                prizes.edge_prizes.len(),
                graph.node_count(),
                graph.edge_count()
            )));
        }
        if prizes
            .node_prizes
            .iter()
            .chain(prizes.edge_prizes.iter())
            .any(|p| !p.is_finite() || *p < 0.0)
        {
            return Err(RetrievalError::Generic(
                "prizes must be finite and non-negative".to_string(),
            ));
        }

        let started = Instant::now();
        let instance = Instance::build(graph, prizes, self.cost_model, self.cost_multiplier);
        let (selected, trees, growth_events) = self.solve_instance(&instance);

        let mut result = PcstResult {
            trees,
            growth_events,
            ..PcstResult::default()
        };
        for tree in &selected {
            for &pos in &tree.nodes {
                result
                    .node_prizes
                    .insert(graph.nodes()[pos].id, instance.node_prizes[pos]);
            }
            for &pos in &tree.edges {
                result
                    .edge_prizes
                    .insert(graph.edges()[pos].id, instance.edge_prizes[pos]);
            }
            result.net_value += tree.net_value;
        }

        tracing::debug!(
            nodes = result.node_count(),
            edges = result.edge_count(),
            trees = result.trees,
            events = result.growth_events,
            net_value = result.net_value,
            elapsed_us = started.elapsed().as_micros() as u64,
            "PCST solve finished"
        );
        Ok(result)
    }

    /// Solve a dense instance; returns kept trees, surviving tree count and
    /// growth events
    pub fn solve_instance(&self, instance: &Instance) -> (Vec<PrunedTree>, usize, usize) {
        if !instance.has_positive_prize() {
            return (Vec::new(), 0, 0);
        }

        let (forest_edges, events) = if instance.edge_count() == 0 {
            (Vec::new(), 0)
        } else {
            let record = grow(instance);
            (record.forest_edges, record.events)
        };

        let trees = prune_forest(instance, &forest_edges, self.pruning);
        let tree_count = trees.len();
        if !self.enforce_connectivity {
            return (trees, tree_count, events);
        }

        let floor = instance.total_prize() + 1.0;
        let root_cost = if self.virtual_root_cost > floor {
            self.virtual_root_cost
        } else {
            tracing::debug!(
                configured = self.virtual_root_cost,
                raised_to = floor,
                "Virtual root cost raised above total prize"
            );
            floor
        };
        (select_rooted(trees, root_cost), tree_count, events)
    }
}
