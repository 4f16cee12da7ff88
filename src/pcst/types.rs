//! Solver result and options

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::graph::{EdgeId, NodeId};

/// Pruning applied to the raw growth forest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PruningStrategy {
    /// Keep every growth tree whole
    None,
    /// Repeatedly drop zero-prize leaves
    Simple,
    /// Drop every subtree whose net value does not cover its connecting edge
    #[default]
    Strong,
}

/// Nodes and edges selected by the solver
///
/// Keys are original graph ids, values the prize each element carried into
/// the solve. Every selected edge has both endpoints among the selected
/// nodes. `BTreeMap` keeps iteration order, and therefore serialization,
/// stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PcstResult {
    pub node_prizes: BTreeMap<NodeId, f64>,
    pub edge_prizes: BTreeMap<EdgeId, f64>,
    /// Collected node prizes minus effective edge costs
    pub net_value: f64,
    /// Trees surviving pruning, before single-tree selection
    pub trees: usize,
    /// Growth-phase merge and deactivation events
    pub growth_events: usize,
}

impl PcstResult {
    pub fn is_empty(&self) -> bool {
        self.node_prizes.is_empty()
    }

    pub fn node_ids(&self) -> Vec<NodeId> {
        self.node_prizes.keys().copied().collect()
    }

    pub fn edge_ids(&self) -> Vec<EdgeId> {
        self.edge_prizes.keys().copied().collect()
    }

    pub fn node_count(&self) -> usize {
        self.node_prizes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_prizes.len()
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.node_prizes.contains_key(&id)
    }

    pub fn contains_edge(&self, id: EdgeId) -> bool {
        self.edge_prizes.contains_key(&id)
    }
}
