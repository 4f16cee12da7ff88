//! Prize vectors aligned with graph positions

use serde::{Deserialize, Serialize};

/// Node and edge prizes, indexed by dense graph position
///
/// Every value is finite and non-negative; elements outside the top-k
/// selection hold exactly zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Prizes {
    pub node_prizes: Vec<f64>,
    pub edge_prizes: Vec<f64>,
}

impl Prizes {
    pub fn new(node_prizes: Vec<f64>, edge_prizes: Vec<f64>) -> Self {
        Self {
            node_prizes,
            edge_prizes,
        }
    }

    /// Zero prizes for a graph of the given size
    pub fn zeros(node_count: usize, edge_count: usize) -> Self {
        Self::new(vec![0.0; node_count], vec![0.0; edge_count])
    }

    /// No node and no edge carries a positive prize
    pub fn is_empty(&self) -> bool {
        self.node_prizes
            .iter()
            .chain(self.edge_prizes.iter())
            .all(|p| *p <= 0.0)
    }

    pub fn total_node_prize(&self) -> f64 {
        self.node_prizes.iter().sum()
    }

    pub fn total_edge_prize(&self) -> f64 {
        self.edge_prizes.iter().sum()
    }

    /// Number of nodes with a positive prize
    pub fn eligible_nodes(&self) -> usize {
        self.node_prizes.iter().filter(|p| **p > 0.0).count()
    }

    /// Number of edges with a positive prize
    pub fn eligible_edges(&self) -> usize {
        self.edge_prizes.iter().filter(|p| **p > 0.0).count()
    }
}
