// Solver instance: dense prizes, effective costs and endpoints for one query
use serde::{Deserialize, Serialize};

use crate::errors::{Result, RetrievalError};
use crate::graph::{Edge, Graph};
use crate::prize::Prizes;

/// How the base cost of an edge is derived
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EdgeCostModel {
    /// Same cost for every edge
    Constant { cost: f64 },
    /// Each edge's own `cost` field
    Attribute,
}

impl Default for EdgeCostModel {
    fn default() -> Self {
        EdgeCostModel::Constant { cost: 0.5 }
    }
}

impl EdgeCostModel {
    pub fn base_cost(&self, edge: &Edge) -> f64 {
        match self {
            EdgeCostModel::Constant { cost } => *cost,
            EdgeCostModel::Attribute => edge.cost,
        }
    }
}

/// Dense PCST instance over graph positions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    pub node_prizes: Vec<f64>,
    /// `max(0, base_cost * multiplier - edge_prize)`
    pub edge_costs: Vec<f64>,
    pub edge_prizes: Vec<f64>,
    pub endpoints: Vec<(usize, usize)>,
}

impl Instance {
    /// Instance with explicit costs and no edge prizes
    ///
    /// Endpoints are node positions and must be below `node_prizes.len()`.
    pub fn new(node_prizes: Vec<f64>, edges: Vec<(usize, usize, f64)>) -> Result<Self> {
        let n = node_prizes.len();
        if let Some((edge, &(u, v, _))) = edges
            .iter()
            .enumerate()
            .find(|(_, (u, v, _))| *u >= n || *v >= n)
        {
            return Err(RetrievalError::MalformedGraph(format!(
                "edge position {} joins ({}, {}) but the instance has {} nodes",
                edge, u, v, n
            )));
        }
        if let Some(prize) = node_prizes.iter().find(|p| !p.is_finite() || **p < 0.0) {
            return Err(RetrievalError::Generic(format!(
                "node prize {} must be finite and non-negative",
                prize
            )));
        }

        let edge_prizes = vec![0.0; edges.len()];
        let (endpoints, edge_costs): (Vec<(usize, usize)>, Vec<f64>) = edges
            .into_iter()
            .map(|(u, v, cost)| ((u, v), cost.max(0.0)))
            .unzip();
        Ok(Self {
            node_prizes,
            edge_costs,
            edge_prizes,
            endpoints,
        })
    }

    /// Derive the instance for one query
    pub fn build(graph: &Graph, prizes: &Prizes, model: EdgeCostModel, multiplier: f64) -> Self {
        let edge_costs = graph
            .edges()
            .iter()
            .zip(prizes.edge_prizes.iter())
            .map(|(edge, prize)| (model.base_cost(edge) * multiplier - prize).max(0.0))
            .collect();

        Self {
            node_prizes: prizes.node_prizes.clone(),
            edge_costs,
            edge_prizes: prizes.edge_prizes.clone(),
            endpoints: (0..graph.edge_count()).map(|e| graph.endpoints(e)).collect(),
        }
    }

    pub fn node_count(&self) -> usize {
        self.node_prizes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.endpoints.len()
    }

    pub fn total_prize(&self) -> f64 {
        self.node_prizes.iter().sum()
    }

    pub fn has_positive_prize(&self) -> bool {
        self.node_prizes.iter().any(|p| *p > 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Node;

    fn graph() -> Graph {
        let nodes = (0..3).map(|i| Node::new(i, vec![1.0])).collect();
        let edges = vec![
            Edge::new(0, 0, 1, vec![1.0]).with_cost(2.0),
            Edge::new(1, 1, 2, vec![1.0]).with_cost(0.25),
        ];
        Graph::new(nodes, edges).unwrap()
    }

    #[test]
    fn test_constant_cost_model() {
        let prizes = Prizes::new(vec![1.0, 0.0, 0.0], vec![0.0, 0.2]);
        let instance = Instance::build(&graph(), &prizes, EdgeCostModel::default(), 1.0);
        assert_eq!(instance.edge_costs[0], 0.5);
        assert!((instance.edge_costs[1] - 0.3).abs() < 1e-12);
        assert_eq!(instance.endpoints, vec![(0, 1), (1, 2)]);
    }

    #[test]
    fn test_attribute_cost_with_multiplier() {
        let prizes = Prizes::zeros(3, 2);
        let instance = Instance::build(&graph(), &prizes, EdgeCostModel::Attribute, 2.0);
        assert_eq!(instance.edge_costs, vec![4.0, 0.5]);
    }

    #[test]
    fn test_out_of_range_endpoint_rejected() {
        let err = Instance::new(vec![1.0, 1.0], vec![(0, 1, 1.0), (1, 2, 1.0)]).unwrap_err();
        assert!(matches!(err, RetrievalError::MalformedGraph(_)));
        assert!(Instance::new(vec![1.0], vec![(0, 0, 1.0)]).is_ok());
    }

    #[test]
    fn test_negative_prize_rejected() {
        let err = Instance::new(vec![1.0, -2.0], Vec::new()).unwrap_err();
        assert!(matches!(err, RetrievalError::Generic(_)));
    }

    #[test]
    fn test_edge_prize_clamped_at_zero() {
        let prizes = Prizes::new(vec![0.0; 3], vec![5.0, 0.0]);
        let instance = Instance::build(&graph(), &prizes, EdgeCostModel::Attribute, 1.0);
        assert_eq!(instance.edge_costs[0], 0.0);
        assert_eq!(instance.edge_prizes[0], 5.0);
    }
}
