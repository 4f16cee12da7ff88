//! Graph record types and the validated `Graph` container

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::errors::{Result, RetrievalError};

/// Node identifier in the source graph
pub type NodeId = u64;

/// Edge identifier in the source graph
pub type EdgeId = u64;

/// Entity record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub embedding: Vec<f32>,
}

impl Node {
    pub fn new(id: NodeId, embedding: Vec<f32>) -> Self {
        Self {
            id,
            label: None,
            embedding,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// Relation record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub embedding: Vec<f32>,
    /// Structural cost, used by the `attribute` edge cost model
    #[serde(default)]
    pub cost: f64,
}

impl Edge {
    pub fn new(id: EdgeId, source: NodeId, target: NodeId, embedding: Vec<f32>) -> Self {
        Self {
            id,
            source,
            target,
            label: None,
            embedding,
            cost: 0.0,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_cost(mut self, cost: f64) -> Self {
        self.cost = cost;
        self
    }
}

/// Validated, read-only knowledge graph
///
/// Nodes and edges are kept sorted by id, so dense positions (`0..n`) follow
/// id order. Every algorithm in the crate breaks ties on positions, which
/// makes "smallest position" and "smallest id" the same rule.
#[derive(Debug, Clone)]
pub struct Graph {
    directed: bool,
    dimension: usize,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    node_positions: HashMap<NodeId, usize>,
    edge_positions: HashMap<EdgeId, usize>,
    endpoints: Vec<(usize, usize)>,
}

impl Graph {
    /// Build an undirected graph
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Result<Self> {
        Self::build(nodes, edges, false)
    }

    /// Build a directed graph
    ///
    /// Direction is preserved in the output but the solver treats every
    /// edge as traversable both ways.
    pub fn directed(nodes: Vec<Node>, edges: Vec<Edge>) -> Result<Self> {
        Self::build(nodes, edges, true)
    }

    pub(crate) fn build(mut nodes: Vec<Node>, mut edges: Vec<Edge>, directed: bool) -> Result<Self> {
        nodes.sort_by_key(|n| n.id);
        edges.sort_by_key(|e| e.id);

        let dimension = nodes
            .first()
            .map(|n| n.embedding.len())
            .or_else(|| edges.first().map(|e| e.embedding.len()))
            .unwrap_or(0);

        let mut node_positions = HashMap::with_capacity(nodes.len());
        for (pos, node) in nodes.iter().enumerate() {
            if node.embedding.len() != dimension {
                return Err(RetrievalError::DimensionMismatch {
                    expected: dimension,
                    actual: node.embedding.len(),
                });
            }
            if node_positions.insert(node.id, pos).is_some() {
                return Err(RetrievalError::MalformedGraph(format!(
                    "duplicate node id {}",
                    node.id
                )));
            }
        }

        let mut edge_positions = HashMap::with_capacity(edges.len());
        let mut endpoints = Vec::with_capacity(edges.len());
        for (pos, edge) in edges.iter().enumerate() {
            if edge.embedding.len() != dimension {
                return Err(RetrievalError::DimensionMismatch {
                    expected: dimension,
                    actual: edge.embedding.len(),
                });
            }
            if edge_positions.insert(edge.id, pos).is_some() {
                return Err(RetrievalError::MalformedGraph(format!(
                    "duplicate edge id {}",
                    edge.id
                )));
            }
            if !edge.cost.is_finite() || edge.cost < 0.0 {
                return Err(RetrievalError::MalformedGraph(format!(
                    "edge {} has invalid cost {}",
                    edge.id, edge.cost
                )));
            }
            let source = node_positions.get(&edge.source).copied();
            let target = node_positions.get(&edge.target).copied();
            match (source, target) {
                (Some(s), Some(t)) => endpoints.push((s, t)),
                _ => {
                    return Err(RetrievalError::MalformedGraph(format!(
                        "edge {} references missing node ({} -> {})",
                        edge.id, edge.source, edge.target
                    )))
                }
            }
        }

        Ok(Self {
            directed,
            dimension,
            nodes,
            edges,
            node_positions,
            edge_positions,
            endpoints,
        })
    }

    pub fn is_directed(&self) -> bool {
        self.directed
    }

    /// Embedding dimension shared by every node and edge
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Dense position of a node id
    pub fn node_position(&self, id: NodeId) -> Option<usize> {
        self.node_positions.get(&id).copied()
    }

    /// Dense position of an edge id
    pub fn edge_position(&self, id: EdgeId) -> Option<usize> {
        self.edge_positions.get(&id).copied()
    }

    pub fn node_by_id(&self, id: NodeId) -> Option<&Node> {
        self.node_position(id).map(|pos| &self.nodes[pos])
    }

    pub fn edge_by_id(&self, id: EdgeId) -> Option<&Edge> {
        self.edge_position(id).map(|pos| &self.edges[pos])
    }

    /// Node positions of an edge's (source, target)
    pub fn endpoints(&self, edge_pos: usize) -> (usize, usize) {
        self.endpoints[edge_pos]
    }
}
