//! Output subgraph representation

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use std::fmt;

use crate::graph::{EdgeId, NodeId};

/// Node of a materialized subgraph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubgraphNode {
    pub local_id: usize,
    pub original_id: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Edge of a materialized subgraph, endpoints in local ids
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubgraphEdge {
    pub local_id: usize,
    pub original_id: EdgeId,
    pub local_source: usize,
    pub local_target: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Bidirectional local/original id map
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdMap {
    node_originals: Vec<NodeId>,
    edge_originals: Vec<EdgeId>,
    node_locals: BTreeMap<NodeId, usize>,
    edge_locals: BTreeMap<EdgeId, usize>,
}

impl IdMap {
    /// Build from originals listed in local-id order
    pub fn new(node_originals: Vec<NodeId>, edge_originals: Vec<EdgeId>) -> Self {
        let node_locals = node_originals
            .iter()
            .enumerate()
            .map(|(local, &original)| (original, local))
            .collect();
        let edge_locals = edge_originals
            .iter()
            .enumerate()
            .map(|(local, &original)| (original, local))
            .collect();
        Self {
            node_originals,
            edge_originals,
            node_locals,
            edge_locals,
        }
    }

    pub fn to_original_node(&self, local: usize) -> Option<NodeId> {
        self.node_originals.get(local).copied()
    }

    pub fn to_local_node(&self, original: NodeId) -> Option<usize> {
        self.node_locals.get(&original).copied()
    }

    pub fn to_original_edge(&self, local: usize) -> Option<EdgeId> {
        self.edge_originals.get(local).copied()
    }

    pub fn to_local_edge(&self, original: EdgeId) -> Option<usize> {
        self.edge_locals.get(&original).copied()
    }

    /// Original node ids in local-id order
    pub fn node_originals(&self) -> &[NodeId] {
        &self.node_originals
    }

    /// Original edge ids in local-id order
    pub fn edge_originals(&self) -> &[EdgeId] {
        &self.edge_originals
    }
}

/// One `source -> relation -> target` line of textual context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Triple {
    pub source: String,
    pub relation: String,
    pub target: String,
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {} -> {}", self.source, self.relation, self.target)
    }
}

/// Compact re-indexed subgraph
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Subgraph {
    pub nodes: Vec<SubgraphNode>,
    pub edges: Vec<SubgraphEdge>,
    pub id_map: IdMap,
    pub directed: bool,
    /// Output caps removed part of the solver's selection
    pub truncated: bool,
}

impl Subgraph {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Single component when edges are read as undirected
    pub fn is_connected(&self) -> bool {
        if self.nodes.len() <= 1 {
            return true;
        }
        let mut adjacency = vec![Vec::new(); self.nodes.len()];
        for edge in &self.edges {
            adjacency[edge.local_source].push(edge.local_target);
            adjacency[edge.local_target].push(edge.local_source);
        }

        let mut seen = vec![false; self.nodes.len()];
        let mut queue = VecDeque::from([0usize]);
        seen[0] = true;
        let mut reached = 1;
        while let Some(node) = queue.pop_front() {
            for &next in &adjacency[node] {
                if !seen[next] {
                    seen[next] = true;
                    reached += 1;
                    queue.push_back(next);
                }
            }
        }
        reached == self.nodes.len()
    }

    fn node_text(&self, local: usize) -> String {
        let node = &self.nodes[local];
        node.label
            .clone()
            .unwrap_or_else(|| node.original_id.to_string())
    }

    /// Edges as labelled triples, in local edge order
    pub fn triples(&self) -> Vec<Triple> {
        self.edges
            .iter()
            .map(|edge| Triple {
                source: self.node_text(edge.local_source),
                relation: edge
                    .label
                    .clone()
                    .unwrap_or_else(|| edge.original_id.to_string()),
                target: self.node_text(edge.local_target),
            })
            .collect()
    }

    /// Triples one per line; isolated nodes are listed by label
    pub fn textualize(&self) -> String {
        let mut touched = vec![false; self.nodes.len()];
        for edge in &self.edges {
            touched[edge.local_source] = true;
            touched[edge.local_target] = true;
        }

        let mut lines: Vec<String> = self.triples().iter().map(|t| t.to_string()).collect();
        lines.extend(
            (0..self.nodes.len())
                .filter(|&local| !touched[local])
                .map(|local| self.node_text(local)),
        );
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Subgraph {
        Subgraph {
            nodes: vec![
                SubgraphNode { local_id: 0, original_id: 10, label: Some("paris".to_string()) },
                SubgraphNode { local_id: 1, original_id: 20, label: Some("france".to_string()) },
                SubgraphNode { local_id: 2, original_id: 30, label: None },
            ],
            edges: vec![SubgraphEdge {
                local_id: 0,
                original_id: 5,
                local_source: 0,
                local_target: 1,
                label: Some("capital_of".to_string()),
            }],
            id_map: IdMap::new(vec![10, 20, 30], vec![5]),
            directed: true,
            truncated: false,
        }
    }

    #[test]
    fn test_id_map_round_trip() {
        let map = IdMap::new(vec![10, 20, 30], vec![5]);
        for local in 0..3 {
            let original = map.to_original_node(local).unwrap();
            assert_eq!(map.to_local_node(original), Some(local));
        }
        assert_eq!(map.to_original_edge(0), Some(5));
        assert_eq!(map.to_local_edge(5), Some(0));
        assert_eq!(map.to_local_node(99), None);
    }

    #[test]
    fn test_triples_and_text() {
        let subgraph = sample();
        assert_eq!(subgraph.triples()[0].to_string(), "paris -> capital_of -> france");
        assert_eq!(subgraph.textualize(), "paris -> capital_of -> france\n30");
    }

    #[test]
    fn test_connectivity() {
        let mut subgraph = sample();
        assert!(!subgraph.is_connected());
        subgraph.edges.push(SubgraphEdge {
            local_id: 1,
            original_id: 6,
            local_source: 2,
            local_target: 1,
            label: None,
        });
        assert!(subgraph.is_connected());
        assert!(Subgraph::default().is_connected());
    }
}
