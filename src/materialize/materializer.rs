//! Selection → compact subgraph
//!
//! Output caps are applied lowest prize first (larger id first on ties),
//! nodes before edges; an edge losing either endpoint goes with it. Local
//! ids follow ascending original ids.

use std::collections::{BTreeMap, BTreeSet};

use crate::errors::{Result, RetrievalError};
use crate::graph::{EdgeId, Graph, NodeId};
use crate::materialize::types::{IdMap, Subgraph, SubgraphEdge, SubgraphNode};
use crate::pcst::PcstResult;
use crate::retrieval::config::RetrievalConfig;

#[derive(Debug, Clone)]
pub struct SubgraphMaterializer {
    max_nodes: usize,
    max_edges: usize,
}

impl Default for SubgraphMaterializer {
    fn default() -> Self {
        Self::from_config(&RetrievalConfig::default())
    }
}

impl SubgraphMaterializer {
    pub fn new(max_nodes: usize, max_edges: usize) -> Self {
        Self {
            max_nodes,
            max_edges,
        }
    }

    pub fn from_config(config: &RetrievalConfig) -> Self {
        Self::new(config.max_output_nodes, config.max_output_edges)
    }

    pub fn max_nodes(&self) -> usize {
        self.max_nodes
    }

    pub fn max_edges(&self) -> usize {
        self.max_edges
    }

    /// Build the output subgraph for `selection` over `graph`
    pub fn materialize(&self, graph: &Graph, selection: &PcstResult) -> Result<Subgraph> {
        for &id in selection.node_prizes.keys() {
            if graph.node_by_id(id).is_none() {
                return Err(RetrievalError::MalformedGraph(format!(
                    "selected node {} is not in the graph",
                    id
                )));
            }
        }
        for &id in selection.edge_prizes.keys() {
            let edge = graph.edge_by_id(id).ok_or_else(|| {
                RetrievalError::MalformedGraph(format!("selected edge {} is not in the graph", id))
            })?;
            if !selection.contains_node(edge.source) || !selection.contains_node(edge.target) {
                return Err(RetrievalError::MalformedGraph(format!(
                    "selected edge {} has an endpoint outside the selection",
                    id
                )));
            }
        }

        let nodes: BTreeSet<NodeId> = keep_highest(&selection.node_prizes, self.max_nodes);
        let reachable: BTreeMap<EdgeId, f64> = selection
            .edge_prizes
            .iter()
            .filter(|(id, _)| {
                graph
                    .edge_by_id(**id)
                    .map_or(false, |e| nodes.contains(&e.source) && nodes.contains(&e.target))
            })
            .map(|(&id, &prize)| (id, prize))
            .collect();
        let edges: BTreeSet<EdgeId> = keep_highest(&reachable, self.max_edges);

        let truncated =
            nodes.len() < selection.node_count() || edges.len() < selection.edge_count();
        if truncated {
            tracing::debug!(
                selected_nodes = selection.node_count(),
                selected_edges = selection.edge_count(),
                kept_nodes = nodes.len(),
                kept_edges = edges.len(),
                "Subgraph truncated to output caps"
            );
        }

        let id_map = IdMap::new(
            nodes.iter().copied().collect(),
            edges.iter().copied().collect(),
        );

        let mut out_nodes = Vec::with_capacity(nodes.len());
        for (local_id, &original_id) in id_map.node_originals().iter().enumerate() {
            let label = graph.node_by_id(original_id).and_then(|n| n.label.clone());
            out_nodes.push(SubgraphNode {
                local_id,
                original_id,
                label,
            });
        }

        let mut out_edges = Vec::with_capacity(edges.len());
        for (local_id, &original_id) in id_map.edge_originals().iter().enumerate() {
            let edge = graph.edge_by_id(original_id).ok_or_else(|| {
                RetrievalError::MalformedGraph(format!("edge {} vanished", original_id))
            })?;
            let local = |node: NodeId| {
                id_map.to_local_node(node).ok_or_else(|| {
                    RetrievalError::MalformedGraph(format!(
                        "edge {} endpoint {} not materialized",
                        original_id, node
                    ))
                })
            };
            out_edges.push(SubgraphEdge {
                local_id,
                original_id,
                local_source: local(edge.source)?,
                local_target: local(edge.target)?,
                label: edge.label.clone(),
            });
        }

        Ok(Subgraph {
            nodes: out_nodes,
            edges: out_edges,
            id_map,
            directed: graph.is_directed(),
            truncated,
        })
    }
}

/// Ids of the `cap` highest-prize entries, ties kept by smaller id
fn keep_highest(prizes: &BTreeMap<u64, f64>, cap: usize) -> BTreeSet<u64> {
    if prizes.len() <= cap {
        return prizes.keys().copied().collect();
    }
    let mut ranked: Vec<(u64, f64)> = prizes.iter().map(|(&id, &p)| (id, p)).collect();
    ranked.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    ranked.into_iter().take(cap).map(|(id, _)| id).collect()
}
