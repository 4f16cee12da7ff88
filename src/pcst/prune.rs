//! Pruning of the growth forest
//!
//! Each connected tree of the growth forest is rooted at its highest-prize
//! node (smallest position on ties) and pruned bottom-up. Strong pruning
//! keeps the edge to a child only when the child's subtree, after its own
//! pruning, is worth more than the edge: exactly the edges whose removal
//! would cut off positive net value.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::pcst::instance::Instance;
use crate::pcst::types::PruningStrategy;

/// One tree left after pruning, in dense positions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrunedTree {
    /// Sorted node positions
    pub nodes: Vec<usize>,
    /// Sorted edge positions
    pub edges: Vec<usize>,
    pub net_value: f64,
}

/// Prune every tree of the growth forest
///
/// Isolated nodes with a positive prize come back as singleton trees.
/// Trees whose net value is not positive are dropped.
pub fn prune_forest(
    instance: &Instance,
    forest_edges: &[usize],
    strategy: PruningStrategy,
) -> Vec<PrunedTree> {
    let n = instance.node_count();
    let mut adjacency: Vec<Vec<(usize, usize)>> = vec![Vec::new(); n];
    let mut sorted_edges = forest_edges.to_vec();
    sorted_edges.sort_unstable();
    for &edge in &sorted_edges {
        let (u, v) = instance.endpoints[edge];
        adjacency[u].push((v, edge));
        adjacency[v].push((u, edge));
    }

    let mut visited = vec![false; n];
    let mut parent: Vec<Option<(usize, usize)>> = vec![None; n];
    let mut trees = Vec::new();

    for start in 0..n {
        if visited[start] {
            continue;
        }
        if adjacency[start].is_empty() {
            visited[start] = true;
            let prize = instance.node_prizes[start];
            if prize > 0.0 {
                trees.push(PrunedTree {
                    nodes: vec![start],
                    edges: Vec::new(),
                    net_value: prize,
                });
            }
            continue;
        }

        let component = collect_component(start, &adjacency, &mut visited);
        let root = component
            .iter()
            .copied()
            .fold(start, |best, node| {
                let (pb, pn) = (instance.node_prizes[best], instance.node_prizes[node]);
                if pn > pb || (pn == pb && node < best) {
                    node
                } else {
                    best
                }
            });

        let order = preorder(root, &adjacency, &mut parent);
        if let Some(tree) = prune_tree(instance, &order, &parent, strategy) {
            trees.push(tree);
        }
    }

    trees
}

fn collect_component(start: usize, adjacency: &[Vec<(usize, usize)>], visited: &mut [bool]) -> Vec<usize> {
    let mut component = Vec::new();
    let mut stack = vec![start];
    visited[start] = true;
    while let Some(node) = stack.pop() {
        component.push(node);
        for &(next, _) in &adjacency[node] {
            if !visited[next] {
                visited[next] = true;
                stack.push(next);
            }
        }
    }
    component
}

/// Preorder from `root`; fills `parent` with (parent node, edge) per node
fn preorder(
    root: usize,
    adjacency: &[Vec<(usize, usize)>],
    parent: &mut [Option<(usize, usize)>],
) -> Vec<usize> {
    let mut order = Vec::new();
    let mut stack = vec![root];
    parent[root] = None;
    while let Some(node) = stack.pop() {
        order.push(node);
        for &(next, edge) in adjacency[node].iter().rev() {
            let is_parent = parent[node].map_or(false, |(p, _)| p == next);
            if next != root && !is_parent {
                parent[next] = Some((node, edge));
                stack.push(next);
            }
        }
    }
    order
}

fn prune_tree(
    instance: &Instance,
    order: &[usize],
    parent: &[Option<(usize, usize)>],
    strategy: PruningStrategy,
) -> Option<PrunedTree> {
    let root = *order.first()?;
    let mut kept_nodes: Vec<usize> = Vec::with_capacity(order.len());
    let mut kept_edges: Vec<usize> = Vec::new();

    match strategy {
        PruningStrategy::None => {
            kept_nodes.extend_from_slice(order);
            kept_edges.extend(order.iter().filter_map(|&v| parent[v].map(|(_, e)| e)));
        }
        PruningStrategy::Simple => {
            let mut needed: HashMap<usize, bool> = order
                .iter()
                .map(|&v| (v, instance.node_prizes[v] > 0.0))
                .collect();
            for &v in order.iter().rev() {
                if let Some((p, _)) = parent[v] {
                    if needed[&v] {
                        needed.insert(p, true);
                    }
                }
            }
            for &v in order {
                if needed[&v] {
                    kept_nodes.push(v);
                    if let Some((_, e)) = parent[v] {
                        kept_edges.push(e);
                    }
                }
            }
        }
        PruningStrategy::Strong => {
            let mut value: HashMap<usize, f64> = order
                .iter()
                .map(|&v| (v, instance.node_prizes[v]))
                .collect();
            let mut attach: HashSet<usize> = HashSet::new();
            for &v in order.iter().rev() {
                if let Some((p, e)) = parent[v] {
                    let gain = value[&v] - instance.edge_costs[e];
                    if gain > 0.0 {
                        *value.entry(p).or_insert(0.0) += gain;
                        attach.insert(v);
                    }
                }
            }
            let mut kept: HashSet<usize> = HashSet::new();
            kept.insert(root);
            kept_nodes.push(root);
            for &v in &order[1..] {
                if let Some((p, e)) = parent[v] {
                    if attach.contains(&v) && kept.contains(&p) {
                        kept.insert(v);
                        kept_nodes.push(v);
                        kept_edges.push(e);
                    }
                }
            }
        }
    }

    let net_value = kept_nodes.iter().map(|&v| instance.node_prizes[v]).sum::<f64>()
        - kept_edges.iter().map(|&e| instance.edge_costs[e]).sum::<f64>();
    if kept_nodes.is_empty() || net_value <= 0.0 {
        return None;
    }

    kept_nodes.sort_unstable();
    kept_edges.sort_unstable();
    Some(PrunedTree {
        nodes: kept_nodes,
        edges: kept_edges,
        net_value,
    })
}

/// Hang every tree off a virtual root and keep what the root pays for
///
/// Each tree connects to the root through a virtual edge costing
/// `virtual_root_cost`, and the root itself carries a prize of the same
/// amount. The first attachment is therefore free and every further one
/// costs `virtual_root_cost`; with that cost above the total prize exactly
/// one tree survives. Trees are considered by net value descending, then by
/// smallest node position. Stripping the root and its edges leaves the
/// returned trees.
pub fn select_rooted(mut trees: Vec<PrunedTree>, virtual_root_cost: f64) -> Vec<PrunedTree> {
    trees.sort_by(|a, b| {
        b.net_value
            .partial_cmp(&a.net_value)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.nodes.first().cmp(&b.nodes.first()))
    });

    let mut root_prize = virtual_root_cost;
    let mut kept = Vec::new();
    for tree in trees {
        let gain = tree.net_value + root_prize - virtual_root_cost;
        if gain > 0.0 {
            root_prize = 0.0;
            kept.push(tree);
        }
    }
    kept
}
