//! Cluster registry for the growth phase
//!
//! Clusters live in an arena and are addressed by integer id. Singleton
//! cluster `i` holds node `i`; each merge appends a new cluster whose
//! `children` record the two merged ids, so the arena doubles as the merge
//! history. Membership lookups go through a union-find over cluster ids.
//!
//! Growth is lazy. The registry keeps a global clock and every active
//! cluster grows at rate one since the instant it last changed state, so
//! advancing the clock is O(1). A node's dual is its fixed base plus the
//! moat counter of its top-level cluster; a merge keeps the counter of the
//! larger child and rebases only the members of the smaller one.

use serde::{Deserialize, Serialize};

/// One cluster of the primal-dual growth
///
/// `moat` and `dual_inside` are settled up to `since`; an active cluster
/// has grown by `now - since` on top of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    pub id: usize,
    pub active: bool,
    /// Sum of member node prizes
    pub prize: f64,
    /// Moat grown by this cluster itself
    pub moat: f64,
    /// Moat grown by this cluster and every cluster it absorbed
    pub dual_inside: f64,
    /// Moat counter shared by the member duals, settled up to `since`
    pub offset: f64,
    /// Clock value of the last state change
    pub since: f64,
    pub parent: Option<usize>,
    pub children: Option<(usize, usize)>,
    /// Edge position whose tightening created this cluster
    pub merge_edge: Option<usize>,
    /// Member node positions; emptied once the cluster is merged away
    pub members: Vec<usize>,
}

impl Cluster {
    pub fn is_top_level(&self) -> bool {
        self.parent.is_none()
    }

    fn growth(&self, now: f64) -> f64 {
        if self.active {
            now - self.since
        } else {
            0.0
        }
    }
}

/// Arena of clusters plus per-node dual bases
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterRegistry {
    clusters: Vec<Cluster>,
    links: Vec<usize>,
    node_base: Vec<f64>,
    now: f64,
    top_level: usize,
    active: usize,
}

impl ClusterRegistry {
    /// One singleton per node; active iff its prize is positive
    pub fn new(node_prizes: &[f64]) -> Self {
        let clusters: Vec<Cluster> = node_prizes
            .iter()
            .enumerate()
            .map(|(node, &prize)| Cluster {
                id: node,
                active: prize > 0.0,
                prize,
                moat: 0.0,
                dual_inside: 0.0,
                offset: 0.0,
                since: 0.0,
                parent: None,
                children: None,
                merge_edge: None,
                members: vec![node],
            })
            .collect();
        let active = clusters.iter().filter(|c| c.active).count();

        Self {
            links: (0..clusters.len()).collect(),
            node_base: vec![0.0; clusters.len()],
            now: 0.0,
            top_level: clusters.len(),
            active,
            clusters,
        }
    }

    pub fn cluster(&self, id: usize) -> &Cluster {
        &self.clusters[id]
    }

    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    /// Current clock value
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Top-level cluster currently containing `node`
    pub fn find(&mut self, node: usize) -> usize {
        let mut id = node;
        while self.links[id] != id {
            let grandparent = self.links[self.links[id]];
            self.links[id] = grandparent;
            id = grandparent;
        }
        id
    }

    /// Moat counter of a top-level cluster at the current clock
    pub fn counter(&self, id: usize) -> f64 {
        let cluster = &self.clusters[id];
        cluster.offset + cluster.growth(self.now)
    }

    /// Total moat of every cluster that has contained `node`
    pub fn node_dual(&mut self, node: usize) -> f64 {
        let top = self.find(node);
        self.node_base[node] + self.counter(top)
    }

    /// Budget left before the cluster deactivates
    pub fn remaining(&self, id: usize) -> f64 {
        let cluster = &self.clusters[id];
        (cluster.prize - cluster.dual_inside - cluster.growth(self.now)).max(0.0)
    }

    /// Clock value at which an active cluster runs out of budget
    pub fn exhausted_at(&self, id: usize) -> Option<f64> {
        let cluster = &self.clusters[id];
        (cluster.active && cluster.is_top_level())
            .then(|| cluster.since + (cluster.prize - cluster.dual_inside).max(0.0))
    }

    pub fn top_level_count(&self) -> usize {
        self.top_level
    }

    pub fn active_count(&self) -> usize {
        self.active
    }

    /// Move the clock forward; every active moat grows by the difference
    pub fn advance_to(&mut self, time: f64) {
        if time > self.now {
            self.now = time;
        }
    }

    fn settle(&mut self, id: usize) {
        let now = self.now;
        let cluster = &mut self.clusters[id];
        let grown = cluster.growth(now);
        cluster.moat += grown;
        cluster.dual_inside += grown;
        cluster.offset += grown;
        cluster.since = now;
    }

    pub fn deactivate(&mut self, id: usize) {
        if self.clusters[id].active {
            self.settle(id);
            self.clusters[id].active = false;
            self.active -= 1;
        }
    }

    /// Merge two top-level clusters through `edge`; returns the new id
    ///
    /// The new cluster continues the counter of the child with more
    /// members. Returns the child whose counter was kept, paired with the
    /// shift applied to the other child's frame.
    pub fn merge(&mut self, a: usize, b: usize, edge: usize) -> (usize, MergeFrames) {
        self.settle(a);
        self.settle(b);

        let id = self.clusters.len();
        let (large, small) = if self.clusters[a].members.len() >= self.clusters[b].members.len() {
            (a, b)
        } else {
            (b, a)
        };

        let shift = self.clusters[small].offset - self.clusters[large].offset;
        let mut members = std::mem::take(&mut self.clusters[large].members);
        let absorbed = std::mem::take(&mut self.clusters[small].members);
        for &node in &absorbed {
            self.node_base[node] += shift;
        }
        members.extend(absorbed);

        for child in [a, b] {
            if self.clusters[child].active {
                self.active -= 1;
            }
            let cluster = &mut self.clusters[child];
            cluster.active = false;
            cluster.parent = Some(id);
        }

        let prize = self.clusters[a].prize + self.clusters[b].prize;
        let dual_inside = self.clusters[a].dual_inside + self.clusters[b].dual_inside;
        let active = prize - dual_inside > 0.0;
        if active {
            self.active += 1;
        }

        self.clusters.push(Cluster {
            id,
            active,
            prize,
            moat: 0.0,
            dual_inside,
            offset: self.clusters[large].offset,
            since: self.now,
            parent: None,
            children: Some((a, b)),
            merge_edge: Some(edge),
            members,
        });
        self.links.push(id);
        self.links[a] = id;
        self.links[b] = id;
        self.top_level -= 1;
        (id, MergeFrames { large, small, shift })
    }
}

/// How a merge re-expressed counter-relative values
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MergeFrames {
    /// Child whose counter the merged cluster continues
    pub large: usize,
    /// Child rebased into the kept frame
    pub small: usize,
    /// Subtract from values relative to the small child's counter
    pub shift: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_singletons() {
        let registry = ClusterRegistry::new(&[1.0, 0.0, 2.0]);
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.top_level_count(), 3);
        assert_eq!(registry.active_count(), 2);
        assert!(!registry.cluster(1).active);
    }

    #[test]
    fn test_grow_only_active() {
        let mut registry = ClusterRegistry::new(&[1.0, 0.0]);
        registry.advance_to(0.25);
        assert_eq!(registry.node_dual(0), 0.25);
        assert_eq!(registry.node_dual(1), 0.0);
        assert_eq!(registry.remaining(0), 0.75);
        assert_eq!(registry.exhausted_at(0), Some(1.0));
        assert_eq!(registry.exhausted_at(1), None);
    }

    #[test]
    fn test_merge_records_history() {
        let mut registry = ClusterRegistry::new(&[1.0, 0.0, 3.0]);
        registry.advance_to(0.5);
        let (merged, _) = registry.merge(0, 1, 7);

        assert_eq!(merged, 3);
        assert_eq!(registry.find(0), 3);
        assert_eq!(registry.find(1), 3);
        assert_eq!(registry.find(2), 2);
        assert_eq!(registry.top_level_count(), 2);

        let cluster = registry.cluster(merged);
        assert_eq!(cluster.children, Some((0, 1)));
        assert_eq!(cluster.merge_edge, Some(7));
        assert_eq!(registry.remaining(merged), 0.5);
        assert!(cluster.active);
        assert_eq!(registry.active_count(), 2);
        assert_eq!(registry.cluster(0).parent, Some(3));
        assert_eq!(registry.cluster(0).moat, 0.5);
    }

    #[test]
    fn test_duals_continuous_across_merge() {
        let mut registry = ClusterRegistry::new(&[4.0, 1.0, 2.0]);
        registry.advance_to(1.0);
        registry.deactivate(1);
        registry.advance_to(1.5);
        let (first, _) = registry.merge(0, 1, 0);
        assert_eq!(registry.node_dual(0), 1.5);
        assert_eq!(registry.node_dual(1), 1.0);

        registry.advance_to(2.0);
        let (second, frames) = registry.merge(first, 2, 1);
        assert_eq!(frames.large, first);
        assert_eq!(registry.node_dual(0), 2.0);
        assert_eq!(registry.node_dual(1), 1.5);
        assert_eq!(registry.node_dual(2), 2.0);

        // prize 7; moats 1.5, 1.0, 2.0 and 0.5 from the first merge
        assert_eq!(registry.remaining(second), 2.0);
        registry.advance_to(3.0);
        assert_eq!(registry.node_dual(1), 2.5);
        assert_eq!(registry.remaining(second), 1.0);
    }

    #[test]
    fn test_exhausted_merge_is_inactive() {
        let mut registry = ClusterRegistry::new(&[1.0, 0.0]);
        registry.advance_to(1.0);
        let (merged, _) = registry.merge(0, 1, 0);
        assert!(!registry.cluster(merged).active);
        assert_eq!(registry.active_count(), 0);
    }

    #[test]
    fn test_deactivate_freezes_growth() {
        let mut registry = ClusterRegistry::new(&[1.0]);
        registry.advance_to(0.5);
        registry.deactivate(0);
        registry.deactivate(0);
        registry.advance_to(2.0);
        assert_eq!(registry.active_count(), 0);
        assert_eq!(registry.node_dual(0), 0.5);
        assert_eq!(registry.cluster(0).moat, 0.5);
    }

    #[test]
    fn test_registry_serializes() {
        let mut registry = ClusterRegistry::new(&[1.0, 1.0]);
        registry.merge(0, 1, 0);
        let json = serde_json::to_string(&registry).unwrap();
        let restored: ClusterRegistry = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, registry);
    }
}
