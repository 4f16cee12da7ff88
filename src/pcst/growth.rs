//! Primal-dual growth phase
//!
//! All active clusters raise their moats at the same rate. An edge becomes
//! tight when the duals of its two endpoints sum to its effective cost; the
//! two clusters then merge and the edge is committed to the growth forest.
//! An active cluster whose moats have consumed its prize deactivates and
//! stops growing, keeping the edges it already committed.
//!
//! Ties are broken deterministically: among simultaneous tight edges the
//! smallest edge position wins, among simultaneous deactivations the
//! smallest cluster id, and a deactivation precedes a merge at equal time.
//!
//! # Event queue
//! Every edge is split into two parts, one per endpoint. A part sits in the
//! heap of the cluster holding its endpoint, keyed by the value of that
//! cluster's moat counter at which the part must be looked at again. The two
//! keys of an edge never promise more than the edge's remaining slack, so no
//! edge turns tight before one of its parts comes due. When a part comes
//! due the slack is recomputed: the edge merges if tight, otherwise the
//! slack is split again between the sides that are still growing. A part
//! whose side has stopped keeps a key of "now" and comes due as soon as its
//! cluster is absorbed into a growing one.
//!
//! Part heaps are merged small into large alongside cluster membership, so
//! a part changes heaps O(log n) times. A global queue holds the next due
//! part of each active cluster, and a second one the deactivations.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use ordered_float::OrderedFloat;

use crate::pcst::cluster::ClusterRegistry;
use crate::pcst::instance::Instance;

/// Slack below which an edge counts as tight
const TIGHT_EPSILON: f64 = 1e-9;

/// Output of the growth phase
#[derive(Debug, Clone)]
pub struct GrowthRecord {
    pub registry: ClusterRegistry,
    /// Committed edge positions in merge order
    pub forest_edges: Vec<usize>,
    /// Merge and deactivation events processed
    pub events: usize,
}

/// Heap entry ordered by `(key, edge, slot, version)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Keyed {
    key: OrderedFloat<f64>,
    edge: usize,
    /// Part index, or cluster id in the global queues
    slot: usize,
    version: u32,
}

impl Keyed {
    fn new(key: f64, edge: usize, slot: usize, version: u32) -> Self {
        Self {
            key: OrderedFloat(key),
            edge,
            slot,
            version,
        }
    }

    fn key(&self) -> f64 {
        self.key.into_inner()
    }
}

type MinHeap = BinaryHeap<Reverse<Keyed>>;

struct Growth<'a> {
    instance: &'a Instance,
    registry: ClusterRegistry,
    /// Per-cluster heaps of edge parts, keyed on the cluster's counter
    parts: Vec<MinHeap>,
    /// Live version per part; older heap entries are stale
    versions: Vec<u32>,
    /// Next due part per active cluster, keyed on the clock
    due: MinHeap,
    /// Deactivations keyed on the clock; `edge` is unused
    exhaustion: MinHeap,
    forest_edges: Vec<usize>,
    events: usize,
}

enum Next {
    Part(Keyed),
    Deactivate(Keyed),
}

/// Run the growth phase until one cluster remains or nothing can grow
pub fn grow(instance: &Instance) -> GrowthRecord {
    let mut growth = Growth::new(instance);
    growth.run();

    tracing::trace!(
        events = growth.events,
        committed = growth.forest_edges.len(),
        clusters = growth.registry.len(),
        "Growth phase finished"
    );

    GrowthRecord {
        registry: growth.registry,
        forest_edges: growth.forest_edges,
        events: growth.events,
    }
}

impl<'a> Growth<'a> {
    fn new(instance: &'a Instance) -> Self {
        let n = instance.node_count();
        let mut growth = Self {
            instance,
            registry: ClusterRegistry::new(&instance.node_prizes),
            parts: vec![MinHeap::new(); n],
            versions: vec![0; 2 * instance.edge_count()],
            due: MinHeap::new(),
            exhaustion: MinHeap::new(),
            forest_edges: Vec::new(),
            events: 0,
        };

        for (edge, &(u, v)) in instance.endpoints.iter().enumerate() {
            if u == v {
                continue;
            }
            let cost = instance.edge_costs[edge];
            let (ku, kv) = match (instance.node_prizes[u] > 0.0, instance.node_prizes[v] > 0.0) {
                (true, true) => (cost / 2.0, cost / 2.0),
                (true, false) => (cost, 0.0),
                (false, true) => (0.0, cost),
                (false, false) => (0.0, 0.0),
            };
            growth.push_part(u, 2 * edge, ku);
            growth.push_part(v, 2 * edge + 1, kv);
        }
        for cluster in 0..n {
            growth.schedule(cluster);
            growth.schedule_exhaustion(cluster);
        }
        growth
    }

    fn run(&mut self) {
        while self.registry.active_count() > 0 && self.registry.top_level_count() > 1 {
            let next = match (self.peek_due(), self.peek_exhaustion()) {
                (Some(part), Some(deact)) if deact.key <= part.key => Next::Deactivate(deact),
                (Some(part), _) => Next::Part(part),
                (None, Some(deact)) => Next::Deactivate(deact),
                (None, None) => break,
            };

            match next {
                Next::Deactivate(entry) => {
                    self.exhaustion.pop();
                    self.registry.advance_to(entry.key());
                    self.registry.deactivate(entry.slot);
                    self.events += 1;
                }
                Next::Part(entry) => {
                    self.due.pop();
                    self.registry.advance_to(entry.key());
                    self.process_due(entry.slot);
                }
            }
        }
    }

    /// Handle the next part of `cluster`, which is due now
    fn process_due(&mut self, cluster: usize) {
        let Some(Reverse(part)) = self.parts[cluster].pop() else {
            return;
        };
        let edge = part.edge;
        let (u, v) = self.instance.endpoints[edge];
        let (cu, cv) = (self.registry.find(u), self.registry.find(v));
        if cu == cv {
            self.schedule(cluster);
            return;
        }

        let slack = self.instance.edge_costs[edge]
            - self.registry.node_dual(u)
            - self.registry.node_dual(v);
        if slack <= TIGHT_EPSILON {
            self.merge(cu, cv, edge);
            return;
        }

        // Split what is left between the sides still growing
        let (mine, other, other_part) = if part.slot % 2 == 0 {
            (cu, cv, part.slot + 1)
        } else {
            (cv, cu, part.slot - 1)
        };
        if self.registry.cluster(other).active {
            self.push_part(mine, part.slot, self.registry.counter(mine) + slack / 2.0);
            self.push_part(other, other_part, self.registry.counter(other) + slack / 2.0);
            self.schedule(other);
        } else {
            self.push_part(mine, part.slot, self.registry.counter(mine) + slack);
            self.push_part(other, other_part, self.registry.counter(other));
        }
        self.schedule(mine);
    }

    fn merge(&mut self, cu: usize, cv: usize, edge: usize) {
        let (merged, frames) = self.registry.merge(cu, cv, edge);
        self.forest_edges.push(edge);
        self.events += 1;

        let mut kept = std::mem::take(&mut self.parts[frames.large]);
        let absorbed = std::mem::take(&mut self.parts[frames.small]);
        for Reverse(mut part) in absorbed {
            if part.version == self.versions[part.slot] {
                part.key = OrderedFloat(part.key() - frames.shift);
                kept.push(Reverse(part));
            }
        }
        self.parts.push(kept);

        self.schedule(merged);
        self.schedule_exhaustion(merged);
    }

    /// Queue `part` in the heap of the top-level cluster holding `at`,
    /// which is either its endpoint or that cluster's id
    fn push_part(&mut self, at: usize, part: usize, key: f64) {
        let cluster = self.registry.find(at);
        self.versions[part] = self.versions[part].wrapping_add(1);
        self.parts[cluster].push(Reverse(Keyed::new(key, part / 2, part, self.versions[part])));
    }

    /// Drop stale parts and queue the cluster's next due part on the clock
    fn schedule(&mut self, cluster: usize) {
        if !self.registry.cluster(cluster).active {
            return;
        }
        let heap = &mut self.parts[cluster];
        while let Some(Reverse(top)) = heap.peek() {
            if top.version == self.versions[top.slot] {
                break;
            }
            heap.pop();
        }
        if let Some(Reverse(top)) = heap.peek() {
            let wait = (top.key() - self.registry.counter(cluster)).max(0.0);
            self.due
                .push(Reverse(Keyed::new(self.registry.now() + wait, top.edge, cluster, 0)));
        }
    }

    fn schedule_exhaustion(&mut self, cluster: usize) {
        if let Some(at) = self.registry.exhausted_at(cluster) {
            self.exhaustion.push(Reverse(Keyed::new(at, 0, cluster, 0)));
        }
    }

    /// Next valid due entry; stale entries are discarded
    fn peek_due(&mut self) -> Option<Keyed> {
        while let Some(Reverse(entry)) = self.due.peek().copied() {
            if self.is_current_due(&entry) {
                return Some(entry);
            }
            self.due.pop();
        }
        None
    }

    fn is_current_due(&self, entry: &Keyed) -> bool {
        let cluster = self.registry.cluster(entry.slot);
        if !(cluster.active && cluster.is_top_level()) {
            return false;
        }
        match self.parts[entry.slot].peek() {
            Some(Reverse(top)) => {
                top.edge == entry.edge
                    && top.version == self.versions[top.slot]
                    && cluster.since + (top.key() - cluster.offset) <= entry.key() + TIGHT_EPSILON
            }
            None => false,
        }
    }

    fn peek_exhaustion(&mut self) -> Option<Keyed> {
        while let Some(Reverse(entry)) = self.exhaustion.peek().copied() {
            let cluster = self.registry.cluster(entry.slot);
            if cluster.active && cluster.is_top_level() {
                return Some(entry);
            }
            self.exhaustion.pop();
        }
        None
    }
}
