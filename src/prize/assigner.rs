// Rank-based prize assignment with top-k clipping
use std::cmp::Ordering;

use crate::prize::types::Prizes;
use crate::retrieval::config::RetrievalConfig;
use crate::scoring::Scores;

/// Converts similarity scores into prizes
///
/// Only strictly positive scores are eligible. Eligible elements are sorted
/// by score descending (stable, so equal scores keep position order) and the
/// first `k` receive prizes `k, k-1, ..., 1`. The prizes depend on the rank
/// alone, so multiplying every score by a positive constant changes nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrizeAssigner {
    topk_nodes: usize,
    topk_edges: usize,
}

impl PrizeAssigner {
    pub fn new(topk_nodes: usize, topk_edges: usize) -> Self {
        Self {
            topk_nodes,
            topk_edges,
        }
    }

    pub fn from_config(config: &RetrievalConfig) -> Self {
        Self::new(config.topk_nodes, config.topk_edges)
    }

    /// Assign node and edge prizes independently
    pub fn assign(&self, scores: &Scores) -> Prizes {
        let prizes = Prizes::new(
            rank_prizes(&scores.node_scores, self.topk_nodes),
            rank_prizes(&scores.edge_scores, self.topk_edges),
        );
        tracing::debug!(
            eligible_nodes = prizes.eligible_nodes(),
            eligible_edges = prizes.eligible_edges(),
            "Assigned prizes"
        );
        prizes
    }

    pub fn topk_nodes(&self) -> usize {
        self.topk_nodes
    }

    pub fn topk_edges(&self) -> usize {
        self.topk_edges
    }
}

fn rank_prizes(scores: &[f64], topk: usize) -> Vec<f64> {
    let mut eligible: Vec<usize> = (0..scores.len()).filter(|&i| scores[i] > 0.0).collect();
    eligible.sort_by(|&a, &b| scores[b].partial_cmp(&scores[a]).unwrap_or(Ordering::Equal));
    eligible.truncate(topk);

    let k = eligible.len();
    let mut prizes = vec![0.0; scores.len()];
    for (rank, &pos) in eligible.iter().enumerate() {
        prizes[pos] = (k - rank) as f64;
    }
    prizes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topk_clipping() {
        let assigner = PrizeAssigner::new(2, 1);
        let scores = Scores::new(vec![0.1, 0.9, 0.5, 0.7], vec![0.2, 0.8]);
        let prizes = assigner.assign(&scores);

        assert_eq!(prizes.node_prizes, vec![0.0, 2.0, 0.0, 1.0]);
        assert_eq!(prizes.edge_prizes, vec![0.0, 1.0]);
    }

    #[test]
    fn test_topk_larger_than_graph() {
        let assigner = PrizeAssigner::new(10, 10);
        let prizes = assigner.assign(&Scores::new(vec![0.3, 0.6], vec![]));
        assert_eq!(prizes.node_prizes, vec![1.0, 2.0]);
        assert!(prizes.edge_prizes.is_empty());
    }

    #[test]
    fn test_ties_follow_position_order() {
        let assigner = PrizeAssigner::new(3, 0);
        let prizes = assigner.assign(&Scores::new(vec![0.5, 0.5, 0.5], vec![0.5]));
        assert_eq!(prizes.node_prizes, vec![3.0, 2.0, 1.0]);
        assert_eq!(prizes.edge_prizes, vec![0.0]);
    }

    #[test]
    fn test_non_positive_scores_ineligible() {
        let assigner = PrizeAssigner::new(3, 3);
        let prizes = assigner.assign(&Scores::new(vec![0.0, -0.4, 0.2], vec![0.0]));
        assert_eq!(prizes.node_prizes, vec![0.0, 0.0, 1.0]);
        assert!(PrizeAssigner::new(3, 3)
            .assign(&Scores::new(vec![0.0, -1.0], vec![0.0]))
            .is_empty());
    }

    #[test]
    fn test_scaling_invariance() {
        let assigner = PrizeAssigner::new(3, 2);
        let scores = Scores::new(vec![0.12, 0.5, 0.33, 0.05], vec![0.4, 0.1, 0.9]);
        let scaled = Scores::new(
            scores.node_scores.iter().map(|s| s * 17.5).collect(),
            scores.edge_scores.iter().map(|s| s * 17.5).collect(),
        );
        assert_eq!(assigner.assign(&scores), assigner.assign(&scaled));
    }
}
