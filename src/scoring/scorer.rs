//! Similarity scorer
//!
//! Produces one relevance score per node and per edge, aligned with the
//! graph's dense positions. Pure over its inputs apart from populating the
//! optional embedding cache.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::embedding::{normalize, ElementKey, EmbeddingCache};
use crate::errors::{Result, RetrievalError};
use crate::graph::Graph;

/// Similarity metric between query and element embeddings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityMetric {
    /// Cosine similarity; zero-norm vectors score 0
    #[default]
    Cosine,
    /// Raw inner product
    Dot,
}

/// Per-element scores, indexed by graph position
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scores {
    pub node_scores: Vec<f64>,
    pub edge_scores: Vec<f64>,
}

impl Scores {
    pub fn new(node_scores: Vec<f64>, edge_scores: Vec<f64>) -> Self {
        Self {
            node_scores,
            edge_scores,
        }
    }

    /// True when no element scored above zero
    pub fn all_non_positive(&self) -> bool {
        self.node_scores
            .iter()
            .chain(self.edge_scores.iter())
            .all(|s| *s <= 0.0)
    }
}

/// Scorer for query/graph similarity
#[derive(Debug, Clone, Default)]
pub struct SimilarityScorer {
    metric: SimilarityMetric,
}

impl SimilarityScorer {
    pub fn new(metric: SimilarityMetric) -> Self {
        Self { metric }
    }

    pub fn metric(&self) -> SimilarityMetric {
        self.metric
    }

    /// Score every node and edge of `graph` against `query`
    pub fn score(
        &self,
        query: &[f32],
        graph: &Graph,
        cache: Option<&EmbeddingCache>,
    ) -> Result<Scores> {
        if !graph.is_empty() && query.len() != graph.dimension() {
            return Err(RetrievalError::DimensionMismatch {
                expected: graph.dimension(),
                actual: query.len(),
            });
        }

        // Every metric scores a zero query as 0 everywhere
        if query.iter().all(|x| *x == 0.0) {
            return Ok(Scores::new(
                vec![0.0; graph.node_count()],
                vec![0.0; graph.edge_count()],
            ));
        }

        let scores = match self.metric {
            SimilarityMetric::Cosine => {
                let query = normalize(query);
                Scores {
                    node_scores: graph
                        .nodes()
                        .iter()
                        .map(|node| {
                            let unit = unit_vector(cache, ElementKey::Node(node.id), &node.embedding);
                            finite_or_zero(dot(&query, &unit))
                        })
                        .collect(),
                    edge_scores: graph
                        .edges()
                        .iter()
                        .map(|edge| {
                            let unit = unit_vector(cache, ElementKey::Edge(edge.id), &edge.embedding);
                            finite_or_zero(dot(&query, &unit))
                        })
                        .collect(),
                }
            }
            SimilarityMetric::Dot => Scores {
                node_scores: graph
                    .nodes()
                    .iter()
                    .map(|node| finite_or_zero(dot(query, &node.embedding)))
                    .collect(),
                edge_scores: graph
                    .edges()
                    .iter()
                    .map(|edge| finite_or_zero(dot(query, &edge.embedding)))
                    .collect(),
            },
        };

        tracing::debug!(
            metric = ?self.metric,
            nodes = scores.node_scores.len(),
            edges = scores.edge_scores.len(),
            "Scored graph elements"
        );
        Ok(scores)
    }
}

fn unit_vector(cache: Option<&EmbeddingCache>, key: ElementKey, embedding: &[f32]) -> Arc<[f32]> {
    match cache {
        Some(cache) => cache.get_or_compute(key, || normalize(embedding)),
        None => Arc::from(normalize(embedding)),
    }
}

fn dot(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| f64::from(*x) * f64::from(*y))
        .sum()
}

// NaN embeddings must not leak into prize ranking
fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Edge, Node};

    fn graph() -> Graph {
        let nodes = vec![
            Node::new(0, vec![1.0, 0.0]),
            Node::new(1, vec![0.0, 2.0]),
            Node::new(2, vec![-1.0, 0.0]),
        ];
        let edges = vec![Edge::new(0, 0, 1, vec![1.0, 1.0])];
        Graph::new(nodes, edges).unwrap()
    }

    #[test]
    fn test_cosine_scores() {
        let scorer = SimilarityScorer::default();
        let scores = scorer.score(&[2.0, 0.0], &graph(), None).unwrap();
        assert!((scores.node_scores[0] - 1.0).abs() < 1e-6);
        assert!(scores.node_scores[1].abs() < 1e-6);
        assert!((scores.node_scores[2] + 1.0).abs() < 1e-6);
        assert!((scores.edge_scores[0] - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-6);
    }

    #[test]
    fn test_dot_scores() {
        let scorer = SimilarityScorer::new(SimilarityMetric::Dot);
        let scores = scorer.score(&[0.0, 3.0], &graph(), None).unwrap();
        assert_eq!(scores.node_scores, vec![0.0, 6.0, 0.0]);
        assert_eq!(scores.edge_scores, vec![3.0]);
    }

    #[test]
    fn test_dimension_mismatch() {
        let scorer = SimilarityScorer::default();
        let err = scorer.score(&[1.0, 0.0, 0.0], &graph(), None).unwrap_err();
        assert!(matches!(
            err,
            RetrievalError::DimensionMismatch { expected: 2, actual: 3 }
        ));
    }

    #[test]
    fn test_zero_query_scores_zero() {
        let scorer = SimilarityScorer::default();
        let scores = scorer.score(&[0.0, 0.0], &graph(), None).unwrap();
        assert!(scores.all_non_positive());
        assert_eq!(scores.node_scores.len(), 3);
        assert_eq!(scores.edge_scores.len(), 1);
    }

    #[test]
    fn test_zero_query_skips_cache() {
        let cache = EmbeddingCache::new();
        let scorer = SimilarityScorer::default();
        scorer.score(&[0.0, 0.0], &graph(), Some(&cache)).unwrap();
        assert_eq!(cache.stats().misses, 0);
    }

    #[test]
    fn test_cache_populated_once() {
        let cache = EmbeddingCache::new();
        let scorer = SimilarityScorer::default();
        let g = graph();
        let first = scorer.score(&[1.0, 0.0], &g, Some(&cache)).unwrap();
        let second = scorer.score(&[1.0, 0.0], &g, Some(&cache)).unwrap();

        assert_eq!(first, second);
        let stats = cache.stats();
        assert_eq!(stats.misses, 4);
        assert_eq!(stats.hits, 4);
    }

    #[test]
    fn test_cached_unit_vector_not_copied() {
        let cache = EmbeddingCache::new();
        let embedding = [3.0, 4.0];
        let first = unit_vector(Some(&cache), ElementKey::Node(0), &embedding);
        let second = unit_vector(Some(&cache), ElementKey::Node(0), &embedding);
        assert!(Arc::ptr_eq(&first, &second));
        assert!((dot(&first, &[0.6, 0.8]) - 1.0).abs() < 1e-6);
    }
}
