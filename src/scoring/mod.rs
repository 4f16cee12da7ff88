// Similarity scoring of graph elements against a query embedding

pub mod scorer;

pub use scorer::{Scores, SimilarityMetric, SimilarityScorer};
