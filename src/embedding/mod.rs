// Embedding cache shared by every query of a retrieval session
//
// Embeddings themselves come from an external model; this module only
// memoizes derived per-element vectors for concurrent readers.

pub mod cache;

pub use cache::{normalize, CacheStats, ElementKey, EmbeddingCache};
