//! Memoized element embeddings with single-flight population
//!
//! Backed by a `moka` cache: `get_with` collapses concurrent misses on one
//! key into a single computation and every other caller waits for that
//! result. Hit and miss counters are kept alongside, since the cache's own
//! entry count is only eventually consistent.

use moka::sync::Cache;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::graph::{EdgeId, NodeId};

/// Capacity used when the number of elements is not known up front
pub const DEFAULT_CAPACITY: u64 = 1_000_000;

/// Cache key: one graph element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKey {
    Node(NodeId),
    Edge(EdgeId),
}

/// Cache counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// Process-lifetime cache of derived embeddings
pub struct EmbeddingCache {
    cache: Cache<ElementKey, Arc<[f32]>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl Default for EmbeddingCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl fmt::Debug for EmbeddingCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbeddingCache")
            .field("entries", &self.cache.entry_count())
            .field("hits", &self.hits.load(Ordering::Relaxed))
            .field("misses", &self.misses.load(Ordering::Relaxed))
            .finish()
    }
}

impl EmbeddingCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache sized for `capacity` elements; a graph needs nodes + edges
    pub fn with_capacity(capacity: u64) -> Self {
        Self {
            cache: Cache::builder().max_capacity(capacity.max(1)).build(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Return the cached vector for `key`, computing it at most once
    pub fn get_or_compute<F>(&self, key: ElementKey, compute: F) -> Arc<[f32]>
    where
        F: FnOnce() -> Vec<f32>,
    {
        let mut computed = false;
        let value = self.cache.get_with(key, || {
            computed = true;
            Arc::from(compute())
        });

        if computed {
            self.misses.fetch_add(1, Ordering::Relaxed);
        } else {
            self.hits.fetch_add(1, Ordering::Relaxed);
        }
        value
    }

    /// Cached vector without populating
    pub fn get(&self, key: ElementKey) -> Option<Arc<[f32]>> {
        self.cache.get(&key)
    }

    /// Number of populated entries
    pub fn len(&self) -> usize {
        self.cache.run_pending_tasks();
        self.cache.entry_count() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }
}

/// Scale a vector to unit L2 norm; a zero vector stays zero
pub fn normalize(vector: &[f32]) -> Vec<f32> {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm == 0.0 || !norm.is_finite() {
        return vec![0.0; vector.len()];
    }
    vector.iter().map(|x| x / norm).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::thread;

    #[test]
    fn test_normalize() {
        let v = normalize(&[3.0, 4.0]);
        assert!((v[0] - 0.6).abs() < 1e-6);
        assert!((v[1] - 0.8).abs() < 1e-6);
        assert_eq!(normalize(&[0.0, 0.0]), vec![0.0, 0.0]);
    }

    #[test]
    fn test_hit_and_miss_counts() {
        let cache = EmbeddingCache::new();
        let first = cache.get_or_compute(ElementKey::Node(1), || vec![1.0, 2.0]);
        let second = cache.get_or_compute(ElementKey::Node(1), || vec![9.0, 9.0]);
        assert_eq!(&*first, &*second);

        let stats = cache.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.entries, 1);
    }

    #[test]
    fn test_node_and_edge_keys_distinct() {
        let cache = EmbeddingCache::new();
        cache.get_or_compute(ElementKey::Node(0), || vec![1.0]);
        cache.get_or_compute(ElementKey::Edge(0), || vec![2.0]);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(ElementKey::Edge(0)).as_deref(), Some(&[2.0f32][..]));
    }

    #[test]
    fn test_single_flight_under_contention() {
        let cache = Arc::new(EmbeddingCache::new());
        let computations = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = cache.clone();
                let computations = computations.clone();
                thread::spawn(move || {
                    cache.get_or_compute(ElementKey::Edge(42), || {
                        computations.fetch_add(1, Ordering::SeqCst);
                        thread::sleep(std::time::Duration::from_millis(20));
                        vec![0.5; 4]
                    })
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap().len(), 4);
        }
        assert_eq!(computations.load(Ordering::SeqCst), 1);
        assert_eq!(cache.stats().misses, 1);
        assert_eq!(cache.stats().hits, 7);
    }

    #[test]
    fn test_shared_allocation_on_hit() {
        let cache = EmbeddingCache::with_capacity(4);
        let first = cache.get_or_compute(ElementKey::Node(3), || vec![1.0, 0.0]);
        let second = cache.get_or_compute(ElementKey::Node(3), || vec![0.0, 1.0]);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_clear() {
        let cache = EmbeddingCache::new();
        cache.get_or_compute(ElementKey::Node(5), || vec![1.0]);
        cache.clear();
        assert!(cache.get(ElementKey::Node(5)).is_none());

        let recomputed = cache.get_or_compute(ElementKey::Node(5), || vec![2.0]);
        assert_eq!(&*recomputed, &[2.0f32][..]);
        assert_eq!(cache.stats().misses, 2);
    }
}
