//! LRU cache over computed embeddings.
//!
//! Recurring texts are common on this pipeline (the same document
//! re-ingested, the same question asked twice); caching skips the backend
//! round-trip for them.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::num::NonZeroUsize;

use lru::LruCache;

/// Entries are keyed by text hash, so the cache never holds chunk bodies.
pub struct EmbeddingCache {
    entries: LruCache<u64, Vec<f32>>,
    hits: u64,
    misses: u64,
}

impl EmbeddingCache {
    /// A zero capacity is clamped to a single entry.
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(capacity),
            hits: 0,
            misses: 0,
        }
    }

    pub fn get(&mut self, text: &str) -> Option<Vec<f32>> {
        match self.entries.get(&key(text)) {
            Some(vector) => {
                self.hits += 1;
                Some(vector.clone())
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    pub fn put(&mut self, text: &str, vector: Vec<f32>) {
        self.entries.put(key(text), vector);
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn key(text: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn miss_then_hit() {
        let mut cache = EmbeddingCache::new(8);

        assert!(cache.get("hello").is_none());
        assert_eq!((cache.hits(), cache.misses()), (0, 1));

        cache.put("hello", vec![0.1, 0.2]);
        assert_eq!(cache.get("hello").unwrap(), vec![0.1, 0.2]);
        assert_eq!((cache.hits(), cache.misses()), (1, 1));
    }

    #[test]
    fn least_recently_used_entry_is_evicted() {
        let mut cache = EmbeddingCache::new(2);
        cache.put("a", vec![1.0]);
        cache.put("b", vec![2.0]);

        // Touch "a" so "b" becomes the eviction candidate.
        cache.get("a");
        cache.put("c", vec![3.0]);

        assert!(cache.get("a").is_some());
        assert!(cache.get("b").is_none());
        assert!(cache.get("c").is_some());
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let mut cache = EmbeddingCache::new(0);
        cache.put("only", vec![1.0]);
        assert_eq!(cache.len(), 1);
        assert!(cache.get("only").is_some());
    }
}
