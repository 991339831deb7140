//! In-memory vector backend: per-namespace record lists with brute-force
//! cosine search. The default when no PostgreSQL connection is configured.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use heron_core::BackendError;
use tokio::sync::RwLock;

use crate::traits::VectorBackend;
use crate::types::{IndexStats, RetrievedMatch, VectorRecord};

pub struct InMemoryBackend {
    dimension: usize,
    namespaces: RwLock<HashMap<String, Vec<VectorRecord>>>,
}

impl InMemoryBackend {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            namespaces: RwLock::new(HashMap::new()),
        }
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        // Zero vectors are the "do not match" sentinel.
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[async_trait]
impl VectorBackend for InMemoryBackend {
    async fn create_index(&self, _dimension: usize) -> Result<(), BackendError> {
        // Nothing to provision; namespaces materialize on first write.
        Ok(())
    }

    async fn upsert(
        &self,
        namespace: &str,
        records: &[VectorRecord],
    ) -> Result<usize, BackendError> {
        let mut namespaces = self.namespaces.write().await;
        let entries = namespaces.entry(namespace.to_string()).or_default();
        for record in records {
            if let Some(existing) = entries.iter_mut().find(|e| e.id == record.id) {
                *existing = record.clone();
            } else {
                entries.push(record.clone());
            }
        }
        Ok(records.len())
    }

    async fn query(
        &self,
        namespace: &str,
        vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<RetrievedMatch>, BackendError> {
        let namespaces = self.namespaces.read().await;
        let entries = match namespaces.get(namespace) {
            Some(entries) => entries,
            None => return Ok(Vec::new()),
        };

        let mut matches: Vec<RetrievedMatch> = entries
            .iter()
            .filter(|e| e.embedding.iter().any(|v| *v != 0.0))
            .map(|e| RetrievedMatch {
                chunk_id: e.id.clone(),
                text: e.text.clone(),
                source: e.source.clone(),
                page_number: e.page_number,
                score: cosine_similarity(vector, &e.embedding),
            })
            .collect();

        // Stable sort keeps insertion order for equal scores.
        matches.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        matches.truncate(top_k);
        Ok(matches)
    }

    async fn stats(&self, namespace: Option<&str>) -> Result<IndexStats, BackendError> {
        let namespaces = self.namespaces.read().await;
        let mut counts = BTreeMap::new();
        match namespace {
            Some(ns) => {
                let count = namespaces.get(ns).map(|e| e.len() as u64).unwrap_or(0);
                counts.insert(ns.to_string(), count);
            }
            None => {
                for (ns, entries) in namespaces.iter() {
                    counts.insert(ns.clone(), entries.len() as u64);
                }
            }
        }
        Ok(IndexStats {
            vector_count: counts.values().sum(),
            dimension: self.dimension,
            namespaces: counts,
        })
    }

    async fn delete_by_source(&self, namespace: &str, source: &str) -> Result<u64, BackendError> {
        let mut namespaces = self.namespaces.write().await;
        let Some(entries) = namespaces.get_mut(namespace) else {
            return Ok(0);
        };
        let before = entries.len();
        entries.retain(|e| e.source != source);
        Ok((before - entries.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, source: &str, embedding: Vec<f32>) -> VectorRecord {
        VectorRecord {
            id: id.to_string(),
            embedding,
            text: format!("text for {id}"),
            source: source.to_string(),
            page_number: None,
        }
    }

    #[test]
    fn cosine_basics() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[tokio::test]
    async fn upsert_then_query_returns_best_match_first() {
        let backend = InMemoryBackend::new(2);
        backend
            .upsert(
                "default",
                &[
                    record("a", "doc", vec![1.0, 0.0]),
                    record("b", "doc", vec![0.0, 1.0]),
                    record("c", "doc", vec![0.7, 0.7]),
                ],
            )
            .await
            .unwrap();

        let matches = backend.query("default", &[1.0, 0.0], 3).await.unwrap();
        assert_eq!(matches.len(), 3);
        assert_eq!(matches[0].chunk_id, "a");
        // Descending scores throughout.
        for pair in matches.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[tokio::test]
    async fn upsert_replaces_matching_ids() {
        let backend = InMemoryBackend::new(2);
        backend
            .upsert("default", &[record("a", "doc", vec![1.0, 0.0])])
            .await
            .unwrap();
        backend
            .upsert("default", &[record("a", "doc", vec![0.0, 1.0])])
            .await
            .unwrap();

        let stats = backend.stats(None).await.unwrap();
        assert_eq!(stats.vector_count, 1);

        let matches = backend.query("default", &[0.0, 1.0], 1).await.unwrap();
        assert!((matches[0].score - 1.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn namespaces_are_isolated() {
        let backend = InMemoryBackend::new(2);
        backend
            .upsert("alpha", &[record("a", "doc", vec![1.0, 0.0])])
            .await
            .unwrap();
        backend
            .upsert("beta", &[record("b", "doc", vec![1.0, 0.0])])
            .await
            .unwrap();

        let matches = backend.query("alpha", &[1.0, 0.0], 10).await.unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].chunk_id, "a");

        let empty = backend.query("missing", &[1.0, 0.0], 10).await.unwrap();
        assert!(empty.is_empty());
    }

    #[tokio::test]
    async fn zero_vector_sentinels_never_match() {
        let backend = InMemoryBackend::new(2);
        backend
            .upsert(
                "default",
                &[
                    record("real", "doc", vec![1.0, 0.0]),
                    record("sentinel", "doc", vec![0.0, 0.0]),
                ],
            )
            .await
            .unwrap();

        let matches = backend.query("default", &[1.0, 0.0], 10).await.unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].chunk_id, "real");

        // Still counted in stats: stored, just never retrievable.
        let stats = backend.stats(Some("default")).await.unwrap();
        assert_eq!(stats.vector_count, 2);
    }

    #[tokio::test]
    async fn delete_by_source_removes_only_that_source() {
        let backend = InMemoryBackend::new(2);
        backend
            .upsert(
                "default",
                &[
                    record("a", "keep.txt", vec![1.0, 0.0]),
                    record("b", "drop.txt", vec![0.0, 1.0]),
                    record("c", "drop.txt", vec![0.5, 0.5]),
                ],
            )
            .await
            .unwrap();

        let removed = backend.delete_by_source("default", "drop.txt").await.unwrap();
        assert_eq!(removed, 2);

        let stats = backend.stats(Some("default")).await.unwrap();
        assert_eq!(stats.vector_count, 1);
    }

    #[tokio::test]
    async fn equal_scores_keep_insertion_order() {
        let backend = InMemoryBackend::new(2);
        backend
            .upsert(
                "default",
                &[
                    record("first", "doc", vec![2.0, 0.0]),
                    record("second", "doc", vec![3.0, 0.0]),
                ],
            )
            .await
            .unwrap();

        // Cosine is scale-invariant: both score 1.0 against the query.
        let matches = backend.query("default", &[1.0, 0.0], 2).await.unwrap();
        assert_eq!(matches[0].chunk_id, "first");
        assert_eq!(matches[1].chunk_id, "second");
    }
}
