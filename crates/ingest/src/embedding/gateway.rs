//! Embedding gateway: zero-vector sentinel, caching, retry, and ordered
//! batch embedding over a pluggable backend.

use std::sync::Arc;

use futures::future::join_all;
use heron_core::{with_retry, BackendError, RagError, RetryPolicy};
use tokio::sync::Mutex;
use tracing::warn;

use super::cache::EmbeddingCache;
use super::traits::EmbeddingBackend;

pub struct EmbeddingGateway {
    backend: Arc<dyn EmbeddingBackend>,
    policy: RetryPolicy,
    cache: Mutex<EmbeddingCache>,
}

impl EmbeddingGateway {
    pub fn new(backend: Arc<dyn EmbeddingBackend>, policy: RetryPolicy, cache_capacity: usize) -> Self {
        Self {
            backend,
            policy,
            cache: Mutex::new(EmbeddingCache::new(cache_capacity)),
        }
    }

    pub fn dimensions(&self) -> usize {
        self.backend.dimensions()
    }

    /// The reserved "embedding failed, do not match" sentinel.
    pub fn zero_vector(&self) -> Vec<f32> {
        vec![0.0; self.backend.dimensions()]
    }

    /// Credential readiness of the underlying backend, for health checks.
    pub fn ready(&self) -> Result<(), BackendError> {
        self.backend.ready()
    }

    /// Embed one text with the full retry budget. Empty or whitespace-only
    /// input yields the zero-vector sentinel without touching the backend.
    /// Exhausted retries surface as an error: callers on the query path
    /// treat that as fatal for the request.
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>, RagError> {
        if text.trim().is_empty() {
            warn!("embedding requested for empty text, returning zero-vector sentinel");
            return Ok(self.zero_vector());
        }

        if let Some(hit) = self.cache.lock().await.get(text) {
            return Ok(hit);
        }

        let vector = with_retry(&self.policy, "embedding", || self.backend.embed(text))
            .await
            .map_err(|e| RagError::from_backend("embedding", self.policy.max_attempts, e))?;
        self.check_dimensions(&vector)?;

        self.cache.lock().await.put(text, vector.clone());
        Ok(vector)
    }

    /// Embed many texts in fixed-size groups, members of a group issued
    /// concurrently. Output length and order always match the input: one
    /// failing text never aborts the batch or shifts indices. A failed
    /// member gets a single isolated retry, then the zero-vector sentinel.
    /// Auth failures abort immediately.
    pub async fn embed_batch(
        &self,
        texts: &[String],
        batch_size: usize,
    ) -> Result<Vec<Vec<f32>>, RagError> {
        let batch_size = batch_size.max(1);
        let mut out = Vec::with_capacity(texts.len());

        for group in texts.chunks(batch_size) {
            let results = join_all(group.iter().map(|text| self.embed_lenient(text))).await;
            for result in results {
                out.push(result?);
            }
        }

        Ok(out)
    }

    /// One attempt, one isolated retry, then the logged zero-vector
    /// fallback. Only auth failures propagate.
    async fn embed_lenient(&self, text: &str) -> Result<Vec<f32>, RagError> {
        if text.trim().is_empty() {
            warn!("empty chunk text in batch, storing zero-vector sentinel");
            return Ok(self.zero_vector());
        }

        if let Some(hit) = self.cache.lock().await.get(text) {
            return Ok(hit);
        }

        let vector = match self.backend.embed(text).await {
            Ok(vector) => vector,
            Err(BackendError::Auth(message)) => {
                return Err(RagError::Auth {
                    component: "embedding",
                    message,
                })
            }
            Err(err) => {
                warn!(error = %err, "chunk embedding failed, retrying once in isolation");
                match self.backend.embed(text).await {
                    Ok(vector) => vector,
                    Err(BackendError::Auth(message)) => {
                        return Err(RagError::Auth {
                            component: "embedding",
                            message,
                        })
                    }
                    Err(err) => {
                        warn!(error = %err, "chunk embedding retry failed, falling back to zero vector");
                        return Ok(self.zero_vector());
                    }
                }
            }
        };
        self.check_dimensions(&vector)?;

        self.cache.lock().await.put(text, vector.clone());
        Ok(vector)
    }

    fn check_dimensions(&self, vector: &[f32]) -> Result<(), RagError> {
        let expected = self.backend.dimensions();
        if vector.len() != expected {
            return Err(RagError::Config(format!(
                "embedding dimension mismatch: expected {expected}, got {}",
                vector.len()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;

    const DIMS: usize = 4;

    /// Deterministic fake: texts containing "broken" always fail with a
    /// transient error, texts containing "flaky" fail on their first call
    /// only, everything else embeds to `[len; DIMS]`.
    struct FakeBackend {
        calls: AtomicUsize,
        per_text: StdMutex<HashMap<String, usize>>,
    }

    impl FakeBackend {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                per_text: StdMutex::new(HashMap::new()),
            }
        }

        fn total_calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn calls_for(&self, text: &str) -> usize {
            self.per_text
                .lock()
                .unwrap()
                .get(text)
                .copied()
                .unwrap_or(0)
        }
    }

    #[async_trait]
    impl EmbeddingBackend for FakeBackend {
        async fn embed(&self, text: &str) -> Result<Vec<f32>, BackendError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let attempt = {
                let mut per_text = self.per_text.lock().unwrap();
                let entry = per_text.entry(text.to_string()).or_insert(0);
                *entry += 1;
                *entry
            };

            if text.contains("auth") {
                return Err(BackendError::Auth("bad key".into()));
            }
            if text.contains("broken") {
                return Err(BackendError::Transient("down".into()));
            }
            if text.contains("flaky") && attempt == 1 {
                return Err(BackendError::Transient("blip".into()));
            }
            Ok(vec![text.len() as f32; DIMS])
        }

        fn dimensions(&self) -> usize {
            DIMS
        }

        fn ready(&self) -> Result<(), BackendError> {
            Ok(())
        }
    }

    fn gateway(backend: Arc<FakeBackend>) -> EmbeddingGateway {
        let policy = RetryPolicy::new(3, Duration::from_millis(1), Duration::from_millis(4));
        EmbeddingGateway::new(backend, policy, 64)
    }

    #[tokio::test]
    async fn empty_text_yields_zero_vector_without_backend_call() {
        let backend = Arc::new(FakeBackend::new());
        let gw = gateway(backend.clone());

        assert_eq!(gw.embed("").await.unwrap(), vec![0.0; DIMS]);
        assert_eq!(gw.embed("   \n ").await.unwrap(), vec![0.0; DIMS]);
        assert_eq!(backend.total_calls(), 0);
    }

    #[tokio::test]
    async fn embed_retries_transient_failures() {
        let backend = Arc::new(FakeBackend::new());
        let gw = gateway(backend.clone());

        // "flaky" fails once, then succeeds on the first retry.
        let vector = gw.embed("flaky text").await.unwrap();
        assert_eq!(vector, vec![10.0; DIMS]);
        assert_eq!(backend.calls_for("flaky text"), 2);
    }

    #[tokio::test]
    async fn embed_exhausts_budget_then_reports_degraded() {
        let backend = Arc::new(FakeBackend::new());
        let gw = gateway(backend.clone());

        let err = gw.embed("broken text").await.unwrap_err();
        assert!(matches!(err, RagError::Degraded { component: "embedding", .. }));
        assert_eq!(backend.calls_for("broken text"), 3);
    }

    #[tokio::test]
    async fn embed_surfaces_auth_immediately() {
        let backend = Arc::new(FakeBackend::new());
        let gw = gateway(backend.clone());

        let err = gw.embed("auth failure").await.unwrap_err();
        assert!(matches!(err, RagError::Auth { component: "embedding", .. }));
        assert_eq!(backend.total_calls(), 1);
    }

    #[tokio::test]
    async fn embed_caches_repeat_texts() {
        let backend = Arc::new(FakeBackend::new());
        let gw = gateway(backend.clone());

        let first = gw.embed("cached text").await.unwrap();
        let second = gw.embed("cached text").await.unwrap();
        assert_eq!(first, second);
        assert_eq!(backend.calls_for("cached text"), 1);
    }

    #[tokio::test]
    async fn batch_preserves_length_and_order_with_mixed_failures() {
        let backend = Arc::new(FakeBackend::new());
        let gw = gateway(backend.clone());

        let texts = vec![
            "first ok".to_string(),
            "broken one".to_string(),
            "second ok text".to_string(),
            "".to_string(),
            "broken two".to_string(),
        ];
        let vectors = gw.embed_batch(&texts, 2).await.unwrap();

        assert_eq!(vectors.len(), texts.len());
        assert_eq!(vectors[0], vec![8.0; DIMS]);
        assert_eq!(vectors[1], vec![0.0; DIMS]); // fallback sentinel
        assert_eq!(vectors[2], vec![14.0; DIMS]);
        assert_eq!(vectors[3], vec![0.0; DIMS]); // empty input sentinel
        assert_eq!(vectors[4], vec![0.0; DIMS]);
    }

    #[tokio::test]
    async fn batch_member_gets_one_isolated_retry() {
        let backend = Arc::new(FakeBackend::new());
        let gw = gateway(backend.clone());

        let texts = vec!["flaky member".to_string(), "steady".to_string()];
        let vectors = gw.embed_batch(&texts, 5).await.unwrap();

        // First call failed, the isolated retry succeeded: no sentinel.
        assert_eq!(vectors[0], vec![12.0; DIMS]);
        assert_eq!(backend.calls_for("flaky member"), 2);
        // A permanently broken member costs exactly two calls before the
        // fallback: the group pass and the isolated retry.
        let _ = gw.embed_batch(&["broken member".to_string()], 5).await.unwrap();
        assert_eq!(backend.calls_for("broken member"), 2);
    }

    #[tokio::test]
    async fn batch_aborts_on_auth_failure() {
        let backend = Arc::new(FakeBackend::new());
        let gw = gateway(backend.clone());

        let texts = vec!["fine".to_string(), "auth broken".to_string()];
        let err = gw.embed_batch(&texts, 2).await.unwrap_err();
        assert!(matches!(err, RagError::Auth { component: "embedding", .. }));
    }
}
