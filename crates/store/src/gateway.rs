//! Vector-store gateway: lazy single-flight index creation, batched writes
//! with per-batch retry, and deterministic result ordering.

use std::sync::Arc;

use heron_core::{with_retry, BackendError, RagError, RetryPolicy};
use tokio::sync::OnceCell;
use tracing::{debug, error, info};

use crate::traits::VectorBackend;
use crate::types::{IndexStats, RetrievedMatch, VectorRecord};

/// Records per write batch, sized to stay under backend payload limits.
pub const UPSERT_BATCH_SIZE: usize = 100;

pub struct VectorStoreGateway {
    backend: Arc<dyn VectorBackend>,
    dimension: usize,
    policy: RetryPolicy,
    index_ready: OnceCell<()>,
}

impl VectorStoreGateway {
    pub fn new(backend: Arc<dyn VectorBackend>, dimension: usize, policy: RetryPolicy) -> Self {
        Self {
            backend,
            dimension,
            policy,
            index_ready: OnceCell::new(),
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Create the index exactly once across all concurrent callers. A
    /// failed attempt leaves the cell empty so the next caller tries again.
    async fn ensure_index(&self) -> Result<(), RagError> {
        self.index_ready
            .get_or_try_init(|| async {
                info!(dimension = self.dimension, "creating vector index");
                with_retry(&self.policy, "vector_store", || {
                    self.backend.create_index(self.dimension)
                })
                .await
            })
            .await
            .map(|_| ())
            .map_err(|e| RagError::from_backend("vector_store", self.policy.max_attempts, e))
    }

    /// Write records in fixed-size batches. Each batch gets the full retry
    /// budget; a batch that still fails aborts the call, but batches already
    /// written stay committed (no cross-batch transaction).
    pub async fn upsert(
        &self,
        namespace: &str,
        records: Vec<VectorRecord>,
    ) -> Result<usize, RagError> {
        if records.is_empty() {
            return Ok(0);
        }
        for record in &records {
            if record.embedding.len() != self.dimension {
                return Err(RagError::Config(format!(
                    "record {} has dimension {}, index expects {}",
                    record.id,
                    record.embedding.len(),
                    self.dimension
                )));
            }
        }

        self.ensure_index().await?;

        let mut written = 0usize;
        for batch in records.chunks(UPSERT_BATCH_SIZE) {
            match with_retry(&self.policy, "vector_store", || {
                self.backend.upsert(namespace, batch)
            })
            .await
            {
                Ok(count) => written += count,
                Err(err) => {
                    error!(
                        namespace,
                        written,
                        batch_len = batch.len(),
                        error = %err,
                        "batch write failed after retries; earlier batches remain committed"
                    );
                    return Err(match err {
                        BackendError::Auth(message) => RagError::Auth {
                            component: "vector_store",
                            message,
                        },
                        other => RagError::Degraded {
                            component: "vector_store",
                            attempts: self.policy.max_attempts,
                            message: format!("batch write failed with {written} records committed: {other}"),
                        },
                    });
                }
            }
        }

        debug!(namespace, written, "vector upsert complete");
        Ok(written)
    }

    /// Top-k search. Results are re-sorted descending by score here even if
    /// the backend already sorted; the stable sort makes tie order
    /// deterministic per invocation.
    pub async fn query(
        &self,
        namespace: &str,
        vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<RetrievedMatch>, RagError> {
        if top_k == 0 {
            return Err(RagError::Input("top_k must be > 0".into()));
        }

        self.ensure_index().await?;

        let mut matches = with_retry(&self.policy, "vector_store", || {
            self.backend.query(namespace, vector, top_k)
        })
        .await
        .map_err(|e| RagError::from_backend("vector_store", self.policy.max_attempts, e))?;

        matches.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        matches.truncate(top_k);
        Ok(matches)
    }

    /// Read-only introspection; deliberately does not create the index.
    pub async fn stats(&self, namespace: Option<&str>) -> Result<IndexStats, RagError> {
        with_retry(&self.policy, "vector_store", || self.backend.stats(namespace))
            .await
            .map_err(|e| RagError::from_backend("vector_store", self.policy.max_attempts, e))
    }

    pub async fn delete_by_source(&self, namespace: &str, source: &str) -> Result<u64, RagError> {
        self.ensure_index().await?;
        with_retry(&self.policy, "vector_store", || {
            self.backend.delete_by_source(namespace, source)
        })
        .await
        .map_err(|e| RagError::from_backend("vector_store", self.policy.max_attempts, e))
    }
}
