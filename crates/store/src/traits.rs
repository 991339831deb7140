use async_trait::async_trait;
use heron_core::BackendError;

use crate::types::{IndexStats, RetrievedMatch, VectorRecord};

/// Trait for vector-store backends (in-memory, pgvector, etc.)
///
/// Backends implement the raw operations; batching, retries, and the
/// single-flight index-creation guard live in the gateway.
#[async_trait]
pub trait VectorBackend: Send + Sync {
    /// Create the index if it does not exist yet. Must be idempotent; the
    /// gateway serializes concurrent callers.
    async fn create_index(&self, dimension: usize) -> Result<(), BackendError>;

    /// Write one batch of records, replacing records with matching ids.
    /// Returns the number written.
    async fn upsert(
        &self,
        namespace: &str,
        records: &[VectorRecord],
    ) -> Result<usize, BackendError>;

    /// Nearest-neighbor search within a namespace, best matches first.
    /// Zero-norm (sentinel) records never match.
    async fn query(
        &self,
        namespace: &str,
        vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<RetrievedMatch>, BackendError>;

    /// Read-only counts; `namespace` narrows to one partition.
    async fn stats(&self, namespace: Option<&str>) -> Result<IndexStats, BackendError>;

    /// Delete every record of a source within a namespace. Returns the
    /// number removed.
    async fn delete_by_source(&self, namespace: &str, source: &str) -> Result<u64, BackendError>;
}
