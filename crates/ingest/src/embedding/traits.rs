use async_trait::async_trait;
use heron_core::BackendError;

/// Trait for embedding backends (Gemini, Ollama, etc.)
#[async_trait]
pub trait EmbeddingBackend: Send + Sync {
    /// Embed a single text into a fixed-dimension vector.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, BackendError>;

    /// The dimensionality of the output vectors.
    fn dimensions(&self) -> usize;

    /// Cheap readiness probe (credential presence), used by health checks.
    /// Does not call the remote service.
    fn ready(&self) -> Result<(), BackendError>;
}
