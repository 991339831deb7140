use async_trait::async_trait;
use heron_core::BackendError;

/// Trait for generation backends (Gemini, Ollama, etc.)
///
/// Generation parameters (model, temperature, output cap) are fixed at
/// construction; the pipeline hands over a fully rendered prompt.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Produce a completion for the prompt.
    async fn generate(&self, prompt: &str) -> Result<String, BackendError>;

    /// Cheap credential presence probe, used by health checks.
    fn ready(&self) -> Result<(), BackendError>;
}
