pub mod cache;
pub mod gateway;
pub mod gemini;
pub mod ollama;
pub mod traits;

pub use cache::EmbeddingCache;
pub use gateway::EmbeddingGateway;
pub use gemini::GeminiEmbedder;
pub use ollama::OllamaEmbedder;
pub use traits::EmbeddingBackend;
