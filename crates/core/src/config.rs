use std::env;

use serde::{Deserialize, Serialize};

use crate::error::RagError;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

fn env_usize(key: &str, default: usize) -> usize {
    env_opt(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_f32(key: &str, default: f32) -> f32 {
    env_opt(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub chunking: ChunkingConfig,
    pub embedding: EmbeddingConfig,
    pub generation: GenerationConfig,
    pub retrieval: RetrievalConfig,
    pub store: StoreConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    pub fn from_env() -> Self {
        Self {
            chunking: ChunkingConfig::from_env(),
            embedding: EmbeddingConfig::from_env(),
            generation: GenerationConfig::from_env(),
            retrieval: RetrievalConfig::from_env(),
            store: StoreConfig::from_env(),
        }
    }

    /// Reject configurations that would break pipeline invariants.
    pub fn validate(&self) -> Result<(), RagError> {
        self.chunking.validate()?;
        if self.embedding.dimensions == 0 {
            return Err(RagError::Config("EMBEDDING_DIMENSIONS must be > 0".into()));
        }
        if self.embedding.batch_size == 0 {
            return Err(RagError::Config("EMBEDDING_BATCH_SIZE must be > 0".into()));
        }
        if self.retrieval.top_k == 0 {
            return Err(RagError::Config("TOP_K_RESULTS must be > 0".into()));
        }
        Ok(())
    }
}

// ── Chunking ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Maximum characters per chunk.
    pub chunk_size: usize,
    /// Characters of overlap between adjacent chunks. Must be < chunk_size.
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            chunk_overlap: 100,
        }
    }
}

impl ChunkingConfig {
    pub fn from_env() -> Self {
        Self {
            chunk_size: env_usize("CHUNK_SIZE", 500),
            chunk_overlap: env_usize("CHUNK_OVERLAP", 100),
        }
    }

    /// Overlap must leave the window room to advance.
    pub fn validate(&self) -> Result<(), RagError> {
        if self.chunk_size == 0 {
            return Err(RagError::Config("CHUNK_SIZE must be > 0".into()));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(RagError::Config(format!(
                "CHUNK_OVERLAP ({}) must be smaller than CHUNK_SIZE ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

// ── Embedding ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Backend selector: "gemini" or "ollama".
    pub provider: String,
    pub model: String,
    /// Fixed output dimension for the chosen backend.
    pub dimensions: usize,
    /// Texts embedded concurrently per batch group.
    pub batch_size: usize,
    /// LRU embedding-cache capacity (entries).
    pub cache_capacity: usize,
    pub google_api_key: Option<String>,
    pub ollama_url: String,
}

impl EmbeddingConfig {
    pub fn from_env() -> Self {
        Self {
            provider: env_or("EMBEDDING_PROVIDER", "gemini"),
            model: env_or("EMBEDDING_MODEL", "embedding-001"),
            dimensions: env_usize("EMBEDDING_DIMENSIONS", 768),
            batch_size: env_usize("EMBEDDING_BATCH_SIZE", 5),
            cache_capacity: env_usize("EMBEDDING_CACHE_CAPACITY", 1024),
            google_api_key: env_opt("GOOGLE_API_KEY"),
            ollama_url: env_or("OLLAMA_URL", "http://localhost:11434"),
        }
    }
}

// ── Generation ────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Backend selector: "gemini" or "ollama".
    pub provider: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub google_api_key: Option<String>,
    pub ollama_url: String,
}

impl GenerationConfig {
    pub fn from_env() -> Self {
        Self {
            provider: env_or("LLM_PROVIDER", "gemini"),
            model: env_or("LLM_MODEL", "gemini-2.5-flash"),
            temperature: env_f32("LLM_TEMPERATURE", 0.2),
            max_tokens: env_opt("LLM_MAX_TOKENS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(1024),
            google_api_key: env_opt("GOOGLE_API_KEY"),
            ollama_url: env_or("OLLAMA_URL", "http://localhost:11434"),
        }
    }
}

// ── Retrieval ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Matches fetched from the store per query.
    pub top_k: usize,
    /// Best matches actually rendered into the prompt.
    pub max_context_chunks: usize,
    pub default_namespace: String,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            max_context_chunks: 3,
            default_namespace: "default".to_string(),
        }
    }
}

impl RetrievalConfig {
    pub fn from_env() -> Self {
        Self {
            top_k: env_usize("TOP_K_RESULTS", 5),
            max_context_chunks: env_usize("MAX_CONTEXT_CHUNKS", 3),
            default_namespace: env_or("DEFAULT_NAMESPACE", "default"),
        }
    }
}

// ── Store ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// PostgreSQL connection string; unset selects the in-memory backend.
    pub database_url: Option<String>,
}

impl StoreConfig {
    pub fn from_env() -> Self {
        Self {
            database_url: env_opt("DATABASE_URL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config {
            chunking: ChunkingConfig::default(),
            embedding: EmbeddingConfig {
                provider: "gemini".into(),
                model: "embedding-001".into(),
                dimensions: 768,
                batch_size: 5,
                cache_capacity: 16,
                google_api_key: Some("key".into()),
                ollama_url: "http://localhost:11434".into(),
            },
            generation: GenerationConfig {
                provider: "gemini".into(),
                model: "gemini-2.5-flash".into(),
                temperature: 0.2,
                max_tokens: 1024,
                google_api_key: Some("key".into()),
                ollama_url: "http://localhost:11434".into(),
            },
            retrieval: RetrievalConfig::default(),
            store: StoreConfig { database_url: None },
        }
    }

    #[test]
    fn valid_defaults_pass() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn overlap_must_be_smaller_than_chunk_size() {
        let mut config = base_config();
        config.chunking.chunk_overlap = config.chunking.chunk_size;
        assert!(matches!(config.validate(), Err(RagError::Config(_))));

        config.chunking.chunk_overlap = config.chunking.chunk_size + 1;
        assert!(matches!(config.validate(), Err(RagError::Config(_))));
    }

    #[test]
    fn zero_chunk_size_rejected() {
        let mut config = base_config();
        config.chunking.chunk_size = 0;
        config.chunking.chunk_overlap = 0;
        assert!(matches!(config.validate(), Err(RagError::Config(_))));
    }

    #[test]
    fn zero_top_k_rejected() {
        let mut config = base_config();
        config.retrieval.top_k = 0;
        assert!(matches!(config.validate(), Err(RagError::Config(_))));
    }
}
