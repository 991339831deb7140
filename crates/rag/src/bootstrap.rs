//! Engine construction from configuration: backend selection and wiring.

use std::sync::Arc;

use heron_core::{Config, RagError, RetryPolicy};
use heron_ingest::embedding::{EmbeddingBackend, GeminiEmbedder, OllamaEmbedder};
use heron_ingest::EmbeddingGateway;
use heron_store::{InMemoryBackend, PgVectorBackend, VectorBackend, VectorStoreGateway};
use tracing::info;

use crate::engine::RagEngine;
use crate::provider::GenerationBackend;
use crate::providers::{GeminiProvider, OllamaProvider};

/// Build a ready-to-use engine from config: validates it, selects the
/// embedding/generation providers and the vector store, and wires the
/// gateways with the default retry schedule.
pub async fn build_engine(config: &Config) -> Result<RagEngine, RagError> {
    config.validate()?;

    let embedding = EmbeddingGateway::new(
        embedding_backend(config)?,
        RetryPolicy::default(),
        config.embedding.cache_capacity,
    );
    let store = VectorStoreGateway::new(
        vector_backend(config).await?,
        config.embedding.dimensions,
        RetryPolicy::default(),
    );
    let generator = generation_backend(config)?;

    Ok(RagEngine::new(embedding, store, generator, config))
}

fn embedding_backend(config: &Config) -> Result<Arc<dyn EmbeddingBackend>, RagError> {
    let cfg = &config.embedding;
    match cfg.provider.as_str() {
        "gemini" => {
            let api_key = cfg.google_api_key.clone().ok_or_else(|| {
                RagError::Config("GOOGLE_API_KEY is required for the gemini embedding provider".into())
            })?;
            Ok(Arc::new(GeminiEmbedder::new(
                api_key,
                cfg.model.clone(),
                cfg.dimensions,
            )))
        }
        "ollama" => Ok(Arc::new(OllamaEmbedder::new(
            cfg.ollama_url.clone(),
            cfg.model.clone(),
            cfg.dimensions,
        ))),
        other => Err(RagError::Config(format!(
            "unknown embedding provider '{other}' (expected gemini or ollama)"
        ))),
    }
}

fn generation_backend(config: &Config) -> Result<Arc<dyn GenerationBackend>, RagError> {
    let cfg = &config.generation;
    match cfg.provider.as_str() {
        "gemini" => {
            let api_key = cfg.google_api_key.clone().ok_or_else(|| {
                RagError::Config("GOOGLE_API_KEY is required for the gemini LLM provider".into())
            })?;
            Ok(Arc::new(GeminiProvider::new(
                api_key,
                cfg.model.clone(),
                cfg.temperature,
                cfg.max_tokens,
            )))
        }
        "ollama" => Ok(Arc::new(OllamaProvider::new(
            cfg.ollama_url.clone(),
            cfg.model.clone(),
            cfg.temperature,
            cfg.max_tokens,
        ))),
        other => Err(RagError::Config(format!(
            "unknown LLM provider '{other}' (expected gemini or ollama)"
        ))),
    }
}

async fn vector_backend(config: &Config) -> Result<Arc<dyn VectorBackend>, RagError> {
    match &config.store.database_url {
        Some(url) => {
            let backend = PgVectorBackend::connect(url, config.embedding.dimensions)
                .await
                .map_err(|e| RagError::from_backend("vector_store", 1, e))?;
            info!("vector store: pgvector");
            Ok(Arc::new(backend))
        }
        None => {
            info!("DATABASE_URL not set, vector store: in-memory");
            Ok(Arc::new(InMemoryBackend::new(config.embedding.dimensions)))
        }
    }
}
