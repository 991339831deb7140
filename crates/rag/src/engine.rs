//! RAG orchestration: the ingest write path (clean → chunk → embed → store)
//! and the grounded query path (embed → retrieve → assemble → generate).

use std::sync::Arc;

use heron_core::config::{ChunkingConfig, RetrievalConfig};
use heron_core::{with_retry, Config, RagError, RetryPolicy};
use heron_ingest::chunker::{chunk_document, chunk_text, Chunk};
use heron_ingest::document::{clean, ExtractedDocument};
use heron_ingest::EmbeddingGateway;
use heron_store::{IndexStats, RetrievedMatch, VectorRecord, VectorStoreGateway};
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::prompt::{build_prompt, format_context, INSUFFICIENT_CONTEXT_ANSWER};
use crate::provider::GenerationBackend;

/// Write-path result: how much of the document made it into the store.
#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub chunks_created: usize,
    pub pages_processed: usize,
}

/// Query-path result: the grounded answer plus citation metadata for every
/// retrieved match, best first.
#[derive(Debug, Clone, Serialize)]
pub struct ChatOutcome {
    pub answer: String,
    pub sources: Vec<RetrievedMatch>,
    pub conversation_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentHealth {
    Ok,
    Error(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct ComponentReport {
    pub embedding: ComponentHealth,
    pub vector_store: ComponentHealth,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub components: ComponentReport,
}

/// The pipeline orchestrator. Methods take `&self` and are safe to run
/// concurrently; callers share one engine behind an `Arc`.
pub struct RagEngine {
    embedding: EmbeddingGateway,
    store: VectorStoreGateway,
    generator: Arc<dyn GenerationBackend>,
    chunking: ChunkingConfig,
    retrieval: RetrievalConfig,
    embed_batch_size: usize,
    generation_policy: RetryPolicy,
}

impl std::fmt::Debug for RagEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RagEngine")
            .field("chunking", &self.chunking)
            .field("retrieval", &self.retrieval)
            .field("embed_batch_size", &self.embed_batch_size)
            .field("generation_policy", &self.generation_policy)
            .finish()
    }
}

impl RagEngine {
    pub fn new(
        embedding: EmbeddingGateway,
        store: VectorStoreGateway,
        generator: Arc<dyn GenerationBackend>,
        config: &Config,
    ) -> Self {
        Self::with_generation_policy(embedding, store, generator, config, RetryPolicy::default())
    }

    /// Like [`new`](Self::new) but with an explicit retry schedule for the
    /// generation backend.
    pub fn with_generation_policy(
        embedding: EmbeddingGateway,
        store: VectorStoreGateway,
        generator: Arc<dyn GenerationBackend>,
        config: &Config,
        generation_policy: RetryPolicy,
    ) -> Self {
        Self {
            embedding,
            store,
            generator,
            chunking: config.chunking.clone(),
            retrieval: config.retrieval.clone(),
            embed_batch_size: config.embedding.batch_size,
            generation_policy,
        }
    }

    fn namespace<'a>(&'a self, namespace: Option<&'a str>) -> &'a str {
        namespace.unwrap_or(&self.retrieval.default_namespace)
    }

    /// Ingest raw (unpaged) text under a source label: clean, chunk, embed,
    /// and persist. A document with no usable text after cleaning is an
    /// input error.
    pub async fn ingest(
        &self,
        text: &str,
        source: &str,
        namespace: Option<&str>,
    ) -> Result<IngestReport, RagError> {
        let cleaned = clean(text);
        if cleaned.is_empty() {
            return Err(RagError::Input(format!(
                "document '{source}' contains no usable text"
            )));
        }

        let chunks = chunk_text(&cleaned, source, None, &self.chunking);
        let chunks_created = self
            .embed_and_store(chunks, self.namespace(namespace))
            .await?;

        Ok(IngestReport {
            chunks_created,
            pages_processed: 1,
        })
    }

    /// Page-aware ingest for extracted documents. Page numbers are carried
    /// onto chunks for paginated sources; sequence indices run across the
    /// whole document.
    pub async fn ingest_document(
        &self,
        doc: &ExtractedDocument,
        namespace: Option<&str>,
    ) -> Result<IngestReport, RagError> {
        let chunks = chunk_document(doc, &self.chunking);
        if chunks.is_empty() {
            return Err(RagError::Input(format!(
                "document '{}' ({}) contains no extractable text",
                doc.source, doc.kind
            )));
        }

        let pages_processed = doc.pages.len();
        let chunks_created = self
            .embed_and_store(chunks, self.namespace(namespace))
            .await?;

        Ok(IngestReport {
            chunks_created,
            pages_processed,
        })
    }

    async fn embed_and_store(
        &self,
        chunks: Vec<Chunk>,
        namespace: &str,
    ) -> Result<usize, RagError> {
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let vectors = self
            .embedding
            .embed_batch(&texts, self.embed_batch_size)
            .await?;

        let records: Vec<VectorRecord> = chunks
            .into_iter()
            .zip(vectors)
            .map(|(chunk, embedding)| VectorRecord {
                id: chunk.id,
                embedding,
                text: chunk.text,
                source: chunk.source,
                page_number: chunk.page_number,
            })
            .collect();

        let written = self.store.upsert(namespace, records).await?;
        info!(namespace, chunks = written, "document ingested");
        Ok(written)
    }

    /// Answer a question from the ingested documents.
    ///
    /// Embeds the query, retrieves the configured top-k matches, renders the
    /// best `max_context_chunks` into the prompt, and asks the generation
    /// backend. An empty result set short-circuits to the canned
    /// insufficient-information answer without touching the generator. All
    /// retrieved matches come back as `sources`, best first, even the ones
    /// that did not fit the prompt.
    pub async fn query(
        &self,
        message: &str,
        namespace: Option<&str>,
        conversation_id: Option<String>,
    ) -> Result<ChatOutcome, RagError> {
        if message.trim().is_empty() {
            return Err(RagError::Input("query must not be empty".into()));
        }
        let conversation_id =
            conversation_id.unwrap_or_else(|| Uuid::new_v4().to_string());
        let namespace = self.namespace(namespace);

        // Step 1: embed the query. Failure here is fatal for this request.
        let query_vector = self.embedding.embed(message).await?;

        // Step 2: retrieve.
        let matches = self
            .store
            .query(namespace, &query_vector, self.retrieval.top_k)
            .await?;
        if matches.is_empty() {
            info!(namespace, "no matches retrieved, returning canned answer");
            return Ok(ChatOutcome {
                answer: INSUFFICIENT_CONTEXT_ANSWER.to_string(),
                sources: Vec::new(),
                conversation_id,
            });
        }

        // Steps 3–4: assemble the bounded context and generate.
        let context_slice =
            &matches[..matches.len().min(self.retrieval.max_context_chunks)];
        let context = format_context(context_slice);
        let prompt = build_prompt(message.trim(), &context);
        debug!(
            namespace,
            matches = matches.len(),
            in_context = context_slice.len(),
            "generating grounded answer"
        );

        let answer = with_retry(&self.generation_policy, "generation", || {
            self.generator.generate(&prompt)
        })
        .await
        .map_err(|e| {
            RagError::from_backend("generation", self.generation_policy.max_attempts, e)
        })?;

        Ok(ChatOutcome {
            answer,
            sources: matches,
            conversation_id,
        })
    }

    /// Remove every chunk ingested from `source`. Returns the number removed.
    pub async fn delete_source(
        &self,
        source: &str,
        namespace: Option<&str>,
    ) -> Result<u64, RagError> {
        let namespace = self.namespace(namespace);
        let deleted = self.store.delete_by_source(namespace, source).await?;
        info!(namespace, source, deleted, "source deleted");
        Ok(deleted)
    }

    pub async fn stats(&self, namespace: Option<&str>) -> Result<IndexStats, RagError> {
        self.store.stats(namespace).await
    }

    /// Component health: the embedding backend's credential probe and a live
    /// stats call against the store. Any failing component degrades the
    /// overall status.
    pub async fn health(&self) -> HealthReport {
        let embedding = match self.embedding.ready() {
            Ok(()) => ComponentHealth::Ok,
            Err(err) => ComponentHealth::Error(err.to_string()),
        };
        let vector_store = match self.store.stats(None).await {
            Ok(_) => ComponentHealth::Ok,
            Err(err) => ComponentHealth::Error(err.to_string()),
        };

        let status = if matches!(embedding, ComponentHealth::Ok)
            && matches!(vector_store, ComponentHealth::Ok)
        {
            HealthStatus::Healthy
        } else {
            HealthStatus::Degraded
        };

        HealthReport {
            status,
            components: ComponentReport {
                embedding,
                vector_store,
            },
        }
    }
}
