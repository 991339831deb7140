//! Document ingestion: text extraction, cleaning, chunking, and embedding.

pub mod chunker;
pub mod document;
pub mod embedding;

pub use chunker::{chunk_document, chunk_text, Chunk};
pub use document::{clean, extract_text, ExtractedDocument, PageText};
pub use embedding::{EmbeddingBackend, EmbeddingGateway};
