//! Chunk output type.

/// A bounded slice of a document's text with attribution metadata.
#[derive(Debug, Clone)]
pub struct Chunk {
    /// Fresh uuid minted at chunking time; re-ingestion creates new ids.
    pub id: String,
    /// The chunk text content. Never empty.
    pub text: String,
    /// Source label of the parent document (filename or manual-entry tag).
    pub source: String,
    /// 1-based page number for paginated sources, absent otherwise.
    pub page_number: Option<u32>,
    /// 0-based position within the document; strictly increasing.
    pub sequence_index: usize,
    /// Filled by the embedding gateway; `None` until embedded.
    pub embedding: Option<Vec<f32>>,
}
