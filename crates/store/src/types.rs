//! Storage and retrieval types.

use std::collections::BTreeMap;

use serde::Serialize;

/// One persisted chunk: vector plus the metadata needed for attribution.
#[derive(Debug, Clone)]
pub struct VectorRecord {
    pub id: String,
    pub embedding: Vec<f32>,
    pub text: String,
    pub source: String,
    pub page_number: Option<u32>,
}

/// A ranked retrieval hit. Scores are cosine similarity: higher = more
/// relevant, across every backend.
#[derive(Debug, Clone, Serialize)]
pub struct RetrievedMatch {
    pub chunk_id: String,
    pub text: String,
    pub source: String,
    pub page_number: Option<u32>,
    pub score: f32,
}

/// Read-only index introspection.
#[derive(Debug, Clone, Serialize)]
pub struct IndexStats {
    pub vector_count: u64,
    pub dimension: usize,
    /// Per-namespace vector counts.
    pub namespaces: BTreeMap<String, u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retrieved_match_serializes() {
        let hit = RetrievedMatch {
            chunk_id: "c1".into(),
            text: "some text".into(),
            source: "doc.pdf".into(),
            page_number: Some(3),
            score: 0.92,
        };
        let json = serde_json::to_string(&hit).unwrap();
        assert!(json.contains("\"score\":0.92"));
        assert!(json.contains("\"page_number\":3"));
        assert!(json.contains("\"source\":\"doc.pdf\""));
    }

    #[test]
    fn stats_serialize_with_namespace_counts() {
        let mut namespaces = BTreeMap::new();
        namespaces.insert("default".to_string(), 12u64);
        let stats = IndexStats {
            vector_count: 12,
            dimension: 768,
            namespaces,
        };
        let json = serde_json::to_string(&stats).unwrap();
        assert!(json.contains("\"vector_count\":12"));
        assert!(json.contains("\"default\":12"));
    }
}
