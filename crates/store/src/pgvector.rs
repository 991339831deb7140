//! PostgreSQL + pgvector backend.
//!
//! One `rag_chunks` table partitioned by a `namespace` column; cosine
//! distance via the `<=>` operator, reported to callers as `1 - distance`
//! so higher scores stay more relevant.

use async_trait::async_trait;
use heron_core::BackendError;
use pgvector::Vector;
use sqlx::{PgPool, Row};
use tracing::info;

use crate::traits::VectorBackend;
use crate::types::{IndexStats, RetrievedMatch, VectorRecord};

pub struct PgVectorBackend {
    pool: PgPool,
    dimension: usize,
}

impl PgVectorBackend {
    pub fn new(pool: PgPool, dimension: usize) -> Self {
        Self { pool, dimension }
    }

    pub async fn connect(database_url: &str, dimension: usize) -> Result<Self, BackendError> {
        let pool = PgPool::connect(database_url).await.map_err(map_sqlx)?;
        Ok(Self::new(pool, dimension))
    }
}

fn map_sqlx(err: sqlx::Error) -> BackendError {
    if let sqlx::Error::Database(db) = &err {
        if let Some(code) = db.code() {
            // 28xxx: invalid authorization. 42P01: undefined table.
            if code.starts_with("28") {
                return BackendError::Auth(db.to_string());
            }
            if code == "42P01" {
                return BackendError::NotFound("vector index not created yet".into());
            }
        }
    }
    BackendError::Transient(err.to_string())
}

#[async_trait]
impl VectorBackend for PgVectorBackend {
    async fn create_index(&self, dimension: usize) -> Result<(), BackendError> {
        sqlx::query("CREATE EXTENSION IF NOT EXISTS vector")
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;

        sqlx::query(&format!(
            "CREATE TABLE IF NOT EXISTS rag_chunks (
                id TEXT PRIMARY KEY,
                namespace TEXT NOT NULL,
                content TEXT NOT NULL,
                source TEXT NOT NULL,
                page_number INT,
                embedding vector({dimension}) NOT NULL,
                ingested_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )"
        ))
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS rag_chunks_namespace_idx ON rag_chunks (namespace)",
        )
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;

        info!(dimension, "pgvector index ready");
        Ok(())
    }

    async fn upsert(
        &self,
        namespace: &str,
        records: &[VectorRecord],
    ) -> Result<usize, BackendError> {
        let ingested_at = chrono::Utc::now();
        for record in records {
            let embedding = Vector::from(record.embedding.clone());
            sqlx::query(
                "INSERT INTO rag_chunks (id, namespace, content, source, page_number, embedding, ingested_at) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7) \
                 ON CONFLICT (id) DO UPDATE SET \
                 namespace = EXCLUDED.namespace, content = EXCLUDED.content, \
                 source = EXCLUDED.source, page_number = EXCLUDED.page_number, \
                 embedding = EXCLUDED.embedding",
            )
            .bind(&record.id)
            .bind(namespace)
            .bind(&record.text)
            .bind(&record.source)
            .bind(record.page_number.map(|p| p as i32))
            .bind(&embedding)
            .bind(ingested_at)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
        }
        Ok(records.len())
    }

    async fn query(
        &self,
        namespace: &str,
        vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<RetrievedMatch>, BackendError> {
        let embedding = Vector::from(vector.to_vec());
        let rows = sqlx::query(
            "SELECT id, content, source, page_number, \
             1.0 - (embedding <=> $1::vector) AS score \
             FROM rag_chunks \
             WHERE namespace = $2 AND vector_norm(embedding) > 0 \
             ORDER BY embedding <=> $1::vector \
             LIMIT $3",
        )
        .bind(&embedding)
        .bind(namespace)
        .bind(top_k as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx)?;

        let matches = rows
            .iter()
            .map(|row| RetrievedMatch {
                chunk_id: row.get("id"),
                text: row.get("content"),
                source: row.get("source"),
                page_number: row.get::<Option<i32>, _>("page_number").map(|p| p as u32),
                score: row.get::<f64, _>("score") as f32,
            })
            .collect();
        Ok(matches)
    }

    async fn stats(&self, namespace: Option<&str>) -> Result<IndexStats, BackendError> {
        let rows = match namespace {
            Some(ns) => sqlx::query(
                "SELECT namespace, COUNT(*) AS count FROM rag_chunks \
                 WHERE namespace = $1 GROUP BY namespace",
            )
            .bind(ns)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx)?,
            None => sqlx::query(
                "SELECT namespace, COUNT(*) AS count FROM rag_chunks GROUP BY namespace",
            )
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx)?,
        };

        let mut namespaces = std::collections::BTreeMap::new();
        for row in &rows {
            namespaces.insert(
                row.get::<String, _>("namespace"),
                row.get::<i64, _>("count") as u64,
            );
        }
        Ok(IndexStats {
            vector_count: namespaces.values().sum(),
            dimension: self.dimension,
            namespaces,
        })
    }

    async fn delete_by_source(&self, namespace: &str, source: &str) -> Result<u64, BackendError> {
        let result = sqlx::query("DELETE FROM rag_chunks WHERE namespace = $1 AND source = $2")
            .bind(namespace)
            .bind(source)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_database_errors_are_transient() {
        assert!(matches!(
            map_sqlx(sqlx::Error::RowNotFound),
            BackendError::Transient(_)
        ));
        assert!(matches!(
            map_sqlx(sqlx::Error::PoolTimedOut),
            BackendError::Transient(_)
        ));
    }
}
