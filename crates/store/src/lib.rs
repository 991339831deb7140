//! Namespaced vector storage: gateway with batched writes, retry, and
//! single-flight index creation over pluggable backends.

pub mod gateway;
pub mod memory;
pub mod pgvector;
pub mod traits;
pub mod types;

pub use gateway::VectorStoreGateway;
pub use memory::InMemoryBackend;
pub use pgvector::PgVectorBackend;
pub use traits::VectorBackend;
pub use types::{IndexStats, RetrievedMatch, VectorRecord};
