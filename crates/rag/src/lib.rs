//! Retrieval-augmented generation: grounded query answering over the
//! ingest and vector-store pipelines.

pub mod bootstrap;
pub mod engine;
pub mod prompt;
pub mod provider;
pub mod providers;

pub use engine::{ChatOutcome, HealthReport, IngestReport, RagEngine};
pub use provider::GenerationBackend;
