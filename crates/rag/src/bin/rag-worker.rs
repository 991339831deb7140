//! rag-worker — CLI front door for the RAG pipeline.
//!
//! Ingests documents (txt/pdf) into the vector store and answers questions
//! against them. Backend selection (embedding/LLM provider, pgvector vs.
//! in-memory store) comes from the environment; see `Config::from_env`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;

use heron_core::config::load_dotenv;
use heron_core::Config;
use heron_ingest::document::extract_text;
use heron_rag::bootstrap;
use heron_rag::engine::HealthStatus;

// ── CLI ─────────────────────────────────────────────────────────────

/// RAG worker — document ingestion and grounded question answering.
#[derive(Parser, Debug)]
#[command(name = "rag-worker", version, about)]
struct Cli {
    /// Vector-store namespace to operate in (defaults to DEFAULT_NAMESPACE).
    #[arg(long)]
    namespace: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Ingest a document file (txt or pdf) into the knowledge base.
    Ingest {
        /// Path to the document.
        file: PathBuf,

        /// Source label stored with each chunk; defaults to the file name.
        #[arg(long)]
        source: Option<String>,
    },
    /// Ask a question against the ingested documents.
    Query {
        /// The question text.
        message: String,
    },
    /// Show vector counts, overall and per namespace.
    Stats,
    /// Report component health.
    Health,
    /// Delete every chunk ingested from a source.
    Delete {
        /// Source label to remove.
        source: String,
    },
}

// ── main ────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    load_dotenv();
    let cli = Cli::parse();
    let config = Config::from_env();

    let engine = bootstrap::build_engine(&config).await?;
    let namespace = cli.namespace.as_deref();

    match cli.command {
        Command::Ingest { file, source } => {
            let bytes = tokio::fs::read(&file).await?;
            let filename = file
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("unnamed")
                .to_string();
            let mut doc = extract_text(&bytes, &filename)?;
            if let Some(label) = source {
                doc.source = label;
            }

            let report = engine.ingest_document(&doc, namespace).await?;
            info!(
                source = %doc.source,
                chunks = report.chunks_created,
                pages = report.pages_processed,
                "ingest complete"
            );
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Query { message } => {
            let outcome = engine.query(&message, namespace, None).await?;
            println!("{}", outcome.answer);
            if !outcome.sources.is_empty() {
                println!("\nSources:");
                for hit in &outcome.sources {
                    println!(
                        "  [{:.3}] {} (page {})",
                        hit.score,
                        hit.source,
                        hit.page_number.unwrap_or(0),
                    );
                }
            }
        }
        Command::Stats => {
            let stats = engine.stats(namespace).await?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        Command::Health => {
            let report = engine.health().await;
            println!("{}", serde_json::to_string_pretty(&report)?);
            if report.status == HealthStatus::Degraded {
                std::process::exit(1);
            }
        }
        Command::Delete { source } => {
            let deleted = engine.delete_source(&source, namespace).await?;
            println!("deleted {deleted} chunk(s) from '{source}'");
        }
    }

    Ok(())
}
