//! Ingestion pipeline: extract, label, embed, upsert.
//!
//! Runs every configured source through its extractor, embeds the labeled
//! chunks in batches, and upserts them into the vector index. Extraction
//! failures are per-source (reported and skipped); embedding and upsert
//! failures abort the run.

use anyhow::{Context, Result};

use crate::config::Config;
use crate::embedding;
use crate::label::{self, RunReport};
use crate::models::{VectorMetadata, VectorRecord};
use crate::pdf;
use crate::vector_store;

/// Run the full ingestion pipeline. With `dry_run`, stop after labeling and
/// report what would be indexed.
pub async fn run_ingest(config: &Config, dry_run: bool) -> Result<()> {
    let pages = pdf::open_page_source();
    let (chunks, report) = label::build_labeled_chunks(config, pages.as_ref());
    print_report(&report);

    label::ensure_unique_labels(&chunks)?;

    if chunks.is_empty() {
        println!("Nothing to index.");
        return Ok(());
    }

    if dry_run {
        println!("Dry run: {} chunks ready to index.", chunks.len());
        return Ok(());
    }

    let embedder = embedding::create_embedder(&config.embedding)?;
    let index = vector_store::create_index(&config.vector_store)?;

    println!(
        "Embedding {} chunks with {}...",
        chunks.len(),
        embedder.model_name()
    );

    let mut records = Vec::with_capacity(chunks.len());
    for batch in chunks.chunks(config.embedding.batch_size) {
        let texts: Vec<String> = batch.iter().map(|c| c.content.clone()).collect();
        let vectors = embedder
            .embed(&texts)
            .await
            .context("embedding batch failed")?;
        anyhow::ensure!(
            vectors.len() == batch.len(),
            "Embedding batch returned {} vectors for {} inputs",
            vectors.len(),
            batch.len()
        );

        for (chunk, values) in batch.iter().zip(vectors) {
            records.push(VectorRecord {
                id: chunk.label.clone(),
                values,
                metadata: VectorMetadata {
                    text: chunk.content.clone(),
                },
            });
        }
    }

    println!("Upserting {} vectors...", records.len());
    for batch in records.chunks(config.vector_store.upsert_batch_size) {
        index.upsert(batch).await.context("upsert batch failed")?;
    }

    println!(
        "Done: {} vectors indexed from {} sources ({} failed).",
        records.len(),
        report.succeeded(),
        report.failed()
    );

    Ok(())
}

fn print_report(report: &RunReport) {
    for outcome in &report.outcomes {
        match &outcome.error {
            None => println!(
                "  {} <- {} ({} chunks)",
                outcome.category, outcome.source, outcome.chunks
            ),
            Some(e) => eprintln!("  {} <- {} FAILED: {}", outcome.category, outcome.source, e),
        }
    }
}
