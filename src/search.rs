//! One-shot similarity search against the vector index.

use anyhow::{Context, Result};

use crate::config::Config;
use crate::embedding;
use crate::vector_store;

/// Embed `query`, fetch the `k` nearest records, and print them ranked.
pub async fn run_search(config: &Config, query: &str, k: usize) -> Result<()> {
    let embedder = embedding::create_embedder(&config.embedding)?;
    let index = vector_store::create_index(&config.vector_store)?;

    let query_vec = embedding::embed_query(embedder.as_ref(), query)
        .await
        .context("embedding the query failed")?;

    let matches = index
        .query(&query_vec, k)
        .await
        .context("vector search failed")?;

    if matches.is_empty() {
        println!("No results.");
        return Ok(());
    }

    for (rank, m) in matches.iter().enumerate() {
        println!("{}. [{:.4}] {}", rank + 1, m.score, m.id);
        for line in m.text.lines() {
            println!("   {}", line);
        }
        println!();
    }

    Ok(())
}
