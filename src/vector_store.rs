//! Vector index capability and its Pinecone implementation.
//!
//! Two operations: batch upsert of `{id, values, metadata.text}` records and
//! top-k similarity search. Batch sizing is the caller's concern
//! (`vector_store.upsert_batch_size`); a failed request is fatal to the run.

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use std::time::Duration;

use crate::config::VectorStoreConfig;
use crate::models::{VectorMatch, VectorRecord};

#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Upsert one batch of records. Record ids overwrite on collision.
    async fn upsert(&self, records: &[VectorRecord]) -> Result<()>;

    /// Return the `top_k` most similar records to `vector`.
    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<VectorMatch>>;
}

/// Create the configured index client. Requires `PINECONE_API_KEY` in the
/// environment for the Pinecone provider.
pub fn create_index(config: &VectorStoreConfig) -> Result<Box<dyn VectorIndex>> {
    match config.provider.as_str() {
        "pinecone" => Ok(Box::new(PineconeIndex::new(config)?)),
        other => bail!("Unknown vector store provider: {}", other),
    }
}

/// Pinecone index client over the REST data-plane API.
pub struct PineconeIndex {
    host: String,
    api_key: String,
    client: reqwest::Client,
}

impl PineconeIndex {
    pub fn new(config: &VectorStoreConfig) -> Result<Self> {
        if config.host.is_empty() {
            bail!("vector_store.host must be set (the index endpoint URL)");
        }
        let api_key = std::env::var("PINECONE_API_KEY")
            .map_err(|_| anyhow!("PINECONE_API_KEY environment variable not set"))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            host: config.host.trim_end_matches('/').to_string(),
            api_key,
            client,
        })
    }
}

#[async_trait]
impl VectorIndex for PineconeIndex {
    async fn upsert(&self, records: &[VectorRecord]) -> Result<()> {
        let body = serde_json::json!({ "vectors": records });

        let response = self
            .client
            .post(format!("{}/vectors/upsert", self.host))
            .header("Api-Key", &self.api_key)
            .json(&body)
            .send()
            .await
            .context("vector store upsert request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            bail!("vector store upsert error {}: {}", status, body_text);
        }
        Ok(())
    }

    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<VectorMatch>> {
        let body = serde_json::json!({
            "vector": vector,
            "topK": top_k,
            "includeMetadata": true,
        });

        let response = self
            .client
            .post(format!("{}/query", self.host))
            .header("Api-Key", &self.api_key)
            .json(&body)
            .send()
            .await
            .context("vector store query request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            bail!("vector store query error {}: {}", status, body_text);
        }

        let json: serde_json::Value = response.json().await?;
        parse_query_response(&json)
    }
}

/// Extract matches from a Pinecone query response.
fn parse_query_response(json: &serde_json::Value) -> Result<Vec<VectorMatch>> {
    let matches = json
        .get("matches")
        .and_then(|m| m.as_array())
        .ok_or_else(|| anyhow!("Invalid query response: missing matches array"))?;

    let mut results = Vec::with_capacity(matches.len());
    for item in matches {
        let id = item
            .get("id")
            .and_then(|v| v.as_str())
            .ok_or_else(|| anyhow!("Invalid query response: match without id"))?;
        let score = item.get("score").and_then(|v| v.as_f64()).unwrap_or(0.0) as f32;
        let text = item
            .get("metadata")
            .and_then(|m| m.get("text"))
            .and_then(|t| t.as_str())
            .unwrap_or("")
            .to_string();

        results.push(VectorMatch {
            id: id.to_string(),
            score,
            text,
        });
    }

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_query_response() {
        let json = serde_json::json!({
            "matches": [
                {"id": "bulletin_0_chunk_3", "score": 0.87, "metadata": {"text": "holiday list"}},
                {"id": "course_2_chunk_0", "score": 0.61, "metadata": {"text": "CS101"}},
            ]
        });
        let matches = parse_query_response(&json).unwrap();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].id, "bulletin_0_chunk_3");
        assert!((matches[0].score - 0.87).abs() < 1e-6);
        assert_eq!(matches[1].text, "CS101");
    }

    #[test]
    fn test_parse_query_response_missing_metadata_tolerated() {
        let json = serde_json::json!({"matches": [{"id": "x", "score": 0.5}]});
        let matches = parse_query_response(&json).unwrap();
        assert_eq!(matches[0].text, "");
    }

    #[test]
    fn test_parse_query_response_missing_matches_is_error() {
        let json = serde_json::json!({"results": []});
        assert!(parse_query_response(&json).is_err());
    }
}
