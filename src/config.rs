use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub sources: SourcesConfig,
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub vector_store: VectorStoreConfig,
    #[serde(default)]
    pub chat: ChatConfig,
}

/// The fixed set of ingestion inputs, grouped by category.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct SourcesConfig {
    /// Two-column bulletin PDFs, extracted left half then right half per page.
    #[serde(default)]
    pub bulletins: Vec<PathBuf>,
    /// PDFs whose tables are flattened and appended after each page's text.
    #[serde(default)]
    pub tabular: Vec<PathBuf>,
    /// Directory scanned for handout PDFs (one unsplit chunk per file).
    #[serde(default)]
    pub handouts_dir: Option<PathBuf>,
    /// Structured timetable JSON (top-level `courses` object).
    #[serde(default)]
    pub timetable: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChunkingConfig {
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
        }
    }
}

fn default_chunk_size() -> usize {
    1000
}
fn default_chunk_overlap() -> usize {
    300
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmbeddingConfig {
    #[serde(default = "default_embedding_provider")]
    pub provider: String,
    #[serde(default = "default_embedding_model")]
    pub model: String,
    /// Optional reduced output dimension, passed through to the provider.
    #[serde(default)]
    pub dimensions: Option<usize>,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_embedding_provider(),
            model: default_embedding_model(),
            dimensions: None,
            batch_size: default_batch_size(),
            max_retries: default_max_retries(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_embedding_provider() -> String {
    "openai".to_string()
}
fn default_embedding_model() -> String {
    "text-embedding-3-large".to_string()
}
fn default_batch_size() -> usize {
    64
}
fn default_max_retries() -> u32 {
    5
}
fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct VectorStoreConfig {
    #[serde(default = "default_store_provider")]
    pub provider: String,
    /// Index endpoint, e.g. `https://myindex-abc123.svc.region.pinecone.io`.
    #[serde(default)]
    pub host: String,
    #[serde(default = "default_upsert_batch_size")]
    pub upsert_batch_size: usize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self {
            provider: default_store_provider(),
            host: String::new(),
            upsert_batch_size: default_upsert_batch_size(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_store_provider() -> String {
    "pinecone".to_string()
}
fn default_upsert_batch_size() -> usize {
    100
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChatConfig {
    #[serde(default = "default_chat_provider")]
    pub provider: String,
    #[serde(default = "default_chat_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            provider: default_chat_provider(),
            model: default_chat_model(),
            temperature: default_temperature(),
            top_k: default_top_k(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_chat_provider() -> String {
    "openai".to_string()
}
fn default_chat_model() -> String {
    "gpt-4o-mini".to_string()
}
fn default_temperature() -> f64 {
    0.2
}
fn default_top_k() -> usize {
    8
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    // Validate chunking
    if config.chunking.chunk_size == 0 {
        anyhow::bail!("chunking.chunk_size must be > 0");
    }
    if config.chunking.chunk_overlap >= config.chunking.chunk_size {
        anyhow::bail!("chunking.chunk_overlap must be smaller than chunking.chunk_size");
    }

    // Validate embedding
    if config.embedding.batch_size == 0 {
        anyhow::bail!("embedding.batch_size must be > 0");
    }
    match config.embedding.provider.as_str() {
        "openai" => {}
        other => anyhow::bail!("Unknown embedding provider: '{}'. Must be openai.", other),
    }

    // Validate vector store
    if config.vector_store.upsert_batch_size == 0 {
        anyhow::bail!("vector_store.upsert_batch_size must be > 0");
    }
    match config.vector_store.provider.as_str() {
        "pinecone" => {}
        other => anyhow::bail!("Unknown vector store provider: '{}'. Must be pinecone.", other),
    }

    // Validate chat
    if config.chat.top_k == 0 {
        anyhow::bail!("chat.top_k must be > 0");
    }
    match config.chat.provider.as_str() {
        "openai" => {}
        other => anyhow::bail!("Unknown chat provider: '{}'. Must be openai.", other),
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let file = write_config("[sources]\nbulletins = []\n");
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.chunking.chunk_size, 1000);
        assert_eq!(config.chunking.chunk_overlap, 300);
        assert_eq!(config.embedding.provider, "openai");
        assert_eq!(config.vector_store.upsert_batch_size, 100);
        assert_eq!(config.chat.top_k, 8);
    }

    #[test]
    fn test_overlap_must_be_smaller_than_size() {
        let file = write_config(
            "[sources]\n[chunking]\nchunk_size = 100\nchunk_overlap = 100\n",
        );
        let err = load_config(file.path()).unwrap_err();
        assert!(err.to_string().contains("chunk_overlap"));
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let file = write_config("[sources]\n[embedding]\nprovider = \"cohere\"\n");
        let err = load_config(file.path()).unwrap_err();
        assert!(err.to_string().contains("Unknown embedding provider"));
    }

    #[test]
    fn test_source_paths_parsed() {
        let file = write_config(
            r#"
[sources]
bulletins = ["dataset/holidays.pdf"]
tabular = ["dataset/list_of_courses.pdf"]
handouts_dir = "dataset/handouts"
timetable = "dataset/timetable.json"
"#,
        );
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.sources.bulletins.len(), 1);
        assert_eq!(config.sources.tabular.len(), 1);
        assert!(config.sources.handouts_dir.is_some());
        assert!(config.sources.timetable.is_some());
    }
}
