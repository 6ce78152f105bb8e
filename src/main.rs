use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use campus_rag::{chat, config, ingest, search};

#[derive(Parser)]
#[command(name = "crag", version, about = "Campus retrieval pipeline and chatbot")]
struct Cli {
    /// Path to the TOML config file
    #[arg(long, global = true, default_value = "campus.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Extract, chunk, embed, and index every configured source
    Ingest {
        /// Stop after labeling and report what would be indexed
        #[arg(long)]
        dry_run: bool,
    },
    /// Embed a query and print the nearest indexed chunks
    Search {
        /// The query text
        query: String,

        /// Number of results to return
        #[arg(short, long, default_value_t = 8)]
        k: usize,
    },
    /// Interactive chat over the indexed content
    Chat {
        /// Session id for conversation history
        #[arg(long, default_value = "default")]
        session: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = config::load_config(&cli.config)?;

    match cli.command {
        Command::Ingest { dry_run } => ingest::run_ingest(&config, dry_run).await,
        Command::Search { query, k } => search::run_search(&config, &query, k).await,
        Command::Chat { session } => chat::run_chat(&config, &session).await,
    }
}
