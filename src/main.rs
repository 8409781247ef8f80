use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use manualqa::benchmark::dataset::load_questions;
use manualqa::benchmark::runner::{print_report, run_evaluation};
use manualqa::config::Config;
use manualqa::embedding::local::LocalEmbeddingProvider;
use manualqa::embedding::EmbeddingProvider;
use manualqa::generation::gemini::GeminiGenerator;
use manualqa::indexer::{build_embeddings, load_context};
use manualqa::logging;
use manualqa::server::ManualQaService;
use rmcp::ServiceExt;

#[derive(Parser)]
#[command(name = "manualqa", version, about = "Hybrid retrieval QA server for technical manuals")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Embed the chunk corpus and write the embedding matrix to disk
    Index,
    /// Run the retrieval evaluation harness against a question set
    Evaluate {
        /// Path to the evaluation dataset (JSON array of questions with expected pages)
        #[arg(long, default_value = "data/eval_questions.json")]
        dataset: PathBuf,
        /// Pages to retrieve per question (defaults to retrieval.top_k)
        #[arg(long)]
        top_k: Option<usize>,
        /// Dense/sparse fusion weight (defaults to retrieval.alpha)
        #[arg(long)]
        alpha: Option<f64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("Config error (using defaults): {}", e);
        Config::default()
    });

    // Logging goes to stderr only — stdout is reserved for JSON-RPC
    logging::init_logging(&config);

    match cli.command {
        Some(Commands::Index) => {
            tracing::info!("Building embedding index...");
            let embedder = LocalEmbeddingProvider::new(&config.embedding.cache_dir).await?;
            let count = build_embeddings(&config, &embedder).await?;
            println!(
                "Embedded {} chunks -> {}",
                count, config.data.embeddings_path
            );
        }

        Some(Commands::Evaluate { dataset, top_k, alpha }) => {
            let embedder: Arc<dyn EmbeddingProvider> =
                Arc::new(LocalEmbeddingProvider::new(&config.embedding.cache_dir).await?);
            let ctx = load_context(&config, embedder)?;

            let questions = load_questions(&dataset)?;
            let top_k = top_k.unwrap_or(config.retrieval.top_k);
            let alpha = alpha.unwrap_or(config.retrieval.alpha);
            if !(0.0..=1.0).contains(&alpha) {
                anyhow::bail!("alpha must be between 0.0 and 1.0, got {}", alpha);
            }

            tracing::info!(
                questions = questions.len(),
                top_k = top_k,
                alpha = alpha,
                "Starting retrieval evaluation"
            );

            let (results, summary) = run_evaluation(&ctx, &questions, top_k, alpha).await?;

            print_report(&results, &summary);
        }

        None => {
            tracing::info!(
                version = env!("CARGO_PKG_VERSION"),
                "manualqa server starting"
            );

            let embedder: Arc<dyn EmbeddingProvider> =
                Arc::new(LocalEmbeddingProvider::new(&config.embedding.cache_dir).await?);
            let ctx = Arc::new(load_context(&config, embedder)?);

            tracing::info!(
                chunks = ctx.store.len(),
                pages = ctx.store.distinct_pages(),
                "Retrieval context loaded"
            );

            let generator = Arc::new(GeminiGenerator::new(&config.generation)?);

            let service = ManualQaService::new(ctx, generator, config.retrieval.clone());

            let (stdin, stdout) = rmcp::transport::io::stdio();
            let server = service.serve((stdin, stdout)).await?;

            tracing::info!("manualqa server running — awaiting tool calls via stdio");

            server.waiting().await?;

            tracing::info!("manualqa server stopped");
        }
    }

    Ok(())
}
