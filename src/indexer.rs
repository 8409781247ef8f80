/// Corpus index lifecycle: embedding generation and startup loading
///
/// `build_embeddings` is the offline step (`manualqa index`): embed every
/// chunk and write the matrix next to the chunk store. `load_context` is
/// the startup path: load chunks + embeddings, build both indexes, and
/// return the immutable RetrievalContext. Any missing or inconsistent
/// artifact is fatal — the server never starts degraded.

use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::Arc;

use crate::chunks::ChunkStore;
use crate::config::Config;
use crate::embedding::EmbeddingProvider;
use crate::errors::ManualQaError;
use crate::index::{tokenize, Bm25Index, DenseIndex};
use crate::search::RetrievalContext;

/// Chunks embedded per provider call during index builds.
const EMBED_BATCH_SIZE: usize = 32;

/// Embed the whole corpus and write the embedding matrix as JSON.
///
/// Returns the number of chunks embedded.
pub async fn build_embeddings(
    config: &Config,
    embedder: &dyn EmbeddingProvider,
) -> Result<usize, ManualQaError> {
    let store = ChunkStore::load(Path::new(&config.data.chunks_path))?;
    if store.is_empty() {
        return Err(ManualQaError::Index(
            "No chunks provided for indexing — the chunk store is empty".to_string(),
        ));
    }

    tracing::info!(
        chunks = store.len(),
        model = embedder.model_name(),
        "Creating embeddings"
    );

    let texts: Vec<String> = store.iter().map(|c| c.content.clone()).collect();

    let pb = ProgressBar::new(store.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{pos}/{len}] embedding chunks [{elapsed_precise} / {eta_precise}]")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let mut embeddings: Vec<Vec<f32>> = Vec::with_capacity(store.len());
    for batch in texts.chunks(EMBED_BATCH_SIZE) {
        let vectors = embedder.embed(batch).await?;
        pb.inc(vectors.len() as u64);
        embeddings.extend(vectors);
    }
    pb.finish_with_message("done");

    let out_path = Path::new(&config.data.embeddings_path);
    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string(&embeddings)?;
    std::fs::write(out_path, json)?;

    tracing::info!(
        path = %out_path.display(),
        count = embeddings.len(),
        dimension = embedder.dimension(),
        "Embedding matrix written"
    );

    Ok(embeddings.len())
}

/// Load the chunk store and embedding matrix and build both indexes.
///
/// Startup precondition for serving: every failure here is fatal.
pub fn load_context(
    config: &Config,
    embedder: Arc<dyn EmbeddingProvider>,
) -> Result<RetrievalContext, ManualQaError> {
    let store = ChunkStore::load(Path::new(&config.data.chunks_path))?;

    let embeddings_path = Path::new(&config.data.embeddings_path);
    let data = std::fs::read_to_string(embeddings_path).map_err(|e| {
        ManualQaError::Startup(format!(
            "Could not read embeddings at {}: {}. Run `manualqa index` first.",
            embeddings_path.display(),
            e
        ))
    })?;
    let embeddings: Vec<Vec<f32>> = serde_json::from_str(&data).map_err(|e| {
        ManualQaError::Startup(format!(
            "Invalid embedding matrix at {}: {}",
            embeddings_path.display(),
            e
        ))
    })?;

    if embeddings.len() != store.len() {
        return Err(ManualQaError::Startup(format!(
            "Embedding count ({}) does not match chunk count ({}). \
             Re-run `manualqa index` after changing the chunk store.",
            embeddings.len(),
            store.len()
        )));
    }

    let dense = DenseIndex::build(embeddings)?;
    if !dense.is_empty() && dense.dimension() != embedder.dimension() {
        return Err(ManualQaError::Startup(format!(
            "Embedding dimension ({}) does not match model '{}' ({}). \
             The matrix was built with a different model — re-run `manualqa index`.",
            dense.dimension(),
            embedder.model_name(),
            embedder.dimension()
        )));
    }

    let documents: Vec<Vec<String>> = store.iter().map(|c| tokenize(&c.content)).collect();
    let sparse = Bm25Index::build(&documents);

    tracing::info!(
        chunks = store.len(),
        pages = store.distinct_pages(),
        dimension = dense.dimension(),
        "Retrieval context loaded"
    );

    Ok(RetrievalContext {
        store,
        dense,
        sparse,
        embedder,
    })
}
