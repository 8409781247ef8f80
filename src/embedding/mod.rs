/// Embedding provider trait and supporting types
///
/// Provides a pluggable interface for text embedding generation. The same
/// provider (and model) is used at indexing and query time so the vector
/// spaces match. The default implementation is local fastembed — no API key.

pub mod local;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during embedding operations.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    /// fastembed model initialization failure
    #[error("Model initialization error: {0}")]
    ModelInit(String),

    /// Embedding generation failure (inference error)
    #[error("Embedding generation error: {0}")]
    Generation(String),
}

/// Core trait for embedding text into fixed-dimension float vectors.
///
/// Implementations must be Send + Sync so a single provider can be shared
/// behind Arc across concurrent query pipelines. Embedding is deterministic
/// for a fixed model.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate one embedding vector per input text, in input order.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    /// Return the model name identifier (e.g., "all-MiniLM-L6-v2").
    fn model_name(&self) -> &str;

    /// Return the dimension of the embedding vectors produced by this model.
    fn dimension(&self) -> usize;
}
