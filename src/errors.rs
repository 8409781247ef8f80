/// Domain-specific error types for manualqa
///
/// Startup errors are fatal — the server refuses to serve queries until the
/// chunk store and both indexes have loaded. Per-query faults surface as
/// Internal and reach the caller as a labeled server-side failure, distinct
/// from an empty result set.

#[derive(Debug, thiserror::Error)]
pub enum ManualQaError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Startup error: {0}")]
    Startup(String),

    #[error("Index error: {0}")]
    Index(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<crate::embedding::EmbeddingError> for ManualQaError {
    fn from(e: crate::embedding::EmbeddingError) -> Self {
        ManualQaError::Internal(e.to_string())
    }
}

impl From<serde_json::Error> for ManualQaError {
    fn from(e: serde_json::Error) -> Self {
        ManualQaError::Index(e.to_string())
    }
}

impl From<std::io::Error> for ManualQaError {
    fn from(e: std::io::Error) -> Self {
        ManualQaError::Startup(e.to_string())
    }
}
