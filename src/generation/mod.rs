/// Answer generator trait and supporting types
///
/// The retrieval core hands the generator a question, the assembled text
/// context, and zero or more page-labeled image parts. Generators are
/// external collaborators — the pipeline catches their failures and
/// converts them into a user-visible answer string, never a fault.

pub mod gemini;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during answer generation.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Inference or response parse failure
    #[error("Generation error: {0}")]
    Generation(String),

    /// API provider returned an HTTP error
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Provider not configured (e.g., missing API key)
    #[error("Provider not configured: {0}")]
    NotConfigured(String),
}

/// A rendered table/diagram page passed alongside the text context.
///
/// The image is the primary source; `ocr_text` is the page's extracted
/// text, which may be garbled for dense tables.
#[derive(Debug, Clone)]
pub struct VisualPart {
    pub page_number: u32,
    pub image_png: Vec<u8>,
    pub ocr_text: String,
}

/// Core trait for producing a grounded natural-language answer.
#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    /// Generate an answer from the question, text context, and visual parts.
    async fn generate(
        &self,
        question: &str,
        context: &str,
        visual_parts: &[VisualPart],
    ) -> Result<String, GenerationError>;

    /// Return the model name identifier used by this generator.
    fn model_name(&self) -> &str;
}
