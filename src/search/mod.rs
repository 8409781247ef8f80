/// Retrieval core: hybrid scoring, intent re-ranking, context assembly
///
/// The pipeline for one question is a single synchronous pass:
/// embed -> dense + sparse scoring -> page-grouped hybrid ranking ->
/// intent re-rank -> context assembly -> answer generation. All index
/// state lives in an immutable RetrievalContext shared behind Arc, so
/// concurrent queries need no locking.

pub mod assemble;
pub mod hybrid;
pub mod rerank;

pub use assemble::{assemble, AssembledContext};
pub use hybrid::hybrid_search;
pub use rerank::rerank;

use serde::Serialize;
use std::sync::Arc;

use crate::chunks::{ChunkMetadata, ChunkStore, ChunkType};
use crate::embedding::EmbeddingProvider;
use crate::errors::ManualQaError;
use crate::generation::{AnswerGenerator, VisualPart};
use crate::index::{Bm25Index, DenseIndex};

/// One ranked result: a page and its best-scoring representative chunk.
///
/// `score` is the combined hybrid score; `rerank_score` is populated by
/// rerank() and equals `score` when no intent boost applies.
#[derive(Debug, Clone)]
pub struct QueryResult {
    pub page_number: u32,
    pub content: String,
    pub chunk_type: ChunkType,
    pub score: f64,
    pub rerank_score: f64,
    pub has_image: bool,
    pub page_image: Option<Vec<u8>>,
    pub metadata: ChunkMetadata,
}

/// Everything one query needs, constructed once at startup.
///
/// Immutable after construction — chunk store and both indexes are
/// read-only at query time, the embedding provider is Send + Sync.
pub struct RetrievalContext {
    pub store: ChunkStore,
    pub dense: DenseIndex,
    pub sparse: Bm25Index,
    pub embedder: Arc<dyn EmbeddingProvider>,
}

/// Final caller-facing response: answer text plus cited pages in
/// ascending page order.
#[derive(Debug, Clone, Serialize)]
pub struct QueryResponse {
    pub answer: String,
    pub pages: Vec<u32>,
}

/// Complete QA pipeline for one question.
///
/// Retrieves `top_k * 2` page candidates, re-ranks by query intent, keeps
/// the top `top_k`, assembles text/visual context, and generates the
/// answer. Generator failures never abort the pipeline — they surface as
/// an answer string and the computed citations are preserved.
pub async fn answer_question(
    ctx: &RetrievalContext,
    generator: &dyn AnswerGenerator,
    question: &str,
    top_k: usize,
    alpha: f64,
) -> Result<QueryResponse, ManualQaError> {
    let mut results = hybrid_search(ctx, question, top_k * 2, alpha).await?;
    rerank(question, &mut results);

    let assembled = assemble(&results, top_k);

    if results.is_empty() {
        return Ok(QueryResponse {
            answer: "No relevant passages were found in the manual for this question.".to_string(),
            pages: Vec::new(),
        });
    }

    let visual_parts: Vec<VisualPart> = assembled
        .visual_parts
        .iter()
        .filter_map(|r| {
            r.page_image.as_ref().map(|png| VisualPart {
                page_number: r.page_number,
                image_png: png.clone(),
                ocr_text: r.content.clone(),
            })
        })
        .collect();

    let answer = match generator
        .generate(question, &assembled.context, &visual_parts)
        .await
    {
        Ok(answer) => answer,
        Err(e) => {
            tracing::warn!(error = %e, "Answer generation failed — returning error answer");
            format!("Error generating answer: {}", e)
        }
    };

    Ok(QueryResponse {
        answer,
        pages: assembled.pages,
    })
}
