/// Hybrid scorer: dense + sparse fusion with page-level diversity
///
/// Dense search captures semantic similarity that exact terms miss; BM25
/// captures exact numeric/technical tokens (altitudes, flap settings) that
/// embeddings blur. Scores are max-normalized per leg, linearly combined
/// with weight alpha, grouped by page, and at most one representative
/// chunk per page reaches the ranked output.

use std::collections::HashMap;

use crate::errors::ManualQaError;
use crate::index::tokenize;

use super::{QueryResult, RetrievalContext};

/// Dense over-fetch multiplier: fetch more chunk candidates than pages
/// requested so page grouping has enough material for diversity.
const OVERFETCH_FACTOR: usize = 3;

/// Guard against division by zero when a leg's scores are all equal or zero
/// (e.g. an empty query tokenizes to nothing and BM25 returns all zeros).
const NORM_EPSILON: f64 = 1e-6;

/// A chunk with its combined score and the per-leg components that
/// produced it. Lives only within one query.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub chunk_idx: usize,
    pub score: f64,
    pub dense: f64,
    pub sparse: f64,
}

/// Per-page aggregation used to enforce page diversity.
struct PageGroup {
    page_number: u32,
    chunks: Vec<ScoredChunk>,
    max_score: f64,
}

/// Run the hybrid search: at most `requested` results, one per page,
/// ordered by descending page-max combined score.
///
/// A corpus with fewer distinct pages than `requested` returns fewer
/// results rather than erroring.
pub async fn hybrid_search(
    ctx: &RetrievalContext,
    query: &str,
    requested: usize,
    alpha: f64,
) -> Result<Vec<QueryResult>, ManualQaError> {
    if ctx.store.is_empty() || requested == 0 {
        return Ok(Vec::new());
    }

    let query_vec = ctx
        .embedder
        .embed(&[query.to_string()])
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| ManualQaError::Internal("Embedding provider returned no vector".to_string()))?;

    let dense_hits = ctx.dense.search(&query_vec, requested * OVERFETCH_FACTOR);
    let sparse_scores = ctx.sparse.score_all(&tokenize(query));

    let scored = combine_scores(&dense_hits, &sparse_scores, alpha, ctx.store.len());
    let pages = rank_pages(ctx, scored, requested);

    tracing::debug!(
        query = query,
        dense_candidates = dense_hits.len(),
        pages_returned = pages.len(),
        "Hybrid search complete"
    );

    Ok(pages)
}

/// Fuse the two legs into one combined score per chunk.
///
/// The combined-score domain is the entire corpus, held as a fixed-size
/// array indexed by chunk index: dense candidates seed `alpha * dense`,
/// then every chunk adds `(1 - alpha) * sparse`. A chunk the dense search
/// missed can therefore still surface on lexical strength alone.
pub fn combine_scores(
    dense_hits: &[(f32, usize)],
    sparse_scores: &[f64],
    alpha: f64,
    corpus_size: usize,
) -> Vec<ScoredChunk> {
    // Distance -> similarity, then max-normalize within the candidate batch.
    let dense_sims: Vec<f64> = dense_hits
        .iter()
        .map(|(distance, _)| 1.0 / (1.0 + f64::from(*distance)))
        .collect();
    let dense_max = dense_sims.iter().cloned().fold(0.0_f64, f64::max);
    let dense_norm: HashMap<usize, f64> = dense_hits
        .iter()
        .zip(&dense_sims)
        .map(|((_, idx), sim)| (*idx, sim / (dense_max + NORM_EPSILON)))
        .collect();

    let sparse_max = sparse_scores.iter().cloned().fold(0.0_f64, f64::max);

    let mut combined = Vec::with_capacity(corpus_size);
    for idx in 0..corpus_size {
        let dense = dense_norm.get(&idx).copied().unwrap_or(0.0);
        let sparse = sparse_scores
            .get(idx)
            .map(|s| s / (sparse_max + NORM_EPSILON))
            .unwrap_or(0.0);
        combined.push(ScoredChunk {
            chunk_idx: idx,
            score: alpha * dense + (1.0 - alpha) * sparse,
            dense,
            sparse,
        });
    }
    combined
}

/// Group scored chunks by page, rank pages by their max score, and emit
/// one QueryResult per selected page carrying its best chunk.
fn rank_pages(ctx: &RetrievalContext, scored: Vec<ScoredChunk>, requested: usize) -> Vec<QueryResult> {
    let mut groups: HashMap<u32, PageGroup> = HashMap::new();
    for sc in scored {
        // Every chunk index in the combined set exists in the store.
        let Some(chunk) = ctx.store.get(sc.chunk_idx) else {
            continue;
        };
        let group = groups.entry(chunk.page_number).or_insert_with(|| PageGroup {
            page_number: chunk.page_number,
            chunks: Vec::new(),
            max_score: sc.score,
        });
        if sc.score > group.max_score {
            group.max_score = sc.score;
        }
        group.chunks.push(sc);
    }

    let mut ranked: Vec<PageGroup> = groups.into_values().collect();
    ranked.sort_by(|a, b| b.max_score.partial_cmp(&a.max_score).unwrap_or(std::cmp::Ordering::Equal));
    ranked.truncate(requested);

    ranked
        .into_iter()
        .filter_map(|group| {
            let best = group
                .chunks
                .iter()
                .max_by(|a, b| a.score.partial_cmp(&b.score).unwrap_or(std::cmp::Ordering::Equal))?;
            let chunk = ctx.store.get(best.chunk_idx)?;
            // Decode once: a corrupt image must leave has_image false so the
            // assembler falls back to a text block instead of losing the chunk.
            let page_image = chunk.image_bytes();
            Some(QueryResult {
                page_number: group.page_number,
                content: chunk.content.clone(),
                chunk_type: chunk.chunk_type,
                score: best.score,
                rerank_score: best.score,
                has_image: page_image.is_some(),
                page_image,
                metadata: chunk.metadata.clone(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combine_pure_dense_ignores_sparse() {
        let dense_hits = vec![(0.0_f32, 0), (0.5_f32, 1)];
        let sparse = vec![0.0, 0.0, 9.0];
        let scored = combine_scores(&dense_hits, &sparse, 1.0, 3);
        assert!(scored[0].score > scored[1].score);
        assert_eq!(scored[2].score, 0.0, "alpha=1.0 zeroes the sparse leg");
    }

    #[test]
    fn test_combine_pure_sparse_ignores_dense() {
        let dense_hits = vec![(0.0_f32, 0)];
        let sparse = vec![0.0, 4.0, 2.0];
        let scored = combine_scores(&dense_hits, &sparse, 0.0, 3);
        assert_eq!(scored[0].score, 0.0, "alpha=0.0 zeroes the dense leg");
        assert!(scored[1].score > scored[2].score);
    }

    #[test]
    fn test_combine_domain_spans_whole_corpus() {
        // Chunk 2 is absent from the dense candidates but still gets a
        // combined entry from its sparse score.
        let dense_hits = vec![(0.1_f32, 0)];
        let sparse = vec![0.1, 0.0, 8.0];
        let scored = combine_scores(&dense_hits, &sparse, 0.5, 3);
        assert_eq!(scored.len(), 3);
        assert!(
            scored[2].score > scored[0].score,
            "strong lexical match must rescue a chunk dense search missed"
        );
    }

    #[test]
    fn test_combine_all_zero_scores_guarded() {
        let scored = combine_scores(&[], &[0.0, 0.0], 0.5, 2);
        assert!(scored.iter().all(|s| s.score == 0.0));
        assert!(scored.iter().all(|s| s.score.is_finite()), "epsilon guard must prevent NaN");
    }

    #[test]
    fn test_combine_components_recorded() {
        let dense_hits = vec![(0.0_f32, 0)];
        let sparse = vec![3.0, 1.0];
        let scored = combine_scores(&dense_hits, &sparse, 0.5, 2);
        assert!(scored[0].dense > 0.0);
        assert!(scored[0].sparse > 0.0);
        assert_eq!(scored[1].dense, 0.0);
        assert!(scored[1].sparse > 0.0);
    }
}
