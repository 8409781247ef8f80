/// Flat exact nearest-neighbor index over chunk embeddings
///
/// Vectors are L2-normalized at build time, so inner product equals cosine
/// similarity and `distance = 1 - dot(q, v)` is cosine distance. search()
/// returns (distance, chunk index) pairs ascending by distance, closest
/// first — indices reference the chunk store's stable ordering.

use crate::errors::ManualQaError;

pub struct DenseIndex {
    dim: usize,
    vectors: Vec<Vec<f32>>,
}

impl DenseIndex {
    /// Build the index from one embedding per chunk, in chunk store order.
    pub fn build(embeddings: Vec<Vec<f32>>) -> Result<Self, ManualQaError> {
        let dim = embeddings.first().map(|v| v.len()).unwrap_or(0);
        if embeddings.iter().any(|v| v.len() != dim) {
            return Err(ManualQaError::Index(
                "Embedding dimensions are inconsistent across the corpus".to_string(),
            ));
        }

        let vectors = embeddings.into_iter().map(normalize).collect();
        Ok(DenseIndex { dim, vectors })
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.dim
    }

    /// Exact top-k search by cosine distance.
    ///
    /// `k` greater than the corpus size returns the whole corpus ranked —
    /// fewer results, never an error.
    pub fn search(&self, query: &[f32], k: usize) -> Vec<(f32, usize)> {
        if self.vectors.is_empty() || k == 0 {
            return Vec::new();
        }

        let q = normalize(query.to_vec());
        let mut scored: Vec<(f32, usize)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(idx, v)| (1.0 - dot(&q, v), idx))
            .collect();

        scored.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);
        scored
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

fn normalize(mut v: Vec<f32>) -> Vec<f32> {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
    v
}
