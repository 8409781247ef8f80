/// BM25-Okapi lexical index over tokenized chunk text
///
/// score_all() scores a tokenized query against every document and returns
/// one score per chunk in store order — the sparse leg always spans the
/// whole corpus. Parameters and the negative-IDF epsilon floor follow the
/// common Okapi formulation (k1 = 1.5, b = 0.75, epsilon = 0.25).

use std::collections::HashMap;

const K1: f64 = 1.5;
const B: f64 = 0.75;
const EPSILON: f64 = 0.25;

/// Tokenization used for both documents and queries: lowercase, whitespace
/// split. Exact numeric/technical tokens (altitudes, flap settings) survive
/// intact, which is the point of the sparse leg.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

pub struct Bm25Index {
    /// Term frequency per document
    doc_freqs: Vec<HashMap<String, usize>>,
    /// Inverse document frequency per term, epsilon-floored
    idf: HashMap<String, f64>,
    doc_lens: Vec<usize>,
    avgdl: f64,
}

impl Bm25Index {
    /// Build the index from pre-tokenized documents in chunk store order.
    pub fn build(documents: &[Vec<String>]) -> Self {
        let corpus_size = documents.len();
        let mut doc_freqs = Vec::with_capacity(corpus_size);
        let mut doc_lens = Vec::with_capacity(corpus_size);
        let mut term_doc_count: HashMap<String, usize> = HashMap::new();

        for doc in documents {
            let mut freqs: HashMap<String, usize> = HashMap::new();
            for token in doc {
                *freqs.entry(token.clone()).or_insert(0) += 1;
            }
            for term in freqs.keys() {
                *term_doc_count.entry(term.clone()).or_insert(0) += 1;
            }
            doc_lens.push(doc.len());
            doc_freqs.push(freqs);
        }

        let avgdl = if corpus_size > 0 {
            doc_lens.iter().sum::<usize>() as f64 / corpus_size as f64
        } else {
            0.0
        };

        // Raw IDF can go negative for terms in more than half the corpus;
        // those are floored to epsilon * average_idf (Okapi convention).
        let n = corpus_size as f64;
        let mut idf: HashMap<String, f64> = HashMap::new();
        let mut idf_sum = 0.0;
        let mut negative_terms: Vec<String> = Vec::new();
        for (term, df) in &term_doc_count {
            let value = ((n - *df as f64 + 0.5) / (*df as f64 + 0.5)).ln();
            idf_sum += value;
            if value < 0.0 {
                negative_terms.push(term.clone());
            }
            idf.insert(term.clone(), value);
        }
        if !idf.is_empty() {
            let average_idf = idf_sum / idf.len() as f64;
            let floor = EPSILON * average_idf;
            for term in negative_terms {
                idf.insert(term, floor);
            }
        }

        Bm25Index {
            doc_freqs,
            idf,
            doc_lens,
            avgdl,
        }
    }

    pub fn len(&self) -> usize {
        self.doc_freqs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.doc_freqs.is_empty()
    }

    /// Score a tokenized query against every document.
    ///
    /// An empty query (or one with no known terms) yields all zeros, which
    /// the hybrid scorer's epsilon normalization guard absorbs.
    pub fn score_all(&self, query: &[String]) -> Vec<f64> {
        let mut scores = vec![0.0; self.doc_freqs.len()];
        if self.avgdl == 0.0 {
            return scores;
        }

        for term in query {
            let Some(&idf) = self.idf.get(term) else {
                continue;
            };
            for (i, freqs) in self.doc_freqs.iter().enumerate() {
                let f = *freqs.get(term).unwrap_or(&0) as f64;
                if f == 0.0 {
                    continue;
                }
                let dl = self.doc_lens[i] as f64;
                scores[i] += idf * (f * (K1 + 1.0)) / (f + K1 * (1.0 - B + B * dl / self.avgdl));
            }
        }
        scores
    }
}
