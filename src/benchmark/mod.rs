/// Retrieval evaluation harness
///
/// Runs a dataset of (question, expected pages) pairs through the
/// retrieval pipeline and scores the returned page citations with
/// user-centric metrics computed @5. Generation is never invoked — the
/// harness measures retrieval quality only and runs fully offline.

pub mod dataset;
pub mod metrics;
pub mod runner;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One evaluation question with its ground-truth pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalQuestion {
    pub question: String,
    pub expected_pages: Vec<u32>,
}

/// Per-question metrics, all computed @5.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionMetrics {
    pub question: String,
    pub expected_pages: Vec<u32>,
    pub retrieved_pages: Vec<u32>,
    pub recall_at_5: f64,
    pub precision_at_5: f64,
    pub f1_at_5: f64,
    pub mrr: f64,
    pub average_precision: f64,
}

/// Aggregated run summary with the weighted composite score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalSummary {
    pub total_questions: usize,
    pub mean_recall_at_5: f64,
    pub mean_precision_at_5: f64,
    pub mean_f1_at_5: f64,
    pub mean_reciprocal_rank: f64,
    pub mean_average_precision: f64,
    /// 0.4 * F1 + 0.4 * MRR + 0.2 * MAP
    pub composite_score: f64,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
}

/// Composite score weights: F1 and MRR dominate, MAP refines.
pub const F1_WEIGHT: f64 = 0.4;
pub const MRR_WEIGHT: f64 = 0.4;
pub const MAP_WEIGHT: f64 = 0.2;
