/// Pure retrieval-quality metric functions, all computed @5
///
/// Ranks are 1-based positions in the retrieved page list. No I/O.

use super::{EvalSummary, QuestionMetrics, F1_WEIGHT, MAP_WEIGHT, MRR_WEIGHT};

/// Score one question's retrieved pages against its ground truth.
pub fn score_question(
    question: &str,
    expected_pages: &[u32],
    retrieved_pages: &[u32],
) -> QuestionMetrics {
    let correct_ranks: Vec<usize> = retrieved_pages
        .iter()
        .enumerate()
        .filter(|(_, page)| expected_pages.contains(page))
        .map(|(i, _)| i + 1)
        .collect();

    let relevant_in_top_5 = retrieved_pages
        .iter()
        .take(5)
        .filter(|page| expected_pages.contains(page))
        .count();

    let recall_at_5 = if expected_pages.is_empty() {
        0.0
    } else {
        relevant_in_top_5 as f64 / expected_pages.len() as f64
    };
    let precision_at_5 = relevant_in_top_5 as f64 / 5.0;

    let f1_at_5 = if precision_at_5 + recall_at_5 > 0.0 {
        2.0 * precision_at_5 * recall_at_5 / (precision_at_5 + recall_at_5)
    } else {
        0.0
    };

    let mrr = correct_ranks
        .first()
        .map(|&rank| 1.0 / rank as f64)
        .unwrap_or(0.0);

    // Average precision: precision measured at each correct rank.
    let average_precision = if correct_ranks.is_empty() {
        0.0
    } else {
        let sum: f64 = correct_ranks
            .iter()
            .map(|&rank| {
                let correct_up_to = correct_ranks.iter().filter(|&&r| r <= rank).count();
                correct_up_to as f64 / rank as f64
            })
            .sum();
        sum / correct_ranks.len() as f64
    };

    QuestionMetrics {
        question: question.to_string(),
        expected_pages: expected_pages.to_vec(),
        retrieved_pages: retrieved_pages.to_vec(),
        recall_at_5,
        precision_at_5,
        f1_at_5,
        mrr,
        average_precision,
    }
}

/// Aggregate per-question metrics into a run summary.
pub fn summarize(
    results: &[QuestionMetrics],
    started_at: chrono::DateTime<chrono::Utc>,
    duration_ms: u64,
) -> EvalSummary {
    let n = results.len().max(1) as f64;
    let mean = |f: fn(&QuestionMetrics) -> f64| results.iter().map(f).sum::<f64>() / n;

    let mean_f1 = mean(|m| m.f1_at_5);
    let mean_mrr = mean(|m| m.mrr);
    let mean_map = mean(|m| m.average_precision);

    EvalSummary {
        total_questions: results.len(),
        mean_recall_at_5: mean(|m| m.recall_at_5),
        mean_precision_at_5: mean(|m| m.precision_at_5),
        mean_f1_at_5: mean_f1,
        mean_reciprocal_rank: mean_mrr,
        mean_average_precision: mean_map,
        composite_score: F1_WEIGHT * mean_f1 + MRR_WEIGHT * mean_mrr + MAP_WEIGHT * mean_map,
        started_at,
        duration_ms,
    }
}
