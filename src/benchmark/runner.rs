/// Evaluation run orchestrator
///
/// For each question: hybrid retrieval (double over-fetch, matching the
/// serving pipeline) -> intent re-rank -> assemble citations -> score the
/// cited pages against ground truth. Prints a per-question trace and a
/// summary report.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Instant;

use crate::errors::ManualQaError;
use crate::search::{assemble, hybrid_search, rerank, RetrievalContext};

use super::metrics::{score_question, summarize};
use super::{EvalQuestion, EvalSummary, QuestionMetrics};

/// Run the evaluation set against a loaded retrieval context.
pub async fn run_evaluation(
    ctx: &RetrievalContext,
    questions: &[EvalQuestion],
    top_k: usize,
    alpha: f64,
) -> Result<(Vec<QuestionMetrics>, EvalSummary), ManualQaError> {
    let started_at = chrono::Utc::now();
    let start = Instant::now();

    let pb = ProgressBar::new(questions.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{pos}/{len}] {msg} [{elapsed_precise} / {eta_precise}]")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let mut results = Vec::with_capacity(questions.len());
    for question in questions {
        pb.set_message(truncate(&question.question, 40));

        let mut ranked = hybrid_search(ctx, &question.question, top_k * 2, alpha).await?;
        rerank(&question.question, &mut ranked);
        let assembled = assemble(&ranked, top_k);

        results.push(score_question(
            &question.question,
            &question.expected_pages,
            &assembled.pages,
        ));
        pb.inc(1);
    }
    pb.finish_with_message("done");

    let summary = summarize(&results, started_at, start.elapsed().as_millis() as u64);
    Ok((results, summary))
}

/// Print the evaluation report to stdout.
pub fn print_report(results: &[QuestionMetrics], summary: &EvalSummary) {
    println!("{}", "=".repeat(72));
    println!("RETRIEVAL EVALUATION REPORT (metrics @5)");
    println!("{}", "=".repeat(72));
    println!("Questions evaluated: {}", summary.total_questions);
    println!("Duration: {} ms", summary.duration_ms);
    println!();
    println!("Mean Recall@5:     {:.2}%", summary.mean_recall_at_5 * 100.0);
    println!("Mean Precision@5:  {:.2}%", summary.mean_precision_at_5 * 100.0);
    println!("Mean F1@5:         {:.4}", summary.mean_f1_at_5);
    println!("Mean MRR:          {:.4}", summary.mean_reciprocal_rank);
    println!("Mean AP:           {:.4}", summary.mean_average_precision);
    println!();
    println!(
        "Composite score ({}*F1 + {}*MRR + {}*MAP): {:.4}",
        super::F1_WEIGHT,
        super::MRR_WEIGHT,
        super::MAP_WEIGHT,
        summary.composite_score
    );
    println!();
    for result in results {
        println!("Q: {}", truncate(&result.question, 70));
        println!(
            "   expected {:?} | retrieved {:?}",
            result.expected_pages,
            &result.retrieved_pages[..result.retrieved_pages.len().min(5)]
        );
        println!(
            "   recall@5 {:.2} | precision@5 {:.2} | mrr {:.2}",
            result.recall_at_5, result.precision_at_5, result.mrr
        );
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_chars).collect();
        format!("{}...", cut)
    }
}
