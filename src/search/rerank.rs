/// Intent-based re-ranking over hybrid results
///
/// Query intent is classified by substring membership against fixed
/// trigger vocabularies. Each intent is one rule in an enumerable table:
/// trigger keywords, a result-applicability predicate, and a
/// multiplicative boost. Categories are independent — a query can match
/// both, one, or neither, and matching boosts multiply together.

use super::QueryResult;

/// One intent rule: if any trigger appears in the lowercased query, every
/// result satisfying `applies` has its score multiplied by `boost`.
pub struct IntentRule {
    pub name: &'static str,
    pub triggers: &'static [&'static str],
    pub boost: f64,
    pub applies: fn(&QueryResult) -> bool,
}

fn is_performance_table(result: &QueryResult) -> bool {
    result
        .metadata
        .table_type
        .as_deref()
        .is_some_and(|t| !t.is_empty())
}

fn mentions_procedure(result: &QueryResult) -> bool {
    result.content.to_lowercase().contains("procedure")
}

/// The rule table. Extending re-ranking means adding a row here; the
/// ranking loop below never changes.
pub const INTENT_RULES: &[IntentRule] = &[
    IntentRule {
        name: "performance",
        triggers: &["weight", "limit", "altitude", "runway", "performance", "field", "climb"],
        boost: 1.5,
        applies: is_performance_table,
    },
    IntentRule {
        name: "procedural",
        triggers: &["procedure", "step", "checklist", "how to", "perform"],
        boost: 1.3,
        applies: mentions_procedure,
    },
];

/// Apply intent boosts and fully re-sort by rerank score descending.
///
/// Results matching no active rule keep rerank_score == score. Ties are
/// broken by the sort's encounter order — stability is not guaranteed.
pub fn rerank(query: &str, results: &mut [QueryResult]) {
    let query_lower = query.to_lowercase();
    let active: Vec<&IntentRule> = INTENT_RULES
        .iter()
        .filter(|rule| rule.triggers.iter().any(|t| query_lower.contains(t)))
        .collect();

    for result in results.iter_mut() {
        let mut score = result.score;
        for rule in &active {
            if (rule.applies)(result) {
                score *= rule.boost;
            }
        }
        result.rerank_score = score;
    }

    results.sort_by(|a, b| {
        b.rerank_score
            .partial_cmp(&a.rerank_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunks::{ChunkMetadata, ChunkType};

    fn result(page: u32, content: &str, score: f64, table_type: Option<&str>) -> QueryResult {
        QueryResult {
            page_number: page,
            content: content.to_string(),
            chunk_type: if table_type.is_some() {
                ChunkType::PerformanceTable
            } else {
                ChunkType::Text
            },
            score,
            rerank_score: score,
            has_image: false,
            page_image: None,
            metadata: ChunkMetadata {
                table_type: table_type.map(str::to_string),
                ..ChunkMetadata::default()
            },
        }
    }

    #[test]
    fn test_performance_query_boosts_table_results() {
        let mut results = vec![
            result(10, "plain narrative text", 0.9, None),
            result(83, "FIELD AND CLIMB LIMIT WEIGHTS", 0.7, Some("field_climb_limits")),
        ];
        rerank("what is the climb limit weight at 2000 feet", &mut results);
        assert_eq!(results[0].page_number, 83, "1.5x boost must lift the table page");
        assert!((results[0].rerank_score - 0.7 * 1.5).abs() < 1e-12);
        assert!((results[1].rerank_score - 0.9).abs() < 1e-12, "non-table result unchanged");
    }

    #[test]
    fn test_procedural_query_boosts_procedure_content() {
        let mut results = vec![
            result(5, "Engine start PROCEDURE: step one", 0.5, None),
            result(6, "general description", 0.5, None),
        ];
        rerank("how to start the engine checklist", &mut results);
        assert_eq!(results[0].page_number, 5);
        assert!((results[0].rerank_score - 0.5 * 1.3).abs() < 1e-12);
    }

    #[test]
    fn test_both_boosts_multiply() {
        let mut results = vec![result(
            83,
            "takeoff procedure with limit table",
            0.4,
            Some("field_climb_limits"),
        )];
        // "limit" triggers performance, "procedure" triggers procedural
        rerank("limit procedure", &mut results);
        assert!((results[0].rerank_score - 0.4 * 1.5 * 1.3).abs() < 1e-12);
    }

    #[test]
    fn test_neutral_query_leaves_scores_unchanged() {
        let mut results = vec![
            result(1, "procedure text", 0.8, Some("field_climb_limits")),
            result(2, "other text", 0.6, None),
        ];
        rerank("what color is the sky", &mut results);
        assert!((results[0].rerank_score - 0.8).abs() < 1e-12);
        assert!((results[1].rerank_score - 0.6).abs() < 1e-12);
        assert_eq!(results[0].page_number, 1, "order unchanged without active rules");
    }

    #[test]
    fn test_boost_only_with_matching_metadata() {
        // Performance intent, but the result has no table_type
        let mut results = vec![result(7, "climb notes", 0.9, None)];
        rerank("climb performance", &mut results);
        assert!((results[0].rerank_score - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_empty_table_type_does_not_boost() {
        let mut results = vec![result(7, "climb notes", 0.9, Some(""))];
        rerank("climb performance", &mut results);
        assert!((results[0].rerank_score - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_full_resort_by_rerank_score() {
        let mut results = vec![
            result(1, "aaa", 1.0, None),
            result(2, "bbb procedure", 0.9, None),
            result(3, "ccc", 0.95, None),
        ];
        rerank("checklist steps", &mut results);
        let pages: Vec<u32> = results.iter().map(|r| r.page_number).collect();
        assert_eq!(pages, vec![2, 1, 3]);
    }
}
