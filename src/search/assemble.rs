/// Context assembly: partition ranked results for the answer generator
///
/// Walks the top `keep` results in rank order, splitting visual results
/// (diagram/table pages carrying image bytes) from text results. Text
/// blocks are labeled with their page number and joined with a visible
/// separator. The exposed page list is deduplicated and sorted ascending
/// for citation display — decoupled from retrieval rank on purpose.

use std::collections::HashSet;

use super::QueryResult;

/// Separator between text blocks in the generation context.
const BLOCK_SEPARATOR: &str = "\n\n---\n\n";

/// The generation payload for one query.
#[derive(Debug, Clone)]
pub struct AssembledContext {
    /// Page-labeled text blocks in rank order
    pub context: String,
    /// Visual results (type visual, image present) in rank order
    pub visual_parts: Vec<QueryResult>,
    /// Unique cited pages, ascending
    pub pages: Vec<u32>,
}

/// Assemble the top `keep` results into text context, visual parts, and
/// the cited page list.
pub fn assemble(results: &[QueryResult], keep: usize) -> AssembledContext {
    let kept = &results[..results.len().min(keep)];

    let mut seen: HashSet<u32> = HashSet::new();
    let mut pages: Vec<u32> = Vec::new();
    let mut text_blocks: Vec<String> = Vec::new();
    let mut visual_parts: Vec<QueryResult> = Vec::new();

    for result in kept {
        if seen.insert(result.page_number) {
            pages.push(result.page_number);
        }

        if result.chunk_type == crate::chunks::ChunkType::Visual && result.has_image {
            visual_parts.push(result.clone());
        } else {
            text_blocks.push(format!("[Page {}]\n{}", result.page_number, result.content));
        }
    }

    pages.sort_unstable();

    AssembledContext {
        context: text_blocks.join(BLOCK_SEPARATOR),
        visual_parts,
        pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunks::{ChunkMetadata, ChunkType};

    fn result(page: u32, content: &str, chunk_type: ChunkType, image: Option<&[u8]>) -> QueryResult {
        QueryResult {
            page_number: page,
            content: content.to_string(),
            chunk_type,
            score: 1.0,
            rerank_score: 1.0,
            has_image: image.is_some(),
            page_image: image.map(|b| b.to_vec()),
            metadata: ChunkMetadata::default(),
        }
    }

    #[test]
    fn test_text_blocks_labeled_and_separated() {
        let results = vec![
            result(41, "flap retraction schedule", ChunkType::Text, None),
            result(7, "limitations overview", ChunkType::Text, None),
        ];
        let assembled = assemble(&results, 5);
        assert_eq!(
            assembled.context,
            "[Page 41]\nflap retraction schedule\n\n---\n\n[Page 7]\nlimitations overview"
        );
        assert!(assembled.visual_parts.is_empty());
    }

    #[test]
    fn test_pages_sorted_ascending_despite_rank_order() {
        let results = vec![
            result(83, "a", ChunkType::Text, None),
            result(12, "b", ChunkType::Text, None),
            result(41, "c", ChunkType::Text, None),
        ];
        let assembled = assemble(&results, 5);
        assert_eq!(assembled.pages, vec![12, 41, 83]);
    }

    #[test]
    fn test_visual_with_image_goes_to_visual_parts() {
        let results = vec![
            result(55, "diagram ocr text", ChunkType::Visual, Some(b"png")),
            result(7, "text", ChunkType::Text, None),
        ];
        let assembled = assemble(&results, 5);
        assert_eq!(assembled.visual_parts.len(), 1);
        assert_eq!(assembled.visual_parts[0].page_number, 55);
        assert!(!assembled.context.contains("diagram ocr text"));
    }

    #[test]
    fn test_visual_without_image_falls_back_to_text() {
        let results = vec![result(55, "orphan visual", ChunkType::Visual, None)];
        let assembled = assemble(&results, 5);
        assert!(assembled.visual_parts.is_empty());
        assert!(assembled.context.contains("[Page 55]\norphan visual"));
    }

    #[test]
    fn test_keep_truncates() {
        let results = vec![
            result(1, "a", ChunkType::Text, None),
            result(2, "b", ChunkType::Text, None),
            result(3, "c", ChunkType::Text, None),
        ];
        let assembled = assemble(&results, 2);
        assert_eq!(assembled.pages, vec![1, 2]);
        assert!(!assembled.context.contains("[Page 3]"));
    }

    #[test]
    fn test_duplicate_pages_deduplicated() {
        let results = vec![
            result(9, "a", ChunkType::Text, None),
            result(9, "b", ChunkType::Text, None),
        ];
        let assembled = assemble(&results, 5);
        assert_eq!(assembled.pages, vec![9]);
    }

    #[test]
    fn test_empty_results() {
        let assembled = assemble(&[], 5);
        assert!(assembled.context.is_empty());
        assert!(assembled.pages.is_empty());
        assert!(assembled.visual_parts.is_empty());
    }
}
