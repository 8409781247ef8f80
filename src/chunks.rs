/// Chunk store: the ordered, read-only corpus the retrieval core runs over
///
/// Chunks are produced by the (external) ingestion step and loaded from a
/// single JSON file before any query executes. A chunk's position in the
/// store is its stable index — the join key between dense hits, sparse
/// scores, and chunk metadata.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::errors::ManualQaError;

/// Content classification assigned at ingestion time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkType {
    Text,
    PerformanceTable,
    Visual,
}

impl fmt::Display for ChunkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChunkType::Text => write!(f, "text"),
            ChunkType::PerformanceTable => write!(f, "performance_table"),
            ChunkType::Visual => write!(f, "visual"),
        }
    }
}

/// Per-chunk metadata carried through retrieval into the final results.
///
/// `table_type` is the re-ranker's performance-table signal; the rest is
/// citation/provenance data from ingestion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChunkMetadata {
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub page: u32,
    /// e.g. "field_climb_limits", "flap_retraction", "landing_limits"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altitude: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runway_condition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flap_setting: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requires_vision: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ink_density: Option<f64>,
}

/// Immutable content unit: one piece of manual text (or a rendered
/// table/diagram page) with page and type metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    pub content: String,
    /// 1-based page in the source manual
    pub page_number: u32,
    #[serde(rename = "type")]
    pub chunk_type: ChunkType,
    #[serde(default)]
    pub metadata: ChunkMetadata,
    /// Base64-encoded PNG render, present only for diagram/table pages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_image: Option<String>,
}

impl Chunk {
    /// Decode the page image from its base64 JSON representation.
    ///
    /// Returns None when the chunk has no image or the blob is corrupt
    /// (a corrupt image degrades to text-only context, never a fault).
    pub fn image_bytes(&self) -> Option<Vec<u8>> {
        let encoded = self.page_image.as_ref()?;
        match STANDARD.decode(encoded) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                tracing::warn!(page = self.page_number, error = %e, "Invalid base64 page image, ignoring");
                None
            }
        }
    }

    pub fn has_image(&self) -> bool {
        self.page_image.is_some()
    }
}

/// Ordered, index-addressable collection of chunks. Read-only at query time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkStore {
    chunks: Vec<Chunk>,
}

impl ChunkStore {
    pub fn new(chunks: Vec<Chunk>) -> Self {
        ChunkStore { chunks }
    }

    /// Load the chunk store from its ingestion-produced JSON file.
    ///
    /// A missing or malformed file is a startup error — the server must not
    /// accept queries without a corpus.
    pub fn load(path: &Path) -> Result<Self, ManualQaError> {
        let data = std::fs::read_to_string(path).map_err(|e| {
            ManualQaError::Startup(format!(
                "Could not read chunk store at {}: {}. \
                 Run the ingestion step first to produce it.",
                path.display(),
                e
            ))
        })?;
        let chunks: Vec<Chunk> = serde_json::from_str(&data).map_err(|e| {
            ManualQaError::Startup(format!(
                "Invalid chunk store at {}: {}",
                path.display(),
                e
            ))
        })?;
        // Page numbers are 1-based throughout; a zero page would corrupt
        // citations and page grouping.
        if let Some(idx) = chunks.iter().position(|c| c.page_number == 0) {
            return Err(ManualQaError::Startup(format!(
                "Invalid chunk store at {}: chunk {} has page_number 0 (pages are 1-based)",
                path.display(),
                idx
            )));
        }
        Ok(ChunkStore { chunks })
    }

    pub fn get(&self, idx: usize) -> Option<&Chunk> {
        self.chunks.get(idx)
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Chunk> {
        self.chunks.iter()
    }

    /// Number of distinct pages in the corpus — the most results any
    /// query can return under page diversity.
    pub fn distinct_pages(&self) -> usize {
        let mut pages: Vec<u32> = self.chunks.iter().map(|c| c.page_number).collect();
        pages.sort_unstable();
        pages.dedup();
        pages.len()
    }
}
