/// Configuration management using figment
///
/// Loads configuration with this precedence (highest wins):
/// 1. Defaults (hardcoded)
/// 2. TOML file: manualqa.toml (in working directory)
/// 3. Environment variables: prefixed MANUALQA_ with `__` as the section
///    separator (e.g., MANUALQA_RETRIEVAL__TOP_K=10)

use figment::{
    Figment,
    providers::{Env, Format, Toml, Serialized},
};
use serde::{Deserialize, Serialize};
use crate::errors::ManualQaError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub retrieval: RetrievalConfig,

    #[serde(default)]
    pub embedding: EmbeddingConfig,

    #[serde(default)]
    pub generation: GenerationConfig,
}

/// Locations of the pre-built corpus artifacts.
///
/// Both files are produced outside the query path: chunks by the ingestion
/// step, embeddings by `manualqa index`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Chunk store JSON (ordered list of chunks, ingestion output)
    #[serde(default = "default_chunks_path")]
    pub chunks_path: String,
    /// Embedding matrix JSON (one vector per chunk, `manualqa index` output)
    #[serde(default = "default_embeddings_path")]
    pub embeddings_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Number of pages returned to the caller (and cited)
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// Dense/sparse mixing weight in [0, 1]: 1.0 = pure dense, 0.0 = pure BM25
    #[serde(default = "default_alpha")]
    pub alpha: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Directory to cache fastembed model weights
    #[serde(default = "default_cache_dir")]
    pub cache_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Gemini API key. Required for answer generation; retrieval and
    /// evaluation work without it.
    #[serde(default)]
    pub gemini_api_key: Option<String>,
    #[serde(default = "default_gemini_model")]
    pub gemini_model: String,
    #[serde(default = "default_gemini_base_url")]
    pub gemini_base_url: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_chunks_path() -> String {
    "data/chunks.json".to_string()
}

fn default_embeddings_path() -> String {
    "data/embeddings.json".to_string()
}

fn default_top_k() -> usize {
    5
}

fn default_alpha() -> f64 {
    0.5
}

fn default_cache_dir() -> String {
    dirs::cache_dir()
        .unwrap_or_else(|| std::path::PathBuf::from(".cache"))
        .join("manualqa/models")
        .to_string_lossy()
        .into_owned()
}

fn default_gemini_model() -> String {
    "gemini-2.5-pro".to_string()
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            log_level: default_log_level(),
            data: DataConfig::default(),
            retrieval: RetrievalConfig::default(),
            embedding: EmbeddingConfig::default(),
            generation: GenerationConfig::default(),
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        DataConfig {
            chunks_path: default_chunks_path(),
            embeddings_path: default_embeddings_path(),
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        RetrievalConfig {
            top_k: default_top_k(),
            alpha: default_alpha(),
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        EmbeddingConfig {
            cache_dir: default_cache_dir(),
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        GenerationConfig {
            gemini_api_key: None,
            gemini_model: default_gemini_model(),
            gemini_base_url: default_gemini_base_url(),
        }
    }
}

impl Config {
    /// Load configuration from defaults, TOML file, and environment variables
    ///
    /// Environment variables override TOML file values.
    /// Example: MANUALQA_RETRIEVAL__ALPHA=0.7 overrides retrieval.alpha.
    pub fn load() -> Result<Config, ManualQaError> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file("manualqa.toml"))
            .merge(Env::prefixed("MANUALQA_").split("__"))
            .extract()
            .map_err(|e| ManualQaError::Config(format!("Failed to load config: {}", e)))?;

        if !(0.0..=1.0).contains(&config.retrieval.alpha) {
            return Err(ManualQaError::Config(format!(
                "retrieval.alpha must be in [0, 1], got {}",
                config.retrieval.alpha
            )));
        }
        if config.retrieval.top_k == 0 {
            return Err(ManualQaError::Config(
                "retrieval.top_k must be at least 1".to_string(),
            ));
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.data.chunks_path, "data/chunks.json");
        assert_eq!(config.retrieval.top_k, 5);
        assert!((config.retrieval.alpha - 0.5).abs() < f64::EPSILON);
        assert_eq!(config.generation.gemini_model, "gemini-2.5-pro");
        assert!(config.generation.gemini_api_key.is_none());
    }
}
