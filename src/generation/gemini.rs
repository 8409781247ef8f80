/// Gemini answer generator
///
/// Calls the generateContent endpoint with the assembled text context and,
/// when visual parts are present, inlines each page render as a base64
/// image part labeled with its page number. Table images are instructed to
/// take precedence over their (possibly garbled) extracted text.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::GenerationConfig;

use super::{AnswerGenerator, GenerationError, VisualPart};

/// Extracted page text attached after each image is capped to keep the
/// request bounded; the image carries the real signal.
const MAX_OCR_CHARS: usize = 1000;

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: GeminiContent,
}

#[derive(Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: Option<String>,
}

/// Gemini-backed answer generator using the HTTP API via reqwest.
pub struct GeminiGenerator {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiGenerator {
    /// Create a generator from config. Fails fast when no API key is set.
    pub fn new(config: &GenerationConfig) -> Result<Self, GenerationError> {
        let api_key = config.gemini_api_key.clone().ok_or_else(|| {
            GenerationError::NotConfigured(
                "Gemini API key required. Set MANUALQA_GENERATION__GEMINI_API_KEY \
                 or generation.gemini_api_key in manualqa.toml"
                    .to_string(),
            )
        })?;

        Ok(GeminiGenerator {
            client: reqwest::Client::new(),
            api_key,
            model: config.gemini_model.clone(),
            base_url: config.gemini_base_url.clone(),
        })
    }

    fn request_parts(&self, question: &str, context: &str, visual_parts: &[VisualPart]) -> Vec<Value> {
        if visual_parts.is_empty() {
            return vec![json!({ "text": build_text_prompt(question, context) })];
        }

        let mut parts = vec![json!({ "text": build_visual_prompt(question, context) })];
        for vp in visual_parts {
            let ocr: String = vp.ocr_text.chars().take(MAX_OCR_CHARS).collect();
            parts.push(json!({ "text": format!("\n[Page {}]", vp.page_number) }));
            parts.push(json!({
                "inline_data": {
                    "mime_type": "image/png",
                    "data": STANDARD.encode(&vp.image_png),
                }
            }));
            parts.push(json!({
                "text": format!("\nExtracted text (may have OCR errors, use image if unclear):\n{}", ocr)
            }));
        }
        parts
    }
}

#[async_trait]
impl AnswerGenerator for GeminiGenerator {
    async fn generate(
        &self,
        question: &str,
        context: &str,
        visual_parts: &[VisualPart],
    ) -> Result<String, GenerationError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let body = json!({
            "contents": [{ "parts": self.request_parts(question, context, visual_parts) }]
        });

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerationError::Generation(format!("HTTP request failed: {}", e)))?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(GenerationError::Api { status, message });
        }

        let parsed: GeminiResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::Generation(format!("Failed to parse Gemini response: {}", e)))?;

        let answer: String = parsed
            .candidates
            .first()
            .map(|c| {
                c.content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if answer.is_empty() {
            return Err(GenerationError::Generation(
                "Gemini returned no answer text".to_string(),
            ));
        }

        Ok(answer)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Prompt for text-only context. Pushes the model toward reading table
/// rows/columns precisely — one cell off gives the wrong answer.
fn build_text_prompt(question: &str, context: &str) -> String {
    format!(
        "Answer this question about the aircraft operations manual.\n\n\
         CRITICAL FOR TABLES:\n\
         - Find the EXACT row mentioned (e.g., \"1600 meters\").\n\
         - Find the EXACT column mentioned (e.g., \"1000 FT\", \"WET\").\n\
         - Read the value at that specific intersection.\n\
         - Be extremely precise - one cell off gives the wrong answer.\n\n\
         Question: {question}\n\n\
         Context:\n{context}\n\n\
         Read the table precisely and provide the exact value:"
    )
}

/// Prompt preamble when table/diagram images are attached. The images are
/// the primary source; extracted text is a fallback.
fn build_visual_prompt(question: &str, context: &str) -> String {
    format!(
        "Answer this question about the aircraft operations manual.\n\n\
         CRITICAL INSTRUCTIONS FOR READING TABLES:\n\
         - Look at the VISUAL table image carefully.\n\
         - Locate the EXACT row and column specified in the question.\n\
         - Read the value at the intersection VERY carefully.\n\
         - Tables may have multiple sub-columns - make sure you're in the right one.\n\
         - If the table has poor quality text extraction, RELY ON THE IMAGE.\n\n\
         Question: {question}\n\n\
         Text context:\n{context}\n\n\
         IMPORTANT: Visual tables below are the PRIMARY source. Read them carefully:"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator() -> GeminiGenerator {
        GeminiGenerator::new(&GenerationConfig {
            gemini_api_key: Some("test-key".to_string()),
            ..GenerationConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_new_without_key_fails() {
        let result = GeminiGenerator::new(&GenerationConfig::default());
        assert!(matches!(result, Err(GenerationError::NotConfigured(_))));
    }

    #[test]
    fn test_text_only_request_has_single_part() {
        let parts = generator().request_parts("q", "ctx", &[]);
        assert_eq!(parts.len(), 1);
        let text = parts[0]["text"].as_str().unwrap();
        assert!(text.contains("Question: q"));
        assert!(text.contains("ctx"));
    }

    #[test]
    fn test_visual_request_inlines_images() {
        let vp = VisualPart {
            page_number: 83,
            image_png: b"png-bytes".to_vec(),
            ocr_text: "garbled table".to_string(),
        };
        let parts = generator().request_parts("q", "ctx", &[vp]);
        // preamble + label + image + ocr text
        assert_eq!(parts.len(), 4);
        assert!(parts[1]["text"].as_str().unwrap().contains("[Page 83]"));
        assert_eq!(
            parts[2]["inline_data"]["data"].as_str().unwrap(),
            STANDARD.encode(b"png-bytes")
        );
        assert!(parts[3]["text"].as_str().unwrap().contains("garbled table"));
    }

    #[test]
    fn test_ocr_text_truncated() {
        let vp = VisualPart {
            page_number: 1,
            image_png: vec![0],
            ocr_text: "x".repeat(5000),
        };
        let parts = generator().request_parts("q", "ctx", &[vp]);
        let ocr_part = parts[3]["text"].as_str().unwrap();
        assert!(ocr_part.len() < 1200, "OCR text must be capped: {}", ocr_part.len());
    }
}
