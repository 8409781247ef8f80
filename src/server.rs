use rmcp::{
    ServerHandler,
    tool,
    model::{ServerCapabilities, Implementation, ProtocolVersion, CallToolResult},
    handler::server::wrapper::Parameters,
    ErrorData as McpError,
};
use serde::{Deserialize, Serialize};
use schemars::JsonSchema;
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;

use crate::config::RetrievalConfig;
use crate::generation::AnswerGenerator;
use crate::search::{answer_question, RetrievalContext};

/// MCP service exposing the manual QA pipeline.
///
/// The retrieval context is loaded before the service is constructed —
/// serving never starts with missing indexes.
pub struct ManualQaService {
    ctx: Arc<RetrievalContext>,
    generator: Arc<dyn AnswerGenerator>,
    retrieval: RetrievalConfig,
    start_time: Instant,
}

impl ManualQaService {
    pub fn new(
        ctx: Arc<RetrievalContext>,
        generator: Arc<dyn AnswerGenerator>,
        retrieval: RetrievalConfig,
    ) -> Self {
        Self {
            ctx,
            generator,
            retrieval,
            start_time: Instant::now(),
        }
    }

    fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct AskQuestionParams {
    /// Natural-language question about the manual (required)
    pub question: String,
    /// Number of pages to retrieve and cite (1-20, default from config)
    pub top_k: Option<u32>,
}

#[rmcp::tool_router]
impl ManualQaService {
    #[tool(description = "Ask a question about the manual. Returns a grounded answer and the cited page numbers in ascending order.")]
    async fn ask_question(
        &self,
        Parameters(params): Parameters<AskQuestionParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(
            tool = "ask_question",
            top_k = ?params.top_k,
            "Tool called"
        );

        if params.question.trim().is_empty() {
            return Ok(CallToolResult::structured_error(json!({
                "isError": true,
                "error": "Field 'question' is required and cannot be empty",
                "field": "question"
            })));
        }

        let top_k = params
            .top_k
            .map(|k| k.clamp(1, 20) as usize)
            .unwrap_or(self.retrieval.top_k);

        match answer_question(
            &self.ctx,
            self.generator.as_ref(),
            &params.question,
            top_k,
            self.retrieval.alpha,
        )
        .await
        {
            Ok(response) => Ok(CallToolResult::structured(json!({
                "answer": response.answer,
                "pages": response.pages,
            }))),
            Err(e) => {
                tracing::error!(error = %e, "Query pipeline failed");
                Ok(CallToolResult::structured_error(json!({
                    "isError": true,
                    "error": format!("Server error during query processing: {}", e),
                })))
            }
        }
    }

    #[tool(description = "Check server health and corpus status")]
    async fn health_check(&self) -> Result<CallToolResult, McpError> {
        tracing::info!(tool = "health_check", "Tool called");

        Ok(CallToolResult::structured(json!({
            "status": "ok",
            "version": env!("CARGO_PKG_VERSION"),
            "uptime_seconds": self.uptime_seconds(),
            "chunks": self.ctx.store.len(),
            "pages": self.ctx.store.distinct_pages(),
            "embedding_model": self.ctx.embedder.model_name(),
            "generation_model": self.generator.model_name(),
        })))
    }
}

#[rmcp::tool_handler(router = Self::tool_router())]
impl ServerHandler for ManualQaService {
    fn get_info(&self) -> rmcp::model::InitializeResult {
        rmcp::model::InitializeResult {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .build(),
            server_info: Implementation {
                name: "manualqa".to_string(),
                title: None,
                version: env!("CARGO_PKG_VERSION").to_string(),
                description: Some("Hybrid retrieval QA server for technical manuals".to_string()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "QA server over a fixed technical manual. Tools: ask_question (question -> answer + cited pages), health_check.".to_string()
            ),
        }
    }
}
