//! Hosted completion API passthrough.
//!
//! The chat route forwards each conversation turn to an OpenAI-compatible
//! chat-completions endpoint with a fixed system prompt and a fixed
//! max-token parameter. No retry, no streaming.

use async_trait::async_trait;
use lazy_static::lazy_static;
use serde::Serialize;
use thiserror::Error;

/// System prompt sent with every turn.
pub const SYSTEM_PROMPT: &str = "You are a helpful coding assistant. Help users with their \
     programming questions, debugging, and code optimization. Be concise but thorough.";

/// Fixed per-request token budget.
const MAX_TOKENS: u32 = 500;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o";

lazy_static! {
    static ref HTTP_CLIENT: reqwest::Client = reqwest::Client::new();
}

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("upstream request failed: {0}")]
    Upstream(String),
    #[error("upstream returned status {0}")]
    Status(u16),
    #[error("upstream returned no completion text")]
    Empty,
}

#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// One conversation turn: the user's message in, the assistant's text out.
    async fn complete(&self, user_message: &str) -> Result<String, CompletionError>;
}

#[derive(Debug, Serialize)]
struct ChatTurn<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatTurn<'a>>,
    max_tokens: u32,
}

/// Client for an OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAiCompletions {
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiCompletions {
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            api_key: std::env::var("OPENAI_API_KEY").unwrap_or_default(),
            model: std::env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
        }
    }
}

#[async_trait]
impl CompletionBackend for OpenAiCompletions {
    async fn complete(&self, user_message: &str) -> Result<String, CompletionError> {
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let body = CompletionRequest {
            model: &self.model,
            messages: vec![
                ChatTurn {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatTurn {
                    role: "user",
                    content: user_message,
                },
            ],
            max_tokens: MAX_TOKENS,
        };

        let response = HTTP_CLIENT
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "completion upstream request failed");
                CompletionError::Upstream(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = %status, "completion upstream returned error");
            return Err(CompletionError::Status(status.as_u16()));
        }

        let payload: serde_json::Value = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "failed to parse completion response");
            CompletionError::Upstream(e.to_string())
        })?;

        payload["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .filter(|s| !s.is_empty())
            .ok_or(CompletionError::Empty)
    }
}
