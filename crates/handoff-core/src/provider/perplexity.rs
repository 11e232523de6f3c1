//! Perplexity backend — OpenAI-compatible chat completions endpoint

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::{LlmProvider, send_json};
use crate::error::ProviderError;

const ENDPOINT: &str = "https://api.perplexity.ai/chat/completions";
const MODEL: &str = "llama-3.1-sonar-small-128k-online";

/// Asks Perplexity's chat completions endpoint with bearer auth.
#[derive(Clone)]
pub struct PerplexityProvider {
    client: Client,
    api_key: String,
}

impl std::fmt::Debug for PerplexityProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PerplexityProvider")
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

impl PerplexityProvider {
    pub fn new(client: Client, api_key: String) -> Self {
        Self { client, api_key }
    }
}

fn extract_answer(body: &Value) -> Option<String> {
    body.pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[async_trait]
impl LlmProvider for PerplexityProvider {
    fn name(&self) -> &str {
        "Perplexity"
    }

    async fn ask(&self, prompt: &str) -> Result<String, ProviderError> {
        debug!("asking Perplexity ({} chars)", prompt.len());
        let request = ChatRequest {
            model: MODEL,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };
        let body = send_json(
            self.client
                .post(ENDPOINT)
                .bearer_auth(&self.api_key)
                .json(&request),
        )
        .await?;
        extract_answer(&body).ok_or_else(|| ProviderError::malformed(self.name()))
    }
}
