//! ChatGPT backend via the OpenAI chat completions API

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::{LlmProvider, send_json};
use crate::error::ProviderError;

const ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
const MODEL: &str = "gpt-4";
const MAX_TOKENS: u32 = 1000;

/// Asks OpenAI's chat completions endpoint with bearer auth.
#[derive(Clone)]
pub struct ChatGptProvider {
    client: Client,
    api_key: String,
}

impl std::fmt::Debug for ChatGptProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatGptProvider")
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    max_tokens: u32,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

impl ChatGptProvider {
    pub fn new(client: Client, api_key: String) -> Self {
        Self { client, api_key }
    }
}

/// Answer text lives at `choices[0].message.content`.
fn extract_answer(body: &Value) -> Option<String> {
    body.pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[async_trait]
impl LlmProvider for ChatGptProvider {
    fn name(&self) -> &str {
        "ChatGPT"
    }

    async fn ask(&self, prompt: &str) -> Result<String, ProviderError> {
        debug!("asking ChatGPT ({} chars)", prompt.len());
        let request = ChatRequest {
            model: MODEL,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
            max_tokens: MAX_TOKENS,
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
