//! Gemini backend via the Google Generative Language API
//!
//! Unlike the other backends, Gemini authenticates with the API key in the
//! request URL rather than a bearer header.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::{LlmProvider, send_json};
use crate::error::ProviderError;

const ENDPOINT: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-pro:generateContent";

/// Asks Google's Gemini generateContent endpoint.
#[derive(Clone)]
pub struct GeminiProvider {
    client: Client,
    api_key: String,
}

impl std::fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

impl GeminiProvider {
    pub fn new(client: Client, api_key: String) -> Self {
        Self { client, api_key }
    }
}

/// Answer text lives at `candidates[0].content.parts[0].text`.
fn extract_answer(body: &Value) -> Option<String> {
    body.pointer("/candidates/0/content/parts/0/text")
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    fn name(&self) -> &str {
        "Gemini"
    }

    async fn ask(&self, prompt: &str) -> Result<String, ProviderError> {
        debug!("asking Gemini ({} chars)", prompt.len());
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };
        let body = send_json(
            self.client
                .post(ENDPOINT)
                .query(&[("key", self.api_key.as_str())])
                .json(&request),
        )
        .await?;
        extract_answer(&body).ok_or_else(|| ProviderError::malformed(self.name()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_answer() {
        let body = json!({
            "candidates": [{"content": {"parts": [{"text": "bonjour"}]}}]
        });
        assert_eq!(extract_answer(&body).as_deref(), Some("bonjour"));
    }

    #[test]
    fn test_extract_answer_empty_candidates() {
        assert!(extract_answer(&json!({"candidates": []})).is_none());
        assert!(extract_answer(&json!({})).is_none());
    }

    #[test]
    fn test_request_shape() {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: "hi" }],
            }],
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["contents"][0]["parts"][0]["text"], "hi");
    }
}
