//! LLM backend abstraction
//!
//! Each backend implements [`LlmProvider`]: a stable display name plus a
//! single `ask` call mapping a prompt to answer text. Providers are
//! immutable after construction and issue exactly one outbound HTTP request
//! per `ask` — no retries, no caching.

pub mod chatgpt;
pub mod gemini;
pub mod perplexity;

pub use chatgpt::ChatGptProvider;
pub use gemini::GeminiProvider;
pub use perplexity::PerplexityProvider;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::error::ProviderError;

/// A backend capable of answering a prompt.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Stable display name, unique within the registry (e.g. "ChatGPT").
    fn name(&self) -> &str;

    /// Send one prompt upstream and return the answer text.
    async fn ask(&self, prompt: &str) -> Result<String, ProviderError>;
}

/// Send a prepared request and parse the response body as JSON.
///
/// Non-2xx responses become a [`ProviderError`] carrying whatever message
/// the upstream body offered; transport failures carry the reqwest error
/// text. The caller extracts the answer from the returned body.
pub(crate) async fn send_json(request: reqwest::RequestBuilder) -> Result<Value, ProviderError> {
    let response = request
        .send()
        .await
        .map_err(|e| ProviderError::transport(&e))?;

    let status = response.status();
    let body: Value = response
        .json()
        .await
        .unwrap_or_else(|_| Value::Object(Default::default()));

    if !status.is_success() {
        debug!("upstream returned {}", status);
        return Err(ProviderError::http(status, &body));
    }

    Ok(body)
}
