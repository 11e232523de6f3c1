//! Error taxonomy for the dispatcher and providers
//!
//! Only [`DispatchError`] ever crosses the transport boundary. A
//! [`ProviderError`] is always folded into the rendered result text by the
//! dispatcher, never surfaced as a protocol failure.

use serde_json::Value;
use thiserror::Error;

/// A fatal dispatch failure, surfaced to the transport layer as-is.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    /// The invocation input was missing or lacked a string `prompt` field.
    #[error("invalid arguments: {0}")]
    InvalidArgument(String),

    /// The operation name matched no provider and was not the fan-out name.
    #[error("unknown operation: {0}")]
    UnknownOperation(String),
}

/// A failure while contacting or interpreting an upstream provider.
///
/// Carries whatever the upstream gave us: the HTTP status if the request got
/// that far, and a human message resolved from the response body when one
/// was present.
#[derive(Debug, Error, Clone)]
#[error("{message}")]
pub struct ProviderError {
    /// Upstream HTTP status code, if the request reached the server.
    pub status: Option<u16>,
    /// Upstream status text, if available.
    pub status_text: Option<String>,
    /// Human-readable description, always populated.
    pub message: String,
}

impl ProviderError {
    /// A transport-level failure (connect, DNS, body read).
    pub fn transport(err: &reqwest::Error) -> Self {
        Self {
            status: err.status().map(|s| s.as_u16()),
            status_text: err
                .status()
                .and_then(|s| s.canonical_reason())
                .map(str::to_string),
            message: format!("request failed: {err}"),
        }
    }

    /// A non-2xx upstream response.
    ///
    /// The message falls back through the payload shapes the providers use:
    /// `error.message` (OpenAI-style and Gemini), then a top-level
    /// `message`, then the bare status line.
    pub fn http(status: reqwest::StatusCode, body: &Value) -> Self {
        let status_text = status.canonical_reason().map(str::to_string);
        let message = body
            .pointer("/error/message")
            .and_then(Value::as_str)
            .or_else(|| body.get("message").and_then(Value::as_str))
            .map(str::to_string)
            .unwrap_or_else(|| {
                format!(
                    "HTTP {} {}",
                    status.as_u16(),
                    status_text.as_deref().unwrap_or("")
                )
                .trim_end()
                .to_string()
            });
        Self {
            status: Some(status.as_u16()),
            status_text,
            message,
        }
    }

    /// A 2xx response whose body did not contain the expected answer field.
    pub fn malformed(provider: &str) -> Self {
        Self {
            status: None,
            status_text: None,
            message: format!("{provider} returned a response with no answer text"),
        }
    }
}
