//! Dispatcher — resolves operation names and executes provider calls
//!
//! Single entry point [`Dispatcher::invoke`]. Only a malformed `prompt` or
//! an unrecognized operation name is fatal; every provider-level failure is
//! rendered into the result text, so a valid invocation always yields a
//! textual answer. Fan-out runs all providers concurrently with no
//! cross-cancellation and reassembles outcomes in registry order.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::catalog::{FAN_OUT_OPERATION, operation_name};
use crate::error::{DispatchError, ProviderError};
use crate::provider::LlmProvider;
use crate::registry::ProviderRegistry;

/// Separator between rendered outcomes in a fan-out result.
const SEPARATOR: &str = "\n\n---\n\n";

/// Result of one provider invocation, before rendering.
pub struct Outcome {
    pub provider: String,
    pub result: Result<String, ProviderError>,
}

/// Routes named operations to providers and aggregates their outcomes.
pub struct Dispatcher {
    registry: Arc<ProviderRegistry>,
}

impl Dispatcher {
    pub fn new(registry: Arc<ProviderRegistry>) -> Self {
        Self { registry }
    }

    /// Invoke an operation by name with the given input object.
    ///
    /// The input must carry a string `prompt` field; this is checked before
    /// any operation resolution so malformed input fails the same way for
    /// every operation name.
    pub async fn invoke(&self, operation: &str, arguments: &Value) -> Result<String, DispatchError> {
        let prompt = arguments
            .get("prompt")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                DispatchError::InvalidArgument("missing or non-string 'prompt' field".to_string())
            })?;

        for provider in self.registry.iter() {
            if operation == operation_name(provider.name()) {
                return Ok(self.ask_one(provider, prompt).await);
            }
        }

        if operation == FAN_OUT_OPERATION && !self.registry.is_empty() {
            return Ok(self.ask_all(prompt).await);
        }

        Err(DispatchError::UnknownOperation(operation.to_string()))
    }

    /// Single-provider dispatch. A provider failure is content, not an
    /// error: the outer call succeeds either way.
    async fn ask_one(&self, provider: &Arc<dyn LlmProvider>, prompt: &str) -> String {
        debug!("dispatching to {}", provider.name());
        match provider.ask(prompt).await {
            Ok(answer) => format!("**{} Response:**\n\n{}", provider.name(), answer),
            Err(err) => {
                warn!("{} failed: {}", provider.name(), err);
                format!("**{} Error:**\n\n{}", provider.name(), err)
            }
        }
    }

    /// Fan-out dispatch: one task per provider, all started before any is
    /// awaited. Waits for every sibling, then joins the rendered outcomes
    /// in registry order regardless of completion order.
    async fn ask_all(&self, prompt: &str) -> String {
        debug!("fanning out to {} providers", self.registry.len());

        let mut handles = Vec::with_capacity(self.registry.len());
        for provider in self.registry.iter() {
            let provider = Arc::clone(provider);
            let prompt = prompt.to_string();
            handles.push(tokio::spawn(async move {
                let result = provider.ask(&prompt).await;
                Outcome {
                    provider: provider.name().to_string(),
                    result,
                }
            }));
        }

        let mut rendered = Vec::with_capacity(handles.len());
        for (provider, handle) in self.registry.iter().zip(handles) {
            let text = match handle.await {
                Ok(outcome) => render_fan_out(&outcome),
                // A panicked provider task counts as that provider failing.
                Err(join_err) => {
                    warn!("{} task failed: {}", provider.name(), join_err);
                    format!("**{} (Error):**\n{}", provider.name(), join_err)
                }
            };
            rendered.push(text);
        }

        rendered.join(SEPARATOR)
    }
}

fn render_fan_out(outcome: &Outcome) -> String {
    match &outcome.result {
        Ok(answer) => format!("**{}:**\n{}", outcome.provider, answer),
        Err(err) => {
            warn!("{} failed: {}", outcome.provider, err);
            format!("**{} (Error):**\n{}", outcome.provider, err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Provider returning a canned outcome after an optional delay.
    struct CannedProvider {
        name: &'static str,
        reply: Result<&'static str, &'static str>,
        delay: Duration,
        calls: AtomicUsize,
    }

    impl CannedProvider {
        fn ok(name: &'static str, answer: &'static str) -> Arc<Self> {
            Arc::new(Self {
                name,
                reply: Ok(answer),
                delay: Duration::ZERO,
                calls: AtomicUsize::new(0),
            })
        }

        fn err(name: &'static str, message: &'static str) -> Arc<Self> {
            Arc::new(Self {
                name,
                reply: Err(message),
                delay: Duration::ZERO,
                calls: AtomicUsize::new(0),
            })
        }

        fn slow(name: &'static str, answer: &'static str, delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                name,
                reply: Ok(answer),
                delay,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl LlmProvider for CannedProvider {
        fn name(&self) -> &str {
            self.name
        }

        async fn ask(&self, _prompt: &str) -> Result<String, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            match self.reply {
                Ok(answer) => Ok(answer.to_string()),
                Err(message) => Err(ProviderError {
                    status: None,
                    status_text: None,
                    message: message.to_string(),
                }),
            }
        }
    }

    fn dispatcher(providers: Vec<Arc<CannedProvider>>) -> Dispatcher {
        let providers: Vec<Arc<dyn LlmProvider>> = providers
            .into_iter()
            .map(|p| p as Arc<dyn LlmProvider>)
            .collect();
        Dispatcher::new(Arc::new(ProviderRegistry::from_providers(providers)))
    }

    #[tokio::test]
    async fn test_missing_prompt_is_invalid_argument() {
        let d = dispatcher(vec![CannedProvider::ok("P1", "A")]);
        for op in ["ask_p1", "ask_all_llms", "ask_nonexistent"] {
            let err = d.invoke(op, &json!({})).await.unwrap_err();
            assert!(matches!(err, DispatchError::InvalidArgument(_)), "{op}");
        }
    }

    #[tokio::test]
    async fn test_non_string_prompt_is_invalid_argument() {
        let d = dispatcher(vec![CannedProvider::ok("P1", "A")]);
        let err = d.invoke("ask_p1", &json!({"prompt": 7})).await.unwrap_err();
        assert!(matches!(err, DispatchError::InvalidArgument(_)));
        let err = d.invoke("ask_p1", &Value::Null).await.unwrap_err();
        assert!(matches!(err, DispatchError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_unknown_operation_never_reaches_providers() {
        let p1 = CannedProvider::ok("P1", "A");
        let d = dispatcher(vec![p1.clone()]);
        let err = d
            .invoke("ask_other", &json!({"prompt": "hi"}))
            .await
            .unwrap_err();
        assert_eq!(err, DispatchError::UnknownOperation("ask_other".to_string()));
        assert_eq!(p1.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_single_dispatch_success_banner() {
        let d = dispatcher(vec![CannedProvider::ok("ChatGPT", "42")]);
        let text = d
            .invoke("ask_chatgpt", &json!({"prompt": "meaning of life"}))
            .await
            .unwrap();
        assert_eq!(text, "**ChatGPT Response:**\n\n42");
    }

    #[tokio::test]
    async fn test_single_dispatch_failure_is_successful_result() {
        let d = dispatcher(vec![CannedProvider::err("Gemini", "rate limited")]);
        let text = d
            .invoke("ask_gemini", &json!({"prompt": "hi"}))
            .await
            .unwrap();
        assert_eq!(text, "**Gemini Error:**\n\nrate limited");
    }

    #[tokio::test]
    async fn test_fan_out_registry_order_and_error_isolation() {
        // P1 is the slowest, so completion order is P2, P3, P1; the
        // aggregation must still come back in registry order.
        let d = dispatcher(vec![
            CannedProvider::slow("P1", "A", Duration::from_millis(30)),
            CannedProvider::err("P2", "boom"),
            CannedProvider::slow("P3", "C", Duration::from_millis(10)),
        ]);
        let text = d.invoke("ask_all_llms", &json!({"prompt": "q"})).await.unwrap();
        assert_eq!(
            text,
            "**P1:**\nA\n\n---\n\n**P2 (Error):**\nboom\n\n---\n\n**P3:**\nC"
        );
    }

    #[tokio::test]
    async fn test_fan_out_single_provider_no_separator() {
        let d = dispatcher(vec![CannedProvider::ok("P1", "A")]);
        let text = d.invoke("ask_all_llms", &json!({"prompt": "q"})).await.unwrap();
        assert_eq!(text, "**P1:**\nA");
    }

    #[tokio::test]
    async fn test_fan_out_all_failures_still_succeeds() {
        let d = dispatcher(vec![
            CannedProvider::err("P1", "down"),
            CannedProvider::err("P2", "also down"),
        ]);
        let text = d.invoke("ask_all_llms", &json!({"prompt": "q"})).await.unwrap();
        assert_eq!(
            text,
            "**P1 (Error):**\ndown\n\n---\n\n**P2 (Error):**\nalso down"
        );
    }

    #[tokio::test]
    async fn test_fan_out_with_empty_registry_is_unknown_operation() {
        let d = dispatcher(vec![]);
        let err = d
            .invoke("ask_all_llms", &json!({"prompt": "q"}))
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::UnknownOperation(_)));
    }

    #[tokio::test]
    async fn test_repeated_ask_issues_independent_calls() {
        let p1 = CannedProvider::ok("P1", "A");
        let d = dispatcher(vec![p1.clone()]);
        let args = json!({"prompt": "same prompt"});
        d.invoke("ask_p1", &args).await.unwrap();
        d.invoke("ask_p1", &args).await.unwrap();
        assert_eq!(p1.calls.load(Ordering::SeqCst), 2);
    }
}
