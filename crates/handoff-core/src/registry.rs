//! Provider registry — the ordered set of active backends
//!
//! Built once at startup from [`Config`] and read-only afterwards, so it is
//! safe to share across in-flight dispatches without locking. Registry
//! order is the fixed configuration-check order (ChatGPT, Perplexity,
//! Gemini) and determines the order of catalog entries and fan-out
//! aggregation.

use std::sync::Arc;

use reqwest::Client;
use tracing::info;

use crate::config::Config;
use crate::provider::{ChatGptProvider, GeminiProvider, LlmProvider, PerplexityProvider};

/// Ordered, immutable collection of active providers. Names are unique.
pub struct ProviderRegistry {
    providers: Vec<Arc<dyn LlmProvider>>,
}

impl ProviderRegistry {
    /// Build the registry from configuration, one provider per present
    /// credential, in fixed priority order.
    pub fn from_config(config: &Config) -> Self {
        let client = Client::new();
        let mut providers: Vec<Arc<dyn LlmProvider>> = Vec::new();

        if let Some(key) = &config.openai_api_key {
            providers.push(Arc::new(ChatGptProvider::new(client.clone(), key.clone())));
        }
        if let Some(key) = &config.perplexity_api_key {
            providers.push(Arc::new(PerplexityProvider::new(
                client.clone(),
                key.clone(),
            )));
        }
        if let Some(key) = &config.gemini_api_key {
            providers.push(Arc::new(GeminiProvider::new(client.clone(), key.clone())));
        }

        let names: Vec<&str> = providers.iter().map(|p| p.name()).collect();
        info!("active providers: [{}]", names.join(", "));

        Self { providers }
    }

    /// Build directly from provider instances. Used by tests and by any
    /// embedder that wants backends beyond the built-in three.
    pub fn from_providers(providers: Vec<Arc<dyn LlmProvider>>) -> Self {
        debug_assert!(
            {
                let mut names: Vec<String> =
                    providers.iter().map(|p| p.name().to_lowercase()).collect();
                names.sort();
                names.windows(2).all(|w| w[0] != w[1])
            },
            "provider names must be unique"
        );
        Self { providers }
    }

    /// Providers in registry order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn LlmProvider>> {
        self.providers.iter()
    }

    /// Look up a provider by normalized (lowercased) name.
    pub fn get(&self, normalized_name: &str) -> Option<&Arc<dyn LlmProvider>> {
        self.providers
            .iter()
            .find(|p| p.name().to_lowercase() == normalized_name)
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
