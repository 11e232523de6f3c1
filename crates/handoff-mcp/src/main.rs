//! handoff-mcp — MCP server that hands a prompt off to your LLM backends
//!
//! Exposes one `ask_*` tool per configured provider (ChatGPT, Perplexity,
//! Gemini) plus `ask_all_llms`, which queries every active provider
//! concurrently and aggregates the answers. Speaks the Model Context
//! Protocol over STDIO (newline-delimited JSON-RPC 2.0).
//!
//! Providers are activated by environment variables at startup:
//!   OPENAI_API_KEY, PERPLEXITY_API_KEY, GEMINI_API_KEY
//! A variable left at its `your_..._api_key_here` template value is ignored.

mod protocol;
mod server;

use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};

use handoff_core::{Config, ProviderRegistry};

use crate::server::McpServer;

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries the protocol.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("handoff-mcp v{} starting", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env();
    let registry = Arc::new(ProviderRegistry::from_config(&config));
    if registry.is_empty() {
        warn!("no provider credentials configured; the tool list will be empty");
    }

    McpServer::new(registry).serve_stdio().await
}
