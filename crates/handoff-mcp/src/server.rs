//! MCP server over STDIO
//!
//! Reads newline-delimited JSON-RPC requests from stdin, routes them to the
//! core dispatcher, and writes responses to stdout. All logging goes to
//! stderr so stdout stays a clean protocol channel.

use std::sync::Arc;

use anyhow::{Context, Result};
use serde_json::Value;
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

use handoff_core::{DispatchError, Dispatcher, ProviderRegistry, catalog};

use crate::protocol::*;

/// MCP server exposing the operation catalog as tools.
pub struct McpServer {
    registry: Arc<ProviderRegistry>,
    dispatcher: Dispatcher,
}

impl McpServer {
    pub fn new(registry: Arc<ProviderRegistry>) -> Self {
        let dispatcher = Dispatcher::new(Arc::clone(&registry));
        Self {
            registry,
            dispatcher,
        }
    }

    /// Serve requests until stdin closes.
    pub async fn serve_stdio(&self) -> Result<()> {
        info!("MCP server starting on STDIO");

        let stdin = io::stdin();
        let mut stdout = io::stdout();
        let reader = BufReader::new(stdin);
        let mut lines = reader.lines();

        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            debug!("received: {}", &line[..line.len().min(200)]);

            let request: JsonRpcRequest = match serde_json::from_str(line) {
                Ok(r) => r,
                Err(e) => {
                    warn!("invalid JSON-RPC request: {}", e);
                    let response =
                        JsonRpcResponse::error(Value::Null, PARSE_ERROR, format!("Parse error: {e}"));
                    write_response(&mut stdout, &response).await?;
                    continue;
                }
            };

            if let Some(response) = self.handle_request(request).await {
                write_response(&mut stdout, &response).await?;
            }
        }

        info!("STDIO closed, shutting down");
        Ok(())
    }

    /// Handle one JSON-RPC request. Notifications return `None`.
    async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let id = request.id.clone().unwrap_or(Value::Null);

        match request.method.as_str() {
            "initialize" => {
                let result = serde_json::json!({
                    "protocolVersion": "2024-11-05",
                    "capabilities": {
                        "tools": { "listChanged": false }
                    },
                    "serverInfo": {
                        "name": "llm-handoff",
                        "version": env!("CARGO_PKG_VERSION"),
                    }
                });
                Some(JsonRpcResponse::success(id, result))
            }

            "notifications/initialized" => {
                info!("MCP client initialized");
                None
            }

            "tools/list" => {
                // Recomputed from the registry on every query.
                let tools: Vec<McpTool> = catalog::operations(&self.registry)
                    .into_iter()
                    .map(|op| McpTool {
                        input_schema: op.input_schema(),
                        name: op.name,
                        description: op.description,
                    })
                    .collect();
                info!("tools/list: returning {} tools", tools.len());
                Some(JsonRpcResponse::success(
                    id,
                    serde_json::json!({ "tools": tools }),
                ))
            }

            "tools/call" => {
                let name = request
                    .params
                    .get("name")
                    .and_then(Value::as_str)
                    .unwrap_or("");
                let arguments = request
                    .params
                    .get("arguments")
                    .cloned()
                    .unwrap_or(Value::Null);

                if name.is_empty() {
                    return Some(JsonRpcResponse::error(
                        id,
                        INVALID_PARAMS,
                        "Missing 'name' parameter".to_string(),
                    ));
                }

                info!("tools/call: {}", name);
                match self.dispatcher.invoke(name, &arguments).await {
                    Ok(text) => Some(JsonRpcResponse::success(
                        id,
                        serde_json::to_value(ToolCallResult::text(text)).unwrap(),
                    )),
                    Err(err @ DispatchError::InvalidArgument(_)) => {
                        Some(JsonRpcResponse::error(id, INVALID_PARAMS, err.to_string()))
                    }
                    Err(err @ DispatchError::UnknownOperation(_)) => {
                        warn!("{}", err);
                        Some(JsonRpcResponse::error(id, INVALID_PARAMS, err.to_string()))
                    }
                }
            }

            "ping" => Some(JsonRpcResponse::success(id, serde_json::json!({}))),

            _ => {
                // Unknown notifications are dropped silently.
                if request.id.is_none() {
                    None
                } else {
                    warn!("unknown method: {}", request.method);
                    Some(JsonRpcResponse::error(
                        id,
                        METHOD_NOT_FOUND,
                        format!("Unknown method: {}", request.method),
                    ))
                }
            }
        }
    }
}

/// Write a newline-delimited JSON-RPC response.
async fn write_response<W: AsyncWriteExt + Unpin>(
    writer: &mut W,
    response: &JsonRpcResponse,
) -> Result<()> {
    let json = serde_json::to_string(response).context("failed to serialize response")?;
    debug!("sending: {}", &json[..json.len().min(200)]);
    writer.write_all(json.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(())
}
