use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info, warn};

use crate::error::{McpError, Result};
use crate::protocol::models::*;

/// Transport trait for MCP communication
#[async_trait]
pub trait McpTransport: Send + Sync {
    /// Sends a request and waits for the response carrying the same id.
    async fn request(&self, request: JsonRpcRequest) -> Result<JsonRpcResponse>;
    async fn notify(&self, notification: JsonRpcNotification) -> Result<()>;
    /// Releases the server-side session. Calling it twice is a no-op.
    async fn close(&self) -> Result<()>;
    /// Records the protocol version negotiated during `initialize`.
    fn set_protocol_version(&self, _version: &str) {}
}

/// MCP protocol client over a single connection
pub struct McpProtocolClient {
    transport: Box<dyn McpTransport>,
    next_id: AtomicU64,
}

impl McpProtocolClient {
    pub fn new(transport: Box<dyn McpTransport>) -> Self {
        Self {
            transport,
            next_id: AtomicU64::new(1),
        }
    }

    async fn send_request(&self, method: &str, params: Option<Value>) -> Result<Value> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        debug!("MCP request {} -> {}", id, method);

        let response = self
            .transport
            .request(JsonRpcRequest::new(id, method, params))
            .await?;

        if response.id != id {
            return Err(McpError::Protocol(format!(
                "Response id {} does not match request id {}",
                response.id, id
            )));
        }

        response.into_result()
    }

    /// Performs the `initialize` handshake followed by the
    /// `notifications/initialized` notification.
    pub async fn initialize(&self) -> Result<McpInitializeResult> {
        let params = serde_json::to_value(McpInitializeRequest::default())?;

        let result = self
            .send_request("initialize", Some(params))
            .await
            .map_err(|e| match e {
                McpError::Rpc { code, message } => {
                    McpError::Connection(format!("Handshake rejected ({}): {}", code, message))
                }
                other => other,
            })?;

        let result: McpInitializeResult = serde_json::from_value(result)
            .map_err(|e| McpError::Protocol(format!("Malformed initialize result: {}", e)))?;

        self.transport.set_protocol_version(&result.protocol_version);
        self.transport
            .notify(JsonRpcNotification::new("notifications/initialized"))
            .await?;

        info!(
            "MCP server initialized: {} v{} (protocol {})",
            result.server_info.name, result.server_info.version, result.protocol_version
        );

        Ok(result)
    }

    /// Lists every tool, following `nextCursor` until the catalog is exhausted.
    pub async fn list_tools(&self) -> Result<Vec<McpToolInfo>> {
        let mut tools = Vec::new();
        let mut cursor: Option<String> = None;
        let mut seen_cursors = HashSet::new();

        loop {
            let params = match cursor.take() {
                Some(cursor) => Some(serde_json::to_value(McpToolListRequest {
                    cursor: Some(cursor),
                })?),
                None => None,
            };

            let result = self
                .send_request("tools/list", params)
                .await
                .map_err(|e| match e {
                    McpError::Rpc { code, message } => {
                        McpError::Protocol(format!("tools/list failed ({}): {}", code, message))
                    }
                    other => other,
                })?;

            let page: McpToolListResult = serde_json::from_value(result)
                .map_err(|e| McpError::Protocol(format!("Malformed tools/list result: {}", e)))?;

            tools.extend(page.tools);

            match page.next_cursor {
                Some(next) if next.is_empty() => break,
                Some(next) if !seen_cursors.insert(next.clone()) => {
                    warn!("tools/list repeated cursor {:?}; stopping pagination", next);
                    break;
                }
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        debug!("MCP server listed {} tools", tools.len());
        Ok(tools)
    }

    /// Calls a tool and returns the raw `tools/call` result object.
    pub async fn call_tool(&self, name: &str, arguments: Value) -> Result<Value> {
        let request = McpToolCallRequest {
            name: name.to_string(),
            arguments: Some(arguments),
        };
        let params = serde_json::to_value(request)?;

        self.send_request("tools/call", Some(params))
            .await
            .map_err(|e| match e {
                McpError::Rpc { code, message } => {
                    McpError::ToolExecution(format!("{} failed ({}): {}", name, code, message))
                }
                other => other,
            })
    }

    pub async fn close(&self) -> Result<()> {
        self.transport.close().await
    }
}
