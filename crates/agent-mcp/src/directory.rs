//! Per-request view of a remote MCP server's tool catalog.
//!
//! A [`ToolDirectory`] owns one connection. Its definitions execute over that
//! connection, so the directory has to stay open until every execution is
//! done and then be closed.

use agent_core::tools::{ToolDefinition, ToolSet};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::McpServerConfig;
use crate::error::Result;
use crate::executor::McpToolExecutor;
use crate::protocol::{McpProtocolClient, McpTransport};
use crate::transports::StreamableHttpTransport;

pub struct ToolDirectory {
    client: Arc<McpProtocolClient>,
    tools: ToolSet,
}

impl ToolDirectory {
    /// Connects to the server described by `config` and fetches its catalog.
    pub async fn open(config: &McpServerConfig) -> Result<Self> {
        let transport = StreamableHttpTransport::new(config)?;
        info!("Opening MCP tool directory at {}", config.url);
        Self::open_with_transport(Box::new(transport)).await
    }

    pub async fn open_with_transport(transport: Box<dyn McpTransport>) -> Result<Self> {
        let client = Arc::new(McpProtocolClient::new(transport));

        let listed = async {
            client.initialize().await?;
            client.list_tools().await
        }
        .await;

        let infos = match listed {
            Ok(infos) => infos,
            Err(e) => {
                if let Err(close_err) = client.close().await {
                    warn!("Failed to close MCP connection after error: {}", close_err);
                }
                return Err(e);
            }
        };

        let tools = infos
            .into_iter()
            .map(|info| {
                let executor = Arc::new(McpToolExecutor::new(client.clone(), info.name.clone()));
                ToolDefinition::new(
                    info.name,
                    info.description.unwrap_or_default(),
                    info.input_schema
                        .unwrap_or_else(|| json!({"type": "object", "properties": {}})),
                )
                .with_executor(executor)
            })
            .collect();

        Ok(Self { client, tools })
    }

    pub fn tools(&self) -> &ToolSet {
        &self.tools
    }

    pub async fn close(self) -> Result<()> {
        self.client.close().await
    }
}

/// Fetches the schema-only catalog and closes the connection right away.
pub async fn fetch_tool_catalog(config: &McpServerConfig) -> Result<ToolSet> {
    let directory = ToolDirectory::open(config).await?;
    let catalog = directory.tools().without_execute();
    if let Err(e) = directory.close().await {
        warn!("Failed to close MCP session after listing tools: {}", e);
    }
    Ok(catalog)
}
