use agent_core::tools::{ToolError, ToolExecutionContext, ToolExecutor};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error};

use crate::error::McpError;
use crate::protocol::McpProtocolClient;

/// Executes one MCP tool over the connection its definition was fetched on.
pub struct McpToolExecutor {
    client: Arc<McpProtocolClient>,
    tool_name: String,
}

impl McpToolExecutor {
    pub fn new(client: Arc<McpProtocolClient>, tool_name: impl Into<String>) -> Self {
        Self {
            client,
            tool_name: tool_name.into(),
        }
    }
}

#[async_trait]
impl ToolExecutor for McpToolExecutor {
    async fn execute(
        &self,
        args: Value,
        context: ToolExecutionContext<'_>,
    ) -> std::result::Result<Value, ToolError> {
        debug!(
            "Executing MCP tool '{}' for call {} ({} messages of context)",
            self.tool_name,
            context.tool_call_id,
            context.messages.len()
        );

        let args = match args {
            Value::Null => Value::Object(Default::default()),
            Value::Object(_) => args,
            other => {
                return Err(ToolError::InvalidArguments(format!(
                    "expected an object, got {}",
                    other
                )))
            }
        };

        match self.client.call_tool(&self.tool_name, args).await {
            Ok(result) => Ok(result),
            Err(McpError::ToolExecution(message)) => Err(ToolError::Execution(message)),
            Err(e) => {
                error!("MCP tool '{}' failed: {}", self.tool_name, e);
                Err(ToolError::Execution(format!("MCP error: {}", e)))
            }
        }
    }
}
