use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::agent::Message;

#[derive(Error, Debug, Clone)]
pub enum ToolError {
    #[error("Execution failed: {0}")]
    Execution(String),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),
}

pub type Result<T> = std::result::Result<T, ToolError>;

/// What a tool sees of the conversation that proposed it.
#[derive(Debug, Clone, Copy)]
pub struct ToolExecutionContext<'a> {
    pub tool_call_id: &'a str,
    pub messages: &'a [Message],
}

#[async_trait]
pub trait ToolExecutor: Send + Sync {
    /// Runs the tool and returns its structured result.
    async fn execute(&self, args: Value, context: ToolExecutionContext<'_>) -> Result<Value>;
}
