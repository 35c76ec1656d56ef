use agent_core::{MessageError, ToolError};
use agent_llm::LLMError;
use agent_mcp::McpError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TurnError {
    #[error("Invalid message history: {0}")]
    InvalidHistory(#[from] MessageError),

    #[error("Tool server error: {0}")]
    Mcp(#[from] McpError),

    #[error("LLM error: {0}")]
    Llm(#[from] LLMError),

    #[error("Tool '{tool_name}' (call {tool_call_id}) is not offered by the tool server")]
    UnknownTool {
        tool_call_id: String,
        tool_name: String,
    },

    #[error("Tool '{tool_name}' (call {tool_call_id}) failed: {source}")]
    ToolExecution {
        tool_call_id: String,
        tool_name: String,
        #[source]
        source: ToolError,
    },
}

pub type Result<T> = std::result::Result<T, TurnError>;
