pub mod agent;
pub mod tools;

pub use agent::types::{validate_history, ContentPart, Message, MessageContent, Role};
pub use agent::MessageError;
pub use tools::{
    FunctionSchema, ToolCall, ToolDefinition, ToolError, ToolExecutionContext, ToolExecutor,
    ToolSchema, ToolSet,
};
