pub mod executor;
pub mod types;

pub use executor::{ToolError, ToolExecutionContext, ToolExecutor};
pub use types::{FunctionSchema, ToolCall, ToolDefinition, ToolSchema, ToolSet};
